// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};

lazy_static! {
    /// Count of all blocks inserted into the forest, committed or not.
    pub static ref TOTAL_BLOCK_COUNT: IntCounter = register_int_counter!(
        "consensus_total_block_count",
        "Count of all blocks inserted into the block store"
    )
    .unwrap();

    /// Count of committed blocks.
    pub static ref COMMITTED_BLOCK_COUNT: IntCounter = register_int_counter!(
        "consensus_committed_block_count",
        "Count of committed blocks"
    )
    .unwrap();

    /// Count of committed blocks whose proposer is not in the configured
    /// byzantine set; the numerator of the chain-quality ratio.
    pub static ref HONEST_COMMITTED_BLOCK_COUNT: IntCounter = register_int_counter!(
        "consensus_honest_committed_block_count",
        "Count of committed blocks proposed by honest validators"
    )
    .unwrap();

    pub static ref LAST_COMMITTED_ROUND: IntGauge = register_int_gauge!(
        "consensus_last_committed_round",
        "Round of the last committed block"
    )
    .unwrap();

    pub static ref CURRENT_ROUND: IntGauge = register_int_gauge!(
        "consensus_current_round",
        "Round the pacemaker is currently in"
    )
    .unwrap();

    /// Distinct votes buffered by the aggregator, across all candidate blocks.
    pub static ref PENDING_VOTES: IntGauge = register_int_gauge!(
        "consensus_pending_votes",
        "Distinct votes buffered across all candidate blocks"
    )
    .unwrap();
}
