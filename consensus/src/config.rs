// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use consensus_types::common::Author;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, time::Duration};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ConsensusConfig {
    // Protocol selector; see consensus_provider::algorithm_from_config
    pub algorithm: String,
    // Simulated signing time applied before a vote leaves the replica
    pub vote_delay_ms: u64,
    // Simulated assembly time applied before a proposal is broadcast
    pub block_build_delay_ms: u64,
    // Maximum number of transactions drawn into one proposal
    pub max_block_size: usize,
    // Validators counted as byzantine for chain-quality accounting
    pub byzantine: BTreeSet<Author>,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            algorithm: "hotsutff".to_string(),
            vote_delay_ms: 20,
            block_build_delay_ms: 50,
            max_block_size: 100,
            byzantine: BTreeSet::new(),
        }
    }
}

impl ConsensusConfig {
    pub fn is_byzantine(&self, author: Author) -> bool {
        self.byzantine.contains(&author)
    }

    pub fn vote_delay(&self) -> Duration {
        Duration::from_millis(self.vote_delay_ms)
    }

    pub fn block_build_delay(&self) -> Duration {
        Duration::from_millis(self.block_build_delay_ms)
    }
}
