// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Consensus for the permissioned chained-BFT network: a view-based
//! pacemaker, a levelled block forest with the three-chain commit rule,
//! and the vote aggregation that drives rounds forward.

pub mod chained_bft;
pub mod config;
pub mod consensus_provider;
pub mod counters;
pub mod util;
