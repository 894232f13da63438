// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::chained_bft::liveness::proposer_election::ProposerElection;
use consensus_types::common::{Author, Round};

/// The rotating proposer maps rounds to validators round-robin over the
/// fixed, ordered roster: the leader for round r is roster[r mod N]. Every
/// replica evaluates the same pure function, so no coordination is needed.
pub struct RotatingProposer {
    proposers: Vec<Author>,
}

impl RotatingProposer {
    /// `proposers` must be identically ordered on every replica.
    pub fn new(proposers: Vec<Author>) -> Self {
        assert!(!proposers.is_empty(), "proposer roster cannot be empty");
        RotatingProposer { proposers }
    }
}

impl ProposerElection for RotatingProposer {
    fn get_valid_proposer(&self, round: Round) -> Author {
        self.proposers[(round % self.proposers.len() as u64) as usize]
    }
}
