// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use consensus_types::common::Round;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The per-replica safety state. Both fields only ever move forward:
/// `last_vote_round` guards against equivocation within a round,
/// `locked_round` anchors the branch the replica is committed to extending.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConsensusState {
    last_vote_round: Round,
    locked_round: Round,
}

impl ConsensusState {
    pub fn new(last_vote_round: Round, locked_round: Round) -> Self {
        ConsensusState {
            last_vote_round,
            locked_round,
        }
    }

    pub fn last_vote_round(&self) -> Round {
        self.last_vote_round
    }

    pub fn locked_round(&self) -> Round {
        self.locked_round
    }

    /// Monotone: an attempt to move backwards is ignored.
    pub fn set_last_vote_round(&mut self, round: Round) {
        self.last_vote_round = self.last_vote_round.max(round);
    }

    /// Monotone: an attempt to move backwards is ignored.
    pub fn set_locked_round(&mut self, round: Round) {
        self.locked_round = self.locked_round.max(round);
    }
}

impl fmt::Display for ConsensusState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ConsensusState[last_vote_round: {}, locked_round: {}]",
            self.last_vote_round, self.locked_round
        )
    }
}
