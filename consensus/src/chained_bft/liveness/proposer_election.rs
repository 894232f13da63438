// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use consensus_types::common::{Author, Round};

/// ProposerElection incorporates the logic of choosing a leader among
/// multiple candidates for a given round.
pub trait ProposerElection: Send + Sync {
    /// The validator entitled to propose in `round`.
    fn get_valid_proposer(&self, round: Round) -> Author;

    /// If a given author is a valid candidate for being a proposer in a
    /// given round.
    fn is_valid_proposer(&self, author: Author, round: Round) -> bool {
        self.get_valid_proposer(round) == author
    }
}
