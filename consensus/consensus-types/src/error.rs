// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::common::{Author, HashValue, Round};
use thiserror::Error;

/// The error kinds the replica core distinguishes. None of them is fatal:
/// processors log the error and return to the event loop.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConsensusError {
    #[error("certificate at round {attempted} does not improve on the high QC at round {current}")]
    StaleQC { attempted: Round, current: Round },

    #[error("message at round {msg_round} is behind the current round {current_round}")]
    StaleMessage {
        msg_round: Round,
        current_round: Round,
    },

    #[error("ancestor {0} is not in the block store")]
    MissingAncestor(HashValue),

    #[error("block at round {round} was proposed by {author}, who is not the round leader")]
    InvalidLeader { author: Author, round: Round },

    #[error("block {0} is at or below the committed frontier")]
    NothingToCommit(HashValue),
}
