// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::common::{Author, HashValue, Round, Signature};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One validator's vote for a block. An honest validator emits at most one
/// vote per round; the aggregator treats repeats from the same voter as
/// no-ops.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Vote {
    round: Round,
    author: Author,
    block_id: HashValue,
    signature: Signature,
}

impl Vote {
    pub fn new(round: Round, author: Author, block_id: HashValue) -> Self {
        Vote {
            round,
            author,
            block_id,
            signature: Signature::sign(author, round),
        }
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn block_id(&self) -> HashValue {
        self.block_id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Vote[round: {}, voter: {}, block: {}]",
            self.round,
            self.author,
            self.block_id.short_str()
        )
    }
}
