// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;

/// Round is the consensus protocol's view counter: it is shared between all
/// validators, there is one leader per round, and it advances when a quorum
/// certificate for the round is observed.
pub type Round = u64;

/// Identity of a validator, totally ordered so leader rotation and vote
/// bookkeeping are deterministic across the network.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Author(u64);

impl Author {
    pub fn new(index: u64) -> Self {
        Author(index)
    }

    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Identifier a submitting client assigns to its transaction; unique per
/// submitter.
pub type TxnId = u64;

/// Content address of a block: a Sha3-256 digest over the block's
/// canonical bytes.
#[derive(
    Clone, Copy, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct HashValue([u8; 32]);

impl HashValue {
    pub const LENGTH: usize = 32;

    /// The all-zero hash, used as the parent id of the genesis certificate.
    pub fn zero() -> Self {
        HashValue([0; Self::LENGTH])
    }

    pub fn sha3_of(bytes: &[u8]) -> Self {
        let mut digest = Sha3_256::new();
        digest.update(bytes);
        HashValue(digest.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four bytes in hex, enough to tell blocks apart in logs.
    pub fn short_str(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HashValue({})", self.short_str())
    }
}

/// Stand-in for a validator signature. Real signing and verification live
/// outside the core; the bytes only tie a signature to its (author, round)
/// origin so aggregation stays distinct per voter.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn sign(author: Author, round: Round) -> Self {
        let mut bytes = author.index().to_be_bytes().to_vec();
        bytes.extend_from_slice(&round.to_be_bytes());
        Signature(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
