// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::common::{Author, HashValue, Round, Signature};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Proof that a super-majority of distinct validators voted for
/// `certified_block_id` at `round`. Once aggregated it travels inside the
/// next proposal and drives round advancement on every replica.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct QuorumCert {
    round: Round,
    certified_block_id: HashValue,
    /// One signature per distinct voter; a stand-in for a real aggregate.
    signatures: BTreeMap<Author, Signature>,
}

impl QuorumCert {
    pub fn new(
        round: Round,
        certified_block_id: HashValue,
        signatures: BTreeMap<Author, Signature>,
    ) -> Self {
        QuorumCert {
            round,
            certified_block_id,
            signatures,
        }
    }

    /// The well-known round-0 certificate every chain starts from. It
    /// certifies the zero hash and carries no signatures; no block with
    /// that id ever exists in the store.
    pub fn certificate_for_genesis() -> Self {
        QuorumCert {
            round: 0,
            certified_block_id: HashValue::zero(),
            signatures: BTreeMap::new(),
        }
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn certified_block_id(&self) -> HashValue {
        self.certified_block_id
    }

    pub fn signatures(&self) -> &BTreeMap<Author, Signature> {
        &self.signatures
    }
}

impl fmt::Display for QuorumCert {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "QC[round: {}, block: {}, voters: {}]",
            self.round,
            self.certified_block_id.short_str(),
            self.signatures.len()
        )
    }
}
