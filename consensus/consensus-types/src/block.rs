// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    common::{Author, HashValue, Round, Signature, TxnId},
    quorum_cert::QuorumCert,
    transaction::Transaction,
};
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fields the block id commits to. Payload transactions contribute
/// their ids only, so a block hashes the same on every replica regardless
/// of whether the local copy still carries reply sinks.
#[derive(Serialize)]
struct BlockIdSource<'a> {
    round: Round,
    author: Author,
    parent_id: HashValue,
    parent_round: Round,
    txn_ids: &'a [TxnId],
}

/// A proposal: one leader's payload for its round, chained to an ancestor
/// through the embedded quorum certificate.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Block {
    id: HashValue,
    round: Round,
    author: Author,
    quorum_cert: QuorumCert,
    payload: Vec<Transaction>,
    signature: Signature,
}

impl Block {
    pub fn new_proposal(
        round: Round,
        author: Author,
        quorum_cert: QuorumCert,
        payload: Vec<Transaction>,
    ) -> Self {
        let id = Self::compute_id(round, author, &quorum_cert, &payload);
        Block {
            id,
            round,
            author,
            quorum_cert,
            payload,
            signature: Signature::sign(author, round),
        }
    }

    fn compute_id(
        round: Round,
        author: Author,
        quorum_cert: &QuorumCert,
        payload: &[Transaction],
    ) -> HashValue {
        let txn_ids: Vec<TxnId> = payload.iter().map(Transaction::id).collect();
        let source = BlockIdSource {
            round,
            author,
            parent_id: quorum_cert.certified_block_id(),
            parent_round: quorum_cert.round(),
            txn_ids: &txn_ids,
        };
        let bytes = bcs::to_bytes(&source).expect("serializing block id fields cannot fail");
        HashValue::sha3_of(&bytes)
    }

    /// Structural checks on a decoded block: the id must match the content
    /// and the round must sit above the certified parent round.
    pub fn verify_well_formed(&self) -> anyhow::Result<()> {
        ensure!(
            self.round > self.quorum_cert.round(),
            "block round {} does not extend certified round {}",
            self.round,
            self.quorum_cert.round()
        );
        let expected = Self::compute_id(self.round, self.author, &self.quorum_cert, &self.payload);
        ensure!(
            expected == self.id,
            "block id {} does not match its content",
            self.id.short_str()
        );
        Ok(())
    }

    pub fn id(&self) -> HashValue {
        self.id
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn quorum_cert(&self) -> &QuorumCert {
        &self.quorum_cert
    }

    pub fn parent_id(&self) -> HashValue {
        self.quorum_cert.certified_block_id()
    }

    pub fn parent_round(&self) -> Round {
        self.quorum_cert.round()
    }

    pub fn payload(&self) -> &[Transaction] {
        &self.payload
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Block {}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[id: {}, round: {}, author: {}, parent: {}]",
            self.id.short_str(),
            self.round,
            self.author,
            self.parent_id().short_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_commits_to_content() {
        let qc = QuorumCert::certificate_for_genesis();
        let (txn, _rx) = Transaction::new(7, Author::new(0), vec![1, 2, 3]);
        let b1 = Block::new_proposal(1, Author::new(1), qc.clone(), vec![txn.clone()]);
        let same = Block::new_proposal(1, Author::new(1), qc.clone(), vec![txn]);
        let different = Block::new_proposal(1, Author::new(2), qc, vec![]);

        assert_eq!(b1.id(), same.id());
        assert_ne!(b1.id(), different.id());
        b1.verify_well_formed().unwrap();
    }

    #[test]
    fn round_must_extend_certified_round() {
        let qc = QuorumCert::new(3, HashValue::sha3_of(b"parent"), Default::default());
        let block = Block::new_proposal(3, Author::new(0), qc, vec![]);
        assert!(block.verify_well_formed().is_err());
    }
}
