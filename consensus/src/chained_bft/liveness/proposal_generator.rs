// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::chained_bft::block_storage::BlockStore;
use consensus_types::{
    block::Block,
    common::{Author, Round, TxnId},
    transaction::Transaction,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// ProposalGenerator is responsible for generating the proposed block on
/// demand: it stages admitted transactions and, when this replica leads a
/// round, assembles them into a block extending the fork-choice parent
/// (the block certified by the current high QC).
///
/// Drawing a payload does NOT remove the transactions from the staging
/// area: a proposal can be superseded before it is sent, and a transaction
/// must survive into the next attempt. The proposer removes them
/// explicitly once the proposal went out.
pub struct ProposalGenerator {
    author: Author,
    block_store: Arc<BlockStore>,
    pending: Mutex<VecDeque<Transaction>>,
    max_block_size: usize,
}

impl ProposalGenerator {
    pub fn new(author: Author, block_store: Arc<BlockStore>, max_block_size: usize) -> Self {
        ProposalGenerator {
            author,
            block_store,
            pending: Mutex::new(VecDeque::new()),
            max_block_size,
        }
    }

    pub fn collect_transaction(&self, txn: Transaction) {
        self.pending.lock().unwrap().push_back(txn);
    }

    /// Assembles the proposal for `round` from the oldest staged
    /// transactions, chained to the highest certified block.
    pub fn generate_proposal(&self, round: Round) -> Block {
        let parent_qc = self.block_store.highest_quorum_cert();
        let payload: Vec<Transaction> = self
            .pending
            .lock()
            .unwrap()
            .iter()
            .take(self.max_block_size)
            .cloned()
            .collect();
        Block::new_proposal(round, self.author, parent_qc, payload)
    }

    /// Unstages a transaction; repeats and unknown ids are no-ops.
    pub fn remove_transaction(&self, txn_id: TxnId) {
        self.pending.lock().unwrap().retain(|t| t.id() != txn_id);
    }

    pub fn pending_transactions(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}
