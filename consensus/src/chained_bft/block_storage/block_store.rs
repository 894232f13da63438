// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    chained_bft::block_storage::{
        block_tree::BlockTree,
        pending_votes::{PendingVotes, VoteReceptionResult},
    },
    config::ConsensusConfig,
    counters,
};
use consensus_types::{
    block::Block, block_reader::BlockReader, common::HashValue, error::ConsensusError,
    quorum_cert::QuorumCert, vote::Vote,
};
use slog_scope::{debug, warn};
use std::sync::{Arc, RwLock};

#[cfg(test)]
#[path = "block_store_test.rs"]
mod block_store_test;

/// Progress counters kept next to the forest so the ratios can be read
/// consistently under the same lock that advances them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BlockStoreMetrics {
    pub total_blocks: u64,
    pub committed_blocks: u64,
    pub honest_committed_blocks: u64,
}

impl BlockStoreMetrics {
    /// committed / total: how much of what was proposed makes progress.
    pub fn chain_growth(&self) -> f64 {
        if self.total_blocks == 0 {
            return 0.0;
        }
        self.committed_blocks as f64 / self.total_blocks as f64
    }

    /// honest committed / committed.
    pub fn chain_quality(&self) -> f64 {
        if self.committed_blocks == 0 {
            return 0.0;
        }
        self.honest_committed_blocks as f64 / self.committed_blocks as f64
    }
}

struct BlockStoreInner {
    tree: BlockTree,
    pending_votes: PendingVotes,
    highest_quorum_cert: QuorumCert,
    metrics: BlockStoreMetrics,
}

impl BlockStoreInner {
    fn update_high_qc(&mut self, qc: QuorumCert) -> Result<(), ConsensusError> {
        let current = self.highest_quorum_cert.round();
        if qc.round() < current {
            return Err(ConsensusError::StaleQC {
                attempted: qc.round(),
                current,
            });
        }
        self.highest_quorum_cert = qc;
        Ok(())
    }
}

/// Responsible for maintaining all the blocks of payload and the
/// dependencies of those blocks (parent links through quorum certificates),
/// plus the vote-aggregation state and the highest certificate observed so
/// far. It is expected to be accessed concurrently by multiple processor
/// tasks and is thread-safe; every operation takes the single internal
/// lock.
pub struct BlockStore {
    inner: RwLock<BlockStoreInner>,
    config: Arc<ConsensusConfig>,
}

impl BlockStore {
    pub fn new(config: Arc<ConsensusConfig>, quorum_size: usize) -> Self {
        BlockStore {
            inner: RwLock::new(BlockStoreInner {
                tree: BlockTree::new(),
                pending_votes: PendingVotes::new(quorum_size),
                highest_quorum_cert: QuorumCert::certificate_for_genesis(),
                metrics: BlockStoreMetrics::default(),
            }),
            config,
        }
    }

    /// Inserts a block into the forest. The embedded certificate is offered
    /// to the high-QC tracker; a stale certificate is normal when a slow
    /// proposal arrives late and is only logged.
    pub fn insert_block(&self, block: Block) {
        let mut inner = self.inner.write().unwrap();
        if let Err(e) = inner.update_high_qc(block.quorum_cert().clone()) {
            debug!("block {} carried an old certificate: {}", block, e);
        }
        inner.tree.insert_vertex(block);
        inner.metrics.total_blocks += 1;
        counters::TOTAL_BLOCK_COUNT.inc();
    }

    /// Adds a vote for the block it names. If this vote completes a
    /// super-majority, the new certificate is returned (exactly once per
    /// block) and becomes the high QC.
    pub fn insert_vote(&self, vote: &Vote) -> VoteReceptionResult {
        let mut inner = self.inner.write().unwrap();
        let result = inner.pending_votes.insert_vote(vote);
        if let VoteReceptionResult::NewQuorumCertificate(qc) = &result {
            if let Err(e) = inner.update_high_qc(qc.clone()) {
                warn!("freshly built certificate {} is stale: {}", qc, e);
            }
        }
        result
    }

    /// Replaces the high QC iff `qc` is at least as recent.
    pub fn update_high_qc(&self, qc: QuorumCert) -> Result<(), ConsensusError> {
        self.inner.write().unwrap().update_high_qc(qc)
    }

    pub fn highest_quorum_cert(&self) -> QuorumCert {
        self.inner.read().unwrap().highest_quorum_cert.clone()
    }

    pub fn block_exists(&self, block_id: HashValue) -> bool {
        self.inner.read().unwrap().tree.vertex_exists(block_id)
    }

    pub fn get_parent_block(&self, block_id: HashValue) -> Result<Block, ConsensusError> {
        let inner = self.inner.read().unwrap();
        let block = inner
            .tree
            .get_vertex(block_id)
            .ok_or(ConsensusError::MissingAncestor(block_id))?;
        let parent_id = block.parent_id();
        inner
            .tree
            .get_vertex(parent_id)
            .cloned()
            .ok_or(ConsensusError::MissingAncestor(parent_id))
    }

    pub fn get_grandparent_block(&self, block_id: HashValue) -> Result<Block, ConsensusError> {
        let parent = self.get_parent_block(block_id)?;
        self.get_parent_block(parent.id())
    }

    /// Commits `block_id`: returns the newest-first chain from it down to
    /// (excluding) the previous committed frontier, then prunes the forest
    /// so the committed block becomes the new frontier. Chain-quality
    /// accounting runs over the returned chain.
    pub fn commit(&self, block_id: HashValue) -> Result<Vec<Block>, ConsensusError> {
        let mut inner = self.inner.write().unwrap();
        let block = inner
            .tree
            .get_vertex(block_id)
            .ok_or(ConsensusError::MissingAncestor(block_id))?
            .clone();
        let frontier = inner.tree.lowest_level();
        if block.round() <= frontier {
            return Err(ConsensusError::NothingToCommit(block_id));
        }

        let mut committed = Vec::new();
        let mut current = block.clone();
        loop {
            committed.push(current.clone());
            if current.parent_round() <= frontier {
                break;
            }
            let parent_id = current.parent_id();
            current = inner
                .tree
                .get_vertex(parent_id)
                .ok_or(ConsensusError::MissingAncestor(parent_id))?
                .clone();
        }

        inner
            .tree
            .prune_up_to_level(block.round())
            .expect("commit target sits above the frontier");
        for b in &committed {
            inner.metrics.committed_blocks += 1;
            counters::COMMITTED_BLOCK_COUNT.inc();
            if !self.config.is_byzantine(b.author()) {
                inner.metrics.honest_committed_blocks += 1;
                counters::HONEST_COMMITTED_BLOCK_COUNT.inc();
            }
        }
        counters::LAST_COMMITTED_ROUND.set(block.round() as i64);
        Ok(committed)
    }

    pub fn metrics(&self) -> BlockStoreMetrics {
        self.inner.read().unwrap().metrics
    }
}

impl BlockReader for BlockStore {
    fn get_block(&self, block_id: HashValue) -> Option<Block> {
        self.inner.read().unwrap().tree.get_vertex(block_id).cloned()
    }
}
