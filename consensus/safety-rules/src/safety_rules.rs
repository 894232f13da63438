// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::consensus_state::ConsensusState;
use consensus_types::{
    block::Block, block_reader::BlockReader, common::Round, error::ConsensusError,
    quorum_cert::QuorumCert,
};

/// The chained three-chain safety rules: when to vote, when a lock moves,
/// and when a certified block makes an ancestor committable. The rules
/// resolve parent links through a [`BlockReader`] and never touch the
/// network or the pacemaker.
pub struct SafetyRules {
    state: ConsensusState,
}

impl SafetyRules {
    pub fn new(state: ConsensusState) -> Self {
        SafetyRules { state }
    }

    pub fn consensus_state(&self) -> ConsensusState {
        self.state.clone()
    }

    /// Learns from a certificate: when the certified block sits directly on
    /// its parent (contiguous rounds), the parent round becomes locked.
    /// Round-0 certificates certify the genesis placeholder and carry no
    /// locking information.
    pub fn update(&mut self, qc: &QuorumCert, reader: &dyn BlockReader) -> Result<(), ConsensusError> {
        if qc.round() == 0 {
            return Ok(());
        }
        let block = reader
            .get_block(qc.certified_block_id())
            .ok_or_else(|| ConsensusError::MissingAncestor(qc.certified_block_id()))?;
        if block.parent_round() + 1 == block.round() {
            self.state.set_locked_round(block.parent_round());
        }
        Ok(())
    }

    /// Records that a vote was produced for `round`; no second vote can be
    /// produced at or below it.
    pub fn update_last_vote_round(&mut self, round: Round) {
        self.state.set_last_vote_round(round);
    }

    /// Whether the replica may vote for `block`: the round must be new, the
    /// certified parent must not sit below the lock, and the parent chain
    /// must actually pass through the locked round.
    pub fn voting_rule(
        &self,
        block: &Block,
        reader: &dyn BlockReader,
    ) -> Result<bool, ConsensusError> {
        if block.round() <= self.state.last_vote_round() {
            return Ok(false);
        }
        if block.parent_round() < self.state.locked_round() {
            return Ok(false);
        }
        self.extends_locked_branch(block, reader)
    }

    /// Walks parent links from `block` down to the locked round. The walk
    /// ends exactly at the locked round on the locked branch; landing below
    /// it means the block extends a fork from before the lock.
    fn extends_locked_branch(
        &self,
        block: &Block,
        reader: &dyn BlockReader,
    ) -> Result<bool, ConsensusError> {
        let locked_round = self.state.locked_round();
        let mut parent_id = block.parent_id();
        let mut parent_round = block.parent_round();
        while parent_round > locked_round {
            let parent = reader
                .get_block(parent_id)
                .ok_or(ConsensusError::MissingAncestor(parent_id))?;
            parent_id = parent.parent_id();
            parent_round = parent.parent_round();
        }
        Ok(parent_round == locked_round)
    }

    /// The three-chain commit rule: a certificate commits the grandparent of
    /// its certified block iff grandparent, parent and certified block carry
    /// contiguous rounds. Callers gate on `qc.round() >= 3`; below that no
    /// three-chain can exist above genesis.
    pub fn commit_rule_for_certified_block(
        &self,
        qc: &QuorumCert,
        reader: &dyn BlockReader,
    ) -> Result<Option<Block>, ConsensusError> {
        let certified = reader
            .get_block(qc.certified_block_id())
            .ok_or_else(|| ConsensusError::MissingAncestor(qc.certified_block_id()))?;
        let parent = reader
            .get_block(certified.parent_id())
            .ok_or_else(|| ConsensusError::MissingAncestor(certified.parent_id()))?;
        if parent.round() + 1 != certified.round() {
            return Ok(None);
        }
        let grandparent = reader
            .get_block(parent.parent_id())
            .ok_or_else(|| ConsensusError::MissingAncestor(parent.parent_id()))?;
        if grandparent.round() + 1 != parent.round() {
            return Ok(None);
        }
        Ok(Some(grandparent))
    }
}
