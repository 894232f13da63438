// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::ensure;
use consensus_types::{
    block::Block,
    common::{HashValue, Round},
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// The levelled forest of proposals: every block observed since the last
/// commit, indexed by id and by round. Parent relations are resolved by
/// lookup through each block's certificate, never by owned links, so forks
/// and temporary orphans cost nothing to represent.
///
/// Example forest shape based on parent links (levels are rounds):
///
/// Genesis--> B1--> B2--> B3
///             ╰--> C2--> C3
///                   ╰--------> D5
///
/// Blocks whose parent has not arrived yet are retained as long as they sit
/// at or above the lowest retained level; they attach once the parent shows
/// up.
pub struct BlockTree {
    vertices: HashMap<HashValue, Block>,
    level_index: BTreeMap<Round, HashSet<HashValue>>,
    lowest_level: Round,
}

impl BlockTree {
    pub fn new() -> Self {
        BlockTree {
            vertices: HashMap::new(),
            level_index: BTreeMap::new(),
            lowest_level: 0,
        }
    }

    /// Inserts a block as a vertex at level = round. Duplicate ids and
    /// blocks below the committed frontier are no-ops.
    pub fn insert_vertex(&mut self, block: Block) {
        if block.round() < self.lowest_level || self.vertices.contains_key(&block.id()) {
            return;
        }
        self.level_index
            .entry(block.round())
            .or_insert_with(HashSet::new)
            .insert(block.id());
        self.vertices.insert(block.id(), block);
    }

    pub fn get_vertex(&self, block_id: HashValue) -> Option<&Block> {
        self.vertices.get(&block_id)
    }

    pub fn vertex_exists(&self, block_id: HashValue) -> bool {
        self.vertices.contains_key(&block_id)
    }

    /// All retained blocks whose certificate points at `block_id`. The scan
    /// walks the level index, so the result only contains vertices at or
    /// above the frontier.
    pub fn get_children(&self, block_id: HashValue) -> Vec<&Block> {
        self.level_index
            .values()
            .flatten()
            .filter_map(|id| self.vertices.get(id))
            .filter(|block| block.parent_id() == block_id)
            .collect()
    }

    /// Drops every vertex with level < `level` and moves the frontier up.
    /// Pruning below the current frontier would un-commit state and is
    /// rejected.
    pub fn prune_up_to_level(&mut self, level: Round) -> anyhow::Result<()> {
        ensure!(
            level >= self.lowest_level,
            "cannot prune to level {} below the frontier at {}",
            level,
            self.lowest_level
        );
        let retained = self.level_index.split_off(&level);
        for pruned_ids in self.level_index.values() {
            for id in pruned_ids {
                self.vertices.remove(id);
            }
        }
        self.level_index = retained;
        self.lowest_level = level;
        Ok(())
    }

    pub fn lowest_level(&self) -> Round {
        self.lowest_level
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }
}
