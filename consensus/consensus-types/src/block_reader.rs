// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{block::Block, common::HashValue};

/// Block lookup seam between the storage layer and the safety rules. The
/// rules only ever need to resolve parent links; they never mutate the
/// store.
pub trait BlockReader {
    fn get_block(&self, block_id: HashValue) -> Option<Block>;

    fn block_exists(&self, block_id: HashValue) -> bool {
        self.get_block(block_id).is_some()
    }
}
