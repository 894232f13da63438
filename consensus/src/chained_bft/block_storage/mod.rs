// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

mod block_store;
mod block_tree;
mod pending_votes;

pub use block_store::{BlockStore, BlockStoreMetrics};
pub use block_tree::BlockTree;
pub use pending_votes::{PendingVotes, VoteReceptionResult};
