// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod block_storage;
pub mod event_processor;
pub mod liveness;
pub mod network;

#[cfg(test)]
mod test_utils;
