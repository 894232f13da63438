// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

mod consensus_state;
mod safety_rules;

pub use crate::{consensus_state::ConsensusState, safety_rules::SafetyRules};
