// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod pacemaker;
pub mod proposal_generator;
pub mod proposer_election;
pub mod rotating_proposer_election;
