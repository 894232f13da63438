// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    chained_bft::{
        event_processor::EventProcessor,
        network::{ConsensusMsg, ConsensusNetworkSender, NetworkTask},
    },
    config::ConsensusConfig,
    util::time_service::ClockTimeService,
};
use consensus_types::common::Author;
use futures::channel::mpsc;
use slog_scope::debug;
use std::sync::Arc;
use tokio::runtime::{self, Runtime};

/// The protocols the replica can run. There is exactly one today; the
/// selector exists so configurations name their protocol explicitly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsensusAlgorithm {
    ChainedHotStuff,
}

/// Deployed configurations spell the selector "hotsutff"; any other value
/// falls back to the same protocol.
pub fn algorithm_from_config(config: &ConsensusConfig) -> ConsensusAlgorithm {
    match config.algorithm.as_str() {
        "hotsutff" => ConsensusAlgorithm::ChainedHotStuff,
        _ => ConsensusAlgorithm::ChainedHotStuff,
    }
}

/// Helper function to start consensus based on configuration: builds the
/// replica, spawns the network router and the event loop on a dedicated
/// runtime, and returns both the runtime and the processor handle the
/// admission front-end feeds transactions into.
pub fn start_consensus(
    author: Author,
    config: ConsensusConfig,
    validators: Vec<Author>,
    network_sender: Arc<dyn ConsensusNetworkSender>,
    network_events: mpsc::Receiver<ConsensusMsg>,
) -> (Runtime, Arc<EventProcessor>) {
    let runtime = runtime::Builder::new_multi_thread()
        .thread_name("consensus")
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime!");
    let algorithm = algorithm_from_config(&config);
    let event_processor = EventProcessor::new(
        author,
        config,
        validators,
        network_sender,
        Arc::new(ClockTimeService),
    );
    let network_task = NetworkTask::new(Arc::clone(&event_processor), network_events);

    runtime.spawn(network_task.start());
    runtime.spawn(Arc::clone(&event_processor).start());

    debug!("Consensus started for {} with {:?}.", author, algorithm);
    (runtime, event_processor)
}
