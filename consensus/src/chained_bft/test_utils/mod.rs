// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    chained_bft::{
        event_processor::EventProcessor,
        liveness::pacemaker::NewRoundEvent,
        network::{ConsensusMsg, ConsensusNetworkSender},
    },
    config::ConsensusConfig,
    util::time_service::ClockTimeService,
};
use consensus_types::{
    block::Block,
    common::{Author, HashValue, Round, Signature},
    quorum_cert::QuorumCert,
    vote::Vote,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

/// Records outbound traffic instead of sending it, so tests route messages
/// between replicas by hand and observe exactly what each one emitted.
pub struct RecordingNetwork {
    sent: Mutex<Vec<(Option<Author>, ConsensusMsg)>>,
}

impl RecordingNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingNetwork {
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Drains everything recorded so far; recipient None means broadcast.
    pub fn take(&self) -> Vec<(Option<Author>, ConsensusMsg)> {
        self.sent.lock().unwrap().drain(..).collect()
    }

    /// Drains only the point-to-point votes.
    pub fn take_votes(&self) -> Vec<(Author, Vote)> {
        self.take()
            .into_iter()
            .filter_map(|(dest, msg)| match (dest, msg) {
                (Some(recipient), ConsensusMsg::Vote(vote)) => Some((recipient, vote)),
                _ => None,
            })
            .collect()
    }

    /// Drains only the broadcast proposals.
    pub fn take_proposals(&self) -> Vec<Block> {
        self.take()
            .into_iter()
            .filter_map(|(dest, msg)| match (dest, msg) {
                (None, ConsensusMsg::Proposal(block)) => Some(block),
                _ => None,
            })
            .collect()
    }
}

impl ConsensusNetworkSender for RecordingNetwork {
    fn send_to(&self, recipient: Author, msg: ConsensusMsg) {
        self.sent.lock().unwrap().push((Some(recipient), msg));
    }

    fn broadcast(&self, msg: ConsensusMsg) {
        self.sent.lock().unwrap().push((None, msg));
    }
}

/// Auxiliary struct that is setting up one replica for a direct-drive
/// test: processors are awaited inline and outbound traffic lands in the
/// recording network.
pub struct NodeSetup {
    pub author: Author,
    pub processor: Arc<EventProcessor>,
    pub network: Arc<RecordingNetwork>,
}

impl NodeSetup {
    pub fn create_nodes(num_nodes: usize, config: ConsensusConfig) -> Vec<NodeSetup> {
        let validators: Vec<Author> = (0..num_nodes as u64).map(Author::new).collect();
        validators
            .iter()
            .map(|&author| {
                let network = RecordingNetwork::new();
                let sender: Arc<dyn ConsensusNetworkSender> = network.clone() as Arc<dyn ConsensusNetworkSender>;
                let processor = EventProcessor::new(
                    author,
                    config.clone(),
                    validators.clone(),
                    sender,
                    Arc::new(ClockTimeService),
                );
                NodeSetup {
                    author,
                    processor,
                    network,
                }
            })
            .collect()
    }
}

/// Test configuration with the simulated delays zeroed out.
pub fn test_config() -> ConsensusConfig {
    let mut config = ConsensusConfig::default();
    config.vote_delay_ms = 0;
    config.block_build_delay_ms = 0;
    config
}

pub fn gen_test_certificate(round: Round, block_id: HashValue, voters: &[Author]) -> QuorumCert {
    let signatures: BTreeMap<Author, Signature> = voters
        .iter()
        .map(|&voter| (voter, Signature::sign(voter, round)))
        .collect();
    QuorumCert::new(round, block_id, signatures)
}

pub fn qc_for(block: &Block) -> QuorumCert {
    gen_test_certificate(block.round(), block.id(), &[])
}

pub fn make_block(round: Round, author: Author, parent_qc: QuorumCert) -> Block {
    Block::new_proposal(round, author, parent_qc, vec![])
}

/// Runs the network by hand: repeatedly delivers recorded traffic and
/// mimics the event loop's reaction to pacemaker announcements, until
/// `done` holds or the iteration budget runs out. `last_rounds` carries
/// the highest round each node was already announced into.
pub async fn simulate_until<F>(nodes: &[NodeSetup], last_rounds: &mut Vec<Round>, done: F)
where
    F: Fn(&[NodeSetup]) -> bool,
{
    for _ in 0..100 {
        if done(nodes) {
            return;
        }

        // React to round advancement like the select loop would: only the
        // latest announced round matters.
        for (i, node) in nodes.iter().enumerate() {
            let round = node.processor.current_round();
            if round > last_rounds[i] {
                last_rounds[i] = round;
                node.processor
                    .clone()
                    .process_new_round_event(NewRoundEvent { round })
                    .await;
            }
        }

        // Deliver recorded traffic.
        for i in 0..nodes.len() {
            for (dest, msg) in nodes[i].network.take() {
                match dest {
                    Some(recipient) => {
                        let target = nodes
                            .iter()
                            .find(|n| n.author == recipient)
                            .expect("message addressed to an unknown validator");
                        deliver(target, msg).await;
                    }
                    None => {
                        for (j, target) in nodes.iter().enumerate() {
                            if j != i {
                                deliver(target, msg.clone()).await;
                            }
                        }
                    }
                }
            }
        }
    }
    panic!("simulation did not reach the expected state in time");
}

async fn deliver(node: &NodeSetup, msg: ConsensusMsg) {
    match msg {
        ConsensusMsg::Proposal(block) => node.processor.clone().process_proposal(block).await,
        ConsensusMsg::Vote(vote) => node.processor.clone().process_vote(vote).await,
        ConsensusMsg::Certificate(qc) => node.processor.clone().process_certificate(qc).await,
        ConsensusMsg::Transaction(txn) => node.processor.handle_transaction(txn),
    }
}
