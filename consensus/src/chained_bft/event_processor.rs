// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    chained_bft::{
        block_storage::{BlockStore, VoteReceptionResult},
        liveness::{
            pacemaker::{NewRoundEvent, Pacemaker},
            proposal_generator::ProposalGenerator,
            proposer_election::ProposerElection,
            rotating_proposer_election::RotatingProposer,
        },
        network::{ConsensusMsg, ConsensusNetworkSender},
    },
    config::ConsensusConfig,
    util::time_service::TimeService,
};
use consensus_types::{
    block::Block,
    common::{Author, Round},
    error::ConsensusError,
    quorum_cert::QuorumCert,
    transaction::Transaction,
    vote::Vote,
};
use futures::{channel::mpsc, StreamExt};
use safety_rules::{ConsensusState, SafetyRules};
use slog_scope::{debug, error, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// The receiving ends of the bounded per-kind queues, taken once by the
/// event loop.
struct EventQueues {
    proposal_rx: mpsc::Receiver<Block>,
    vote_rx: mpsc::Receiver<Vote>,
    certificate_rx: mpsc::Receiver<QuorumCert>,
    new_round_rx: watch::Receiver<NewRoundEvent>,
}

/// Consensus SMR is working in an event based fashion: the replica is one
/// serializer loop over four inbound sources (proposals, votes,
/// certificates, new-round announcements) that dispatches each event to a
/// short-lived processor task. All shared state sits behind the component
/// locks (block store, safety rules, staging area, pacemaker); the loop
/// itself never blocks inside a processor.
///
/// Inbound `handle_*` methods run on the transport side and only filter
/// and enqueue. The queues have capacity 1: a full queue drops the
/// message, which is safe because the sender retries in a later round.
pub struct EventProcessor {
    author: Author,
    config: Arc<ConsensusConfig>,
    block_store: Arc<BlockStore>,
    pacemaker: Arc<Pacemaker>,
    proposer_election: Arc<dyn ProposerElection>,
    proposal_generator: Arc<ProposalGenerator>,
    safety_rules: Mutex<SafetyRules>,
    network: Arc<dyn ConsensusNetworkSender>,
    time_service: Arc<dyn TimeService>,
    /// Guards the bootstrap transition triggered by the first transaction.
    started: Mutex<bool>,
    proposal_tx: Mutex<mpsc::Sender<Block>>,
    vote_tx: Mutex<mpsc::Sender<Vote>>,
    certificate_tx: Mutex<mpsc::Sender<QuorumCert>>,
    queues: Mutex<Option<EventQueues>>,
}

impl EventProcessor {
    pub fn new(
        author: Author,
        config: ConsensusConfig,
        validators: Vec<Author>,
        network: Arc<dyn ConsensusNetworkSender>,
        time_service: Arc<dyn TimeService>,
    ) -> Arc<Self> {
        let config = Arc::new(config);
        let quorum_size = validators.len() * 2 / 3 + 1;
        let block_store = Arc::new(BlockStore::new(Arc::clone(&config), quorum_size));
        let proposal_generator = Arc::new(ProposalGenerator::new(
            author,
            Arc::clone(&block_store),
            config.max_block_size,
        ));
        let (pacemaker, new_round_rx) = Pacemaker::new();
        let (proposal_tx, proposal_rx) = mpsc::channel(1);
        let (vote_tx, vote_rx) = mpsc::channel(1);
        let (certificate_tx, certificate_rx) = mpsc::channel(1);

        Arc::new(EventProcessor {
            author,
            config,
            block_store,
            pacemaker: Arc::new(pacemaker),
            proposer_election: Arc::new(RotatingProposer::new(validators)),
            proposal_generator,
            safety_rules: Mutex::new(SafetyRules::new(ConsensusState::default())),
            network,
            time_service,
            started: Mutex::new(false),
            proposal_tx: Mutex::new(proposal_tx),
            vote_tx: Mutex::new(vote_tx),
            certificate_tx: Mutex::new(certificate_tx),
            queues: Mutex::new(Some(EventQueues {
                proposal_rx,
                vote_rx,
                certificate_rx,
                new_round_rx,
            })),
        })
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn block_store(&self) -> Arc<BlockStore> {
        Arc::clone(&self.block_store)
    }

    pub fn current_round(&self) -> Round {
        self.pacemaker.current_round()
    }

    pub fn consensus_state(&self) -> ConsensusState {
        self.safety_rules.lock().unwrap().consensus_state()
    }

    /// Number of transactions currently staged for future proposals.
    pub fn pending_transactions(&self) -> usize {
        self.proposal_generator.pending_transactions()
    }

    /// Round filter applied on the transport side before a proposal is
    /// enqueued; anything from a finished round is dropped silently.
    pub fn pre_process_proposal(&self, block: Block) -> Option<Block> {
        let current_round = self.pacemaker.current_round();
        if block.round() < current_round {
            debug!(
                "dropping proposal {}: {}",
                block,
                ConsensusError::StaleMessage {
                    msg_round: block.round(),
                    current_round,
                }
            );
            return None;
        }
        Some(block)
    }

    pub fn handle_proposal(&self, block: Block) {
        if let Some(block) = self.pre_process_proposal(block) {
            if let Err(e) = self.proposal_tx.lock().unwrap().try_send(block) {
                debug!("proposal queue is full, dropping: {}", e);
            }
        }
    }

    pub fn handle_vote(&self, vote: Vote) {
        if vote.round() < self.pacemaker.current_round() {
            debug!("dropping vote {} from a finished round", vote);
            return;
        }
        if let Err(e) = self.vote_tx.lock().unwrap().try_send(vote) {
            debug!("vote queue is full, dropping: {}", e);
        }
    }

    pub fn handle_certificate(&self, qc: QuorumCert) {
        if qc.round() < self.pacemaker.current_round() {
            debug!("dropping certificate {} from a finished round", qc);
            return;
        }
        if let Err(e) = self.certificate_tx.lock().unwrap().try_send(qc) {
            debug!("certificate queue is full, dropping: {}", e);
        }
    }

    /// Stages a client transaction. The very first transaction seen by the
    /// leader of round 1 also starts the whole network: nothing certifies
    /// round 0, so that leader enters round 1 by acting as if the genesis
    /// certificate had just arrived.
    pub fn handle_transaction(&self, txn: Transaction) {
        let mut started = self.started.lock().unwrap();
        self.proposal_generator.collect_transaction(txn);
        if !*started && self.proposer_election.is_valid_proposer(self.author, 1) {
            *started = true;
            self.pacemaker.process_certificate_round(0);
        }
    }

    /// The serializer: selects one ready source and dispatches its event to
    /// a spawned processor, then returns to the select. Runs until the
    /// process shuts down.
    pub async fn start(self: Arc<Self>) {
        let queues = self.queues.lock().unwrap().take();
        let mut queues = match queues {
            Some(queues) => queues,
            None => {
                error!("event loop for {} started twice", self.author);
                return;
            }
        };
        info!("{} starting the consensus event loop", self.author);
        loop {
            tokio::select! {
                Some(block) = queues.proposal_rx.next() => {
                    tokio::spawn(Arc::clone(&self).process_proposal(block));
                }
                Some(vote) = queues.vote_rx.next() => {
                    tokio::spawn(Arc::clone(&self).process_vote(vote));
                }
                Some(qc) = queues.certificate_rx.next() => {
                    tokio::spawn(Arc::clone(&self).process_certificate(qc));
                }
                changed = queues.new_round_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let event = queues.new_round_rx.borrow_and_update().clone();
                    tokio::spawn(Arc::clone(&self).process_new_round_event(event));
                }
                else => break,
            }
        }
    }

    /// Full proposal processing: learn from the embedded certificate, check
    /// the proposal is current and correctly led, store it, and vote if the
    /// safety rules allow. The vote goes to the replica that aggregates
    /// round + 1, which may be this one.
    pub async fn process_proposal(self: Arc<Self>, block: Block) {
        debug!("{} received proposal {}", self.author, block);
        self.process_certificate_impl(block.quorum_cert()).await;

        let current_round = self.pacemaker.current_round();
        if block.round() != current_round {
            debug!(
                "proposal {} is not for the current round {}",
                block, current_round
            );
            return;
        }
        if !self
            .proposer_election
            .is_valid_proposer(block.author(), block.round())
        {
            warn!(
                "{}",
                ConsensusError::InvalidLeader {
                    author: block.author(),
                    round: block.round(),
                }
            );
            return;
        }
        self.block_store.insert_block(block.clone());

        let should_vote = {
            let safety_rules = self.safety_rules.lock().unwrap();
            match safety_rules.voting_rule(&block, self.block_store.as_ref()) {
                Ok(should_vote) => should_vote,
                Err(e) => {
                    error!("voting rule failed for {}: {}", block, e);
                    return;
                }
            }
        };
        if !should_vote {
            debug!("{} not voting for {}", self.author, block);
            return;
        }

        let vote = Vote::new(block.round(), self.author, block.id());
        self.safety_rules
            .lock()
            .unwrap()
            .update_last_vote_round(vote.round());
        self.time_service.sleep(self.config.vote_delay()).await;

        let next_leader = self
            .proposer_election
            .get_valid_proposer(self.pacemaker.current_round() + 1);
        if next_leader == self.author {
            Arc::clone(&self).process_vote(vote).await;
        } else {
            self.network.send_to(next_leader, ConsensusMsg::Vote(vote));
        }
    }

    /// Counts a vote; if it completes a certificate the certificate is
    /// processed in place, which is what advances this replica into the
    /// round it is about to lead.
    pub async fn process_vote(self: Arc<Self>, vote: Vote) {
        match self.block_store.insert_vote(&vote) {
            VoteReceptionResult::NewQuorumCertificate(qc) => {
                debug!("{} aggregated {}", self.author, qc);
                self.process_certificate_impl(&qc).await;
            }
            VoteReceptionResult::VoteAdded(count) => {
                debug!("{} added {}, {} so far", self.author, vote, count)
            }
            VoteReceptionResult::DuplicateVote => {
                debug!("{} already counted {}", self.author, vote)
            }
        }
    }

    pub async fn process_certificate(self: Arc<Self>, qc: QuorumCert) {
        self.process_certificate_impl(&qc).await;
    }

    /// Certificate processing: drive the pacemaker, move the safety lock,
    /// and check the three-chain commit rule. Only certificates from round
    /// 3 on can complete a three-chain above genesis.
    async fn process_certificate_impl(&self, qc: &QuorumCert) {
        if qc.round() < self.pacemaker.current_round() {
            return;
        }
        self.pacemaker.process_certificate_round(qc.round());
        {
            let mut safety_rules = self.safety_rules.lock().unwrap();
            if let Err(e) = safety_rules.update(qc, self.block_store.as_ref()) {
                error!("safety state update failed for {}: {}", qc, e);
                return;
            }
        }
        if qc.round() < 3 {
            return;
        }
        let commit_candidate = {
            let safety_rules = self.safety_rules.lock().unwrap();
            safety_rules.commit_rule_for_certified_block(qc, self.block_store.as_ref())
        };
        let block = match commit_candidate {
            Ok(Some(block)) => block,
            Ok(None) => return,
            Err(e) => {
                error!("commit rule failed for {}: {}", qc, e);
                return;
            }
        };
        let committed = match self.block_store.commit(block.id()) {
            Ok(committed) => committed,
            Err(e) => {
                error!("commit of {} failed: {}", block, e);
                return;
            }
        };
        self.process_committed_blocks(&committed);
    }

    /// Entering a round this replica leads means proposing.
    pub async fn process_new_round_event(self: Arc<Self>, event: NewRoundEvent) {
        debug!("{} entering round {}", self.author, event.round);
        if self
            .proposer_election
            .is_valid_proposer(self.author, event.round)
        {
            self.generate_and_propose(event.round).await;
        }
    }

    /// Builds and broadcasts this round's proposal, processes it locally
    /// like any other proposal, and only then unstages its payload.
    async fn generate_and_propose(self: Arc<Self>, round: Round) {
        let block = self.proposal_generator.generate_proposal(round);
        self.time_service.sleep(self.config.block_build_delay()).await;
        info!("{} proposing {}", self.author, block);
        self.network.broadcast(ConsensusMsg::Proposal(block.clone()));
        Arc::clone(&self).process_proposal(block.clone()).await;
        for txn in block.payload() {
            self.proposal_generator.remove_transaction(txn.id());
        }
    }

    /// Commit fan-out: answer the clients this replica admitted, and
    /// unstage committed payloads everywhere except on the proposer, which
    /// already unstaged them at proposal time.
    fn process_committed_blocks(&self, blocks: &[Block]) {
        for block in blocks {
            info!("{} committed {}", self.author, block);
            for txn in block.payload() {
                if txn.author() == self.author {
                    txn.reply(block.round());
                }
                if block.author() != self.author {
                    self.proposal_generator.remove_transaction(txn.id());
                }
            }
        }
    }
}
