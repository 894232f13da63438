// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    chained_bft::block_storage::{BlockStore, VoteReceptionResult},
    config::ConsensusConfig,
};
use consensus_types::{
    block::Block,
    common::{Author, Round},
    error::ConsensusError,
    quorum_cert::QuorumCert,
    vote::Vote,
};
use std::sync::Arc;

fn store() -> BlockStore {
    // Quorum of 3 matches a four-validator network.
    BlockStore::new(Arc::new(ConsensusConfig::default()), 3)
}

fn qc_for(block: &Block) -> QuorumCert {
    QuorumCert::new(block.round(), block.id(), Default::default())
}

fn block(round: Round, parent_qc: QuorumCert) -> Block {
    Block::new_proposal(round, Author::new(round % 4), parent_qc, vec![])
}

/// Inserts the direct chain b1..b_n and returns it oldest-first.
fn insert_chain(store: &BlockStore, len: u64) -> Vec<Block> {
    let mut chain = Vec::new();
    let mut parent_qc = QuorumCert::certificate_for_genesis();
    for round in 1..=len {
        let b = block(round, parent_qc);
        parent_qc = qc_for(&b);
        store.insert_block(b.clone());
        chain.push(b);
    }
    chain
}

#[test]
fn votes_build_exactly_one_certificate() {
    let store = store();
    let chain = insert_chain(&store, 1);
    let b1 = &chain[0];
    let high_before = store.highest_quorum_cert();
    assert_eq!(high_before.round(), 0);

    let mut certificates = 0;
    // Five copies of the same vote, then two more distinct voters.
    for voter in [1u64, 1, 1, 1, 1, 2, 3] {
        let vote = Vote::new(1, Author::new(voter), b1.id());
        if let VoteReceptionResult::NewQuorumCertificate(qc) = store.insert_vote(&vote) {
            assert_eq!(qc.certified_block_id(), b1.id());
            certificates += 1;
        }
    }
    assert_eq!(certificates, 1);
    assert_eq!(store.highest_quorum_cert().round(), 1);

    // A late distinct voter must not rebuild the certificate.
    assert_eq!(
        store.insert_vote(&Vote::new(1, Author::new(0), b1.id())),
        VoteReceptionResult::VoteAdded(4)
    );
    assert_eq!(store.highest_quorum_cert().round(), 1);
}

#[test]
fn high_qc_never_goes_backwards() {
    let store = store();
    let chain = insert_chain(&store, 3);
    assert_eq!(store.highest_quorum_cert().round(), 2);

    let stale = qc_for(&chain[0]);
    assert_eq!(
        store.update_high_qc(stale),
        Err(ConsensusError::StaleQC {
            attempted: 1,
            current: 2
        })
    );

    // Re-installing the certificate at the same round is allowed.
    store.update_high_qc(qc_for(&chain[1])).unwrap();
    assert_eq!(store.highest_quorum_cert().round(), 2);
}

#[test]
fn ancestor_walks() {
    let store = store();
    let chain = insert_chain(&store, 3);

    assert_eq!(store.get_parent_block(chain[2].id()).unwrap(), chain[1]);
    assert_eq!(store.get_grandparent_block(chain[2].id()).unwrap(), chain[0]);
    // b1's parent is the genesis placeholder, which is never stored.
    assert_eq!(
        store.get_parent_block(chain[0].id()),
        Err(ConsensusError::MissingAncestor(chain[0].parent_id()))
    );
    assert_eq!(
        store.get_grandparent_block(chain[1].id()),
        Err(ConsensusError::MissingAncestor(chain[0].parent_id()))
    );
}

#[test]
fn commit_returns_the_chain_newest_first_and_prunes() {
    let store = store();
    let chain = insert_chain(&store, 4);

    let committed = store.commit(chain[0].id()).unwrap();
    assert_eq!(committed, vec![chain[0].clone()]);

    // The frontier moved to round 1; everything below is gone.
    assert!(store.block_exists(chain[0].id()));
    let committed = store.commit(chain[3].id()).unwrap();
    assert_eq!(
        committed,
        vec![chain[3].clone(), chain[2].clone(), chain[1].clone()]
    );
    assert!(!store.block_exists(chain[0].id()));
    assert!(!store.block_exists(chain[1].id()));
    assert!(!store.block_exists(chain[2].id()));
    assert!(store.block_exists(chain[3].id()));

    // Committing the frontier again yields nothing new.
    assert_eq!(
        store.commit(chain[3].id()),
        Err(ConsensusError::NothingToCommit(chain[3].id()))
    );
}

#[test]
fn commit_walk_stops_on_missing_ancestor() {
    let store = store();
    let b1 = block(1, QuorumCert::certificate_for_genesis());
    let b2 = block(2, qc_for(&b1));
    let b3 = block(3, qc_for(&b2));
    let b4 = block(4, qc_for(&b3));
    for b in [&b1, &b3, &b4] {
        store.insert_block(b.clone());
    }

    assert_eq!(
        store.commit(b4.id()),
        Err(ConsensusError::MissingAncestor(b2.id()))
    );
    // The failed walk must not advance any commit accounting.
    assert_eq!(store.metrics().committed_blocks, 0);
    assert!(store.block_exists(b4.id()));
}

#[test]
fn metrics_stay_consistent() {
    let store = store();
    let chain = insert_chain(&store, 5);
    store.commit(chain[2].id()).unwrap();

    let metrics = store.metrics();
    assert_eq!(metrics.total_blocks, 5);
    assert_eq!(metrics.committed_blocks, 3);
    assert!(metrics.committed_blocks <= metrics.total_blocks);
    assert!(metrics.honest_committed_blocks <= metrics.committed_blocks);
    assert!((metrics.chain_growth() - 0.6).abs() < f64::EPSILON);
}

#[test]
fn byzantine_proposers_are_not_counted_as_honest() {
    let mut config = ConsensusConfig::default();
    // Rounds 1..=3 rotate through proposers 1, 2, 3; mark one byzantine.
    config.byzantine.insert(Author::new(2));
    let store = BlockStore::new(Arc::new(config), 3);

    let mut parent_qc = QuorumCert::certificate_for_genesis();
    let mut tip = None;
    for round in 1..=3 {
        let b = block(round, parent_qc);
        parent_qc = qc_for(&b);
        store.insert_block(b.clone());
        tip = Some(b);
    }
    store.commit(tip.unwrap().id()).unwrap();

    let metrics = store.metrics();
    assert_eq!(metrics.committed_blocks, 3);
    assert_eq!(metrics.honest_committed_blocks, 2);
    assert!((metrics.chain_quality() - 2.0 / 3.0).abs() < f64::EPSILON);
}
