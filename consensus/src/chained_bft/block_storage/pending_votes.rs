// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::counters;
use consensus_types::{
    common::{Author, HashValue, Signature},
    quorum_cert::QuorumCert,
    vote::Vote,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Result of inserting one vote into the aggregator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VoteReceptionResult {
    /// The vote was counted; the candidate now has this many distinct voters.
    VoteAdded(usize),
    /// A vote from this voter for this block was already counted.
    DuplicateVote,
    /// This vote completed a super-majority and the certificate was
    /// synthesized. Emitted at most once per candidate block.
    NewQuorumCertificate(QuorumCert),
}

/// Collects votes per candidate block until a super-majority of distinct
/// voters is reached. The aggregator does not enforce one-vote-per-round;
/// that is the voter's own safety obligation.
pub struct PendingVotes {
    quorum_size: usize,
    buckets: HashMap<HashValue, BTreeMap<Author, Signature>>,
    /// Candidates whose certificate was already handed out.
    formed: HashSet<HashValue>,
}

impl PendingVotes {
    pub fn new(quorum_size: usize) -> Self {
        PendingVotes {
            quorum_size,
            buckets: HashMap::new(),
            formed: HashSet::new(),
        }
    }

    pub fn insert_vote(&mut self, vote: &Vote) -> VoteReceptionResult {
        let bucket = self
            .buckets
            .entry(vote.block_id())
            .or_insert_with(BTreeMap::new);
        if bucket.contains_key(&vote.author()) {
            return VoteReceptionResult::DuplicateVote;
        }
        bucket.insert(vote.author(), vote.signature().clone());
        counters::PENDING_VOTES.inc();

        if bucket.len() >= self.quorum_size && self.formed.insert(vote.block_id()) {
            return VoteReceptionResult::NewQuorumCertificate(QuorumCert::new(
                vote.round(),
                vote.block_id(),
                bucket.clone(),
            ));
        }
        VoteReceptionResult::VoteAdded(bucket.len())
    }

    /// The aggregated signatures for a candidate; only available once a
    /// super-majority voted for it.
    pub fn aggregated_signatures(
        &self,
        block_id: HashValue,
    ) -> anyhow::Result<&BTreeMap<Author, Signature>> {
        let bucket = self
            .buckets
            .get(&block_id)
            .filter(|bucket| bucket.len() >= self.quorum_size);
        bucket.ok_or_else(|| {
            anyhow::format_err!(
                "no super-majority for block {} yet",
                block_id.short_str()
            )
        })
    }
}
