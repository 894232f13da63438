// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::chained_bft::event_processor::EventProcessor;
use anyhow::ensure;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use consensus_types::{
    block::Block, common::Author, quorum_cert::QuorumCert, transaction::Transaction, vote::Vote,
};
use futures::{channel::mpsc, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything consensus sends or receives. The enum tag makes each frame
/// self-describing on the wire.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum ConsensusMsg {
    Proposal(Block),
    Vote(Vote),
    Certificate(QuorumCert),
    Transaction(Transaction),
}

/// Encodes a message as a length-prefixed frame: a u32 big-endian body
/// length followed by the canonical bytes of the message.
pub fn encode_frame(msg: &ConsensusMsg) -> anyhow::Result<Bytes> {
    let body = bcs::to_bytes(msg)?;
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.write_u32::<BigEndian>(body.len() as u32)?;
    frame.extend_from_slice(&body);
    Ok(Bytes::from(frame))
}

/// Decodes one complete frame produced by [`encode_frame`].
pub fn decode_frame(mut frame: &[u8]) -> anyhow::Result<ConsensusMsg> {
    ensure!(frame.len() >= 4, "frame too short for a length prefix");
    let body_len = frame.read_u32::<BigEndian>()? as usize;
    ensure!(
        frame.len() == body_len,
        "frame length {} does not match prefix {}",
        frame.len(),
        body_len
    );
    Ok(bcs::from_bytes(frame)?)
}

/// Outbound half of the transport the core drives. Both operations are
/// best-effort: the protocol tolerates lost messages by retrying in later
/// rounds, so delivery failures stay inside the implementation.
pub trait ConsensusNetworkSender: Send + Sync {
    fn send_to(&self, recipient: Author, msg: ConsensusMsg);
    fn broadcast(&self, msg: ConsensusMsg);
}

/// Drains decoded inbound messages from the transport and hands each to
/// the matching pre-filter handler. Stale traffic dies here, before it can
/// occupy a slot in the event loop's bounded queues.
pub struct NetworkTask {
    processor: Arc<EventProcessor>,
    network_events: mpsc::Receiver<ConsensusMsg>,
}

impl NetworkTask {
    pub fn new(processor: Arc<EventProcessor>, network_events: mpsc::Receiver<ConsensusMsg>) -> Self {
        NetworkTask {
            processor,
            network_events,
        }
    }

    pub async fn start(mut self) {
        while let Some(msg) = self.network_events.next().await {
            match msg {
                ConsensusMsg::Proposal(block) => self.processor.handle_proposal(block),
                ConsensusMsg::Vote(vote) => self.processor.handle_vote(vote),
                ConsensusMsg::Certificate(qc) => self.processor.handle_certificate(qc),
                ConsensusMsg::Transaction(txn) => self.processor.handle_transaction(txn),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_types::quorum_cert::QuorumCert;

    #[test]
    fn frame_round_trip() {
        let vote = Vote::new(3, Author::new(1), consensus_types::common::HashValue::sha3_of(b"b3"));
        let frame = encode_frame(&ConsensusMsg::Vote(vote.clone())).unwrap();
        match decode_frame(&frame).unwrap() {
            ConsensusMsg::Vote(decoded) => assert_eq!(decoded, vote),
            other => panic!("decoded the wrong variant: {:?}", other),
        }
    }

    #[test]
    fn truncated_frames_are_rejected() {
        let msg = ConsensusMsg::Certificate(QuorumCert::certificate_for_genesis());
        let frame = encode_frame(&msg).unwrap();
        assert!(decode_frame(&frame[..frame.len() - 1]).is_err());
        assert!(decode_frame(&frame[..2]).is_err());
    }

    #[test]
    fn transactions_lose_their_reply_sink_on_the_wire() {
        let (txn, _rx) = Transaction::new(9, Author::new(2), vec![1, 2, 3]);
        let frame = encode_frame(&ConsensusMsg::Transaction(txn.clone())).unwrap();
        match decode_frame(&frame).unwrap() {
            ConsensusMsg::Transaction(decoded) => {
                assert_eq!(decoded, txn);
                // Replying through the decoded copy must be a silent no-op.
                decoded.reply(1);
            }
            other => panic!("decoded the wrong variant: {:?}", other),
        }
    }
}
