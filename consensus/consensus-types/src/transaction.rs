// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::common::{Author, Round, TxnId};
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::{Arc, Mutex},
};

/// Delivered on a transaction's reply sink once the block carrying it
/// commits at the replica the client submitted to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionReply {
    pub id: TxnId,
    pub committed_round: Round,
}

/// Single-use reply sink. The sender is consumed by the first reply;
/// notifications for a transaction that was already answered (e.g. the same
/// block observed through two certificates) are absorbed silently.
///
/// The handle never crosses the wire: a deserialized transaction carries an
/// empty handle.
#[derive(Clone, Default)]
pub struct TxnReplyHandle(Arc<Mutex<Option<oneshot::Sender<TransactionReply>>>>);

impl TxnReplyHandle {
    pub fn new() -> (Self, oneshot::Receiver<TransactionReply>) {
        let (tx, rx) = oneshot::channel();
        (TxnReplyHandle(Arc::new(Mutex::new(Some(tx)))), rx)
    }

    pub fn none() -> Self {
        TxnReplyHandle::default()
    }

    pub fn reply(&self, reply: TransactionReply) {
        if let Some(tx) = self.0.lock().unwrap().take() {
            // The receiver may already be dropped; that is the client's choice.
            let _ = tx.send(reply);
        }
    }
}

impl fmt::Debug for TxnReplyHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let armed = self.0.lock().unwrap().is_some();
        write!(f, "TxnReplyHandle(armed: {})", armed)
    }
}

/// A client transaction staged for inclusion in a block. `author` is the
/// validator the client submitted to, which is also the replica responsible
/// for answering on the reply sink at commit time.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Transaction {
    id: TxnId,
    author: Author,
    payload: Vec<u8>,
    #[serde(skip)]
    reply: TxnReplyHandle,
}

impl Transaction {
    /// Builds a transaction together with the receiving half of its reply
    /// sink, for the admission front-end to hand back to the client.
    pub fn new(id: TxnId, author: Author, payload: Vec<u8>) -> (Self, oneshot::Receiver<TransactionReply>) {
        let (reply, rx) = TxnReplyHandle::new();
        (
            Transaction {
                id,
                author,
                payload,
                reply,
            },
            rx,
        )
    }

    /// A transaction without a reply sink, as it appears after decoding from
    /// the wire on a replica that did not admit it.
    pub fn new_without_reply(id: TxnId, author: Author, payload: Vec<u8>) -> Self {
        Transaction {
            id,
            author,
            payload,
            reply: TxnReplyHandle::none(),
        }
    }

    pub fn id(&self) -> TxnId {
        self.id
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn reply(&self, committed_round: Round) {
        self.reply.reply(TransactionReply {
            id: self.id,
            committed_round,
        });
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.author == other.author && self.payload == other.payload
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Txn[{} from {}]", self.id, self.author)
    }
}
