// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::counters;
use consensus_types::common::Round;
use std::sync::Mutex;
use tokio::sync::watch;

/// Carried on the new-round stream each time the pacemaker enters a round.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewRoundEvent {
    pub round: Round,
}

/// Determines the round a replica is in. The round only moves forward, and
/// only a certificate at or above the current round moves it: observing a
/// certificate for round r means r is over, so the pacemaker enters r + 1
/// and announces it on the new-round stream.
///
/// The stream is single-consumer with latest-wins semantics: if the event
/// loop has not picked up an announcement before the next one fires, only
/// the newest round is delivered. Skipped announcements carry no
/// information the newest one does not.
pub struct Pacemaker {
    current_round: Mutex<Round>,
    new_round_tx: watch::Sender<NewRoundEvent>,
}

impl Pacemaker {
    pub fn new() -> (Self, watch::Receiver<NewRoundEvent>) {
        let (new_round_tx, new_round_rx) = watch::channel(NewRoundEvent { round: 0 });
        (
            Pacemaker {
                current_round: Mutex::new(0),
                new_round_tx,
            },
            new_round_rx,
        )
    }

    pub fn current_round(&self) -> Round {
        *self.current_round.lock().unwrap()
    }

    /// Advances past `certificate_round` if it is not behind the current
    /// round. Never blocks: publishing to the stream replaces whatever the
    /// consumer has not read yet.
    pub fn process_certificate_round(&self, certificate_round: Round) {
        let mut current = self.current_round.lock().unwrap();
        if certificate_round < *current {
            return;
        }
        *current = certificate_round + 1;
        counters::CURRENT_ROUND.set(*current as i64);
        // The receiver side may be gone during shutdown; nothing to do then.
        let _ = self.new_round_tx.send(NewRoundEvent { round: *current });
    }
}
