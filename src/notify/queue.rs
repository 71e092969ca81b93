//! Outbound messages waiting for a successful send.
//!
//! Change notices are always queued. Error notices are queued only when the
//! same text is neither pending nor already delivered, so a failure that
//! persists across cycles reaches the chat exactly once.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::notify::ledger::DedupLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Change,
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Change => "change",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingMessage {
    /// Queue-unique sequence number, used to acknowledge this exact message.
    pub seq: u64,
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued(u64),
    /// Error text already reached the chat in an earlier cycle.
    AlreadyDelivered,
    /// Error text is waiting in the queue already.
    AlreadyPending,
}

impl EnqueueOutcome {
    #[must_use]
    pub const fn is_queued(self) -> bool {
        matches!(self, Self::Queued(_))
    }
}

#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: VecDeque<PendingMessage>,
    ledger: DedupLedger,
    next_seq: u64,
}

impl NotificationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, text: impl Into<String>, kind: MessageKind) -> EnqueueOutcome {
        let text = text.into();
        if kind == MessageKind::Error {
            if self.ledger.contains(&text) {
                tracing::debug!(text = %text, "error notice already delivered, skipping");
                return EnqueueOutcome::AlreadyDelivered;
            }
            if self
                .pending
                .iter()
                .any(|msg| msg.kind == MessageKind::Error && msg.text == text)
            {
                return EnqueueOutcome::AlreadyPending;
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push_back(PendingMessage { seq, kind, text });
        EnqueueOutcome::Queued(seq)
    }

    /// Snapshot of the queue in send order. Nothing is removed.
    #[must_use]
    pub fn drain_pending(&self) -> Vec<PendingMessage> {
        self.pending.iter().cloned().collect()
    }

    /// Remove a delivered message. Error texts are written to the ledger.
    pub fn acknowledge(&mut self, seq: u64) -> Option<PendingMessage> {
        let index = self.pending.iter().position(|msg| msg.seq == seq)?;
        let message = self.pending.remove(index)?;
        if message.kind == MessageKind::Error {
            self.ledger.record(&message.text);
        }
        Some(message)
    }

    #[must_use]
    pub const fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
