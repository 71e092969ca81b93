//! Per-message delivery with retry-by-retention.
//!
//! Every queued message gets one attempt per cycle, in queue order. A failed
//! send is logged and the message stays queued; it never stops the rest of
//! the queue from being attempted.

#![allow(missing_docs)]

use crate::core::errors::{HsbError, Result};
use crate::notify::queue::{NotificationQueue, PendingMessage};

/// Push side of the messaging channel.
pub trait Messenger {
    /// Hand `text` to the channel for `destination`.
    ///
    /// # Errors
    /// Any failure; the pipeline reports it as `SendMessage`.
    fn send(&self, destination: &str, text: &str) -> Result<()>;
}

impl<M: Messenger + ?Sized> Messenger for &M {
    fn send(&self, destination: &str, text: &str) -> Result<()> {
        (**self).send(destination, text)
    }
}

impl<M: Messenger + ?Sized> Messenger for Box<M> {
    fn send(&self, destination: &str, text: &str) -> Result<()> {
        (**self).send(destination, text)
    }
}

/// Result of one pass over the queue.
#[derive(Debug, Default, Clone)]
pub struct DeliveryReport {
    pub delivered: Vec<PendingMessage>,
    pub failed: Vec<(PendingMessage, String)>,
}

impl DeliveryReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

pub struct DeliveryPipeline<M> {
    messenger: M,
    destination: String,
}

impl<M: Messenger> DeliveryPipeline<M> {
    pub fn new(messenger: M, destination: impl Into<String>) -> Self {
        Self {
            messenger,
            destination: destination.into(),
        }
    }

    /// Attempt one message. Does not touch the queue.
    pub fn deliver(&self, message: &PendingMessage) -> Result<()> {
        self.messenger
            .send(&self.destination, &message.text)
            .map_err(|err| match err {
                err @ HsbError::SendMessage { .. } => err,
                other => HsbError::SendMessage {
                    details: other.to_string(),
                },
            })
    }

    /// Attempt every pending message once. Successes are acknowledged
    /// (removed, and error texts recorded in the ledger); failures stay.
    pub fn deliver_pending(&self, queue: &mut NotificationQueue) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for message in queue.drain_pending() {
            match self.deliver(&message) {
                Ok(()) => {
                    tracing::info!(
                        seq = message.seq,
                        kind = %message.kind,
                        "message delivered"
                    );
                    queue.acknowledge(message.seq);
                    report.delivered.push(message);
                }
                Err(err) => {
                    tracing::warn!(
                        seq = message.seq,
                        kind = %message.kind,
                        error = %err,
                        "message delivery failed, keeping it queued"
                    );
                    report.failed.push((message, err.to_string()));
                }
            }
        }
        report
    }
}
