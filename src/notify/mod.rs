//! Notification path: outbound queue, error dedup ledger, delivery pipeline,
//! message rendering, and the Telegram messenger.

pub mod delivery;
pub mod ledger;
pub mod message;
pub mod queue;
pub mod telegram;

pub use delivery::{DeliveryPipeline, DeliveryReport, Messenger};
pub use ledger::DedupLedger;
pub use queue::{EnqueueOutcome, MessageKind, NotificationQueue, PendingMessage};
pub use telegram::TelegramMessenger;
