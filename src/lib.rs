//! Homework status bot.
//!
//! Polls the homework review API, detects review-status transitions, and
//! relays them to a Telegram chat. Failed sends stay queued for the next
//! cycle; a failure that repeats with the same text is reported once.
//!
//! Layout follows the data flow:
//!
//! - [`source`]: raw poll responses
//! - [`tracker`]: validation, last-known status, change detection
//! - [`notify`]: queue, dedup ledger, delivery, Telegram
//! - [`daemon`]: the poll loop and shutdown signalling
//! - [`core`]: errors and configuration
//! - [`logger`]: tracing setup and the JSONL activity journal

pub mod core;
pub mod daemon;
pub mod logger;
pub mod notify;
pub mod source;
pub mod tracker;

#[cfg(feature = "cli")]
pub mod cli_app;

pub use crate::core::errors::{HsbError, Result};
