//! Append-only JSONL activity journal.
//!
//! One JSON object per line. A journal that cannot be opened or written
//! disables itself after a single warning; the poll loop keeps running.

#![allow(missing_docs)]

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::errors::{HsbError, Result};
use crate::notify::queue::MessageKind;
use crate::tracker::status::ReviewStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActivityEvent {
    LoopStarted {
        interval_secs: u64,
        cursor: i64,
    },
    ChangeDetected {
        id: String,
        status: ReviewStatus,
        previous: Option<ReviewStatus>,
        updated_at: i64,
    },
    CycleFailed {
        kind: String,
        code: String,
        message: String,
    },
    MessageDelivered {
        seq: u64,
        kind: MessageKind,
    },
    DeliveryFailed {
        seq: u64,
        kind: MessageKind,
        error: String,
    },
    LoopStopped {
        cycles: u64,
    },
}

#[derive(Serialize)]
struct JournalLine<'a> {
    ts: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a ActivityEvent,
}

#[derive(Debug)]
pub struct ActivityJournal {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl ActivityJournal {
    /// A journal that discards everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            path: None,
            writer: None,
        }
    }

    /// Open `path` for appending, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| HsbError::io(parent, err))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| HsbError::io(path, err))?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            writer: Some(BufWriter::new(file)),
        })
    }

    /// [`ActivityJournal::open`], degrading to a disabled journal on failure.
    #[must_use]
    pub fn open_or_disabled(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::disabled();
        };
        match Self::open(path) {
            Ok(journal) => journal,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "activity journal disabled");
                Self::disabled()
            }
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record(&mut self, event: &ActivityEvent) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let line = JournalLine {
            ts: Utc::now(),
            event,
        };
        let outcome = serde_json::to_writer(&mut *writer, &line)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(err) = outcome {
            tracing::warn!(
                path = ?self.path,
                error = %err,
                "activity journal write failed, disabling journal"
            );
            self.writer = None;
        }
    }
}
