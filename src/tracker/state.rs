//! Last-known review status per homework.
//!
//! Only transitions produce events. The first observation of an id sets its
//! baseline silently so a restart does not replay every known status.

#![allow(missing_docs)]

use std::collections::HashMap;

use serde::Serialize;

use crate::core::errors::{HsbError, Result};
use crate::tracker::status::{ReviewStatus, UnknownStatus};

/// A status transition worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub id: String,
    pub status: ReviewStatus,
    /// `None` when the homework had no recorded status before this event.
    pub previous: Option<ReviewStatus>,
    pub updated_at: i64,
}

/// Owns the `id -> last_status` map. Entries are never evicted.
#[derive(Debug, Default)]
pub struct StateTracker {
    statuses: HashMap<String, ReviewStatus>,
}

impl StateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw status string for `id`, last updated at `updated_at`.
    ///
    /// Returns `Some(event)` only when `id` was already known with a
    /// different status. An unrecognized status leaves the map untouched.
    pub fn observe(
        &mut self,
        id: &str,
        status: &str,
        updated_at: i64,
    ) -> Result<Option<ChangeEvent>> {
        let status = status
            .parse::<ReviewStatus>()
            .map_err(|UnknownStatus(status)| HsbError::UnrecognizedStatus {
                id: id.to_string(),
                status,
            })?;
        Ok(self.record(id, status, updated_at))
    }

    /// Typed core of [`StateTracker::observe`] for already-validated input.
    pub fn record(&mut self, id: &str, status: ReviewStatus, updated_at: i64) -> Option<ChangeEvent> {
        match self.statuses.insert(id.to_string(), status) {
            None => {
                tracing::debug!(id = %id, status = %status, "baseline status recorded");
                None
            }
            Some(previous) if previous == status => None,
            Some(previous) => {
                tracing::info!(
                    id = %id,
                    from = %previous,
                    to = %status,
                    "homework status changed"
                );
                Some(ChangeEvent {
                    id: id.to_string(),
                    status,
                    previous: Some(previous),
                    updated_at,
                })
            }
        }
    }

    #[must_use]
    pub fn last_status(&self, id: &str) -> Option<ReviewStatus> {
        self.statuses.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.statuses.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
