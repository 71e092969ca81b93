//! Turns a raw poll response into change events and moves the poll cursor.

#![allow(missing_docs)]

use serde_json::Value;

use crate::core::config::{EmptyBatchPolicy, PollConfig};
use crate::core::errors::{HsbError, Result};
use crate::tracker::state::{ChangeEvent, StateTracker};
use crate::tracker::status::StatusEntry;

const FIELD_HOMEWORKS: &str = "homeworks";

/// Lower bound (epoch seconds) for the next poll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollCursor(i64);

impl PollCursor {
    #[must_use]
    pub const fn new(since: i64) -> Self {
        Self(since)
    }

    /// Cursor anchored at the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorOptions {
    pub empty_batch: EmptyBatchPolicy,
    pub unwrap_singleton: bool,
    pub notify_new_entries: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for DetectorOptions {
    fn from(config: &PollConfig) -> Self {
        Self {
            empty_batch: config.empty_batch,
            unwrap_singleton: config.unwrap_singleton,
            notify_new_entries: config.notify_new_entries,
        }
    }
}

/// Validates poll responses and feeds them through a [`StateTracker`].
#[derive(Debug)]
pub struct ChangeDetector {
    tracker: StateTracker,
    cursor: PollCursor,
    options: DetectorOptions,
}

impl ChangeDetector {
    #[must_use]
    pub fn new(options: DetectorOptions, cursor: PollCursor) -> Self {
        Self {
            tracker: StateTracker::new(),
            cursor,
            options,
        }
    }

    #[must_use]
    pub const fn cursor(&self) -> PollCursor {
        self.cursor
    }

    #[must_use]
    pub const fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    /// Validate `raw` and return the change events it carries, in order.
    ///
    /// The whole batch is parsed before the tracker sees any of it, so a
    /// malformed item fails the call without recording anything. On success
    /// the cursor moves to the `updated_at` of the last emitted event; a batch
    /// with no events leaves it where it was.
    pub fn detect(&mut self, raw: &Value) -> Result<Vec<ChangeEvent>> {
        let entries = self.parse_batch(raw)?;
        let window_start = self.cursor.get();

        let mut events = Vec::new();
        for entry in entries {
            if self.tracker.contains(&entry.id) {
                events.extend(self.tracker.record(&entry.id, entry.status, entry.updated_at));
                continue;
            }
            self.tracker.record(&entry.id, entry.status, entry.updated_at);
            if self.options.notify_new_entries && entry.updated_at >= window_start {
                tracing::info!(
                    id = %entry.id,
                    status = %entry.status,
                    updated_at = entry.updated_at,
                    "new homework appeared inside the poll window"
                );
                events.push(ChangeEvent {
                    id: entry.id,
                    status: entry.status,
                    previous: None,
                    updated_at: entry.updated_at,
                });
            }
        }

        if let Some(last) = events.last() {
            self.cursor = PollCursor::new(last.updated_at);
        }
        Ok(events)
    }

    /// Shape checks only; no tracker access.
    pub fn parse_batch(&self, raw: &Value) -> Result<Vec<StatusEntry>> {
        let body = if self.options.unwrap_singleton {
            unwrap_legacy_singleton(raw)
        } else {
            raw
        };

        let object = body
            .as_object()
            .ok_or_else(|| HsbError::shape("response is not a JSON object"))?;
        let items = object
            .get(FIELD_HOMEWORKS)
            .ok_or_else(|| HsbError::shape(format!("response has no `{FIELD_HOMEWORKS}` key")))?
            .as_array()
            .ok_or_else(|| HsbError::shape(format!("`{FIELD_HOMEWORKS}` is not a list")))?;

        if items.is_empty() {
            return match self.options.empty_batch {
                EmptyBatchPolicy::Reject => {
                    Err(HsbError::shape(format!("`{FIELD_HOMEWORKS}` list is empty")))
                }
                EmptyBatchPolicy::Accept => Ok(Vec::new()),
            };
        }

        items.iter().map(StatusEntry::from_value).collect()
    }
}

/// Compatibility shim: some responses wrap the record in a one-element list.
fn unwrap_legacy_singleton(raw: &Value) -> &Value {
    match raw.as_array().map(Vec::as_slice) {
        Some([only]) => only,
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::tracker::status::ReviewStatus;

    fn item(name: &str, status: &str, updated_at: i64) -> Value {
        let stamp = chrono::DateTime::from_timestamp(updated_at, 0)
            .expect("valid timestamp")
            .to_rfc3339();
        json!({ "homework_name": name, "status": status, "date_updated": stamp })
    }

    fn batch(items: Vec<Value>) -> Value {
        json!({ "homeworks": items, "current_date": 0 })
    }

    fn detector() -> ChangeDetector {
        ChangeDetector::new(DetectorOptions::default(), PollCursor::new(0))
    }

    #[test]
    fn cursor_follows_last_event_in_received_order() {
        let mut detector = detector();
        let events = detector
            .detect(&batch(vec![item("a", "reviewing", 100), item("b", "reviewing", 300)]))
            .expect("valid");
        assert_eq!(events.len(), 2);
        assert_eq!(detector.cursor().get(), 300);

        let events = detector
            .detect(&batch(vec![item("a", "approved", 500), item("b", "approved", 400)]))
            .expect("valid");
        assert_eq!(events.len(), 2);
        assert_eq!(detector.cursor().get(), 400, "order-based, not max-based");
    }

    #[test]
    fn unchanged_trailing_item_does_not_move_cursor() {
        let mut detector = detector();
        detector
            .detect(&batch(vec![item("a", "reviewing", 10), item("b", "reviewing", 20)]))
            .expect("valid");
        detector
            .detect(&batch(vec![item("a", "approved", 100), item("b", "reviewing", 900)]))
            .expect("valid");
        assert_eq!(detector.cursor().get(), 100);
    }

    #[test]
    fn batch_without_events_keeps_cursor() {
        let mut detector = ChangeDetector::new(DetectorOptions::default(), PollCursor::new(1_000));
        let events = detector
            .detect(&batch(vec![item("old", "approved", 10)]))
            .expect("valid");
        assert!(events.is_empty(), "entry updated before the window is baseline only");
        assert_eq!(detector.cursor().get(), 1_000);
        assert_eq!(detector.tracker().last_status("old"), Some(ReviewStatus::Approved));
    }

    #[test]
    fn arrivals_can_be_silenced() {
        let options = DetectorOptions {
            notify_new_entries: false,
            ..DetectorOptions::default()
        };
        let mut detector = ChangeDetector::new(options, PollCursor::new(0));
        assert!(detector
            .detect(&batch(vec![item("a", "reviewing", 100)]))
            .expect("valid")
            .is_empty());
        let events = detector
            .detect(&batch(vec![item("a", "approved", 200)]))
            .expect("valid");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].previous, Some(ReviewStatus::Reviewing));
    }

    #[test]
    fn malformed_item_fails_batch_without_recording() {
        let mut detector = detector();
        let raw = batch(vec![
            item("a", "reviewing", 100),
            json!({ "homework_name": "b", "date_updated": "2020-02-13T14:40:57Z" }),
        ]);
        let err = detector.detect(&raw).unwrap_err();
        assert_eq!(err.code(), "HSB-2101");
        assert!(detector.tracker().is_empty());
        assert_eq!(detector.cursor().get(), 0);
    }

    #[test]
    fn unrecognized_status_fails_batch() {
        let mut detector = detector();
        let err = detector
            .detect(&batch(vec![item("a", "reviewing", 1), item("b", "archived", 2)]))
            .unwrap_err();
        assert_eq!(err.code(), "HSB-2102");
        assert!(detector.tracker().is_empty());
    }

    #[test]
    fn empty_list_policy() {
        let mut strict = detector();
        assert!(strict.detect(&batch(vec![])).unwrap_err().is_shape_error());

        let options = DetectorOptions {
            empty_batch: EmptyBatchPolicy::Accept,
            ..DetectorOptions::default()
        };
        let mut lenient = ChangeDetector::new(options, PollCursor::new(7));
        assert!(lenient.detect(&batch(vec![])).expect("accepted").is_empty());
        assert_eq!(lenient.cursor().get(), 7);
    }

    #[test]
    fn top_level_shape_errors() {
        let mut detector = detector();
        for raw in [
            json!("text"),
            json!({ "current_date": 1 }),
            json!({ "homeworks": { "a": 1 } }),
            json!([]),
        ] {
            assert!(detector.detect(&raw).unwrap_err().is_shape_error(), "{raw}");
        }
    }

    #[test]
    fn singleton_list_is_unwrapped_when_enabled() {
        let wrapped = json!([batch(vec![item("a", "reviewing", 5)])]);
        let mut detector = detector();
        assert_eq!(detector.detect(&wrapped).expect("unwrapped").len(), 1);

        let options = DetectorOptions {
            unwrap_singleton: false,
            ..DetectorOptions::default()
        };
        let mut strict = ChangeDetector::new(options, PollCursor::new(0));
        assert!(strict.detect(&wrapped).is_err());
    }

    #[test]
    fn two_element_list_is_not_unwrapped() {
        let raw = json!([batch(vec![]), batch(vec![])]);
        assert!(detector().detect(&raw).is_err());
    }
}
