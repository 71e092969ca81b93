//! Review status vocabulary and the per-homework entry parsed from a poll.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;

use crate::core::errors::{HsbError, Result};

/// Identifier used when upstream omits `homework_name`.
pub const UNNAMED: &str = "unnamed";

const FIELD_NAME: &str = "homework_name";
const FIELD_STATUS: &str = "status";
const FIELD_UPDATED: &str = "date_updated";
const FIELD_LESSON: &str = "lesson_name";
const FIELD_COMMENT: &str = "reviewer_comment";

/// Closed set of statuses the review service documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [Self; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable verdict used in change notices.
    #[must_use]
    pub const fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "The work has been reviewed: the reviewer liked everything. Hooray!",
            Self::Reviewing => "The work has been taken for review by a reviewer.",
            Self::Rejected => "The work has been reviewed: the reviewer has remarks.",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse failure for a status string. Carries the rejected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl FromStr for ReviewStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

/// One homework as seen in a single poll response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub id: String,
    pub status: ReviewStatus,
    /// Epoch seconds of the last status change.
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_comment: Option<String>,
}

impl StatusEntry {
    /// Validate one raw item from the `homeworks` list.
    pub fn from_value(item: &Value) -> Result<Self> {
        let object = item
            .as_object()
            .ok_or_else(|| HsbError::shape(format!("homework item is not an object: {item}")))?;

        let id = object
            .get(FIELD_NAME)
            .and_then(Value::as_str)
            .unwrap_or(UNNAMED)
            .to_string();

        let raw_status = object
            .get(FIELD_STATUS)
            .ok_or_else(|| HsbError::shape(format!("homework {id} has no `{FIELD_STATUS}` field")))?
            .as_str()
            .ok_or_else(|| HsbError::shape(format!("homework {id} has a non-string status")))?;
        let status = raw_status
            .parse::<ReviewStatus>()
            .map_err(|UnknownStatus(status)| HsbError::UnrecognizedStatus {
                id: id.clone(),
                status,
            })?;

        let updated_at = match object.get(FIELD_UPDATED).and_then(Value::as_str) {
            Some(raw) => parse_timestamp(raw).ok_or_else(|| {
                HsbError::shape(format!("homework {id} has malformed date `{raw}`"))
            })?,
            None => {
                return Err(HsbError::shape(format!(
                    "homework {id} has no `{FIELD_UPDATED}` field"
                )));
            }
        };

        Ok(Self {
            id,
            status,
            updated_at,
            lesson_name: optional_string(object.get(FIELD_LESSON)),
            reviewer_comment: optional_string(object.get(FIELD_COMMENT)),
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|stamp| stamp.timestamp())
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn vocabulary_round_trips_through_text() {
        for status in ReviewStatus::ALL {
            assert_eq!(status.as_str().parse::<ReviewStatus>(), Ok(status));
        }
        assert_eq!(
            "archived".parse::<ReviewStatus>(),
            Err(UnknownStatus("archived".to_string()))
        );
        assert!("Approved".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn parses_a_full_item() {
        let entry = StatusEntry::from_value(&json!({
            "id": 124,
            "status": "rejected",
            "homework_name": "username__hw_python_oop.zip",
            "reviewer_comment": "Fix the tests",
            "date_updated": "2020-02-13T14:40:57Z",
            "lesson_name": "OOP"
        }))
        .expect("valid item");
        assert_eq!(entry.id, "username__hw_python_oop.zip");
        assert_eq!(entry.status, ReviewStatus::Rejected);
        assert_eq!(entry.updated_at, 1_581_604_857);
        assert_eq!(entry.lesson_name.as_deref(), Some("OOP"));
        assert_eq!(entry.reviewer_comment.as_deref(), Some("Fix the tests"));
    }

    #[test]
    fn missing_name_falls_back_to_sentinel() {
        let entry = StatusEntry::from_value(&json!({
            "status": "approved",
            "date_updated": "2020-02-13T14:40:57Z"
        }))
        .expect("valid item");
        assert_eq!(entry.id, UNNAMED);
    }

    #[test]
    fn missing_status_is_a_shape_error() {
        let err = StatusEntry::from_value(&json!({
            "homework_name": "hw1",
            "date_updated": "2020-02-13T14:40:57Z"
        }))
        .unwrap_err();
        assert_eq!(err.code(), "HSB-2101");
    }

    #[test]
    fn unknown_status_is_reported_with_id() {
        let err = StatusEntry::from_value(&json!({
            "homework_name": "hw1",
            "status": "archived",
            "date_updated": "2020-02-13T14:40:57Z"
        }))
        .unwrap_err();
        match err {
            HsbError::UnrecognizedStatus { id, status } => {
                assert_eq!(id, "hw1");
                assert_eq!(status, "archived");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_date_is_a_shape_error() {
        let err = StatusEntry::from_value(&json!({
            "homework_name": "hw1",
            "status": "approved",
            "date_updated": "yesterday"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("malformed date"));
    }

    #[test]
    fn non_object_item_is_rejected() {
        assert!(StatusEntry::from_value(&json!("hw1")).is_err());
    }
}
