//! Status tracking: review-status vocabulary, per-homework last-known state,
//! and the change detector that drives both from raw poll responses.

pub mod detector;
pub mod state;
pub mod status;

pub use detector::{ChangeDetector, DetectorOptions, PollCursor};
pub use state::{ChangeEvent, StateTracker};
pub use status::{ReviewStatus, StatusEntry};
