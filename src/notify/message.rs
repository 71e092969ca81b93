//! Notification text rendering.

use crate::core::errors::HsbError;
use crate::tracker::state::ChangeEvent;

/// Text sent when a homework's review status changes.
#[must_use]
pub fn render_change(event: &ChangeEvent) -> String {
    format!(
        "Review status changed for \"{}\". {}",
        event.id,
        event.status.verdict()
    )
}

/// Text sent when a cycle fails. Identical failures render identically so
/// the ledger can recognise them.
#[must_use]
pub fn render_error(error: &HsbError) -> String {
    format!("Program failure: {error}")
}
