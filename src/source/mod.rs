//! Pull side of the pipeline: where raw status responses come from.

pub mod practicum;

pub use practicum::PracticumSource;

use serde_json::Value;

use crate::core::errors::Result;

/// Status endpoint returning every homework updated at or after `since`.
pub trait StatusSource {
    /// Fetch the raw, unvalidated response body.
    ///
    /// # Errors
    /// Network failures, non-success status codes and unparseable bodies,
    /// all as `ApiResponse`.
    fn fetch(&self, since: i64) -> Result<Value>;
}

impl<S: StatusSource + ?Sized> StatusSource for &S {
    fn fetch(&self, since: i64) -> Result<Value> {
        (**self).fetch(since)
    }
}

impl<S: StatusSource + ?Sized> StatusSource for Box<S> {
    fn fetch(&self, since: i64) -> Result<Value> {
        (**self).fetch(since)
    }
}
