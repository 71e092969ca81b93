//! HSB-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, HsbError>;

/// Top-level error type for the homework status bot.
#[derive(Debug, Error)]
pub enum HsbError {
    #[error("[HSB-1001] invalid configuration: {details}")]
    Configuration { details: String },

    #[error("[HSB-1002] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[HSB-2001] status API request failed: {details}")]
    ApiResponse { details: String },

    #[error("[HSB-2101] unexpected response shape: {details}")]
    DataShape { details: String },

    #[error("[HSB-2102] undocumented status `{status}` for homework {id}")]
    UnrecognizedStatus { id: String, status: String },

    #[error("[HSB-3001] message delivery failed: {details}")]
    SendMessage { details: String },

    #[error("[HSB-3101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[HSB-3201] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[HSB-3900] runtime failure: {details}")]
    Runtime { details: String },
}

/// Coarse taxonomy used when a failure is rendered into an error notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    ApiResponse,
    DataShape,
    UnrecognizedStatus,
    SendMessage,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::ApiResponse => "api_response",
            Self::DataShape => "data_shape",
            Self::UnrecognizedStatus => "unrecognized_status",
            Self::SendMessage => "send_message",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HsbError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "HSB-1001",
            Self::ConfigParse { .. } => "HSB-1002",
            Self::ApiResponse { .. } => "HSB-2001",
            Self::DataShape { .. } => "HSB-2101",
            Self::UnrecognizedStatus { .. } => "HSB-2102",
            Self::SendMessage { .. } => "HSB-3001",
            Self::Serialization { .. } => "HSB-3101",
            Self::Io { .. } => "HSB-3201",
            Self::Runtime { .. } => "HSB-3900",
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::ConfigParse { .. } => ErrorKind::Configuration,
            Self::ApiResponse { .. } => ErrorKind::ApiResponse,
            Self::DataShape { .. } => ErrorKind::DataShape,
            Self::UnrecognizedStatus { .. } => ErrorKind::UnrecognizedStatus,
            Self::SendMessage { .. } => ErrorKind::SendMessage,
            Self::Serialization { .. }
            | Self::Io { .. }
            | Self::Runtime { .. } => ErrorKind::Internal,
        }
    }

    /// Whether the poll loop may carry on after this failure.
    ///
    /// Only configuration problems are fatal, and those are raised before the
    /// loop starts.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Configuration)
    }

    /// `UnrecognizedStatus` is a specific flavour of a bad response shape.
    #[must_use]
    pub const fn is_shape_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::DataShape | ErrorKind::UnrecognizedStatus
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub fn shape(details: impl Into<String>) -> Self {
        Self::DataShape {
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for HsbError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for HsbError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HsbError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
