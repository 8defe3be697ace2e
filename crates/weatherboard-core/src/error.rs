//! Centralized error types for Weatherboard.
//!
//! Every use case reports failures as an [`AppError`]: a classification tag
//! plus an optional underlying cause. Cancellation is a separate marker,
//! [`Cancelled`], and is never folded into an `AppError`.

use std::fmt;

use thiserror::Error;

/// Boxed error used as the cause of an [`AppError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A caller supplied an unusable parameter (e.g. an empty place name).
    InvalidInput,
    /// A dashboard query or filter violates its construction rules.
    InvalidQuery,
    /// The requested place or record does not exist.
    NotFound,
    /// The forecast source could not be reached.
    Network,
    /// Anything not anticipated by the other kinds.
    Other,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::InvalidQuery => "invalid query",
            ErrorKind::NotFound => "not found",
            ErrorKind::Network => "network",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error surfaced by every use case.
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Wrap an underlying fault, keeping it reachable through `source()`.
    ///
    /// `message` describes this layer only; the cause's text stays on the cause.
    pub fn with_cause(
        kind: ErrorKind,
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Classify an unanticipated fault.
    pub fn other(cause: impl Into<BoxError>) -> Self {
        Self::with_cause(ErrorKind::Other, "unexpected failure", cause)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            ErrorKind::InvalidInput => "Please check the place name and try again.",
            ErrorKind::InvalidQuery => "This dashboard card has conflicting conditions.",
            ErrorKind::NotFound => "Location not found. Check and try again.",
            ErrorKind::Network => "Unable to reach the weather service. Please try again.",
            ErrorKind::Other => "Something went wrong. Please try again.",
        }
    }
}

/// Raised when the scope governing an operation is cancelled.
///
/// Use cases hand this back to the caller instead of wrapping it as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("operation cancelled")]
pub struct Cancelled;
