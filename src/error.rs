//! Error types for path-addressed tree operations.
//!
//! Every failure the store can report is a variant of [`Error`]. Collaborator
//! failures (I/O from providers, syntax errors from parsers) are carried
//! through unchanged via `#[error(transparent)]`.

use serde::Serialize;
use thiserror::Error;

/// Stable error codes for programmatic handling (e.g. by a CLI or a
/// service that exposes the store).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Path errors
    EmptyPath,
    EmptySegment,

    // Resolution errors
    NotFound,
    InvalidIndex,
    IndexOutOfRange,
    TypeMismatch,

    // Write errors
    ConflictingType,
    IndexLimit,

    // Collaborator errors
    Io,
    Parse,
    Decode,
}

/// Errors produced by the store and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// A zero-segment path was supplied.
    #[error("path is empty")]
    EmptyPath,

    /// The path contains an empty segment (e.g. `a..b` or a trailing delimiter).
    #[error("path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    /// A mapping along the path lacks the requested key.
    #[error("key not found: {path}")]
    NotFound { path: String },

    /// A non-integer segment was used against a sequence.
    #[error("invalid sequence index '{segment}' at {path}")]
    InvalidIndex { path: String, segment: String },

    /// An integer segment was outside the bounds of a sequence.
    #[error("index {index} out of range (len {len}) at {path}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    /// Attempted to descend through a scalar, or to delete through a sequence.
    #[error("cannot descend into {found} at {path}")]
    TypeMismatch { path: String, found: &'static str },

    /// A write needed a container of a different kind than the one present.
    #[error("conflicting type at {path}: found {found}, need {expected}")]
    ConflictingType {
        path: String,
        found: &'static str,
        expected: &'static str,
    },

    /// A write would grow a sequence past [`crate::tree::MAX_SEQUENCE_INDEX`].
    #[error("index {index} at {path} exceeds the sequence limit of {max}")]
    IndexLimit {
        path: String,
        index: usize,
        max: usize,
    },

    /// Provider I/O failure, surfaced as-is.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Parser failure, surfaced as-is.
    #[error(transparent)]
    Parse(Box<dyn std::error::Error + Send + Sync>),

    /// Structural decode into a typed destination failed.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::EmptyPath => ErrorCode::EmptyPath,
            Error::EmptySegment { .. } => ErrorCode::EmptySegment,
            Error::NotFound { .. } => ErrorCode::NotFound,
            Error::InvalidIndex { .. } => ErrorCode::InvalidIndex,
            Error::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Error::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Error::ConflictingType { .. } => ErrorCode::ConflictingType,
            Error::IndexLimit { .. } => ErrorCode::IndexLimit,
            Error::Io(_) => ErrorCode::Io,
            Error::Parse(_) => ErrorCode::Parse,
            Error::Decode(_) => ErrorCode::Decode,
        }
    }

    /// Wrap any parser error.
    pub fn parse(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Parse(err.into())
    }

    /// True for the resolution failures a soft-typed read turns into a default.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::InvalidIndex { .. }
                | Error::IndexOutOfRange { .. }
                | Error::TypeMismatch { .. }
        )
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound { path: path.into() }
    }

    pub(crate) fn type_mismatch(path: impl Into<String>, found: &'static str) -> Self {
        Error::TypeMismatch {
            path: path.into(),
            found,
        }
    }

    pub(crate) fn conflicting(
        path: impl Into<String>,
        found: &'static str,
        expected: &'static str,
    ) -> Self {
        Error::ConflictingType {
            path: path.into(),
            found,
            expected,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;
