//! Error types for reply-harvest
//!
//! This module provides the error hierarchy for the library:
//! - [`TransportError`] for failed fetches (connectivity, non-2xx status, unreadable body)
//! - [`DecodeError`] for responses whose required structure is violated
//! - [`StructuralError`] for reply trees that trip the flattening depth guard
//! - [`Error`], the top-level type returned to callers
//!
//! Whether an error is fatal depends on where it happens, not on its kind: the same
//! transport failure aborts a harvest on the listing fetch but is only recorded as an
//! [`ItemFailure`](crate::types::ItemFailure) on a detail fetch.

use thiserror::Error;

/// Result type alias for reply-harvest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for reply-harvest
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// The underlying fetch failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A response did not have the required shape
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A reply tree could not be flattened
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    /// A per-item fetch task panicked
    #[error("fetch task panicked: {0}")]
    Panicked(String),

    /// The harvest ended without ever delivering a result
    #[error("harvest aborted before completion")]
    Aborted,
}

impl Error {
    /// Build a configuration error for a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Failures of the "fetch JSON by URL" collaborator
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or timed out
    #[error("request to {url} failed: {source}")]
    Request {
        /// The URL that was requested
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be read or was not JSON
    #[error("invalid response body from {url}: {source}")]
    Body {
        /// The URL that was requested
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// Transport-specific failure that is not an HTTP client error
    #[error("{url} unavailable: {reason}")]
    Unavailable {
        /// The URL that was requested
        url: String,
        /// Why the resource could not be fetched
        reason: String,
    },
}

impl TransportError {
    /// Returns true if the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Request { source, .. } if source.is_timeout())
    }
}

/// Violations of a response's required structure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A required field is absent
    #[error("{context}: missing required field `{field}`")]
    MissingField {
        /// The record being decoded (e.g., "listing item")
        context: &'static str,
        /// Name of the missing field
        field: &'static str,
    },

    /// A required field is present but has the wrong JSON type
    #[error("{context}: field `{field}` is not {expected}")]
    WrongType {
        /// The record being decoded
        context: &'static str,
        /// Name of the mismatched field
        field: &'static str,
        /// The JSON type that was expected
        expected: &'static str,
    },

    /// A record was expected to be a JSON object
    #[error("{context}: expected a JSON object")]
    NotAnObject {
        /// The record being decoded
        context: &'static str,
    },

    /// A detail response was not an array of at least `expected` elements
    #[error("corrupt response shape: expected at least {expected} elements, found {found}")]
    ResponseShape {
        /// Minimum number of elements required
        expected: usize,
        /// Number of elements actually present
        found: usize,
    },

    /// A detail response did not echo the requested item
    #[error("detail response does not contain the originating item")]
    MissingItemEcho,
}

/// Failures while walking a reply tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// The tree is nested deeper than the configured limit
    #[error("reply tree exceeds maximum depth of {max_depth}")]
    DepthExceeded {
        /// The configured depth limit
        max_depth: usize,
    },
}
