//! Error type definitions.
//!
//! This module defines the errors surfaced by the request connector and by
//! application initialization.

use std::io;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Marker carried inside an `io::Error` when a progress signal requests
/// cancellation from within a `Read` implementation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Request canceled")]
pub struct Canceled;

/// Errors raised while resolving, reading or saving a request.
///
/// Every resolution failure (bad URL, unreachable host, timeout, unexpected
/// status, redirect limit) is a variant of this one type so callers can treat
/// them uniformly as I/O failures. Exceeding the redirect limit stays
/// distinguishable through [`RequestError::is_too_many_redirects`].
#[derive(Error, Debug)]
pub enum RequestError {
    /// The configured (or redirected) URL could not be parsed.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The URL uses a scheme no transport handles.
    #[error("Unsupported URL scheme '{scheme}' in '{url}'")]
    UnsupportedScheme { scheme: String, url: String },

    /// The server answered with a status that is neither success nor a followable redirect.
    #[error("Connection failed with HTTP code {status}")]
    Status { status: u16, url: String },

    /// Redirects were followed until the configured limit ran out.
    #[error("Connection failed: too many redirects (limit {limit})")]
    TooManyRedirects { limit: u32 },

    /// Failure inside the HTTP transport (connect, timeout, TLS handshake, ...).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// TLS settings could not be assembled.
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// Plain I/O failure while reading the body or touching the filesystem.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// A download failed; the message embeds URL, headers and status line.
    #[error("{message}")]
    Download {
        message: String,
        #[source]
        source: io::Error,
    },

    /// The progress signal asked to stop.
    #[error("Request canceled")]
    Canceled,
}

impl RequestError {
    /// Returns `true` if the redirect limit was exceeded.
    pub fn is_too_many_redirects(&self) -> bool {
        matches!(self, RequestError::TooManyRedirects { .. })
    }

    /// Returns `true` if the request was canceled through its progress signal.
    pub fn is_canceled(&self) -> bool {
        matches!(self, RequestError::Canceled)
    }

    /// HTTP status code attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<io::Error> for RequestError {
    fn from(e: io::Error) -> Self {
        if is_cancellation(&e) {
            RequestError::Canceled
        } else {
            RequestError::Io(e)
        }
    }
}

impl From<Canceled> for RequestError {
    fn from(_: Canceled) -> Self {
        RequestError::Canceled
    }
}

impl From<Canceled> for io::Error {
    fn from(c: Canceled) -> Self {
        io::Error::new(io::ErrorKind::Interrupted, c)
    }
}

/// Checks whether an `io::Error` wraps a [`Canceled`] marker.
pub(crate) fn is_cancellation(e: &io::Error) -> bool {
    e.get_ref().is_some_and(|inner| inner.is::<Canceled>())
}
