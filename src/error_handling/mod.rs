//! Error handling.
//!
//! This module provides:
//! - The request error type shared by resolution, processing and downloads
//! - Initialization errors for the binary
//! - The cancellation marker that travels through `io::Error`

mod types;

// Re-export public API
pub use types::{Canceled, InitializationError, RequestError};

pub(crate) use types::is_cancellation;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_canceled_io_error_maps_back_to_canceled() {
        let io_err: io::Error = Canceled.into();
        assert!(is_cancellation(&io_err));
        let err = RequestError::from(io_err);
        assert!(err.is_canceled());
    }

    #[test]
    fn test_plain_io_error_stays_io() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(!is_cancellation(&io_err));
        match RequestError::from(io_err) {
            RequestError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("Expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_status_error_message_contains_code() {
        let err = RequestError::Status {
            status: 503,
            url: "http://localhost/".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_too_many_redirects());
    }

    #[test]
    fn test_too_many_redirects_is_distinguishable() {
        let err = RequestError::TooManyRedirects { limit: 3 };
        assert!(err.is_too_many_redirects());
        assert!(err.to_string().contains("too many redirects"));
        assert_eq!(err.status(), None);
    }
}
