//! Configuration constants.
//!
//! This module defines the defaults used when a request does not override
//! them, plus buffer sizes used while copying response bodies.

use std::time::Duration;

/// Default TCP connect timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read timeout, applied to every blocking read of the response.
pub const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Default maximum number of connection attempts while following redirects.
///
/// A limit of `N` allows up to `N - 1` redirects before the final response.
pub const REDIRECT_LIMIT: u32 = 10;

/// Chunk size used when copying a response body to a sink.
pub const COPY_BUFFER_SIZE: usize = 4 * 1024;

/// Initial buffer capacity for `read_bytes` when the content length is unknown.
pub const DEFAULT_BYTES_CAPACITY: usize = 32 * 1024;

/// Initial buffer capacity for `read_string` when the content length is unknown.
pub const DEFAULT_STRING_CAPACITY: usize = 16 * 1024;

/// Upper bound on up-front buffer allocation taken from a declared content length.
///
/// Larger bodies still read fine; the buffer simply grows as data arrives.
pub const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// Raw read buffer used by the character reader.
pub const READER_BUFFER_SIZE: usize = 8 * 1024;

// Environment variables overriding the request defaults
/// Connect timeout override in milliseconds
pub const ENV_CONNECT_TIMEOUT_MS: &str = "HTTP_REQUESTS_CONNECT_TIMEOUT_MS";
/// Read timeout override in milliseconds
pub const ENV_READ_TIMEOUT_MS: &str = "HTTP_REQUESTS_READ_TIMEOUT_MS";
/// Redirect limit override
pub const ENV_REDIRECT_LIMIT: &str = "HTTP_REQUESTS_REDIRECT_LIMIT";
