//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, buffer sizes)
//! - HTTP header name constants
//! - Request defaults read from the environment
//! - CLI option types and parsing

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{LogFormat, LogLevel, Opt, RequestDefaults};
