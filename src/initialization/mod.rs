//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - The logger used by the binary
//! - The blocking HTTP client that backs every request

mod client;
mod logger;

// Re-export public API
pub(crate) use client::init_client;
pub use logger::init_logger_with;
