//! http_requests library: configurable HTTP request connector
//!
//! This library reads data from HTTP(S) and `file:` URLs with manual redirect
//! following, gzip negotiation, cooperative cancellation and guaranteed
//! release of every connection and stream once processing is done.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), http_requests::RequestError> {
//! let body = http_requests::request("https://example.com/")
//!     .connect_timeout(Duration::from_secs(5))
//!     .redirect_limit(5)
//!     .default_user_agent()
//!     .read_string(None)?;
//! println!("{body}");
//!
//! let status_ok = http_requests::head("https://example.com/")
//!     .connect_or(|request| request.is_successful(), false, None);
//! # let _ = status_ok;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! All operations block the calling thread. Inside an async runtime, run them
//! on a blocking thread (for example `tokio::task::spawn_blocking`).

#![warn(missing_docs)]

pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod tls;
mod user_agent;

// Re-export public API
pub use config::{LogFormat, LogLevel, RequestDefaults};
pub use error_handling::{Canceled, InitializationError, RequestError};
pub use fetch::{
    charset_for, create_error_message, head, request, BodyStream, CancellationFlag, Connection,
    FileConnection, HttpConnection, ProgressIndicator, Request, RequestBuilder, RequestConfig,
    ResolveScope, ResponseReader,
};
pub use tls::HostnameVerifier;
pub use user_agent::default_user_agent;
