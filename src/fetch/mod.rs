//! Configurable HTTP request connector.
//!
//! A [`RequestBuilder`] collects connection settings; its terminal
//! operations open a [`Connection`] lazily, hand a [`Request`] to a
//! processing callback and release every resource before returning:
//!
//! - [`RequestBuilder::connect`] runs a processor against the live request
//! - [`RequestBuilder::connect_or`] absorbs failures into a fallback value
//! - [`RequestBuilder::save_to_file`], [`RequestBuilder::read_bytes`] and
//!   [`RequestBuilder::read_string`] cover the common whole-body cases
//!
//! Redirects (`301`/`302`) are followed manually up to the configured limit.

use std::io::Read;

mod builder;
mod charset;
mod connection;
mod progress;
mod redirects;
mod request;
mod scope;

pub use builder::{RequestBuilder, RequestConfig};
pub use charset::{charset_for, ResponseReader};
pub use connection::{Connection, FileConnection, HttpConnection};
pub use progress::{CancellationFlag, ProgressIndicator};
pub use request::{create_error_message, Request};
pub use scope::ResolveScope;

/// Byte stream over a response body.
pub type BodyStream = Box<dyn Read + Send>;

/// Starts a `GET` request to `url` with environment-derived defaults.
pub fn request(url: impl Into<String>) -> RequestBuilder {
    RequestBuilder::new(url)
}

/// Starts a `HEAD` request to `url` with environment-derived defaults.
pub fn head(url: impl Into<String>) -> RequestBuilder {
    RequestBuilder::new(url).method(reqwest::Method::HEAD)
}
