//! HTTP header constants.
//!
//! Header values the connector sends on every request, plus the encoding
//! token it negotiates.

/// Content coding advertised in `Accept-Encoding` and recognized in `Content-Encoding`.
pub const GZIP_ENCODING: &str = "gzip";

/// Value sent in both `Cache-Control` and `Pragma` to bypass intermediate caches.
pub const NO_CACHE: &str = "no-cache";
