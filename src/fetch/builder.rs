//! Request configuration and the fluent builder with its terminal operations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;

use crate::config::RequestDefaults;
use crate::error_handling::RequestError;
use crate::fetch::progress::ProgressIndicator;
use crate::fetch::request::Request;
use crate::fetch::scope::ResolveScope;
use crate::tls::HostnameVerifier;

/// Everything needed to open a connection. Built through [`RequestBuilder`].
#[derive(Clone)]
pub struct RequestConfig {
    pub(crate) url: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
    pub(crate) redirect_limit: u32,
    pub(crate) gzip: bool,
    pub(crate) force_https: bool,
    pub(crate) hostname_verifier: Option<HostnameVerifier>,
    pub(crate) user_agent: Option<String>,
    pub(crate) accept: Option<String>,
    pub(crate) method: Option<Method>,
    pub(crate) resolve_scope: Option<Arc<dyn ResolveScope>>,
}

impl RequestConfig {
    fn new(url: String, defaults: RequestDefaults) -> Self {
        Self {
            url,
            connect_timeout: defaults.connect_timeout,
            read_timeout: defaults.read_timeout,
            redirect_limit: defaults.redirect_limit,
            gzip: true,
            force_https: false,
            hostname_verifier: None,
            user_agent: None,
            accept: None,
            method: None,
            resolve_scope: None,
        }
    }

    /// URL as configured, before any HTTPS rewrite.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL the connector starts from: `http:` becomes `https:` when HTTPS is forced.
    pub fn target_url(&self) -> String {
        match self.url.strip_prefix("http:") {
            Some(rest) if self.force_https => format!("https:{rest}"),
            _ => self.url.clone(),
        }
    }

    /// HTTP method, `GET` unless overridden.
    pub fn method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    /// Connect timeout (`Duration::ZERO` means none).
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Per-read timeout (`Duration::ZERO` means none).
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Maximum number of connection attempts.
    pub fn redirect_limit(&self) -> u32 {
        self.redirect_limit
    }

    /// Whether gzip is negotiated.
    pub fn gzip(&self) -> bool {
        self.gzip
    }

    /// Configured `User-Agent`.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Configured `Accept` MIME type.
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("url", &self.url)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("redirect_limit", &self.redirect_limit)
            .field("gzip", &self.gzip)
            .field("force_https", &self.force_https)
            .field("hostname_verifier", &self.hostname_verifier.is_some())
            .field("user_agent", &self.user_agent)
            .field("accept", &self.accept)
            .field("method", &self.method)
            .field("resolve_scope", &self.resolve_scope.is_some())
            .finish()
    }
}

/// Fluent request configuration.
///
/// Setters never validate; bad values (an unparseable URL, an invalid header
/// value) surface when a terminal operation connects. Terminal operations
/// borrow the builder, so one builder can be connected several times.
///
/// ```no_run
/// use std::io::Read;
///
/// # fn main() -> Result<(), http_requests::RequestError> {
/// let first_byte = http_requests::request("https://example.com/")
///     .accept("text/html")
///     .connect(|request| {
///         let mut byte = [0u8; 1];
///         request.input_stream()?.read_exact(&mut byte)?;
///         Ok::<_, http_requests::RequestError>(byte[0])
///     })?;
/// # let _ = first_byte;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    config: RequestConfig,
}

impl RequestBuilder {
    /// Creates a GET builder using [`RequestDefaults::from_env`].
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_defaults(url, RequestDefaults::from_env())
    }

    /// Creates a GET builder with explicit defaults.
    pub fn with_defaults(url: impl Into<String>, defaults: RequestDefaults) -> Self {
        Self {
            config: RequestConfig::new(url.into(), defaults),
        }
    }

    /// Connect timeout. `Duration::ZERO` disables it.
    pub fn connect_timeout(mut self, value: Duration) -> Self {
        self.config.connect_timeout = value;
        self
    }

    /// Timeout for each blocking read. `Duration::ZERO` disables it.
    pub fn read_timeout(mut self, value: Duration) -> Self {
        self.config.read_timeout = value;
        self
    }

    /// Maximum number of connection attempts while following redirects.
    pub fn redirect_limit(mut self, redirect_limit: u32) -> Self {
        self.config.redirect_limit = redirect_limit;
        self
    }

    /// Advertise gzip and transparently decompress gzip responses (default: on).
    pub fn gzip(mut self, value: bool) -> Self {
        self.config.gzip = value;
        self
    }

    /// Rewrite `http:` URLs to `https:` before connecting.
    pub fn force_https(mut self, force_https: bool) -> Self {
        self.config.force_https = force_https;
        self
    }

    /// Accepts certificates issued for another name when `verifier` approves the host.
    pub fn hostname_verifier(mut self, verifier: Option<HostnameVerifier>) -> Self {
        self.config.hostname_verifier = verifier;
        self
    }

    /// `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the user agent to `http_requests/<version>`.
    pub fn default_user_agent(self) -> Self {
        self.user_agent(crate::user_agent::default_user_agent())
    }

    /// `Accept` header value (a MIME type).
    pub fn accept(mut self, mime_type: impl Into<String>) -> Self {
        self.config.accept = Some(mime_type.into());
        self
    }

    /// Overrides the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.config.method = Some(method);
        self
    }

    /// Hook entered around connection resolution (see [`ResolveScope`]).
    pub fn resolve_scope(mut self, scope: Arc<dyn ResolveScope>) -> Self {
        self.config.resolve_scope = Some(scope);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Runs `processor` against a lazily connected [`Request`].
    ///
    /// The connection is opened the first time the processor asks for it.
    /// Streams and the transport are released before this returns, whether
    /// the processor succeeded or not; the processor's error is returned
    /// unchanged.
    pub fn connect<T, E, F>(&self, processor: F) -> Result<T, E>
    where
        F: FnOnce(&mut Request<'_>) -> Result<T, E>,
        E: From<RequestError>,
    {
        let mut request = Request::new(&self.config);
        let result = processor(&mut request);
        request.cleanup();
        result
    }

    /// Like [`connect`](Self::connect), but any failure yields `error_value`.
    ///
    /// When `logger` is given, the failure is recorded on it as a warning.
    pub fn connect_or<T, E, F>(
        &self,
        processor: F,
        error_value: T,
        logger: Option<&dyn log::Log>,
    ) -> T
    where
        F: FnOnce(&mut Request<'_>) -> Result<T, E>,
        E: From<RequestError> + fmt::Display,
    {
        match self.connect(processor) {
            Ok(value) => value,
            Err(e) => {
                if let Some(logger) = logger {
                    logger.log(
                        &log::Record::builder()
                            .level(log::Level::Warn)
                            .target(module_path!())
                            .args(format_args!("Request to {} failed: {e}", self.config.url))
                            .build(),
                    );
                }
                error_value
            }
        }
    }

    /// Streams the response body into `path` (see [`Request::save_to_file`]).
    pub fn save_to_file(
        &self,
        path: impl AsRef<Path>,
        progress: Option<&dyn ProgressIndicator>,
    ) -> Result<PathBuf, RequestError> {
        self.connect(|request| request.save_to_file(path.as_ref(), progress))
    }

    /// Reads the whole response body into memory.
    pub fn read_bytes(
        &self,
        progress: Option<&dyn ProgressIndicator>,
    ) -> Result<Vec<u8>, RequestError> {
        self.connect(|request| request.read_bytes(progress))
    }

    /// Reads the whole response body as text (see [`Request::read_string`]).
    pub fn read_string(
        &self,
        progress: Option<&dyn ProgressIndicator>,
    ) -> Result<String, RequestError> {
        self.connect(|request| request.read_string(progress))
    }
}
