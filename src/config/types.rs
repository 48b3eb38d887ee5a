//! Configuration types and CLI options.
//!
//! This module defines the CLI options, the logging enums, and the request
//! defaults that can be overridden through the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::warn;

use crate::config::constants::{
    CONNECT_TIMEOUT, ENV_CONNECT_TIMEOUT_MS, ENV_READ_TIMEOUT_MS, ENV_REDIRECT_LIMIT,
    READ_TIMEOUT, REDIRECT_LIMIT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// Options left unset fall back to [`RequestDefaults::from_env`].
///
/// # Examples
///
/// ```bash
/// # Print a page
/// http_requests https://example.com/
///
/// # Download to a file, upgrading to HTTPS
/// http_requests http://example.com/archive.tar.gz --output ./archive.tar.gz --force-https
///
/// # Only look at the status and headers
/// http_requests https://example.com/ --head
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "http_requests",
    about = "Reads a URL following redirects, with gzip support and automatic cleanup."
)]
pub struct Opt {
    /// URL to read (http, https or file)
    #[arg(value_parser)]
    pub url: String,

    /// Save the body to this file instead of printing it
    #[arg(long, short, value_parser)]
    pub output: Option<PathBuf>,

    /// Send a HEAD request and print status and headers
    #[arg(long)]
    pub head: bool,

    /// Accept header (MIME type)
    #[arg(long)]
    pub accept: Option<String>,

    /// User-Agent header value (defaults to `http_requests/<version>`)
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Do not advertise or decode gzip content encoding
    #[arg(long)]
    pub no_gzip: bool,

    /// Rewrite http: URLs to https: before connecting
    #[arg(long)]
    pub force_https: bool,

    /// Maximum number of connection attempts while following redirects
    #[arg(long)]
    pub redirect_limit: Option<u32>,

    /// Connect timeout in milliseconds (0 disables the timeout)
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout in milliseconds (0 disables the timeout)
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Defaults applied to every new request builder.
///
/// Constructed from the compiled-in constants, optionally overridden by
/// environment variables (see [`RequestDefaults::from_env`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDefaults {
    /// TCP connect timeout (`Duration::ZERO` disables it)
    pub connect_timeout: Duration,
    /// Per-read timeout (`Duration::ZERO` disables it)
    pub read_timeout: Duration,
    /// Maximum number of connection attempts while following redirects
    pub redirect_limit: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            redirect_limit: REDIRECT_LIMIT,
        }
    }
}

impl RequestDefaults {
    /// Reads overrides from `HTTP_REQUESTS_CONNECT_TIMEOUT_MS`,
    /// `HTTP_REQUESTS_READ_TIMEOUT_MS` and `HTTP_REQUESTS_REDIRECT_LIMIT`.
    ///
    /// Unset variables keep the compiled-in default. Unparseable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            connect_timeout: parse_override(&lookup, ENV_CONNECT_TIMEOUT_MS)
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            read_timeout: parse_override(&lookup, ENV_READ_TIMEOUT_MS)
                .map(Duration::from_millis)
                .unwrap_or(defaults.read_timeout),
            redirect_limit: parse_override(&lookup, ENV_REDIRECT_LIMIT)
                .unwrap_or(defaults.redirect_limit),
        }
    }
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {key}: {raw:?}");
            None
        }
    }
}
