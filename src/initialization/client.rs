//! HTTP client initialization.
//!
//! Builds the blocking `reqwest` client that backs a single request. Redirects
//! are disabled so the connector can follow them itself and enforce its own
//! limit.

use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};

use crate::error_handling::RequestError;
use crate::fetch::RequestConfig;

/// Initializes the HTTP client for one request.
///
/// Creates a `reqwest::blocking::Client` configured with:
/// - Redirect following disabled (handled by the connector)
/// - Connect timeout and per-read timeout from the configuration
///   (`Duration::ZERO` means no timeout)
/// - A custom TLS configuration when a hostname verifier is set
///
/// # Errors
///
/// Returns `RequestError::Tls` if the TLS configuration cannot be built, or
/// `RequestError::Transport` if client creation fails.
pub(crate) fn init_client(config: &RequestConfig) -> Result<Client, RequestError> {
    let mut builder = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(non_zero(config.connect_timeout))
        .timeout(non_zero(config.read_timeout));

    if let Some(verifier) = &config.hostname_verifier {
        let tls = crate::tls::client_config_with_hostname_verifier(verifier.clone())?;
        builder = builder.use_preconfigured_tls(tls);
    }

    Ok(builder.build()?)
}

fn non_zero(timeout: Duration) -> Option<Duration> {
    (!timeout.is_zero()).then_some(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeout_disables_timeout() {
        assert_eq!(non_zero(Duration::ZERO), None);
        assert_eq!(
            non_zero(Duration::from_millis(1500)),
            Some(Duration::from_millis(1500))
        );
    }
}
