//! Connection resolution and redirect following.
//!
//! This module opens the connection for a request configuration, following
//! `301`/`302` redirects manually so the hop count can be bounded and every
//! hop carries the same headers.

use log::debug;
use reqwest::blocking::RequestBuilder as HttpRequestBuilder;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CACHE_CONTROL, LOCATION, PRAGMA, USER_AGENT};
use reqwest::{StatusCode, Url};

use crate::config::{GZIP_ENCODING, NO_CACHE};
use crate::error_handling::RequestError;
use crate::fetch::connection::{Connection, FileConnection, HttpConnection};
use crate::fetch::RequestConfig;
use crate::initialization::init_client;

/// Resolves `config` to a live connection.
///
/// At most `redirect_limit` connections are attempted. `200` and `304`
/// responses are accepted; `301` and `302` with a `Location` header move on to
/// the next hop; anything else fails with the status code. `file:` URLs open
/// the local file directly.
///
/// # Errors
///
/// - `RequestError::InvalidUrl` / `UnsupportedScheme` for unusable targets
/// - `RequestError::Transport` if a hop cannot be connected
/// - `RequestError::Status` for any other status
/// - `RequestError::TooManyRedirects` once the limit is exhausted
pub(crate) fn open_connection(config: &RequestConfig) -> Result<Connection, RequestError> {
    let mut current = parse_url(&config.target_url())?;

    if config.redirect_limit > 0 && current.scheme() == "file" {
        debug!("Opening local file {current}");
        return FileConnection::open(current).map(Connection::File);
    }

    let client = init_client(config)?;

    for hop in 0..config.redirect_limit {
        ensure_http_scheme(&current)?;
        debug!(
            "Connecting to {current} (attempt {}/{})",
            hop + 1,
            config.redirect_limit
        );

        let attempt = client.request(config.method(), current.clone());
        let response = apply_request_headers(attempt, config).send()?;
        let status = response.status();

        if status == StatusCode::OK || status == StatusCode::NOT_MODIFIED {
            return Ok(Connection::Http(HttpConnection::new(current, response)));
        }

        let location = if status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND {
            response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        } else {
            None
        };
        // Release this hop before following the redirect or failing
        drop(response);

        match location {
            Some(location) => {
                let next = current.join(&location).map_err(|source| RequestError::InvalidUrl {
                    url: location.clone(),
                    source,
                })?;
                debug!("Redirect {} from {current} to {next}", status.as_u16());
                current = next;
            }
            None => {
                return Err(RequestError::Status {
                    status: status.as_u16(),
                    url: current.to_string(),
                })
            }
        }
    }

    Err(RequestError::TooManyRedirects {
        limit: config.redirect_limit,
    })
}

/// Applies the configured headers plus the cache-bypass headers to one hop.
pub(crate) fn apply_request_headers(
    mut builder: HttpRequestBuilder,
    config: &RequestConfig,
) -> HttpRequestBuilder {
    if let Some(user_agent) = &config.user_agent {
        builder = builder.header(USER_AGENT, user_agent.as_str());
    }
    if config.gzip {
        builder = builder.header(ACCEPT_ENCODING, GZIP_ENCODING);
    }
    if let Some(accept) = &config.accept {
        builder = builder.header(ACCEPT, accept.as_str());
    }
    builder
        .header(CACHE_CONTROL, NO_CACHE)
        .header(PRAGMA, NO_CACHE)
}

fn parse_url(raw: &str) -> Result<Url, RequestError> {
    Url::parse(raw).map_err(|source| RequestError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

fn ensure_http_scheme(url: &Url) -> Result<(), RequestError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(RequestError::UnsupportedScheme {
            scheme: scheme.to_string(),
            url: url.to_string(),
        }),
    }
}
