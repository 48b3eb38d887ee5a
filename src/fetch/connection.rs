//! Live transport connections.
//!
//! A [`Connection`] is what the connector hands to a request: either an HTTP
//! response whose body has not been read yet, or an opened local file for
//! `file:` URLs. File connections have no status line.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH};
use reqwest::{StatusCode, Url};

use crate::error_handling::RequestError;
use crate::fetch::BodyStream;

/// Resolved connection owned by a single request.
#[derive(Debug)]
pub enum Connection {
    /// HTTP or HTTPS response.
    Http(HttpConnection),
    /// Local file opened through a `file:` URL.
    File(FileConnection),
}

impl Connection {
    /// URL this connection was finally opened for (after redirects).
    pub fn url(&self) -> &Url {
        match self {
            Connection::Http(http) => &http.url,
            Connection::File(file) => &file.url,
        }
    }

    /// Response headers. File connections expose `Content-Length` only.
    pub fn headers(&self) -> &HeaderMap {
        match self {
            Connection::Http(http) => &http.headers,
            Connection::File(file) => &file.headers,
        }
    }

    /// Value of a header, if present and valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// HTTP status, or `None` for transports without a status concept.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Connection::Http(http) => Some(http.status),
            Connection::File(_) => None,
        }
    }

    /// Whether this is an HTTP-family transport.
    pub fn is_http(&self) -> bool {
        matches!(self, Connection::Http(_))
    }

    /// Declared `Content-Length`, if present and parseable.
    pub fn content_length(&self) -> Option<u64> {
        self.header(CONTENT_LENGTH.as_str())
            .and_then(|v| v.trim().parse().ok())
    }

    /// Declared `Content-Encoding`, if present.
    pub fn content_encoding(&self) -> Option<&str> {
        self.header(CONTENT_ENCODING.as_str())
    }

    /// Whether the transport has been released.
    pub fn is_disconnected(&self) -> bool {
        match self {
            Connection::Http(http) => http.disconnected,
            Connection::File(file) => file.disconnected,
        }
    }

    /// Releases the transport. Any body not yet handed out is dropped.
    pub(crate) fn disconnect(&mut self) {
        match self {
            Connection::Http(http) => {
                http.body = None;
                http.disconnected = true;
            }
            Connection::File(file) => {
                file.file = None;
                file.disconnected = true;
            }
        }
    }

    /// Hands out the raw body. Can only succeed once per connection.
    pub(crate) fn take_body(&mut self) -> Result<BodyStream, RequestError> {
        let body: Option<BodyStream> = match self {
            Connection::Http(http) => http.body.take().map(|r| Box::new(r) as BodyStream),
            Connection::File(file) => file.file.take().map(|f| Box::new(f) as BodyStream),
        };
        body.ok_or_else(|| {
            RequestError::Io(io::Error::other("response body has already been taken"))
        })
    }
}

/// HTTP response with its status and headers captured up front.
#[derive(Debug)]
pub struct HttpConnection {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Response>,
    disconnected: bool,
}

impl HttpConnection {
    pub(crate) fn new(url: Url, response: Response) -> Self {
        Self {
            url,
            status: response.status(),
            headers: response.headers().clone(),
            body: Some(response),
            disconnected: false,
        }
    }

    /// Response status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase for the status, empty when unknown.
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }
}

/// Local file behind a `file:` URL.
#[derive(Debug)]
pub struct FileConnection {
    url: Url,
    path: PathBuf,
    headers: HeaderMap,
    file: Option<File>,
    disconnected: bool,
}

impl FileConnection {
    pub(crate) fn open(url: Url) -> Result<Self, RequestError> {
        let path = url.to_file_path().map_err(|_| {
            RequestError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{url}' does not name a local file"),
            ))
        })?;
        let file = File::open(&path)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(file.metadata()?.len()));
        Ok(Self {
            url,
            path,
            headers,
            file: Some(file),
            disconnected: false,
        })
    }

    /// Filesystem path of the opened file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
