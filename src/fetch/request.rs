//! The per-connection request handed to processors.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;
use log::{trace, warn};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use crate::config::{
    DEFAULT_BYTES_CAPACITY, DEFAULT_STRING_CAPACITY, GZIP_ENCODING, MAX_PREALLOCATION,
};
use crate::error_handling::RequestError;
use crate::fetch::charset::{charset_for, ResponseReader};
use crate::fetch::connection::Connection;
use crate::fetch::progress::{copy_stream_content, ProgressIndicator};
use crate::fetch::redirects::open_connection;
use crate::fetch::scope::ScopeGuard;
use crate::fetch::{BodyStream, RequestConfig};

/// A single request lifecycle.
///
/// The connection, the byte stream and the character reader are all created
/// on first access and reused afterwards. Everything is released when the
/// processing callback returns (or when the request is dropped).
pub struct Request<'a> {
    config: &'a RequestConfig,
    connection: Option<Connection>,
    input: Option<BodyStream>,
    reader: Option<ResponseReader>,
    cleaned_up: bool,
}

impl<'a> Request<'a> {
    pub(crate) fn new(config: &'a RequestConfig) -> Self {
        Self {
            config,
            connection: None,
            input: None,
            reader: None,
            cleaned_up: false,
        }
    }

    /// Configuration this request was built from.
    pub fn config(&self) -> &RequestConfig {
        self.config
    }

    /// URL as configured on the builder.
    pub fn url(&self) -> &str {
        self.config.url()
    }

    /// Live connection, opened (following redirects) on first call.
    pub fn connection(&mut self) -> Result<&Connection, RequestError> {
        self.connection_mut().map(|connection| &*connection)
    }

    fn connection_mut(&mut self) -> Result<&mut Connection, RequestError> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => {
                let _scope = ScopeGuard::enter(self.config.resolve_scope.as_deref());
                open_connection(self.config)?
            }
        };
        Ok(self.connection.insert(connection))
    }

    /// Response body as bytes, gunzipped when gzip was negotiated.
    ///
    /// Every call returns the same stream. Once [`reader`](Self::reader) has
    /// been created the stream lives inside it and is reached through
    /// [`ResponseReader::get_mut`].
    pub fn input_stream(&mut self) -> Result<&mut BodyStream, RequestError> {
        if let Some(reader) = self.reader.take() {
            return Ok(self.reader.insert(reader).get_mut());
        }
        let stream = match self.input.take() {
            Some(stream) => stream,
            None => self.open_input()?,
        };
        Ok(self.input.insert(stream))
    }

    fn open_input(&mut self) -> Result<BodyStream, RequestError> {
        let gzip = self.config.gzip;
        let connection = self.connection_mut()?;
        let decompress = decodes_gzip(gzip, connection);
        let body = connection.take_body()?;
        Ok(if decompress {
            Box::new(GzDecoder::new(body))
        } else {
            body
        })
    }

    /// Character reader over the body, decoding with the declared charset.
    ///
    /// With a progress signal and a known positive length, every read checks
    /// for cancellation and reports the fraction consumed.
    pub fn reader(
        &mut self,
        progress: Option<Arc<dyn ProgressIndicator>>,
    ) -> Result<&mut ResponseReader, RequestError> {
        let reader = match self.reader.take() {
            Some(reader) => reader,
            None => self.open_reader(progress)?,
        };
        Ok(self.reader.insert(reader))
    }

    fn open_reader(
        &mut self,
        progress: Option<Arc<dyn ProgressIndicator>>,
    ) -> Result<ResponseReader, RequestError> {
        let connection = self.connection_mut()?;
        let charset = charset_for(connection.content_encoding());
        let length = connection.content_length().filter(|&length| length > 0);

        let stream = match self.input.take() {
            Some(stream) => stream,
            None => self.open_input()?,
        };
        Ok(match (progress, length) {
            (Some(indicator), Some(total)) => {
                ResponseReader::with_progress(stream, charset, Some(indicator), total)
            }
            _ => ResponseReader::new(stream, charset),
        })
    }

    /// `true` for a `200` response and for transports without a status.
    pub fn is_successful(&mut self) -> Result<bool, RequestError> {
        Ok(self
            .connection()?
            .status()
            .map_or(true, |status| status == StatusCode::OK))
    }

    /// Reads the remaining body into memory.
    pub fn read_bytes(
        &mut self,
        progress: Option<&dyn ProgressIndicator>,
    ) -> Result<Vec<u8>, RequestError> {
        let declared = self.connection()?.content_length();
        let expected = self.expected_length()?;
        let mut buffer = Vec::with_capacity(initial_capacity(declared, DEFAULT_BYTES_CAPACITY));
        copy_stream_content(progress, self.input_stream()?, &mut buffer, expected)?;
        Ok(buffer)
    }

    /// Reads the remaining body as text.
    ///
    /// The charset is looked up from the declared content encoding, falling
    /// back to UTF-8; malformed input becomes U+FFFD.
    pub fn read_string(
        &mut self,
        progress: Option<&dyn ProgressIndicator>,
    ) -> Result<String, RequestError> {
        let connection = self.connection()?;
        let charset = charset_for(connection.content_encoding());
        let declared = connection.content_length();
        let expected = self.expected_length()?;

        let mut buffer = Vec::with_capacity(initial_capacity(declared, DEFAULT_STRING_CAPACITY));
        copy_stream_content(progress, self.input_stream()?, &mut buffer, expected)?;
        let (text, _had_errors) = charset.decode_without_bom_handling(&buffer);
        Ok(text.into_owned())
    }

    /// Streams the body into `path`, creating parent directories as needed.
    ///
    /// A partially written file is removed on any failure. I/O failures are
    /// reported as `RequestError::Download` with the URL, headers and status
    /// line; cancellation stays `RequestError::Canceled`.
    pub fn save_to_file(
        &mut self,
        path: &Path,
        progress: Option<&dyn ProgressIndicator>,
    ) -> Result<PathBuf, RequestError> {
        if let Some(progress) = progress {
            progress.check_canceled()?;
        }
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        let result = self.write_body(&mut file, progress);
        drop(file);

        match result {
            Ok(()) => Ok(path.to_path_buf()),
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(path) {
                    if remove_err.kind() != io::ErrorKind::NotFound {
                        warn!(
                            "Failed to remove partial download {}: {remove_err}",
                            path.display()
                        );
                    }
                }
                Err(match e {
                    RequestError::Io(source) if self.connection.is_some() => {
                        RequestError::Download {
                            message: create_error_message(&source, self),
                            source,
                        }
                    }
                    other => other,
                })
            }
        }
    }

    fn write_body(
        &mut self,
        file: &mut File,
        progress: Option<&dyn ProgressIndicator>,
    ) -> Result<(), RequestError> {
        let expected = self.expected_length()?;
        copy_stream_content(progress, self.input_stream()?, file, expected)?;
        file.flush()?;
        Ok(())
    }

    /// Length the body must reach, when it can be checked.
    ///
    /// Gunzipped bodies and `HEAD` responses have no comparable length.
    fn expected_length(&mut self) -> Result<Option<u64>, RequestError> {
        let gzip = self.config.gzip;
        let head = self.config.method() == Method::HEAD;
        let connection = self.connection()?;
        if head || decodes_gzip(gzip, connection) {
            return Ok(None);
        }
        Ok(connection.content_length())
    }

    /// Releases the reader, the stream and the transport. Runs once.
    pub(crate) fn cleanup(&mut self) {
        if std::mem::replace(&mut self.cleaned_up, true) {
            return;
        }
        let url = self.config.url();
        if self.reader.take().is_some() {
            trace!("Closed response reader for {url}");
        }
        if self.input.take().is_some() {
            trace!("Closed response stream for {url}");
        }
        if let Some(connection) = self.connection.as_mut() {
            connection.disconnect();
            trace!("Disconnected from {}", connection.url());
        }
    }
}

impl Drop for Request<'_> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Builds a download failure message carrying the URL, the error and the
/// response headers, plus the status line for HTTP responses.
///
/// The URL is the one the connection finally reached (after redirects), or
/// the configured URL when no connection was opened.
pub fn create_error_message(error: &dyn Display, request: &Request<'_>) -> String {
    let Some(connection) = &request.connection else {
        return format!("Cannot download '{}': {error}", request.url());
    };
    let mut message = format!(
        "Cannot download '{}': {error}\n, headers: {}",
        connection.url(),
        format_headers(connection.headers())
    );
    if let Connection::Http(http) = connection {
        message.push_str(&format!(
            "\n, response: {} {}",
            http.status().as_u16(),
            http.reason()
        ));
    }
    message
}

fn format_headers(headers: &HeaderMap) -> String {
    let fields: Vec<String> = headers
        .keys()
        .map(|name| {
            let values: Vec<&str> = headers
                .get_all(name)
                .iter()
                .map(|value| value.to_str().unwrap_or("<binary>"))
                .collect();
            format!("{name}=[{}]", values.join(", "))
        })
        .collect();
    format!("{{{}}}", fields.join(", "))
}

fn decodes_gzip(gzip: bool, connection: &Connection) -> bool {
    gzip && connection
        .content_encoding()
        .is_some_and(|encoding| encoding.trim().eq_ignore_ascii_case(GZIP_ENCODING))
}

fn initial_capacity(declared: Option<u64>, default: usize) -> usize {
    declared
        .filter(|&length| length > 0)
        .and_then(|length| usize::try_from(length.min(MAX_PREALLOCATION)).ok())
        .unwrap_or(default)
}
