//! Character decoding of response bodies.
//!
//! The charset is taken from the response's declared content encoding. Unknown
//! or missing labels fall back to UTF-8 (so `gzip` decodes as UTF-8).

use std::io::{self, BufRead, Read};
use std::sync::Arc;

use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};

use crate::config::READER_BUFFER_SIZE;
use crate::fetch::progress::{ProgressIndicator, ProgressReader};
use crate::fetch::BodyStream;

/// Resolves a declared encoding label to a charset, defaulting to UTF-8.
pub fn charset_for(label: Option<&str>) -> &'static Encoding {
    label
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Buffered reader that decodes the response body into UTF-8 text.
///
/// Implements [`Read`] and [`BufRead`], so `read_line`, `lines` and
/// `read_to_string` all yield valid UTF-8 whatever the source charset.
/// Malformed input is replaced with U+FFFD.
pub struct ResponseReader {
    inner: ProgressReader<BodyStream>,
    encoding: &'static Encoding,
    decoder: Decoder,
    raw: Vec<u8>,
    decoded: String,
    pos: usize,
    finished: bool,
}

impl ResponseReader {
    pub(crate) fn new(inner: BodyStream, encoding: &'static Encoding) -> Self {
        Self::with_progress(inner, encoding, None, 0)
    }

    /// Reader whose raw reads check `indicator` and report progress against `total`.
    pub(crate) fn with_progress(
        inner: BodyStream,
        encoding: &'static Encoding,
        indicator: Option<Arc<dyn ProgressIndicator>>,
        total: u64,
    ) -> Self {
        Self {
            inner: ProgressReader::new(indicator, inner, total),
            encoding,
            decoder: encoding.new_decoder_without_bom_handling(),
            raw: vec![0; READER_BUFFER_SIZE],
            decoded: String::new(),
            pos: 0,
            finished: false,
        }
    }

    /// Charset the body is decoded with.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// The byte stream being decoded.
    ///
    /// Bytes already pulled into the decode buffer are not seen again here.
    pub fn get_mut(&mut self) -> &mut BodyStream {
        self.inner.get_mut()
    }

    fn decode_chunk(&mut self, len: usize, last: bool) {
        let mut consumed = 0;
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(len - consumed)
                .unwrap_or(READER_BUFFER_SIZE * 4);
            self.decoded.reserve(needed);
            let (result, read, _had_errors) =
                self.decoder
                    .decode_to_string(&self.raw[consumed..len], &mut self.decoded, last);
            consumed += read;
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }
}

impl Read for ResponseReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.consume(count);
        Ok(count)
    }
}

impl BufRead for ResponseReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.pos >= self.decoded.len() && !self.finished {
            self.decoded.clear();
            self.pos = 0;
            let len = self.inner.read(&mut self.raw)?;
            let last = len == 0;
            self.decode_chunk(len, last);
            self.finished = last;
        }
        Ok(&self.decoded.as_bytes()[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.decoded.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader_over(bytes: Vec<u8>, encoding: &'static Encoding) -> ResponseReader {
        ResponseReader::new(Box::new(Cursor::new(bytes)), encoding)
    }

    #[test]
    fn test_charset_fallbacks() {
        assert_eq!(charset_for(None), UTF_8);
        assert_eq!(charset_for(Some("gzip")), UTF_8);
        assert_eq!(charset_for(Some("")), UTF_8);
        assert_eq!(charset_for(Some("ISO-8859-1")).name(), "windows-1252");
        assert_eq!(charset_for(Some(" utf-16le ")).name(), "UTF-16LE");
    }

    #[test]
    fn test_reader_decodes_utf8_lines() {
        let reader = reader_over("first\nsecond ✓\n".as_bytes().to_vec(), UTF_8);
        let lines: Vec<String> = reader
            .lines()
            .collect::<Result<_, _>>()
            .expect("lines should decode");
        assert_eq!(lines, vec!["first".to_string(), "second ✓".to_string()]);
    }

    #[test]
    fn test_reader_decodes_latin1() {
        let encoding = charset_for(Some("latin1"));
        let mut reader = reader_over(vec![0x63, 0x61, 0x66, 0xE9], encoding);
        let mut text = String::new();
        reader.read_to_string(&mut text).expect("decode");
        assert_eq!(text, "café");
        assert_eq!(reader.encoding().name(), "windows-1252");
    }

    #[test]
    fn test_reader_handles_split_multibyte_sequences() {
        // A multi-byte character straddling the raw buffer boundary
        let mut bytes = vec![b'a'; READER_BUFFER_SIZE - 1];
        bytes.extend_from_slice("é".as_bytes());
        bytes.push(b'z');
        let mut reader = reader_over(bytes, UTF_8);
        let mut text = String::new();
        reader.read_to_string(&mut text).expect("decode");
        assert_eq!(text.chars().count(), READER_BUFFER_SIZE + 1);
        assert!(text.ends_with("éz"));
    }

    #[test]
    fn test_reader_replaces_malformed_input() {
        let mut reader = reader_over(vec![b'o', b'k', 0xFF], UTF_8);
        let mut text = String::new();
        reader.read_to_string(&mut text).expect("decode");
        assert_eq!(text, "ok\u{FFFD}");
    }

    #[test]
    fn test_reader_empty_body() {
        let mut reader = reader_over(Vec::new(), UTF_8);
        let mut text = String::new();
        assert_eq!(reader.read_to_string(&mut text).expect("decode"), 0);
        assert!(text.is_empty());
    }
}
