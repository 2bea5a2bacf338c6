//! Buffered pull of decoded characters.
//!
//! [`CharRead`] is the seam to whatever produces characters. Two readers are
//! provided: [`StrReader`] for text that is already decoded, and
//! [`DecodingReader`] for raw bytes in an explicitly named encoding.
//! [`CharSource`] sits on top, refilling a fixed window and handing out one
//! character at a time.

use std::io::{ErrorKind, Read};

use encoding_rs::{DecoderResult, Encoding};

use crate::config::DEFAULT_READ_BUFFER_SIZE;
use crate::error::{ParseError, ReadError};

/// Result of one [`CharRead::read_chars`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// This many characters were written to the front of the buffer.
    Chars(usize),
    /// The stream is exhausted.
    End,
}

/// A producer of decoded characters.
pub trait CharRead {
    /// Write up to `buf.len()` characters into `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Io`] when the underlying stream fails and
    /// [`ReadError::Malformed`] when the input cannot be decoded.
    fn read_chars(&mut self, buf: &mut [char]) -> Result<Fill, ReadError>;
}

// =============================================================================
// Readers
// =============================================================================

/// Reader over an in-memory string.
#[derive(Debug, Clone)]
pub struct StrReader {
    text: String,
    pos: usize,
}

impl StrReader {
    /// Wrap `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: 0,
        }
    }
}

impl CharRead for StrReader {
    fn read_chars(&mut self, buf: &mut [char]) -> Result<Fill, ReadError> {
        if self.pos >= self.text.len() {
            return Ok(Fill::End);
        }
        let mut n = 0;
        for c in self.text[self.pos..].chars().take(buf.len()) {
            buf[n] = c;
            n += 1;
            self.pos += c.len_utf8();
        }
        Ok(Fill::Chars(n))
    }
}

/// Size of the raw byte chunk pulled from the inner reader.
const BYTE_CHUNK_SIZE: usize = 8192;

/// Reader that decodes bytes from `R` in a fixed encoding.
///
/// A leading byte order mark matching the encoding is dropped. Malformed
/// sequences are errors rather than replacement characters.
pub struct DecodingReader<R> {
    inner: R,
    encoding: &'static Encoding,
    decoder: encoding_rs::Decoder,
    bytes: Vec<u8>,
    decoded: String,
    decoded_pos: usize,
    position: u64,
    finished: bool,
}

impl<R: Read> DecodingReader<R> {
    /// Decode `inner` using the encoding named by `label` (WHATWG labels,
    /// case-insensitive, e.g. `utf-8`, `latin1`, `utf-16le`).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedEncoding`] if the label is unknown.
    pub fn new(inner: R, label: &str) -> Result<Self, ParseError> {
        let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            ParseError::UnsupportedEncoding {
                label: label.to_owned(),
            }
        })?;
        Ok(Self::with_encoding(inner, encoding))
    }

    /// Decode `inner` using `encoding`.
    #[must_use]
    pub fn with_encoding(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            decoder: encoding.new_decoder_with_bom_removal(),
            bytes: vec![0; BYTE_CHUNK_SIZE],
            decoded: String::new(),
            decoded_pos: 0,
            position: 0,
            finished: false,
        }
    }

    /// Canonical name of the encoding in use.
    #[must_use]
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    fn decode_next_chunk(&mut self) -> Result<(), ReadError> {
        let read = loop {
            match self.inner.read(&mut self.bytes) {
                Ok(read) => break read,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        };
        let last = read == 0;
        let chunk = &self.bytes[..read];
        self.decoded.clear();
        self.decoded_pos = 0;

        let mut consumed = 0;
        loop {
            let remaining = chunk.len() - consumed;
            let needed = self
                .decoder
                .max_utf8_buffer_length_without_replacement(remaining)
                .unwrap_or(remaining * 3 + 16);
            self.decoded.reserve(needed);
            let (result, used) = self.decoder.decode_to_string_without_replacement(
                &chunk[consumed..],
                &mut self.decoded,
                last,
            );
            consumed += used;
            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => {}
                DecoderResult::Malformed(..) => {
                    return Err(ReadError::Malformed {
                        encoding: self.encoding.name(),
                        position: self.position + consumed as u64,
                    });
                }
            }
        }
        self.position += read as u64;
        self.finished = last;
        Ok(())
    }
}

impl<R: Read> CharRead for DecodingReader<R> {
    fn read_chars(&mut self, buf: &mut [char]) -> Result<Fill, ReadError> {
        // Multi-byte sequences split across chunks decode to nothing until
        // their tail arrives, so keep pulling until something is produced.
        while self.decoded_pos >= self.decoded.len() {
            if self.finished {
                return Ok(Fill::End);
            }
            self.decode_next_chunk()?;
        }
        let mut n = 0;
        for c in self.decoded[self.decoded_pos..].chars().take(buf.len()) {
            buf[n] = c;
            n += 1;
            self.decoded_pos += c.len_utf8();
        }
        Ok(Fill::Chars(n))
    }
}

// =============================================================================
// Character Source
// =============================================================================

/// Refill window over a [`CharRead`], with an end-of-input latch and an
/// optional verbatim cache of everything handed out.
///
/// An unbound source behaves as an empty stream.
pub struct CharSource {
    reader: Option<Box<dyn CharRead>>,
    window: Vec<char>,
    len: usize,
    pos: usize,
    at_eof: bool,
    cache: Option<String>,
}

impl Default for CharSource {
    fn default() -> Self {
        Self::new(DEFAULT_READ_BUFFER_SIZE)
    }
}

impl CharSource {
    /// Create an unbound source with a refill window of `window_size` characters.
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        Self {
            reader: None,
            window: vec!['\0'; window_size.max(1)],
            len: 0,
            pos: 0,
            at_eof: false,
            cache: None,
        }
    }

    /// Read from `reader` from now on, dropping anything left in the window.
    pub fn bind(&mut self, reader: Box<dyn CharRead>) {
        self.reader = Some(reader);
        self.rewind();
    }

    /// Detach the current reader. Later reads report end of input.
    pub fn unbind(&mut self) {
        self.reader = None;
        self.rewind();
    }

    /// Whether a reader is attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.reader.is_some()
    }

    /// Turn the verbatim cache on (emptied) or off (discarded).
    pub fn set_caching(&mut self, enabled: bool) {
        self.cache = enabled.then(String::new);
    }

    /// Empty the cache without changing whether caching is on.
    pub fn clear_cache(&mut self) {
        if let Some(cache) = &mut self.cache {
            cache.clear();
        }
    }

    /// Everything read since the cache was last cleared, or `None` when
    /// caching is off.
    #[must_use]
    pub fn cached(&self) -> Option<&str> {
        self.cache.as_deref()
    }

    /// Next character, or `None` once the stream is exhausted.
    ///
    /// After the first `None` every later call also returns `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Decode`] if the reader reports malformed input.
    #[inline]
    pub fn read_char(&mut self) -> Result<Option<char>, ParseError> {
        if self.pos >= self.len && !self.refill()? {
            return Ok(None);
        }
        let c = self.window[self.pos];
        self.pos += 1;
        if let Some(cache) = &mut self.cache {
            cache.push(c);
        }
        Ok(Some(c))
    }

    fn rewind(&mut self) {
        self.len = 0;
        self.pos = 0;
        self.at_eof = false;
    }

    fn refill(&mut self) -> Result<bool, ParseError> {
        if self.at_eof {
            return Ok(false);
        }
        let Some(reader) = self.reader.as_mut() else {
            self.at_eof = true;
            return Ok(false);
        };
        match reader.read_chars(&mut self.window) {
            Ok(Fill::Chars(0)) => {
                tracing::warn!("reader returned no characters; treating as end of input");
                self.at_eof = true;
                Ok(false)
            }
            Ok(Fill::Chars(n)) => {
                self.len = n.min(self.window.len());
                self.pos = 0;
                Ok(true)
            }
            Ok(Fill::End) => {
                self.at_eof = true;
                Ok(false)
            }
            Err(ReadError::Io(err)) => {
                tracing::warn!(error = %err, "read failed; treating as end of input");
                self.at_eof = true;
                Ok(false)
            }
            Err(ReadError::Malformed { encoding, position }) => {
                self.at_eof = true;
                Err(ParseError::Decode { encoding, position })
            }
        }
    }
}
