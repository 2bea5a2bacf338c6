//! Integration tests for input binding, decoding and the source cache.

use std::io::{self, Cursor, Read};

use tagscan::{
    AttributeMap, CharRead, CharSource, DecodingReader, Event, EventCollector, Fill, ParseError,
    ReadError, StrReader, Tokenizer, TokenizerConfig,
};

fn collect(tokenizer: &mut Tokenizer) -> Vec<Event> {
    let mut sink = EventCollector::new();
    tokenizer.parse(&mut sink).unwrap();
    sink.into_events()
}

fn text(s: &str) -> Event {
    Event::Text(s.to_owned())
}

fn start_tag(name: &str) -> Event {
    Event::Tag {
        name: name.to_owned(),
        attributes: AttributeMap::new(),
        end_tag: false,
        empty_tag: false,
    }
}

// =============================================================================
// Source cache
// =============================================================================

#[test]
fn test_document_source_absent_by_default() {
    let mut tokenizer = Tokenizer::from_text("<a>b");
    let _ = collect(&mut tokenizer);
    assert!(!tokenizer.should_cache_source());
    assert_eq!(tokenizer.document_source(), None);
}

#[test]
fn test_document_source_is_verbatim() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default().with_cache_source(true));
    tokenizer.set_input_str("<a x='&amp;'>\r\nb");
    let _ = collect(&mut tokenizer);
    assert_eq!(
        tokenizer.document_source().as_deref(),
        Some("<a x='&amp;'>\r\nb")
    );
}

#[test]
fn test_document_source_covers_latest_parse() {
    let mut tokenizer = Tokenizer::from_text("first");
    tokenizer.set_should_cache_source(true);
    assert!(tokenizer.should_cache_source());
    let _ = collect(&mut tokenizer);
    assert_eq!(tokenizer.document_source().as_deref(), Some("first"));

    tokenizer.set_input_str("second");
    let _ = collect(&mut tokenizer);
    assert_eq!(tokenizer.document_source().as_deref(), Some("second"));

    tokenizer.set_should_cache_source(false);
    assert_eq!(tokenizer.document_source(), None);
}

#[test]
fn test_tiny_read_window() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default().with_read_buffer_size(1));
    tokenizer.set_input_str("ab<c>d");
    assert_eq!(
        collect(&mut tokenizer),
        vec![text("ab"), start_tag("c"), text("d")]
    );
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn test_latin1_input() {
    let bytes = vec![b'c', b'a', b'f', 0xE9];
    let mut tokenizer = Tokenizer::from_reader(Cursor::new(bytes), "latin1").unwrap();
    assert_eq!(collect(&mut tokenizer), vec![text("café")]);
}

#[test]
fn test_utf16_input_with_bom() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<b>x".encode_utf16() {
        bytes.extend(unit.to_le_bytes());
    }
    let mut tokenizer = Tokenizer::from_reader(Cursor::new(bytes), "utf-16le").unwrap();
    assert_eq!(collect(&mut tokenizer), vec![start_tag("b"), text("x")]);
}

/// Hands out one byte per read.
struct Trickle {
    bytes: Vec<u8>,
    pos: usize,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.bytes.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.bytes[self.pos];
        self.pos += 1;
        Ok(1)
    }
}

#[test]
fn test_multibyte_sequence_split_across_reads() {
    let reader = Trickle {
        bytes: "é<b>ü".as_bytes().to_vec(),
        pos: 0,
    };
    let mut tokenizer = Tokenizer::from_reader(reader, "utf-8").unwrap();
    assert_eq!(
        collect(&mut tokenizer),
        vec![text("é"), start_tag("b"), text("ü")]
    );
}

#[test]
fn test_unknown_encoding_label() {
    let result = Tokenizer::from_reader(Cursor::new(Vec::new()), "klingon");
    assert!(matches!(
        result,
        Err(ParseError::UnsupportedEncoding { ref label }) if label == "klingon"
    ));
}

#[test]
fn test_failed_rebind_leaves_no_input() {
    let mut tokenizer = Tokenizer::from_text("x");
    assert!(tokenizer.has_input());
    assert!(
        tokenizer
            .set_input_bytes(Cursor::new(Vec::new()), "bogus")
            .is_err()
    );
    assert!(!tokenizer.has_input());
    assert!(collect(&mut tokenizer).is_empty());
}

#[test]
fn test_malformed_utf8_aborts_parse() {
    let mut tokenizer =
        Tokenizer::from_reader(Cursor::new(b"ok<b>\xFF".to_vec()), "utf-8").unwrap();
    let mut sink = EventCollector::new();
    let result = tokenizer.parse(&mut sink);
    assert!(matches!(
        result,
        Err(ParseError::Decode {
            encoding: "UTF-8",
            ..
        })
    ));
}

#[test]
fn test_encoding_name_is_canonical() {
    let reader = DecodingReader::new(Cursor::new(Vec::new()), "latin1").unwrap();
    assert_eq!(reader.encoding_name(), "windows-1252");
}

/// Yields its bytes once, then fails.
struct Flaky {
    sent: bool,
}

impl Read for Flaky {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::other("connection reset"));
        }
        self.sent = true;
        buf[..2].copy_from_slice(b"hi");
        Ok(2)
    }
}

#[test]
fn test_io_error_is_treated_as_end_of_input() {
    let mut tokenizer = Tokenizer::from_reader(Flaky { sent: false }, "utf-8").unwrap();
    assert_eq!(collect(&mut tokenizer), vec![text("hi")]);
}

// =============================================================================
// Custom readers
// =============================================================================

/// Produces some characters, then reports a zero-length fill.
struct Stalled {
    chunks: Vec<&'static str>,
}

impl CharRead for Stalled {
    fn read_chars(&mut self, buf: &mut [char]) -> Result<Fill, ReadError> {
        let Some(chunk) = self.chunks.pop() else {
            return Ok(Fill::Chars(0));
        };
        let mut n = 0;
        for (slot, c) in buf.iter_mut().zip(chunk.chars()) {
            *slot = c;
            n += 1;
        }
        Ok(Fill::Chars(n))
    }
}

#[test]
fn test_zero_length_read_is_end_of_input() {
    let mut tokenizer = Tokenizer::default();
    tokenizer.set_input(Stalled {
        chunks: vec!["<i>", "ab"],
    });
    assert_eq!(collect(&mut tokenizer), vec![text("ab"), start_tag("i")]);
}

#[test]
fn test_char_source_latches_end_of_input() {
    let mut source = CharSource::new(2);
    assert_eq!(source.read_char().unwrap(), None);

    source.bind(Box::new(StrReader::new("abc")));
    assert!(source.is_bound());
    assert_eq!(source.read_char().unwrap(), Some('a'));
    assert_eq!(source.read_char().unwrap(), Some('b'));
    assert_eq!(source.read_char().unwrap(), Some('c'));
    assert_eq!(source.read_char().unwrap(), None);
    assert_eq!(source.read_char().unwrap(), None);
}

#[test]
fn test_char_source_cache() {
    let mut source = CharSource::default();
    source.set_caching(true);
    source.bind(Box::new(StrReader::new("xy")));
    while source.read_char().unwrap().is_some() {}
    assert_eq!(source.cached(), Some("xy"));

    source.clear_cache();
    assert_eq!(source.cached(), Some(""));
    source.set_caching(false);
    assert_eq!(source.cached(), None);
}
