use std::io::Read;

use crate::attributes::AttributeMap;
use crate::buffer::ScanBuffer;
use crate::config::TokenizerConfig;
use crate::entities::EntityTable;
use crate::error::ParseError;
use crate::sink::Sink;
use crate::source::{CharRead, CharSource, DecodingReader, StrReader};

use super::character_reference::EscapeContext;

/// Streaming, error-tolerant markup tokenizer.
///
/// A tokenizer owns its input binding, its scan buffers and its entity
/// table. Call [`parse`](Self::parse) to run it to end of input, driving a
/// [`Sink`]; rebind with one of the `set_input*` methods to parse another
/// document with the same buffers.
///
/// ```
/// use tagscan::{Event, EventCollector, Tokenizer};
///
/// let mut tokenizer = Tokenizer::from_text("<p class=note>caf&eacute;</p>");
/// let mut events = EventCollector::new();
/// tokenizer.parse(&mut events).unwrap();
/// assert_eq!(events.events()[1], Event::Text("café".to_owned()));
/// ```
pub struct Tokenizer {
    pub(super) source: CharSource,
    /// Raw text of the construct being scanned, or pending literal text.
    pub(super) buffer: ScanBuffer,
    /// Candidate entity name while matching `&name`.
    pub(super) escape_buffer: ScanBuffer,
    /// Built on the first named reference and kept for the tokenizer's lifetime.
    pub(super) entities: Option<EntityTable>,
    /// Attributes of the tag being scanned; cleared per tag.
    pub(super) attributes: AttributeMap,
    config: TokenizerConfig,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

impl Tokenizer {
    /// Create a tokenizer with no input. Parsing it yields no events.
    #[must_use]
    pub fn new(config: TokenizerConfig) -> Self {
        let mut source = CharSource::new(config.read_buffer_size);
        source.set_caching(config.cache_source);
        Self {
            source,
            buffer: ScanBuffer::with_capacity(config.buffer_capacity, config.growth_factor),
            escape_buffer: ScanBuffer::with_capacity(config.buffer_capacity, config.growth_factor),
            entities: None,
            attributes: AttributeMap::new(),
            config,
        }
    }

    /// Create a tokenizer over already-decoded text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut tokenizer = Self::default();
        tokenizer.set_input_str(text);
        tokenizer
    }

    /// Create a tokenizer over raw bytes in the encoding named by `label`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedEncoding`] if the label is unknown.
    pub fn from_reader<R: Read + 'static>(reader: R, label: &str) -> Result<Self, ParseError> {
        let mut tokenizer = Self::default();
        tokenizer.set_input_bytes(reader, label)?;
        Ok(tokenizer)
    }

    // =========================================================================
    // Input binding
    // =========================================================================

    /// Read from `reader` on the next parse.
    pub fn set_input(&mut self, reader: impl CharRead + 'static) {
        self.source.bind(Box::new(reader));
    }

    /// Read `text` on the next parse.
    pub fn set_input_str(&mut self, text: impl Into<String>) {
        self.set_input(StrReader::new(text));
    }

    /// Decode `reader` with the encoding named by `label` on the next parse.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedEncoding`] if the label is unknown;
    /// the tokenizer is left without input.
    pub fn set_input_bytes<R: Read + 'static>(
        &mut self,
        reader: R,
        label: &str,
    ) -> Result<(), ParseError> {
        match DecodingReader::new(reader, label) {
            Ok(decoding) => {
                self.set_input(decoding);
                Ok(())
            }
            Err(err) => {
                self.source.unbind();
                Err(err)
            }
        }
    }

    /// Drop the current input. The next parse yields no events.
    pub fn clear_input(&mut self) {
        self.source.unbind();
    }

    /// Whether an input is bound.
    #[must_use]
    pub fn has_input(&self) -> bool {
        self.source.is_bound()
    }

    // =========================================================================
    // Configuration and state
    // =========================================================================

    /// The configuration this tokenizer was built with, reflecting later
    /// changes to the cache flag.
    #[must_use]
    pub const fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Keep (or stop keeping) a verbatim copy of the consumed input.
    pub fn set_should_cache_source(&mut self, enabled: bool) {
        self.config.cache_source = enabled;
        self.source.set_caching(enabled);
    }

    /// Whether the consumed input is being cached.
    #[must_use]
    pub const fn should_cache_source(&self) -> bool {
        self.config.cache_source
    }

    /// Every character consumed by the most recent parse, or `None` when
    /// caching is off.
    #[must_use]
    pub fn document_source(&self) -> Option<String> {
        self.source.cached().map(str::to_owned)
    }

    /// The entity table, once the first named reference has built it.
    #[must_use]
    pub const fn entity_table(&self) -> Option<&EntityTable> {
        self.entities.as_ref()
    }

    // =========================================================================
    // Driver
    // =========================================================================

    /// Tokenize the bound input to the end, reporting to `sink`.
    ///
    /// Malformed markup never stops the parse; it is reported through
    /// [`Sink::error_string`] and scanning resumes at the next recovery point.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Decode`] if the input bytes are invalid in the
    /// declared encoding. Events already delivered stay delivered.
    pub fn parse(&mut self, sink: &mut dyn Sink) -> Result<(), ParseError> {
        self.begin();
        tracing::trace!("parse started");

        let mut c = self.read()?;
        while let Some(ch) = c {
            c = match ch {
                '&' => self.parse_escape(sink, EscapeContext::Text)?,
                '<' => {
                    self.buffer.flush(sink);
                    self.parse_tag(sink)?
                }
                // Line endings are normalized by dropping CR.
                '\r' => self.read()?,
                _ => {
                    self.buffer.add(ch);
                    self.read()?
                }
            };
        }
        self.buffer.flush(sink);

        tracing::trace!("parse finished");
        Ok(())
    }

    /// Deliver the bound input as preformatted text: a `PRE` start tag
    /// followed by every remaining character, unscanned.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Decode`] if the input bytes are invalid in the
    /// declared encoding.
    pub fn parse_plain_text(&mut self, sink: &mut dyn Sink) -> Result<(), ParseError> {
        self.begin();
        sink.tag("PRE", &self.attributes, false, false);
        while let Some(c) = self.read()? {
            self.buffer.add(c);
        }
        self.buffer.flush(sink);
        Ok(())
    }

    /// Next input character, or `None` at end of input.
    #[inline]
    pub(super) fn read(&mut self) -> Result<Option<char>, ParseError> {
        self.source.read_char()
    }

    fn begin(&mut self) {
        self.buffer.clear();
        self.escape_buffer.clear();
        self.attributes.clear();
        self.source.clear_cache();
    }
}
