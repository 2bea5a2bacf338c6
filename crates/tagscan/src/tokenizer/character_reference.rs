use crate::entities::EntityTable;
use crate::error::{ParseError, SyntaxError};
use crate::sink::Sink;

use super::engine::Tokenizer;

/// Where a reference is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EscapeContext {
    /// Document text. Errors flush the text that precedes the reference.
    Text,
    /// Inside an attribute value. The tag's raw text stays buffered, and end
    /// of input is left to the enclosing tag to report.
    AttributeValue,
}

impl Tokenizer {
    /// Resolve a reference. The current character is the `&`.
    ///
    /// On success the resolved text is appended to `buffer` in place of the
    /// raw reference. Returns the first character not consumed.
    pub(super) fn parse_escape(
        &mut self,
        sink: &mut dyn Sink,
        context: EscapeContext,
    ) -> Result<Option<char>, ParseError> {
        let offset = self.buffer.len();
        self.buffer.add('&');
        let c = self.read()?;
        match c {
            None => {
                self.escape_at_eof(sink, offset, context);
                Ok(None)
            }
            Some('#') => {
                self.buffer.add('#');
                self.parse_numeric_reference(sink, offset, context)
            }
            Some(ch) if ch.is_alphabetic() => self.parse_named_reference(sink, offset, context, ch),
            Some(_) => {
                self.escape_error(sink, offset, context, SyntaxError::ExpectingLetter);
                Ok(c)
            }
        }
    }

    // =========================================================================
    // Numeric references
    // =========================================================================

    /// `&#` has been consumed.
    fn parse_numeric_reference(
        &mut self,
        sink: &mut dyn Sink,
        offset: usize,
        context: EscapeContext,
    ) -> Result<Option<char>, ParseError> {
        let mut value: u32 = 0;
        let mut digits = 0usize;
        loop {
            let c = self.read()?;
            match c {
                None => {
                    self.escape_at_eof(sink, offset, context);
                    return Ok(None);
                }
                Some(d) if d.is_ascii_digit() => {
                    self.buffer.add(d);
                    value = value
                        .saturating_mul(10)
                        .saturating_add(d.to_digit(10).unwrap_or(0));
                    digits += 1;
                }
                Some(';') if digits > 0 => {
                    self.resolve_numeric(offset, value);
                    return self.read();
                }
                Some(';') => {
                    self.buffer.add(';');
                    self.escape_error(sink, offset, context, SyntaxError::ExpectingDigit);
                    return self.read();
                }
                Some(_) if digits > 0 => {
                    self.resolve_numeric(offset, value);
                    return Ok(c);
                }
                Some(_) => {
                    self.escape_error(sink, offset, context, SyntaxError::ExpectingDigit);
                    return Ok(c);
                }
            }
        }
    }

    /// Replace `buffer[offset..]` with the character for `value`.
    ///
    /// NUL, surrogates and values past U+10FFFF become U+FFFD.
    fn resolve_numeric(&mut self, offset: usize, value: u32) {
        let resolved = char::from_u32(value)
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.buffer.reset(offset);
        self.buffer.add(resolved);
    }

    // =========================================================================
    // Named references
    // =========================================================================

    /// `&` has been consumed and `first` is a letter.
    ///
    /// Letters are matched one at a time and the table is consulted after
    /// each; the first hit wins, so `&ltx` resolves to `<x`. A `;` directly
    /// after a resolved name is consumed.
    fn parse_named_reference(
        &mut self,
        sink: &mut dyn Sink,
        offset: usize,
        context: EscapeContext,
        first: char,
    ) -> Result<Option<char>, ParseError> {
        self.escape_buffer.clear();
        let mut c = Some(first);
        let terminator = loop {
            let Some(ch) = c else {
                self.escape_at_eof(sink, offset, context);
                return Ok(None);
            };
            if !ch.is_alphabetic() {
                break ch;
            }
            self.buffer.add(ch);
            self.escape_buffer.add(ch);

            let table = self.entities.get_or_insert_with(EntityTable::new);
            if let Some(resolved) = table.lookup(self.escape_buffer.as_str()) {
                self.buffer.reset(offset);
                self.buffer.add(resolved);
                let next = self.read()?;
                return if next == Some(';') { self.read() } else { Ok(next) };
            }
            c = self.read()?;
        };

        // Not an entity. Ask the sink; without an answer the reference
        // vanishes.
        self.buffer.reset(offset);
        let name = self.escape_buffer.as_str();
        match sink.document_attribute(name) {
            Some(replacement) => self.buffer.push_str(&replacement),
            None => tracing::debug!(name, "unresolved reference dropped"),
        }
        if terminator == ';' {
            self.read()
        } else {
            Ok(Some(terminator))
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// Report `buffer[offset..]` (the raw reference) as `error` and remove it.
    fn escape_error(
        &mut self,
        sink: &mut dyn Sink,
        offset: usize,
        context: EscapeContext,
        error: SyntaxError,
    ) {
        match context {
            EscapeContext::Text => self.generate_error(sink, offset, error),
            EscapeContext::AttributeValue => {
                let text = self.buffer.extract(offset);
                self.buffer.reset(offset);
                Self::report(sink, &text, error);
            }
        }
    }

    /// End of input inside a reference.
    fn escape_at_eof(&mut self, sink: &mut dyn Sink, offset: usize, context: EscapeContext) {
        if context == EscapeContext::Text {
            self.generate_error(sink, offset, SyntaxError::UnexpectedEof);
        }
    }
}
