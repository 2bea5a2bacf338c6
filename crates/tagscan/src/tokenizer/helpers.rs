use crate::error::{ParseError, SyntaxError};
use crate::sink::Sink;

use super::engine::Tokenizer;

impl Tokenizer {
    // =========================================================================
    // Character classes
    // =========================================================================

    /// Letters, digits, `-` and `:`.
    pub(super) fn is_identifier_char(c: char) -> bool {
        c == '-' || c == ':' || c.is_ascii_digit() || c.is_alphabetic()
    }

    pub(super) const fn is_whitespace_char(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\r' | '\n')
    }

    // =========================================================================
    // Sub-scanners
    //
    // Each takes the current character and returns the first character it
    // did not consume. Consumed characters are appended to `buffer` so an
    // error later in the construct can report the raw text.
    // =========================================================================

    /// Consume a run of identifier characters starting at `c`.
    pub(super) fn scan_identifier(
        &mut self,
        mut c: Option<char>,
    ) -> Result<Option<char>, ParseError> {
        while let Some(ch) = c.filter(|&ch| Self::is_identifier_char(ch)) {
            self.buffer.add(ch);
            c = self.read()?;
        }
        Ok(c)
    }

    /// Consume a run of whitespace starting at `c`.
    pub(super) fn skip_white(&mut self, mut c: Option<char>) -> Result<Option<char>, ParseError> {
        while let Some(ch) = c.filter(|&ch| Self::is_whitespace_char(ch)) {
            self.buffer.add(ch);
            c = self.read()?;
        }
        Ok(c)
    }

    /// Skip whitespace, then scan a `"` or `'` delimited literal.
    ///
    /// Returns the literal's contents, or `None` if no quote was found or
    /// input ended inside the literal. A `>` ends the literal early and is
    /// left unconsumed.
    pub(super) fn scan_quoted_string(
        &mut self,
        c: Option<char>,
    ) -> Result<(Option<String>, Option<char>), ParseError> {
        let c = self.skip_white(c)?;
        let Some(quote) = c.filter(|&ch| ch == '"' || ch == '\'') else {
            return Ok((None, c));
        };
        self.buffer.add(quote);
        let offset = self.buffer.len();
        loop {
            match self.read()? {
                None => return Ok((None, None)),
                Some(ch) if ch == quote => {
                    let literal = self.buffer.extract(offset);
                    self.buffer.add(ch);
                    return Ok((Some(literal), self.read()?));
                }
                Some('>') => return Ok((Some(self.buffer.extract(offset)), Some('>'))),
                Some(ch) => self.buffer.add(ch),
            }
        }
    }

    // =========================================================================
    // Error reporting
    // =========================================================================

    /// Report `buffer[offset..]` as `error`, flushing any literal text that
    /// precedes it first.
    pub(super) fn generate_error(&mut self, sink: &mut dyn Sink, offset: usize, error: SyntaxError) {
        let text = self.buffer.extract(offset);
        self.buffer.reset(offset);
        self.buffer.flush(sink);
        Self::report(sink, &text, error);
    }

    /// Report the whole construct scanned so far as truncated by end of input.
    pub(super) fn eof_error(&mut self, sink: &mut dyn Sink) {
        self.generate_error(sink, 0, SyntaxError::UnexpectedEof);
    }

    pub(super) fn report(sink: &mut dyn Sink, text: &str, error: SyntaxError) {
        tracing::debug!(%error, text, "markup error");
        sink.error_string(text, error);
    }

    /// Error recovery inside a construct: consume through the next `>` and
    /// report everything scanned as `error`, or as end of input if none
    /// comes.
    pub(super) fn skip_to_close_angle(
        &mut self,
        sink: &mut dyn Sink,
        mut c: Option<char>,
        error: SyntaxError,
    ) -> Result<Option<char>, ParseError> {
        loop {
            let Some(ch) = c else {
                self.eof_error(sink);
                return Ok(None);
            };
            self.buffer.add(ch);
            if ch == '>' {
                break;
            }
            c = self.read()?;
        }
        self.generate_error(sink, 0, error);
        self.read()
    }
}
