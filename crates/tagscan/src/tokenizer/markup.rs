use crate::attributes::{AttributeMap, IMPLIED_VALUE};
use crate::error::{ParseError, SyntaxError};
use crate::sink::Sink;

use super::character_reference::EscapeContext;
use super::engine::Tokenizer;

/// Which construct an attribute value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueMode {
    /// A start or end tag, closed by `>`.
    Tag,
    /// The XML declaration, closed by `?>`.
    Declaration,
}

impl ValueMode {
    const fn close(self) -> char {
        match self {
            Self::Tag => '>',
            Self::Declaration => '?',
        }
    }

    const fn ends_unquoted(self, c: char) -> bool {
        matches!(c, '"' | ' ' | '\t' | '\r' | '\n') || c == self.close()
    }
}

/// A scanned attribute value and the character after it.
type ScannedValue = Option<(String, Option<char>)>;

impl Tokenizer {
    /// Dispatch on the character after `<`.
    ///
    /// Any pending text has already been flushed. Returns the first
    /// character after the construct.
    pub(super) fn parse_tag(&mut self, sink: &mut dyn Sink) -> Result<Option<char>, ParseError> {
        self.buffer.clear();
        self.buffer.add('<');
        let c = self.read()?;
        match c {
            Some('!') => {
                self.buffer.add('!');
                self.parse_comment_or_doctype(sink)
            }
            Some('?') => {
                self.buffer.add('?');
                self.parse_processing_instruction(sink)
            }
            _ => self.parse_tag_body(sink, c),
        }
    }

    // =========================================================================
    // Tags
    // =========================================================================

    fn parse_tag_body(
        &mut self,
        sink: &mut dyn Sink,
        c: Option<char>,
    ) -> Result<Option<char>, ParseError> {
        let mut c = self.skip_white(c)?;
        let mut end_tag = false;
        if c == Some('/') {
            self.buffer.add('/');
            end_tag = true;
            let next = self.read()?;
            c = self.skip_white(next)?;
        }
        if c.is_none() {
            self.eof_error(sink);
            return Ok(None);
        }

        let offset = self.buffer.len();
        c = self.scan_identifier(c)?;
        if self.buffer.len() == offset {
            // A second `<` starts the next construct; keep it.
            if c == Some('<') {
                self.generate_error(sink, 0, SyntaxError::ExpectingTagName);
                return Ok(c);
            }
            return self.skip_to_close_angle(sink, c, SyntaxError::ExpectingTagName);
        }
        let name = self.buffer.extract(offset);

        self.attributes.clear();
        let mut empty_tag = false;
        loop {
            c = self.skip_white(c)?;
            match c {
                None => {
                    self.eof_error(sink);
                    return Ok(None);
                }
                Some('>') => break,
                Some('/') => {
                    self.buffer.add('/');
                    c = self.read()?;
                    if c != Some('>') {
                        return self.skip_to_close_angle(
                            sink,
                            c,
                            SyntaxError::ExpectingEmptyTagClose,
                        );
                    }
                    end_tag = true;
                    empty_tag = true;
                    break;
                }
                // Implicit close: the `<` starts the next construct.
                Some('<') => {
                    sink.tag(&name, &self.attributes, end_tag, false);
                    self.buffer.clear();
                    return Ok(c);
                }
                Some(_) => {
                    let offset = self.buffer.len();
                    c = self.scan_identifier(c)?;
                    if self.buffer.len() == offset {
                        return self.skip_to_close_angle(sink, c, SyntaxError::ExpectingAttribute);
                    }
                    let attribute = self.buffer.extract(offset);
                    let Some((value, next)) = self.parse_attribute_value(sink, c, ValueMode::Tag)?
                    else {
                        self.eof_error(sink);
                        return Ok(None);
                    };
                    self.attributes.put(attribute, value);
                    c = next;
                }
            }
        }

        sink.tag(&name, &self.attributes, end_tag, empty_tag);
        self.buffer.clear();
        self.read()
    }

    /// Scan `= value` after an attribute name, or supply the implied value.
    ///
    /// Returns `None` if input ends inside the value.
    fn parse_attribute_value(
        &mut self,
        sink: &mut dyn Sink,
        c: Option<char>,
        mode: ValueMode,
    ) -> Result<ScannedValue, ParseError> {
        let c = self.skip_white(c)?;
        if c != Some('=') {
            return Ok(Some((IMPLIED_VALUE.to_owned(), c)));
        }
        self.buffer.add('=');
        let next = self.read()?;
        let c = self.skip_white(next)?;
        match c {
            None => Ok(None),
            Some(ch) if ch == '<' || ch == mode.close() => Ok(Some((String::new(), c))),
            Some(quote @ ('"' | '\'')) => self.scan_quoted_value(sink, quote),
            Some(_) => self.scan_unquoted_value(sink, c, mode),
        }
    }

    /// The current character is the opening quote. References are resolved
    /// in place; a `>` ends the value early and is left unconsumed.
    fn scan_quoted_value(
        &mut self,
        sink: &mut dyn Sink,
        quote: char,
    ) -> Result<ScannedValue, ParseError> {
        self.buffer.add(quote);
        let offset = self.buffer.len();
        let mut c = self.read()?;
        loop {
            match c {
                None => return Ok(None),
                Some(ch) if ch == quote => {
                    let value = self.buffer.extract(offset);
                    self.buffer.add(ch);
                    return Ok(Some((value, self.read()?)));
                }
                Some('>') => return Ok(Some((self.buffer.extract(offset), c))),
                Some('&') => c = self.parse_escape(sink, EscapeContext::AttributeValue)?,
                Some(ch) => {
                    self.buffer.add(ch);
                    c = self.read()?;
                }
            }
        }
    }

    fn scan_unquoted_value(
        &mut self,
        sink: &mut dyn Sink,
        mut c: Option<char>,
        mode: ValueMode,
    ) -> Result<ScannedValue, ParseError> {
        let offset = self.buffer.len();
        loop {
            match c {
                None => return Ok(None),
                Some(ch) if mode.ends_unquoted(ch) => break,
                Some('&') => c = self.parse_escape(sink, EscapeContext::AttributeValue)?,
                Some(ch) => {
                    self.buffer.add(ch);
                    c = self.read()?;
                }
            }
        }
        Ok(Some((self.buffer.extract(offset), c)))
    }

    // =========================================================================
    // Comments and DOCTYPE
    // =========================================================================

    /// `<!` has been consumed.
    fn parse_comment_or_doctype(
        &mut self,
        sink: &mut dyn Sink,
    ) -> Result<Option<char>, ParseError> {
        let c = self.read()?;
        if c != Some('-') {
            return self.parse_shorthand_or_doctype(sink, c);
        }
        self.buffer.add('-');
        let c = self.read()?;
        if c != Some('-') {
            return self.parse_shorthand_comment(sink, c);
        }
        self.buffer.add('-');
        self.parse_dashed_comment(sink)
    }

    /// `<!--` has been consumed. The comment ends at the first `>` preceded
    /// by two or more dashes.
    fn parse_dashed_comment(&mut self, sink: &mut dyn Sink) -> Result<Option<char>, ParseError> {
        loop {
            let mut c = self.read()?;
            let mut dashes = 0usize;
            while c == Some('-') {
                self.buffer.add('-');
                dashes += 1;
                c = self.read()?;
            }
            let Some(ch) = c else {
                self.eof_error(sink);
                return Ok(None);
            };
            self.buffer.add(ch);
            if ch == '>' && dashes >= 2 {
                sink.comment(self.buffer.as_str());
                self.buffer.clear();
                return self.read();
            }
        }
    }

    /// Everything through the next `>` is one comment.
    fn parse_shorthand_comment(
        &mut self,
        sink: &mut dyn Sink,
        mut c: Option<char>,
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
        sink.comment(self.buffer.as_str());
        self.buffer.clear();
        self.read()
    }

    fn parse_shorthand_or_doctype(
        &mut self,
        sink: &mut dyn Sink,
        c: Option<char>,
    ) -> Result<Option<char>, ParseError> {
        let offset = self.buffer.len();
        let c = self.scan_identifier(c)?;
        if self.buffer.as_str().get(offset..) == Some("DOCTYPE") {
            self.parse_doctype(sink, c)
        } else {
            self.parse_shorthand_comment(sink, c)
        }
    }

    /// `<!DOCTYPE` has been consumed.
    fn parse_doctype(
        &mut self,
        sink: &mut dyn Sink,
        c: Option<char>,
    ) -> Result<Option<char>, ParseError> {
        let c = self.skip_white(c)?;
        let offset = self.buffer.len();
        let c = self.scan_identifier(c)?;
        let root = self.buffer.extract(offset);
        let c = self.skip_white(c)?;

        let offset = self.buffer.len();
        let c = self.scan_identifier(c)?;
        let keyword = self.buffer.extract(offset);
        let (public_id, system_id, c) = match keyword.as_str() {
            "SYSTEM" => {
                let (system_id, c) = self.scan_quoted_string(c)?;
                (None, system_id, c)
            }
            "PUBLIC" => match self.scan_quoted_string(c)? {
                (Some(public_id), c) => {
                    let (system_id, c) = self.scan_quoted_string(c)?;
                    (Some(public_id), system_id, c)
                }
                (None, c) => (None, None, c),
            },
            _ => (None, None, c),
        };

        if !self.skip_declaration_remainder(c)? {
            self.eof_error(sink);
            return Ok(None);
        }
        sink.doctype(&root, public_id.as_deref(), system_id.as_deref());
        self.buffer.clear();
        self.read()
    }

    /// Consume through the closing `>`, passing over a bracketed internal
    /// subset. Brackets inside quoted literals of the subset do not nest.
    /// Returns `false` if input ends first.
    fn skip_declaration_remainder(&mut self, mut c: Option<char>) -> Result<bool, ParseError> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        while let Some(ch) = c {
            self.buffer.add(ch);
            match (quote, ch) {
                (Some(open), _) if ch == open => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') if depth > 0 => quote = Some(ch),
                (None, '>') if depth == 0 => return Ok(true),
                (None, '[') => depth += 1,
                (None, ']') => depth = depth.saturating_sub(1),
                (None, _) => {}
            }
            c = self.read()?;
        }
        Ok(false)
    }

    // =========================================================================
    // Processing instructions
    // =========================================================================

    /// `<?` has been consumed.
    fn parse_processing_instruction(
        &mut self,
        sink: &mut dyn Sink,
    ) -> Result<Option<char>, ParseError> {
        let mut target = String::new();
        let mut c = self.read()?;
        while let Some(ch) = c.filter(|&ch| !Self::ends_pi_target(ch)) {
            self.buffer.add(ch);
            target.push(ch);
            c = self.read()?;
        }
        if target == "xml" {
            self.parse_xml_declaration(sink, c)
        } else {
            self.parse_pi_data(sink, &target, c)
        }
    }

    const fn ends_pi_target(c: char) -> bool {
        matches!(c, '"' | '>' | '?') || Self::is_whitespace_char(c)
    }

    /// Data runs to the first `?>`. A `?` not followed by `>` is data.
    fn parse_pi_data(
        &mut self,
        sink: &mut dyn Sink,
        target: &str,
        c: Option<char>,
    ) -> Result<Option<char>, ParseError> {
        let mut c = self.skip_white(c)?;
        let offset = self.buffer.len();
        loop {
            match c {
                None => {
                    self.eof_error(sink);
                    return Ok(None);
                }
                Some('?') => {
                    c = self.read()?;
                    if c == Some('>') {
                        sink.pi(target, &self.buffer.as_str()[offset..]);
                        self.buffer.clear();
                        return self.read();
                    }
                    self.buffer.add('?');
                }
                Some(ch) => {
                    self.buffer.add(ch);
                    c = self.read()?;
                }
            }
        }
    }

    /// `<?xml` has been consumed. Pseudo-attributes go to
    /// [`Sink::xml_declaration`] rather than [`Sink::pi`].
    fn parse_xml_declaration(
        &mut self,
        sink: &mut dyn Sink,
        mut c: Option<char>,
    ) -> Result<Option<char>, ParseError> {
        let mut attributes = AttributeMap::new();
        loop {
            c = self.skip_white(c)?;
            match c {
                None => {
                    self.eof_error(sink);
                    return Ok(None);
                }
                Some('?') => break,
                Some('>') => {
                    return self.skip_to_close_angle(
                        sink,
                        c,
                        SyntaxError::ExpectingDeclarationClose,
                    );
                }
                Some(_) => {
                    let offset = self.buffer.len();
                    c = self.scan_identifier(c)?;
                    if self.buffer.len() == offset {
                        return self.skip_to_close_angle(sink, c, SyntaxError::ExpectingAttribute);
                    }
                    let name = self.buffer.extract(offset);
                    let Some((value, next)) =
                        self.parse_attribute_value(sink, c, ValueMode::Declaration)?
                    else {
                        self.eof_error(sink);
                        return Ok(None);
                    };
                    attributes.put(name, value);
                    c = next;
                }
            }
        }

        self.buffer.add('?');
        let next = self.read()?;
        let c = self.skip_white(next)?;
        match c {
            None => {
                self.eof_error(sink);
                Ok(None)
            }
            Some('>') => {
                sink.xml_declaration(&attributes);
                self.buffer.clear();
                self.read()
            }
            Some(_) => self.skip_to_close_angle(sink, c, SyntaxError::ExpectingDeclarationClose),
        }
    }
}
