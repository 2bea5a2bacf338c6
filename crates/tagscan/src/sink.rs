//! The consumer contract the tokenizer drives.
//!
//! Calls arrive in strict document order. Literal text between structural
//! constructs is delivered through [`Sink::flush`] immediately before the
//! next structural call, and once more at end of input if any remains.

use std::collections::HashMap;

use serde::Serialize;

use crate::attributes::AttributeMap;
use crate::error::SyntaxError;

/// Receiver of tokenizer events.
pub trait Sink {
    /// A maximal run of literal text, with references already resolved.
    fn flush(&mut self, text: &str);

    /// A start, end, or self-closing tag.
    ///
    /// `end_tag` is set for `</name>` and for `<name/>`; `empty_tag` only for
    /// the latter.
    fn tag(&mut self, name: &str, attributes: &AttributeMap, end_tag: bool, empty_tag: bool);

    /// A comment, including its `<!` and `>` delimiters.
    fn comment(&mut self, text: &str);

    /// A processing instruction other than the XML declaration.
    fn pi(&mut self, target: &str, data: &str);

    /// A DOCTYPE declaration. The internal subset is never reported.
    fn doctype(&mut self, root: &str, public_id: Option<&str>, system_id: Option<&str>);

    /// Malformed markup. `text` is the raw offending input as far as it was
    /// scanned.
    fn error_string(&mut self, text: &str, error: SyntaxError);

    /// Template hook for a named reference missing from the entity table.
    ///
    /// The returned text is inserted verbatim; `None` drops the reference.
    fn document_attribute(&mut self, name: &str) -> Option<String> {
        let _ = name;
        None
    }

    /// Pseudo-attributes of an `<?xml ...?>` declaration.
    fn xml_declaration(&mut self, attributes: &AttributeMap) {
        let _ = attributes;
    }
}

/// Owned form of every [`Sink`] call that produces output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Event {
    /// See [`Sink::flush`].
    Text(String),
    /// See [`Sink::tag`].
    Tag {
        /// Tag name.
        name: String,
        /// Attributes, empty when none were given.
        attributes: AttributeMap,
        /// `</name>` or `<name/>`.
        end_tag: bool,
        /// `<name/>`.
        empty_tag: bool,
    },
    /// See [`Sink::comment`].
    Comment(String),
    /// See [`Sink::pi`].
    Pi {
        /// PI target.
        target: String,
        /// Everything between the target and `?>`.
        data: String,
    },
    /// See [`Sink::doctype`].
    Doctype {
        /// Root element name.
        root: String,
        /// `PUBLIC` literal, if any.
        public_id: Option<String>,
        /// `SYSTEM` literal, if any.
        system_id: Option<String>,
    },
    /// See [`Sink::error_string`].
    Error {
        /// Raw offending text.
        text: String,
        /// What went wrong.
        error: SyntaxError,
    },
}

/// A [`Sink`] that records every event.
///
/// Named references unknown to the entity table are answered from an
/// optional substitution map, which makes it usable as a minimal template
/// expander.
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    events: Vec<Event>,
    substitutions: HashMap<String, String>,
    declaration: Option<AttributeMap>,
}

impl EventCollector {
    /// Create an empty collector with no substitutions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector that expands `&name;` from `substitutions`.
    #[must_use]
    pub fn with_substitutions(substitutions: HashMap<String, String>) -> Self {
        Self {
            substitutions,
            ..Self::default()
        }
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Take the recorded events, leaving the collector empty.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Consume the collector and return its events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Pseudo-attributes of the last XML declaration seen.
    #[must_use]
    pub const fn xml_declaration_attributes(&self) -> Option<&AttributeMap> {
        self.declaration.as_ref()
    }
}

impl Sink for EventCollector {
    fn flush(&mut self, text: &str) {
        self.events.push(Event::Text(text.to_owned()));
    }

    fn tag(&mut self, name: &str, attributes: &AttributeMap, end_tag: bool, empty_tag: bool) {
        self.events.push(Event::Tag {
            name: name.to_owned(),
            attributes: attributes.clone(),
            end_tag,
            empty_tag,
        });
    }

    fn comment(&mut self, text: &str) {
        self.events.push(Event::Comment(text.to_owned()));
    }

    fn pi(&mut self, target: &str, data: &str) {
        self.events.push(Event::Pi {
            target: target.to_owned(),
            data: data.to_owned(),
        });
    }

    fn doctype(&mut self, root: &str, public_id: Option<&str>, system_id: Option<&str>) {
        self.events.push(Event::Doctype {
            root: root.to_owned(),
            public_id: public_id.map(str::to_owned),
            system_id: system_id.map(str::to_owned),
        });
    }

    fn error_string(&mut self, text: &str, error: SyntaxError) {
        self.events.push(Event::Error {
            text: text.to_owned(),
            error,
        });
    }

    fn document_attribute(&mut self, name: &str) -> Option<String> {
        self.substitutions.get(name).cloned()
    }

    fn xml_declaration(&mut self, attributes: &AttributeMap) {
        self.declaration = Some(attributes.clone());
    }
}
