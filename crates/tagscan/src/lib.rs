//! Tolerant streaming tokenizer for HTML-like markup.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([`Tokenizer`])
//!   - Start, end and self-closing tags with attributes
//!   - Dashed and shorthand comments, DOCTYPE, processing instructions
//!   - The `<?xml ...?>` declaration, reported as pseudo-attributes
//!   - Numeric and Latin-1 named character references, with a sink hook
//!     for names the table does not know
//! - **Input** ([`source`])
//!   - Pre-decoded text and raw bytes in an explicitly named encoding
//!   - Optional verbatim cache of the consumed document
//!
//! Malformed markup never aborts a parse. Each problem is reported to the
//! [`Sink`] as an error event carrying the raw offending text, and scanning
//! resumes at the next recovery point.
//!
//! # Not Implemented
//!
//! - Tree construction and tag-soup fixups
//! - Encoding sniffing from `<meta>` or the XML declaration
//! - Script and style raw-text handling
//! - The HTML5 named reference table

/// Tag attributes in insertion order.
pub mod attributes;
/// Scan buffer.
pub mod buffer;
/// Tokenizer tuning.
pub mod config;
/// Named character reference table.
pub mod entities;
/// Fatal and recoverable error types.
pub mod error;
/// The event consumer trait and a collecting implementation.
pub mod sink;
/// Character input.
pub mod source;
/// The tokenizer.
pub mod tokenizer;

pub use attributes::{Attribute, AttributeMap};
pub use buffer::ScanBuffer;
pub use config::TokenizerConfig;
pub use entities::EntityTable;
pub use error::{ParseError, ReadError, SyntaxError};
pub use sink::{Event, EventCollector, Sink};
pub use source::{CharRead, CharSource, DecodingReader, Fill, StrReader};
pub use tokenizer::Tokenizer;

/// Tokenize `input` and collect every event.
///
/// ```
/// use tagscan::{Event, tokenize};
///
/// let events = tokenize("a&lt;b");
/// assert_eq!(events, vec![Event::Text("a<b".to_owned())]);
/// ```
#[must_use]
pub fn tokenize(input: &str) -> Vec<Event> {
    let mut tokenizer = Tokenizer::from_text(input);
    let mut collector = EventCollector::new();
    // Already-decoded text has no decode step to fail.
    if let Err(err) = tokenizer.parse(&mut collector) {
        tracing::error!(error = %err, "tokenizing in-memory text failed");
    }
    collector.into_events()
}
