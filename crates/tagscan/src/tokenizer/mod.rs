//! The scanning engine.
//!
//! There is no flat state enum. The engine is a set of mutually recursive
//! scan procedures over a "current character" cursor: each procedure takes
//! the character it starts on and returns the first character it did not
//! consume, so a construct that ends on a character belonging to the next
//! construct (an implicit tag close on `<`, an unterminated numeric reference)
//! hands it back without any pushback buffer.

/// Entity and character reference resolution (`&...`).
mod character_reference;
/// Driver loop, input binding and the read cursor.
mod engine;
/// Identifier, whitespace and quoted-string sub-scanners plus error reporting.
mod helpers;
/// Tags, comments, DOCTYPE, processing instructions and the XML declaration.
mod markup;

pub use engine::Tokenizer;
