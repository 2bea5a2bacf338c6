//! Error types.
//!
//! The tokenizer distinguishes two kinds of failure:
//!
//! - [`ParseError`] is fatal. It is returned from construction or from
//!   [`Tokenizer::parse`](crate::Tokenizer::parse) and aborts the current parse.
//! - [`SyntaxError`] is never fatal. It is handed to
//!   [`Sink::error_string`](crate::Sink::error_string) together with the raw
//!   offending text, and scanning resumes at the next recovery point.

use serde::Serialize;
use strum_macros::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

/// A condition that aborts tokenization.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The encoding label passed alongside raw bytes is not known.
    #[error("unsupported encoding label `{label}`")]
    UnsupportedEncoding {
        /// The label as given by the caller.
        label: String,
    },

    /// The underlying bytes are not valid in the declared encoding.
    #[error("malformed {encoding} input near byte {position}")]
    Decode {
        /// Canonical name of the encoding being decoded.
        encoding: &'static str,
        /// Byte offset (from the start of the stream) of the chunk that failed.
        position: u64,
    },
}

/// Failure reported by a [`CharRead`](crate::source::CharRead) implementation.
///
/// [`CharSource`](crate::source::CharSource) degrades `Io` to end of input and
/// escalates `Malformed` to [`ParseError::Decode`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// The underlying stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The bytes could not be decoded.
    #[error("malformed {encoding} input near byte {position}")]
    Malformed {
        /// Canonical name of the encoding being decoded.
        encoding: &'static str,
        /// Byte offset of the failure.
        position: u64,
    },
}

/// A recoverable markup error, reported through the sink.
///
/// The `Display` form is the short diagnostic message delivered alongside the
/// offending text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter, Serialize)]
pub enum SyntaxError {
    /// Input ended in the middle of a construct.
    #[strum(to_string = "unexpected end of file")]
    UnexpectedEof,
    /// An attribute name was required but none could be scanned.
    #[strum(to_string = "expecting an attribute")]
    ExpectingAttribute,
    /// A `/` inside a tag was not followed by `>`.
    #[strum(to_string = "expecting />")]
    ExpectingEmptyTagClose,
    /// The XML declaration did not end with `?>`.
    #[strum(to_string = "expecting ?>")]
    ExpectingDeclarationClose,
    /// A `<` was followed by something that is not a tag name.
    #[strum(to_string = "expecting a tag name")]
    ExpectingTagName,
    /// `&#` was not followed by at least one decimal digit.
    #[strum(to_string = "expecting a digit")]
    ExpectingDigit,
    /// `&` was followed by neither `#` nor a letter.
    #[strum(to_string = "expecting a letter")]
    ExpectingLetter,
}

impl SyntaxError {
    /// The diagnostic message as a static string.
    #[must_use]
    pub fn message(self) -> &'static str {
        self.into()
    }
}
