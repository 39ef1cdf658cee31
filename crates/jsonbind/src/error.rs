//! Error types reported by decoding, encoding, and schema linking.

use std::io;

use thiserror::Error;

/// A fatal stream error.
///
/// Raised when the input is not well-formed JSON text or when the underlying
/// reader or writer fails. A stream error aborts the current decode or
/// encode call; the stream position past `offset` is unspecified.
#[derive(Debug, Error)]
#[error("{kind} at byte {offset}")]
pub struct StreamError {
    /// Byte offset into the stream at which the error was detected.
    pub offset: u64,
    /// What went wrong.
    pub kind: StreamErrorKind,
}

impl StreamError {
    pub(crate) fn new(offset: u64, kind: impl Into<StreamErrorKind>) -> Self {
        Self {
            offset,
            kind: kind.into(),
        }
    }
}

/// The reason a [`StreamError`] was raised.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamErrorKind {
    /// A character that cannot appear at this point in JSON text.
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    /// A `\uXXXX` escape that does not form a valid scalar value, such as an
    /// unpaired surrogate.
    #[error("invalid unicode escape {0:#06x}")]
    InvalidUnicodeEscape(u32),

    /// A string literal whose bytes are not valid UTF-8.
    #[error("invalid UTF-8 in string literal")]
    InvalidUtf8,

    /// A number token that does not parse as a finite IEEE 754 double.
    #[error("invalid number literal")]
    InvalidNumber,

    /// The stream ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    /// A well-formed token in a position where the grammar requires another.
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        /// Description of the token that was read.
        found: String,
        /// Description of what the grammar required.
        expected: &'static str,
    },

    /// The underlying reader or writer failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A non-fatal conversion failure.
///
/// Reported when a parsed value cannot be converted into the target scalar
/// type, or when a registered encode conversion declines a value. The
/// affected slot receives the type's default value (decoding) or `null`
/// (encoding) and the operation continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {raw:?} to {target}")]
pub struct TypeError {
    /// Name of the host type the value was destined for.
    pub target: &'static str,
    /// Textual rendition of the offending value.
    pub raw: String,
}

impl TypeError {
    pub(crate) fn new<T>(raw: String) -> Self {
        Self {
            target: std::any::type_name::<T>(),
            raw,
        }
    }
}

/// A schema misconfiguration detected while linking a binding graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A scalar binding for which no converter is registered.
    #[error("no converter registered for {0}")]
    MissingConverter(&'static str),

    /// A type whose binding declares more than one shape.
    #[error("conflicting shape declarations for {0}")]
    ShapeConflict(&'static str),

    /// A type whose binding declares the same field name twice.
    #[error("duplicate field {1:?} on {0}")]
    DuplicateField(&'static str, String),
}
