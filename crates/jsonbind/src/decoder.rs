//! The reusable, schema-linked decoder.

use std::{fmt, io::Read, sync::Arc};

use crate::{
    bind::Bindable,
    error::{StreamError, TypeError},
    lexer::Lexer,
    link::{DecodeNode, decode_node},
};

/// The outcome of a successful decode.
#[derive(Debug)]
pub struct Decoded<T> {
    /// The populated value.
    pub value: T,
    /// Conversion failures encountered along the way. Each affected slot
    /// holds its type's default value.
    pub errors: Vec<TypeError>,
}

/// A linked decoder for `T`.
///
/// Created by [`Schema::decoder`](crate::Schema::decoder). The underlying
/// binding graph is immutable, so a decoder can be reused and shared across
/// threads freely.
pub struct Decoder<T: Bindable> {
    root: Arc<DecodeNode<T>>,
}

// The node graph holds type-erased closures, so Debug is hand-rolled.
impl<T: Bindable> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder").finish_non_exhaustive()
    }
}

impl<T: Bindable> Decoder<T> {
    pub(crate) fn new(root: Arc<DecodeNode<T>>) -> Self {
        Self { root }
    }

    /// Reads one JSON value from `input` and populates a fresh `T`.
    ///
    /// Exactly one top-level value is read; trailing content is neither
    /// consumed as JSON nor validated. Malformed JSON or an I/O failure
    /// aborts with a [`StreamError`] carrying the byte offset; conversion
    /// failures are collected in [`Decoded::errors`] instead.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`] if the input is not well-formed JSON text
    /// or the reader fails.
    pub fn decode(&self, mut input: impl Read) -> Result<Decoded<T>, StreamError> {
        let mut lexer = Lexer::new(&mut input);
        let mut errors = Vec::new();
        let value = decode_node(&self.root, &mut lexer, &mut errors)?;
        Ok(Decoded { value, errors })
    }
}
