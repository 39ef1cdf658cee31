//! The schema: converter registrations plus output format, from which
//! linked decoders and encoders are minted.

use crate::{
    bind::Bindable,
    convert::Converters,
    decoder::Decoder,
    encoder::Encoder,
    error::ConfigError,
    link::{DecodeLinker, EncodeLinker},
    value::Value,
};

/// Configuration from which decoders and encoders are linked.
///
/// A schema owns a [`Converters`] registry and an optional indent string.
/// [`decoder`](Schema::decoder) and [`encoder`](Schema::encoder) snapshot
/// the registrations they need, so later changes to the schema never affect
/// already-linked instances.
///
/// # Examples
///
/// ```
/// use jsonbind::Schema;
///
/// let schema = Schema::new();
/// let decoder = schema.decoder::<Vec<i32>>().unwrap();
/// let decoded = decoder.decode(&b"[1, 2.9, -3]"[..]).unwrap();
/// assert_eq!(decoded.value, vec![1, 2, -3]);
/// ```
pub struct Schema {
    converters: Converters,
    indent: Option<String>,
}

impl Schema {
    /// A schema whose encoders produce compact output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            converters: Converters::default(),
            indent: None,
        }
    }

    /// A schema whose encoders indent by one `indent` per nesting level,
    /// with one member per line and a space after each name separator.
    #[must_use]
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            converters: Converters::default(),
            indent: Some(indent.into()),
        }
    }

    /// Direct access to the converter registry.
    pub fn converters_mut(&mut self) -> &mut Converters {
        &mut self.converters
    }

    /// Registers a decode conversion for `T` from JSON string content.
    ///
    /// Shorthand for a [`Converters::set_decode`] entry that accepts only
    /// string values.
    pub fn set_decoder_converter<T: 'static>(
        &mut self,
        f: impl Fn(&str) -> Option<T> + Send + Sync + 'static,
    ) {
        self.converters.set_decode::<T>(move |v| match v {
            Value::String(s) => f(s),
            _ => None,
        });
    }

    /// Registers an encode conversion for `T` producing a JSON string.
    ///
    /// A conversion that declines reports a type error and emits `null`
    /// for the slot.
    pub fn set_encoder_converter<T: 'static>(
        &mut self,
        f: impl Fn(&T) -> Option<String> + Send + Sync + 'static,
    ) {
        self.converters.set_encode::<T>(move |t| f(t).map(Value::String));
    }

    /// Links a decoder for `T` against the current registrations.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any type reachable from `T` declares a
    /// conflicting shape, a duplicate field, or a scalar with no converter.
    pub fn decoder<T: Bindable>(&self) -> Result<Decoder<T>, ConfigError> {
        let mut linker = DecodeLinker::new(&self.converters);
        Ok(Decoder::new(linker.node::<T>()?))
    }

    /// Links an encoder for `T` against the current registrations and
    /// output format.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] under the same conditions as
    /// [`decoder`](Schema::decoder).
    pub fn encoder<T: Bindable>(&self) -> Result<Encoder<T>, ConfigError> {
        let mut linker = EncodeLinker::new(&self.converters);
        Ok(Encoder::new(linker.node::<T>()?, self.indent.clone()))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}
