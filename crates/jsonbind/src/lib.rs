//! Data-binding JSON: reusable, schema-linked decoders and encoders.
//!
//! A [`Schema`] links a per-type binding graph once, ahead of use; the
//! resulting [`Decoder`] and [`Encoder`] then move data directly between
//! JSON byte streams and host values, with no intermediate document tree
//! for bound slots. Types opt in by implementing [`Bindable`], declaring
//! their shape through a [`Binder`]: named fields, a sequence, a
//! string-keyed map, or a registry-converted scalar.
//!
//! Malformed input fails fast with a byte-offset [`StreamError`];
//! conversion mismatches are collected as non-fatal [`TypeError`]s while
//! the affected slots fall back to their defaults.
//!
//! ```
//! use jsonbind::{Bindable, Binder, Schema};
//!
//! #[derive(Default, PartialEq, Debug)]
//! struct Greeting {
//!     text: String,
//!     count: u32,
//! }
//!
//! impl Bindable for Greeting {
//!     fn bind(binder: &mut Binder<Self>) {
//!         binder.field("text", |g: &mut Self, v| g.text = v, |g| &g.text);
//!         binder.field("count", |g: &mut Self, v| g.count = v, |g| &g.count);
//!     }
//! }
//!
//! let schema = Schema::new();
//! let decoder = schema.decoder::<Greeting>().unwrap();
//! let encoder = schema.encoder::<Greeting>().unwrap();
//!
//! let decoded = decoder
//!     .decode(&br#"{"text": "hello", "count": 2}"#[..])
//!     .unwrap();
//! assert_eq!(decoded.value, Greeting { text: "hello".into(), count: 2 });
//! assert!(decoded.errors.is_empty());
//!
//! let mut out = Vec::new();
//! encoder.encode(&decoded.value, &mut out).unwrap();
//! assert_eq!(out, br#"{"text":"hello","count":2}"#);
//! ```

mod bind;
mod convert;
mod decoder;
mod encoder;
mod error;
mod lexer;
mod link;
mod schema;
mod value;
mod writer;

#[cfg(test)]
mod tests;

pub use bind::{Bindable, Binder};
pub use convert::{Converters, DecodeFn, EncodeFn};
pub use decoder::{Decoded, Decoder};
pub use encoder::Encoder;
pub use error::{ConfigError, StreamError, StreamErrorKind, TypeError};
pub use schema::Schema;
pub use value::{Array, Object, Value};
