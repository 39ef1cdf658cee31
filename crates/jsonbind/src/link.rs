//! Binding graph nodes and the linkers that build them.
//!
//! A node describes how one host type maps to JSON. Nodes are produced once
//! per `Schema::decoder`/`Schema::encoder` call and memoized by `TypeId`
//! within that call, so recursive types resolve to the same handle and
//! linking terminates on cyclic graphs. The memo inserts a node with an
//! unset kind before binding the type, then seals it; the unset window only
//! exists while linking runs.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use crate::{
    bind::{Bindable, Binder},
    convert::{Converters, DecodeFn, EncodeFn},
    error::{ConfigError, StreamError, TypeError},
    lexer::{Lexer, Token, parse_value},
    value::Value,
    writer::JsonWriter,
};

/// Decodes one member of a parent value: consumes the member's tokens and
/// stores the result through the parent's setter.
pub(crate) type DecodeFollow<T> =
    Arc<dyn Fn(&mut T, &mut Lexer<'_>, &mut Vec<TypeError>) -> Result<(), StreamError> + Send + Sync>;

/// Encodes one member of a parent value: projects it out through the
/// parent's getter and writes its JSON text.
pub(crate) type EncodeFollow<T> =
    Arc<dyn Fn(&T, &mut JsonWriter<'_>, &mut Vec<TypeError>) -> Result<(), StreamError> + Send + Sync>;

pub(crate) struct DecodeNode<T> {
    pub(crate) kind: OnceLock<DecodeKind<T>>,
}

pub(crate) enum DecodeKind<T> {
    Scalar(DecodeFn<T>),
    Fields(HashMap<String, DecodeFollow<T>>),
    Items(DecodeFollow<T>),
    Pairs(DecodeFollow<T>),
}

pub(crate) struct EncodeNode<T> {
    pub(crate) kind: OnceLock<EncodeKind<T>>,
}

pub(crate) enum EncodeKind<T> {
    Scalar(EncodeFn<T>),
    /// Field follows in declaration order.
    Fields(Vec<(String, EncodeFollow<T>)>),
    Items(EncodeFollow<T>),
    Pairs(EncodeFollow<T>),
}

pub(crate) struct DecodeLinker<'a> {
    converters: &'a Converters,
    memo: HashMap<TypeId, Box<dyn Any>>,
}

impl<'a> DecodeLinker<'a> {
    pub(crate) fn new(converters: &'a Converters) -> Self {
        Self {
            converters,
            memo: HashMap::new(),
        }
    }

    pub(crate) fn converters(&self) -> &Converters {
        self.converters
    }

    /// Returns the memoized node for `T`, linking it first if needed.
    pub(crate) fn node<T: Bindable>(&mut self) -> Result<Arc<DecodeNode<T>>, ConfigError> {
        if let Some(existing) = self
            .memo
            .get(&TypeId::of::<T>())
            .and_then(|n| n.downcast_ref::<Arc<DecodeNode<T>>>())
        {
            return Ok(Arc::clone(existing));
        }
        let node = Arc::new(DecodeNode {
            kind: OnceLock::new(),
        });
        self.memo
            .insert(TypeId::of::<T>(), Box::new(Arc::clone(&node)));
        let mut binder = Binder::new();
        T::bind(&mut binder);
        let kind = binder.into_decode(self)?;
        let _ = node.kind.set(kind);
        Ok(node)
    }
}

pub(crate) struct EncodeLinker<'a> {
    converters: &'a Converters,
    memo: HashMap<TypeId, Box<dyn Any>>,
}

impl<'a> EncodeLinker<'a> {
    pub(crate) fn new(converters: &'a Converters) -> Self {
        Self {
            converters,
            memo: HashMap::new(),
        }
    }

    pub(crate) fn converters(&self) -> &Converters {
        self.converters
    }

    pub(crate) fn node<T: Bindable>(&mut self) -> Result<Arc<EncodeNode<T>>, ConfigError> {
        if let Some(existing) = self
            .memo
            .get(&TypeId::of::<T>())
            .and_then(|n| n.downcast_ref::<Arc<EncodeNode<T>>>())
        {
            return Ok(Arc::clone(existing));
        }
        let node = Arc::new(EncodeNode {
            kind: OnceLock::new(),
        });
        self.memo
            .insert(TypeId::of::<T>(), Box::new(Arc::clone(&node)));
        let mut binder = Binder::new();
        T::bind(&mut binder);
        let kind = binder.into_encode(self)?;
        let _ = node.kind.set(kind);
        Ok(node)
    }
}

/// Decodes one JSON value of `node`'s shape from the token stream.
pub(crate) fn decode_node<T: Bindable>(
    node: &DecodeNode<T>,
    lexer: &mut Lexer<'_>,
    errors: &mut Vec<TypeError>,
) -> Result<T, StreamError> {
    let kind = node.kind.get().expect("binding graph sealed before use");
    match kind {
        DecodeKind::Scalar(convert) => {
            let raw = parse_value(lexer)?;
            match convert(&raw) {
                Some(v) => Ok(v),
                None => {
                    errors.push(TypeError::new::<T>(raw_text(&raw)));
                    Ok(T::default())
                }
            }
        }
        DecodeKind::Fields(fields) => {
            let mut out = T::default();
            match lexer.next()? {
                // null leaves the default-constructed value in place.
                Token::Null => return Ok(out),
                Token::ObjectBegin => {}
                other => return Err(lexer.unexpected(&other, "'{'")),
            }
            if *lexer.peek()? == Token::ObjectEnd {
                lexer.next()?;
                return Ok(out);
            }
            loop {
                let key = match lexer.next()? {
                    Token::String(k) => k,
                    other => return Err(lexer.unexpected(&other, "an object key")),
                };
                lexer.expect(&Token::Colon, "':'")?;
                if let Some(follow) = fields.get(&key) {
                    follow(&mut out, lexer, errors)?;
                } else {
                    // Unknown members are parsed and discarded.
                    parse_value(lexer)?;
                }
                match lexer.next()? {
                    Token::Comma => {}
                    Token::ObjectEnd => break,
                    other => return Err(lexer.unexpected(&other, "',' or '}'")),
                }
            }
            Ok(out)
        }
        DecodeKind::Items(follow) | DecodeKind::Pairs(follow) => {
            let mut out = T::default();
            if *lexer.peek()? == Token::Null {
                lexer.next()?;
                return Ok(out);
            }
            follow(&mut out, lexer, errors)?;
            Ok(out)
        }
    }
}

/// Writes one JSON value of `node`'s shape for `value`.
pub(crate) fn encode_node<T: Bindable>(
    node: &EncodeNode<T>,
    value: &T,
    writer: &mut JsonWriter<'_>,
    errors: &mut Vec<TypeError>,
) -> Result<(), StreamError> {
    let kind = node.kind.get().expect("binding graph sealed before use");
    match kind {
        EncodeKind::Scalar(convert) => match convert(value) {
            Some(raw) => writer.value(&raw),
            None => {
                errors.push(TypeError::new::<T>(String::new()));
                writer.value(&Value::Null)
            }
        },
        EncodeKind::Fields(fields) => {
            writer.begin_object()?;
            for (name, follow) in fields {
                writer.key(name)?;
                follow(value, writer, errors)?;
            }
            writer.end_object()
        }
        EncodeKind::Items(follow) | EncodeKind::Pairs(follow) => follow(value, writer, errors),
    }
}

/// Textual rendition of a value for [`TypeError::raw`]. String content is
/// reported without quotes.
fn raw_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
