//! The [`Bindable`] trait and the [`Binder`] it declares shapes through.

use std::{
    any,
    collections::{BTreeMap, HashMap},
};
use std::sync::Arc;

use crate::{
    error::ConfigError,
    lexer::Token,
    link::{
        DecodeFollow, DecodeKind, DecodeLinker, EncodeFollow, EncodeKind, EncodeLinker,
        decode_node, encode_node,
    },
    value::Value,
};

/// A type that can be linked into a binding graph.
///
/// `bind` declares the type's JSON shape on the given [`Binder`]: exactly
/// one of [`scalar`](Binder::scalar), [`items`](Binder::items),
/// [`pairs`](Binder::pairs), or any number of [`field`](Binder::field)
/// declarations (none at all is legal and maps to `{}`). The `Default`
/// bound supplies the instance that decoding populates.
///
/// Implementations ship for `bool`, `char`, the standard integer widths,
/// `f32`/`f64`, `String`, [`Value`], `Vec<U>`, `HashMap<String, U>`, and
/// `BTreeMap<String, U>`.
///
/// # Examples
///
/// ```
/// use jsonbind::{Bindable, Binder};
///
/// #[derive(Default)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// impl Bindable for Point {
///     fn bind(binder: &mut Binder<Self>) {
///         binder.field("x", |p: &mut Self, v| p.x = v, |p| &p.x);
///         binder.field("y", |p: &mut Self, v| p.y = v, |p| &p.y);
///     }
/// }
/// ```
pub trait Bindable: Default + 'static {
    /// Declares this type's JSON shape.
    fn bind(binder: &mut Binder<Self>);
}

type DecodeMaker<T> = Box<dyn FnOnce(&mut DecodeLinker<'_>) -> Result<DecodeFollow<T>, ConfigError>>;
type EncodeMaker<T> = Box<dyn FnOnce(&mut EncodeLinker<'_>) -> Result<EncodeFollow<T>, ConfigError>>;

/// Accumulates the shape declarations of one [`Bindable`] type.
///
/// Linking consumes the accumulated declarations into an immutable graph
/// node; declaring more than one shape, repeating an [`items`](Binder::items)
/// or [`pairs`](Binder::pairs) declaration, or repeating a field name is a
/// [`ConfigError`] at that point.
pub struct Binder<T> {
    scalar: bool,
    /// Set when `items` or `pairs` is declared more than once.
    repeated: bool,
    fields: Vec<(String, DecodeMaker<T>, EncodeMaker<T>)>,
    items: Option<(DecodeMaker<T>, EncodeMaker<T>)>,
    pairs: Option<(DecodeMaker<T>, EncodeMaker<T>)>,
}

impl<T: Bindable> Binder<T> {
    pub(crate) fn new() -> Self {
        Self {
            scalar: false,
            repeated: false,
            fields: Vec::new(),
            items: None,
            pairs: None,
        }
    }

    /// Declares `T` a scalar, converted through the registry.
    pub fn scalar(&mut self) {
        self.scalar = true;
    }

    /// Declares an object field bound to a member of `T`.
    ///
    /// `set` stores a decoded member value; `get` projects the member out
    /// for encoding. Fields encode in declaration order.
    pub fn field<U: Bindable>(
        &mut self,
        name: impl Into<String>,
        set: impl Fn(&mut T, U) + Send + Sync + 'static,
        get: impl for<'v> Fn(&'v T) -> &'v U + Send + Sync + 'static,
    ) {
        let decode: DecodeMaker<T> = Box::new(move |linker| {
            let node = linker.node::<U>()?;
            let follow: DecodeFollow<T> = Arc::new(move |parent, lexer, errors| {
                let member = decode_node(&node, lexer, errors)?;
                set(parent, member);
                Ok(())
            });
            Ok(follow)
        });
        let encode: EncodeMaker<T> = Box::new(move |linker| {
            let node = linker.node::<U>()?;
            let follow: EncodeFollow<T> = Arc::new(move |parent, writer, errors| {
                encode_node(&node, get(parent), writer, errors)
            });
            Ok(follow)
        });
        self.fields.push((name.into(), decode, encode));
    }

    /// Declares `T` a sequence of `U` values, bound to a JSON array.
    ///
    /// `set` receives the fully collected elements and rebuilds the
    /// container; `get` projects the elements out in order for encoding.
    pub fn items<U: Bindable>(
        &mut self,
        set: impl Fn(&mut T, Vec<U>) + Send + Sync + 'static,
        get: impl for<'v> Fn(&'v T) -> Vec<&'v U> + Send + Sync + 'static,
    ) {
        let decode: DecodeMaker<T> = Box::new(move |linker| {
            let node = linker.node::<U>()?;
            let follow: DecodeFollow<T> = Arc::new(move |parent, lexer, errors| {
                match lexer.next()? {
                    Token::ArrayBegin => {}
                    other => return Err(lexer.unexpected(&other, "'['")),
                }
                let mut collected = Vec::new();
                if *lexer.peek()? == Token::ArrayEnd {
                    lexer.next()?;
                } else {
                    loop {
                        collected.push(decode_node(&node, lexer, errors)?);
                        match lexer.next()? {
                            Token::Comma => {}
                            Token::ArrayEnd => break,
                            other => return Err(lexer.unexpected(&other, "',' or ']'")),
                        }
                    }
                }
                set(parent, collected);
                Ok(())
            });
            Ok(follow)
        });
        let encode: EncodeMaker<T> = Box::new(move |linker| {
            let node = linker.node::<U>()?;
            let follow: EncodeFollow<T> = Arc::new(move |parent, writer, errors| {
                writer.begin_array()?;
                for item in get(parent) {
                    writer.element()?;
                    encode_node(&node, item, writer, errors)?;
                }
                writer.end_array()
            });
            Ok(follow)
        });
        if self.items.is_some() {
            self.repeated = true;
        }
        self.items = Some((decode, encode));
    }

    /// Declares `T` a string-keyed map of `U` values, bound to a JSON
    /// object with open membership.
    ///
    /// `set` receives the fully collected entries and rebuilds the map;
    /// `get` projects the entries out for encoding.
    pub fn pairs<U: Bindable>(
        &mut self,
        set: impl Fn(&mut T, Vec<(String, U)>) + Send + Sync + 'static,
        get: impl for<'v> Fn(&'v T) -> Vec<(&'v str, &'v U)> + Send + Sync + 'static,
    ) {
        let decode: DecodeMaker<T> = Box::new(move |linker| {
            let node = linker.node::<U>()?;
            let follow: DecodeFollow<T> = Arc::new(move |parent, lexer, errors| {
                match lexer.next()? {
                    Token::ObjectBegin => {}
                    other => return Err(lexer.unexpected(&other, "'{'")),
                }
                let mut entries = Vec::new();
                if *lexer.peek()? == Token::ObjectEnd {
                    lexer.next()?;
                } else {
                    loop {
                        let key = match lexer.next()? {
                            Token::String(k) => k,
                            other => return Err(lexer.unexpected(&other, "an object key")),
                        };
                        lexer.expect(&Token::Colon, "':'")?;
                        entries.push((key, decode_node(&node, lexer, errors)?));
                        match lexer.next()? {
                            Token::Comma => {}
                            Token::ObjectEnd => break,
                            other => return Err(lexer.unexpected(&other, "',' or '}'")),
                        }
                    }
                }
                set(parent, entries);
                Ok(())
            });
            Ok(follow)
        });
        let encode: EncodeMaker<T> = Box::new(move |linker| {
            let node = linker.node::<U>()?;
            let follow: EncodeFollow<T> = Arc::new(move |parent, writer, errors| {
                writer.begin_object()?;
                for (key, member) in get(parent) {
                    writer.key(key)?;
                    encode_node(&node, member, writer, errors)?;
                }
                writer.end_object()
            });
            Ok(follow)
        });
        if self.pairs.is_some() {
            self.repeated = true;
        }
        self.pairs = Some((decode, encode));
    }

    fn check_shape(&self) -> Result<(), ConfigError> {
        let declared = usize::from(self.scalar)
            + usize::from(self.items.is_some())
            + usize::from(self.pairs.is_some())
            + usize::from(!self.fields.is_empty());
        if declared > 1 || self.repeated {
            return Err(ConfigError::ShapeConflict(any::type_name::<T>()));
        }
        Ok(())
    }

    pub(crate) fn into_decode(self, linker: &mut DecodeLinker<'_>) -> Result<DecodeKind<T>, ConfigError> {
        self.check_shape()?;
        if self.scalar {
            let convert = linker
                .converters()
                .get_decode::<T>()
                .ok_or(ConfigError::MissingConverter(any::type_name::<T>()))?;
            return Ok(DecodeKind::Scalar(convert));
        }
        if let Some((decode, _)) = self.items {
            return Ok(DecodeKind::Items(decode(linker)?));
        }
        if let Some((decode, _)) = self.pairs {
            return Ok(DecodeKind::Pairs(decode(linker)?));
        }
        let mut fields = HashMap::new();
        for (name, decode, _) in self.fields {
            if fields.contains_key(&name) {
                return Err(ConfigError::DuplicateField(any::type_name::<T>(), name));
            }
            let follow = decode(linker)?;
            fields.insert(name, follow);
        }
        Ok(DecodeKind::Fields(fields))
    }

    pub(crate) fn into_encode(self, linker: &mut EncodeLinker<'_>) -> Result<EncodeKind<T>, ConfigError> {
        self.check_shape()?;
        if self.scalar {
            let convert = linker
                .converters()
                .get_encode::<T>()
                .ok_or(ConfigError::MissingConverter(any::type_name::<T>()))?;
            return Ok(EncodeKind::Scalar(convert));
        }
        if let Some((_, encode)) = self.items {
            return Ok(EncodeKind::Items(encode(linker)?));
        }
        if let Some((_, encode)) = self.pairs {
            return Ok(EncodeKind::Pairs(encode(linker)?));
        }
        let mut fields = Vec::with_capacity(self.fields.len());
        for (name, _, encode) in self.fields {
            if fields.iter().any(|(n, _)| *n == name) {
                return Err(ConfigError::DuplicateField(any::type_name::<T>(), name));
            }
            let follow = encode(linker)?;
            fields.push((name, follow));
        }
        Ok(EncodeKind::Fields(fields))
    }
}

macro_rules! bind_scalar {
    ($($t:ty),+ $(,)?) => {$(
        impl Bindable for $t {
            fn bind(binder: &mut Binder<Self>) {
                binder.scalar();
            }
        }
    )+};
}

bind_scalar!(
    bool, char, f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, String, Value,
);

impl<U: Bindable> Bindable for Vec<U> {
    fn bind(binder: &mut Binder<Self>) {
        fn project<U>(seq: &Vec<U>) -> Vec<&U> {
            seq.iter().collect()
        }
        binder.items(|seq: &mut Self, items| *seq = items, project::<U>);
    }
}

impl<U: Bindable> Bindable for HashMap<String, U> {
    fn bind(binder: &mut Binder<Self>) {
        fn project<U>(map: &HashMap<String, U>) -> Vec<(&str, &U)> {
            map.iter().map(|(k, v)| (k.as_str(), v)).collect()
        }
        binder.pairs(
            |map: &mut Self, entries| {
                map.clear();
                map.extend(entries);
            },
            project::<U>,
        );
    }
}

impl<U: Bindable> Bindable for BTreeMap<String, U> {
    fn bind(binder: &mut Binder<Self>) {
        fn project<U>(map: &BTreeMap<String, U>) -> Vec<(&str, &U)> {
            map.iter().map(|(k, v)| (k.as_str(), v)).collect()
        }
        binder.pairs(
            |map: &mut Self, entries| {
                map.clear();
                map.extend(entries);
            },
            project::<U>,
        );
    }
}
