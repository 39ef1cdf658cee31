//! The converter registry mapping scalar host types to and from [`Value`].

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use crate::value::Value;

/// Converts a parsed [`Value`] into a host scalar, or declines with `None`.
pub type DecodeFn<T> = Arc<dyn Fn(&Value) -> Option<T> + Send + Sync>;

/// Converts a host scalar into a [`Value`], or declines with `None`.
pub type EncodeFn<T> = Arc<dyn Fn(&T) -> Option<Value> + Send + Sync>;

/// A bidirectional table of scalar conversions, keyed by host type.
///
/// A fresh registry carries default entries for `bool`, every standard
/// integer width, `f32`, `f64`, `char`, `String`, and `Value` itself.
/// [`set_decode`](Converters::set_decode) and
/// [`set_encode`](Converters::set_encode) overwrite existing entries, so
/// defaults can be replaced wholesale.
///
/// Linking a decoder or encoder snapshots the entries it needs; later
/// registrations never affect already-linked graphs.
#[derive(Clone)]
pub struct Converters {
    decode: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    encode: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Converters {
    /// Registers or replaces the decode conversion for `T`.
    pub fn set_decode<T: 'static>(&mut self, f: impl Fn(&Value) -> Option<T> + Send + Sync + 'static) {
        let f: DecodeFn<T> = Arc::new(f);
        self.decode.insert(TypeId::of::<T>(), Arc::new(f));
    }

    /// Registers or replaces the encode conversion for `T`.
    pub fn set_encode<T: 'static>(&mut self, f: impl Fn(&T) -> Option<Value> + Send + Sync + 'static) {
        let f: EncodeFn<T> = Arc::new(f);
        self.encode.insert(TypeId::of::<T>(), Arc::new(f));
    }

    /// Returns the decode conversion registered for `T`, if any.
    #[must_use]
    pub fn get_decode<T: 'static>(&self) -> Option<DecodeFn<T>> {
        self.decode
            .get(&TypeId::of::<T>())
            .and_then(|f| f.downcast_ref::<DecodeFn<T>>())
            .cloned()
    }

    /// Returns the encode conversion registered for `T`, if any.
    #[must_use]
    pub fn get_encode<T: 'static>(&self) -> Option<EncodeFn<T>> {
        self.encode
            .get(&TypeId::of::<T>())
            .and_then(|f| f.downcast_ref::<EncodeFn<T>>())
            .cloned()
    }
}

macro_rules! default_integer {
    ($registry:expr, $($t:ty),+) => {$(
        $registry.set_decode::<$t>(|v| match v {
            Value::Number(n) => {
                let t = n.trunc();
                // MAX as f64 rounds up to MAX + 1 for the 64-bit widths, so
                // the upper bound is exclusive against MAX + 1, which is
                // exact at every width. MIN as f64 is always exact.
                (t >= <$t>::MIN as f64 && t < (<$t>::MAX as f64) + 1.0).then(|| t as $t)
            }
            _ => None,
        });
        $registry.set_encode::<$t>(|n| Some(Value::Number(*n as f64)));
    )+};
}

impl Default for Converters {
    fn default() -> Self {
        let mut c = Self {
            decode: HashMap::new(),
            encode: HashMap::new(),
        };

        default_integer!(c, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

        c.set_decode::<bool>(|v| match v {
            Value::Boolean(b) => Some(*b),
            _ => None,
        });
        c.set_encode::<bool>(|b| Some(Value::Boolean(*b)));

        c.set_decode::<f32>(|v| match v {
            Value::Number(n) => Some(*n as f32),
            _ => None,
        });
        c.set_encode::<f32>(|n| Some(Value::Number(f64::from(*n))));

        c.set_decode::<f64>(|v| match v {
            Value::Number(n) => Some(*n),
            _ => None,
        });
        c.set_encode::<f64>(|n| Some(Value::Number(*n)));

        // A char binds to a one-character string in either direction.
        c.set_decode::<char>(|v| match v {
            Value::String(s) => {
                let mut chars = s.chars();
                let first = chars.next()?;
                chars.next().is_none().then_some(first)
            }
            _ => None,
        });
        c.set_encode::<char>(|ch| Some(Value::String(ch.to_string())));

        c.set_decode::<String>(|v| match v {
            Value::String(s) => Some(s.clone()),
            _ => None,
        });
        c.set_encode::<String>(|s| Some(Value::String(s.clone())));

        // Value binds to itself, capturing any JSON shape verbatim.
        c.set_decode::<Value>(|v| Some(v.clone()));
        c.set_encode::<Value>(|v| Some(v.clone()));

        c
    }
}
