//! JSON value types and string escaping helpers.

/// Ordered key/value entries of a JSON object.
///
/// Duplicate keys are preserved in document order; [`Value::get`] resolves
/// them last-write-wins.
pub type Object = Vec<(String, Value)>;

/// The elements of a JSON array.
pub type Array = Vec<Value>;

/// A JSON value as defined by [RFC 8259].
///
/// Numbers are always stored as 64-bit floats; narrowing into integral host
/// types happens in the converter registry, truncating toward zero.
///
/// # Examples
///
/// ```
/// use jsonbind::Value;
///
/// let v = Value::Object(vec![("key".to_string(), Value::String("value".into()))]);
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// ```
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// The `null` literal.
    #[default]
    Null,
    /// `true` or `false`.
    Boolean(bool),
    /// Any JSON number.
    Number(f64),
    /// A string literal.
    String(String),
    /// An ordered sequence of values.
    Array(Array),
    /// An ordered sequence of key/value entries.
    Object(Object),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is [`Boolean`].
    ///
    /// [`Boolean`]: Value::Boolean
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Boolean(..))
    }

    /// Returns `true` if the value is [`Number`].
    ///
    /// [`Number`]: Value::Number
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(..))
    }

    /// Returns `true` if the value is [`String`].
    ///
    /// [`String`]: Value::String
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is [`Array`].
    ///
    /// [`Array`]: Value::Array
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if the value is [`Object`].
    ///
    /// [`Object`]: Value::Object
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }

    /// Looks up an object key. With duplicate keys the last entry wins.
    ///
    /// Returns `None` on non-object values.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonbind::Value;
    ///
    /// let v = Value::Object(vec![
    ///     ("a".to_string(), Value::Number(1.0)),
    ///     ("a".to_string(), Value::Number(2.0)),
    /// ]);
    /// assert_eq!(v.get("a"), Some(&Value::Number(2.0)));
    /// assert_eq!(v.get("b"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(entries) => entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Escapes a string for inclusion in a JSON string literal.
///
/// Quotes, backslashes, control characters and the Unicode line separators
/// U+2028/U+2029 are replaced with their JSON escape sequences; everything
/// else passes through as raw UTF-8.
pub(crate) fn write_escaped_string<W: core::fmt::Write>(src: &str, f: &mut W) -> core::fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{000C}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            // Escape Unicode line separators which pre-2019 JavaScript
            // parsers do not accept in string literals.
            '\u{2028}' | '\u{2029}' => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            c if c.is_ascii_control() => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Convenience wrapper around [`write_escaped_string`] returning a `String`.
pub(crate) fn escape_string(src: &str) -> String {
    let mut result = String::with_capacity(src.len());
    write_escaped_string(src, &mut result).expect("writing to a String cannot fail");
    result
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Number(n) if n.is_finite() => write!(f, "{n}"),
            // Non-finite numbers have no JSON representation.
            Value::Number(_) => f.write_str("null"),
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Value::Array(arr) => {
                f.write_str("[")?;
                let mut first = true;
                for v in arr {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Object(entries) => {
                f.write_str("{")?;
                let mut first = true;
                for (k, v) in entries {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "\"{}\":{}", escape_string(k), v)?;
                }
                f.write_str("}")
            }
        }
    }
}
