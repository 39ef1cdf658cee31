//! Output-side JSON writer with compact and indented formats.

use std::io::Write;

use crate::{
    error::StreamError,
    value::{Value, escape_string},
};

/// Writes JSON text to a byte stream.
///
/// With an indent string, each nesting level adds one repetition of the
/// indent, every member starts on its own line, and a single space follows
/// each name separator. Without one, output is fully compact. Empty
/// containers render as `{}` and `[]` in both modes.
pub(crate) struct JsonWriter<'a> {
    out: &'a mut dyn Write,
    indent: Option<&'a str>,
    /// Bytes written so far, reported as the offset of I/O failures.
    written: u64,
    /// One entry per open container; set once the first member is written.
    levels: Vec<bool>,
}

impl<'a> JsonWriter<'a> {
    pub(crate) fn new(out: &'a mut dyn Write, indent: Option<&'a str>) -> Self {
        Self {
            out,
            indent,
            written: 0,
            levels: Vec::new(),
        }
    }

    fn raw(&mut self, text: &str) -> Result<(), StreamError> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| StreamError::new(self.written, e))?;
        self.written += text.len() as u64;
        Ok(())
    }

    fn newline_indent(&mut self) -> Result<(), StreamError> {
        if let Some(indent) = self.indent {
            let pad = indent.repeat(self.levels.len());
            self.raw("\n")?;
            self.raw(&pad)?;
        }
        Ok(())
    }

    /// Starts the next array element or object member, emitting the comma
    /// separator and line break as needed.
    pub(crate) fn element(&mut self) -> Result<(), StreamError> {
        let first = match self.levels.last_mut() {
            Some(seen) => !std::mem::replace(seen, true),
            None => return Ok(()),
        };
        if !first {
            self.raw(",")?;
        }
        self.newline_indent()
    }

    /// Writes an object member name and its separator.
    pub(crate) fn key(&mut self, name: &str) -> Result<(), StreamError> {
        self.element()?;
        let escaped = escape_string(name);
        self.raw("\"")?;
        self.raw(&escaped)?;
        self.raw(if self.indent.is_some() { "\": " } else { "\":" })
    }

    pub(crate) fn begin_object(&mut self) -> Result<(), StreamError> {
        self.raw("{")?;
        self.levels.push(false);
        Ok(())
    }

    pub(crate) fn end_object(&mut self) -> Result<(), StreamError> {
        self.close("}")
    }

    pub(crate) fn begin_array(&mut self) -> Result<(), StreamError> {
        self.raw("[")?;
        self.levels.push(false);
        Ok(())
    }

    pub(crate) fn end_array(&mut self) -> Result<(), StreamError> {
        self.close("]")
    }

    fn close(&mut self, delimiter: &str) -> Result<(), StreamError> {
        let had_members = self.levels.pop().unwrap_or(false);
        if had_members {
            self.newline_indent()?;
        }
        self.raw(delimiter)
    }

    /// Writes a full [`Value`] tree.
    pub(crate) fn value(&mut self, v: &Value) -> Result<(), StreamError> {
        match v {
            Value::Null => self.raw("null"),
            Value::Boolean(b) => self.raw(if *b { "true" } else { "false" }),
            Value::Number(n) if n.is_finite() => {
                let text = format!("{n}");
                self.raw(&text)
            }
            // Non-finite numbers have no JSON representation.
            Value::Number(_) => self.raw("null"),
            Value::String(s) => {
                let escaped = escape_string(s);
                self.raw("\"")?;
                self.raw(&escaped)?;
                self.raw("\"")
            }
            Value::Array(items) => {
                self.begin_array()?;
                for item in items {
                    self.element()?;
                    self.value(item)?;
                }
                self.end_array()
            }
            Value::Object(entries) => {
                self.begin_object()?;
                for (k, v) in entries {
                    self.key(k)?;
                    self.value(v)?;
                }
                self.end_object()
            }
        }
    }

    pub(crate) fn finish(&mut self) -> Result<(), StreamError> {
        self.out
            .flush()
            .map_err(|e| StreamError::new(self.written, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(v: &Value, indent: Option<&str>) -> String {
        let mut out = Vec::new();
        let mut w = JsonWriter::new(&mut out, indent);
        w.value(v).unwrap();
        w.finish().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn compact_has_no_whitespace() {
        let v = Value::Object(vec![
            (
                "a".to_string(),
                Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]),
            ),
            ("b".to_string(), Value::Null),
        ]);
        assert_eq!(render(&v, None), r#"{"a":[1,2],"b":null}"#);
    }

    #[test]
    fn indented_layout() {
        let v = Value::Object(vec![
            ("a".to_string(), Value::Array(vec![Value::Number(1.0)])),
            ("b".to_string(), Value::Object(vec![])),
        ]);
        assert_eq!(
            render(&v, Some("  ")),
            "{\n  \"a\": [\n    1\n  ],\n  \"b\": {}\n}"
        );
    }

    #[test]
    fn empty_containers_stay_tight() {
        assert_eq!(render(&Value::Array(vec![]), Some("  ")), "[]");
        assert_eq!(render(&Value::Object(vec![]), Some("  ")), "{}");
    }

    #[test]
    fn non_finite_numbers_render_null() {
        assert_eq!(render(&Value::Number(f64::NAN), None), "null");
        assert_eq!(render(&Value::Number(f64::INFINITY), None), "null");
    }
}
