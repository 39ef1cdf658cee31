//! Streaming JSON tokenizer.
//!
//! Reads UTF-8 JSON text from a byte stream and produces [`Token`]s one at a
//! time. Every error carries the byte offset at which it was detected; for
//! tokens, [`Lexer::token_start`] records where the most recent token began.

use std::io::{self, Read};

use crate::{
    error::{StreamError, StreamErrorKind},
    value::Value,
};

const BUFFER_SIZE: usize = 8 * 1024;

/// A single JSON token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    ObjectBegin,
    ObjectEnd,
    ArrayBegin,
    ArrayEnd,
    Colon,
    Comma,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Token {
    /// Renders the token for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::ObjectBegin => "'{'".to_string(),
            Self::ObjectEnd => "'}'".to_string(),
            Self::ArrayBegin => "'['".to_string(),
            Self::ArrayEnd => "']'".to_string(),
            Self::Colon => "':'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Null => "null".to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => format!("number {n}"),
            Self::String(s) => format!("string {s:?}"),
        }
    }
}

/// Tokenizer over an arbitrary byte reader.
pub(crate) struct Lexer<'a> {
    input: &'a mut dyn Read,
    buf: Vec<u8>,
    pos: usize,
    len: usize,
    eof: bool,
    /// Absolute offset of the next unread byte.
    offset: u64,
    /// Offset of the first byte of the most recently lexed token.
    token_start: u64,
    peeked: Option<(Token, u64)>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a mut dyn Read) -> Self {
        Self {
            input,
            buf: vec![0; BUFFER_SIZE],
            pos: 0,
            len: 0,
            eof: false,
            offset: 0,
            token_start: 0,
            peeked: None,
        }
    }

    /// Consumes and returns the next token.
    pub(crate) fn next(&mut self) -> Result<Token, StreamError> {
        if let Some((token, start)) = self.peeked.take() {
            self.token_start = start;
            return Ok(token);
        }
        self.lex()
    }

    /// Returns the next token without consuming it.
    pub(crate) fn peek(&mut self) -> Result<&Token, StreamError> {
        if self.peeked.is_none() {
            let token = self.lex()?;
            self.peeked = Some((token, self.token_start));
        }
        // Filled above; the None arm is never taken.
        match &self.peeked {
            Some((token, _)) => Ok(token),
            None => Err(self.end_of_input()),
        }
    }

    /// Consumes the next token, which must equal `want`.
    pub(crate) fn expect(&mut self, want: &Token, expected: &'static str) -> Result<(), StreamError> {
        let token = self.next()?;
        if token == *want {
            Ok(())
        } else {
            Err(self.unexpected(&token, expected))
        }
    }

    /// Builds the error for a token read in a position the grammar forbids.
    pub(crate) fn unexpected(&self, found: &Token, expected: &'static str) -> StreamError {
        StreamError::new(
            self.token_start,
            StreamErrorKind::UnexpectedToken {
                found: found.describe(),
                expected,
            },
        )
    }

    fn fill(&mut self) -> Result<(), StreamError> {
        if self.pos < self.len || self.eof {
            return Ok(());
        }
        loop {
            match self.input.read(&mut self.buf) {
                Ok(0) => {
                    self.eof = true;
                    self.pos = 0;
                    self.len = 0;
                    return Ok(());
                }
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(StreamError::new(self.offset, e)),
            }
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, StreamError> {
        self.fill()?;
        if self.pos < self.len {
            Ok(Some(self.buf[self.pos]))
        } else {
            Ok(None)
        }
    }

    fn bump(&mut self) {
        self.pos += 1;
        self.offset += 1;
    }

    /// Consumes the next byte, failing on end of input.
    fn require_byte(&mut self) -> Result<u8, StreamError> {
        match self.peek_byte()? {
            Some(b) => {
                self.bump();
                Ok(b)
            }
            None => Err(self.end_of_input()),
        }
    }

    fn end_of_input(&self) -> StreamError {
        StreamError::new(self.offset, StreamErrorKind::UnexpectedEndOfInput)
    }

    /// Error for an unconsumed byte at the current offset.
    fn invalid_byte(&self, b: u8) -> StreamError {
        StreamError::new(self.offset, StreamErrorKind::InvalidCharacter(char::from(b)))
    }

    /// Error for a byte that was just consumed.
    fn invalid_consumed(&self, b: u8) -> StreamError {
        StreamError::new(
            self.offset - 1,
            StreamErrorKind::InvalidCharacter(char::from(b)),
        )
    }

    fn lex(&mut self) -> Result<Token, StreamError> {
        loop {
            match self.peek_byte()? {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.bump(),
                _ => break,
            }
        }
        self.token_start = self.offset;
        let b = self.require_byte()?;
        match b {
            b'{' => Ok(Token::ObjectBegin),
            b'}' => Ok(Token::ObjectEnd),
            b'[' => Ok(Token::ArrayBegin),
            b']' => Ok(Token::ArrayEnd),
            b':' => Ok(Token::Colon),
            b',' => Ok(Token::Comma),
            b'"' => self.lex_string(),
            b't' => {
                self.literal(b"rue")?;
                Ok(Token::Boolean(true))
            }
            b'f' => {
                self.literal(b"alse")?;
                Ok(Token::Boolean(false))
            }
            b'n' => {
                self.literal(b"ull")?;
                Ok(Token::Null)
            }
            b'-' | b'0'..=b'9' => self.lex_number(b),
            other => Err(StreamError::new(
                self.token_start,
                StreamErrorKind::InvalidCharacter(char::from(other)),
            )),
        }
    }

    /// Consumes the remaining bytes of a keyword (`true`, `false`, `null`).
    fn literal(&mut self, rest: &[u8]) -> Result<(), StreamError> {
        for &expected in rest {
            let b = self.require_byte()?;
            if b != expected {
                return Err(self.invalid_consumed(b));
            }
        }
        Ok(())
    }

    fn lex_number(&mut self, first: u8) -> Result<Token, StreamError> {
        let mut repr = String::new();
        let mut b = first;
        if b == b'-' {
            repr.push('-');
            b = match self.peek_byte()? {
                Some(d @ b'0'..=b'9') => {
                    self.bump();
                    d
                }
                Some(other) => return Err(self.invalid_byte(other)),
                None => return Err(self.end_of_input()),
            };
        }
        repr.push(char::from(b));
        if b == b'0' {
            // JSON forbids leading zeros.
            if let Some(d @ b'0'..=b'9') = self.peek_byte()? {
                return Err(self.invalid_byte(d));
            }
        } else {
            self.digits_into(&mut repr)?;
        }
        if let Some(b'.') = self.peek_byte()? {
            self.bump();
            repr.push('.');
            self.require_digit(&mut repr)?;
            self.digits_into(&mut repr)?;
        }
        if let Some(b'e' | b'E') = self.peek_byte()? {
            self.bump();
            repr.push('e');
            if let Some(sign @ (b'+' | b'-')) = self.peek_byte()? {
                self.bump();
                repr.push(char::from(sign));
            }
            self.require_digit(&mut repr)?;
            self.digits_into(&mut repr)?;
        }
        let n: f64 = repr
            .parse()
            .map_err(|_| StreamError::new(self.token_start, StreamErrorKind::InvalidNumber))?;
        Ok(Token::Number(n))
    }

    /// Appends one mandatory digit.
    fn require_digit(&mut self, repr: &mut String) -> Result<(), StreamError> {
        match self.peek_byte()? {
            Some(d @ b'0'..=b'9') => {
                self.bump();
                repr.push(char::from(d));
                Ok(())
            }
            Some(other) => Err(self.invalid_byte(other)),
            None => Err(self.end_of_input()),
        }
    }

    /// Appends any following digits.
    fn digits_into(&mut self, repr: &mut String) -> Result<(), StreamError> {
        while let Some(d @ b'0'..=b'9') = self.peek_byte()? {
            self.bump();
            repr.push(char::from(d));
        }
        Ok(())
    }

    /// Lexes a string body; the opening quote is already consumed.
    fn lex_string(&mut self) -> Result<Token, StreamError> {
        let mut bytes = Vec::new();
        loop {
            let b = self.require_byte()?;
            match b {
                b'"' => {
                    let s = String::from_utf8(bytes).map_err(|_| {
                        StreamError::new(self.token_start, StreamErrorKind::InvalidUtf8)
                    })?;
                    return Ok(Token::String(s));
                }
                b'\\' => self.lex_escape(&mut bytes)?,
                0x00..=0x1F => return Err(self.invalid_consumed(b)),
                other => bytes.push(other),
            }
        }
    }

    /// Lexes one escape sequence; the backslash is already consumed.
    fn lex_escape(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        let b = self.require_byte()?;
        let unescaped = match b {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => return self.lex_unicode_escape(out),
            other => return Err(self.invalid_consumed(other)),
        };
        out.push(unescaped);
        Ok(())
    }

    /// Lexes the `XXXX` of a `\uXXXX` escape, combining surrogate pairs.
    fn lex_unicode_escape(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        // Offset of the escape's backslash, for error reporting.
        let start = self.offset - 2;
        let hi = self.hex4()?;
        let scalar = if (0xD800..=0xDBFF).contains(&hi) {
            if self.require_byte()? != b'\\' || self.require_byte()? != b'u' {
                return Err(StreamError::new(
                    start,
                    StreamErrorKind::InvalidUnicodeEscape(hi),
                ));
            }
            let lo = self.hex4()?;
            if !(0xDC00..=0xDFFF).contains(&lo) {
                return Err(StreamError::new(
                    start,
                    StreamErrorKind::InvalidUnicodeEscape(lo),
                ));
            }
            0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00)
        } else {
            hi
        };
        let c = char::from_u32(scalar).ok_or_else(|| {
            StreamError::new(start, StreamErrorKind::InvalidUnicodeEscape(scalar))
        })?;
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        Ok(())
    }

    /// Reads four hex digits.
    fn hex4(&mut self) -> Result<u32, StreamError> {
        let mut v = 0u32;
        for _ in 0..4 {
            let b = self.require_byte()?;
            let digit = char::from(b)
                .to_digit(16)
                .ok_or_else(|| self.invalid_consumed(b))?;
            v = v << 4 | digit;
        }
        Ok(v)
    }
}

/// Parses one complete JSON value into a [`Value`] tree.
///
/// Used for scalar slots and to discard unknown object members.
pub(crate) fn parse_value(lexer: &mut Lexer<'_>) -> Result<Value, StreamError> {
    let token = lexer.next()?;
    parse_value_from(token, lexer)
}

/// Continues [`parse_value`] after its first token has been read.
pub(crate) fn parse_value_from(token: Token, lexer: &mut Lexer<'_>) -> Result<Value, StreamError> {
    match token {
        Token::Null => Ok(Value::Null),
        Token::Boolean(b) => Ok(Value::Boolean(b)),
        Token::Number(n) => Ok(Value::Number(n)),
        Token::String(s) => Ok(Value::String(s)),
        Token::ArrayBegin => {
            let mut items = Vec::new();
            if *lexer.peek()? == Token::ArrayEnd {
                lexer.next()?;
                return Ok(Value::Array(items));
            }
            loop {
                items.push(parse_value(lexer)?);
                match lexer.next()? {
                    Token::Comma => {}
                    Token::ArrayEnd => return Ok(Value::Array(items)),
                    other => return Err(lexer.unexpected(&other, "',' or ']'")),
                }
            }
        }
        Token::ObjectBegin => {
            let mut entries = Vec::new();
            if *lexer.peek()? == Token::ObjectEnd {
                lexer.next()?;
                return Ok(Value::Object(entries));
            }
            loop {
                let key = match lexer.next()? {
                    Token::String(k) => k,
                    other => return Err(lexer.unexpected(&other, "an object key")),
                };
                lexer.expect(&Token::Colon, "':'")?;
                entries.push((key, parse_value(lexer)?));
                match lexer.next()? {
                    Token::Comma => {}
                    Token::ObjectEnd => return Ok(Value::Object(entries)),
                    other => return Err(lexer.unexpected(&other, "',' or '}'")),
                }
            }
        }
        other => Err(lexer.unexpected(&other, "a value")),
    }
}
