use rstest::rstest;

use crate::{Schema, StreamError, StreamErrorKind, Value};

fn decode_err(input: &[u8]) -> StreamError {
    let schema = Schema::new();
    let decoder = schema.decoder::<Value>().unwrap();
    decoder.decode(input).unwrap_err()
}

#[rstest]
#[case(b"a", 0)]
#[case(b"tru!", 3)]
#[case(b"trux", 3)]
#[case(b"-x", 1)]
#[case(b"1e ", 2)]
#[case(b"1e+ ", 3)]
#[case(b"1.x", 2)]
#[case(b"[01]", 2)]
#[case(br#"{"str": }"#, 8)]
#[case(b"[1, 2", 5)]
#[case(br#"{"a":"#, 5)]
#[case(b"\"abc", 4)]
#[case(b"nul", 3)]
#[case(b"", 0)]
#[case(b"\"a\x01\"", 2)]
#[case(br#""\q""#, 2)]
#[case(br#""\uZZZZ""#, 3)]
fn error_offsets(#[case] input: &[u8], #[case] offset: u64) {
    let err = decode_err(input);
    assert_eq!(
        err.offset,
        offset,
        "input {:?}: {err}",
        String::from_utf8_lossy(input)
    );
}

#[test]
fn value_in_key_position() {
    let err = decode_err(b"{1: 2}");
    assert_eq!(err.offset, 1);
    assert!(matches!(
        err.kind,
        StreamErrorKind::UnexpectedToken { expected, .. } if expected == "an object key"
    ));
}

#[test]
fn missing_colon() {
    let err = decode_err(br#"{"a" 1}"#);
    assert_eq!(err.offset, 5);
    assert!(matches!(
        err.kind,
        StreamErrorKind::UnexpectedToken { expected, .. } if expected == "':'"
    ));
}

#[test]
fn lone_high_surrogate() {
    let err = decode_err(br#""\uD834x""#);
    assert_eq!(err.offset, 1);
    assert!(matches!(
        err.kind,
        StreamErrorKind::InvalidUnicodeEscape(0xD834)
    ));
}

#[test]
fn unpaired_low_surrogate() {
    let err = decode_err(br#""\uDC00""#);
    assert!(matches!(
        err.kind,
        StreamErrorKind::InvalidUnicodeEscape(0xDC00)
    ));
}

#[test]
fn invalid_utf8_in_string() {
    let err = decode_err(b"\"\xff\"");
    assert_eq!(err.offset, 0);
    assert!(matches!(err.kind, StreamErrorKind::InvalidUtf8));
}

#[test]
fn truncated_input_reports_end() {
    let err = decode_err(b"tr");
    assert_eq!(err.offset, 2);
    assert!(matches!(err.kind, StreamErrorKind::UnexpectedEndOfInput));
}

#[test]
fn reader_failures_surface_as_io() {
    use std::io::{self, Read};

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("wire cut"))
        }
    }

    let schema = Schema::new();
    let decoder = schema.decoder::<Value>().unwrap();
    let err = decoder.decode(Broken).unwrap_err();
    assert_eq!(err.offset, 0);
    assert!(matches!(err.kind, StreamErrorKind::Io(_)));
}

#[test]
fn error_message_carries_offset() {
    let err = decode_err(br#"{"str": }"#);
    assert_eq!(err.to_string(), "unexpected '}', expected a value at byte 8");
}
