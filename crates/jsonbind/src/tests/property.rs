use quickcheck::QuickCheck;

use crate::{Schema, Value};

/// Property: any finite `Value` tree survives an encode-then-decode trip
/// unchanged, in both output formats.
#[test]
fn value_round_trips_compact() {
    fn prop(value: Value) -> bool {
        round_trips(&Schema::new(), &value)
    }
    QuickCheck::new().tests(500).quickcheck(prop as fn(Value) -> bool);
}

#[test]
fn value_round_trips_indented() {
    fn prop(value: Value) -> bool {
        round_trips(&Schema::with_indent("  "), &value)
    }
    QuickCheck::new().tests(500).quickcheck(prop as fn(Value) -> bool);
}

/// Property: `Display` output agrees with the compact encoder.
#[test]
fn display_matches_compact_encoder() {
    fn prop(value: Value) -> bool {
        let schema = Schema::new();
        let encoder = schema.encoder::<Value>().unwrap();
        let mut out = Vec::new();
        encoder.encode(&value, &mut out).unwrap();
        out == value.to_string().into_bytes()
    }
    QuickCheck::new().tests(500).quickcheck(prop as fn(Value) -> bool);
}

fn round_trips(schema: &Schema, value: &Value) -> bool {
    let encoder = schema.encoder::<Value>().unwrap();
    let decoder = schema.decoder::<Value>().unwrap();

    let mut out = Vec::new();
    if !encoder.encode(value, &mut out).unwrap().is_empty() {
        return false;
    }
    let decoded = decoder.decode(&out[..]).unwrap();
    decoded.errors.is_empty() && decoded.value == *value
}
