//! Fuzz testing harnesses for the object codec.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks.

use dynobj_core::{decode_all, from_bytes, to_bytes, CodecConfig, MemoryContext, Value};

use crate::fixtures::{decode_embedded, encode_embedded, literal_context};

/// Fuzz target for top-level decoding.
///
/// Arbitrary bytes must either decode or return an error, never panic.
pub fn fuzz_top_level_decode(data: &[u8]) {
    let ctx = MemoryContext::new(CodecConfig::literal());
    let _ = from_bytes(&ctx, data);
    let _ = decode_all(&ctx, data, None);
}

/// Fuzz target for embedded decoding, with normalized codes that are not
/// checked against a registry.
pub fn fuzz_embedded_decode(data: &[u8]) {
    let unchecked = MemoryContext::new(CodecConfig::new().check_field_names(false));
    let _ = decode_embedded(&unchecked, data);
    let _ = decode_embedded(&literal_context(), data);
}

/// Fuzz target for embedded roundtrip.
///
/// Whatever decodes must re-encode, and the re-encoded form must be
/// stable under a further roundtrip.
pub fn fuzz_embedded_roundtrip(data: &[u8]) {
    let ctx = MemoryContext::new(CodecConfig::literal());
    let Ok(value) = decode_embedded(&ctx, data) else {
        return;
    };
    // NaN never compares equal to itself
    if contains_nan(&value) {
        return;
    }
    let roundtrip = |value: &Value| {
        let encoded = encode_embedded(&ctx, value).expect("Decoded value must re-encode");
        decode_embedded(&ctx, &encoded).expect("Re-encoded value must decode")
    };
    let first = roundtrip(&value);
    let second = roundtrip(&first);
    assert_eq!(first, second, "Roundtrip mismatch");
}

/// Fuzz target for top-level roundtrip of decoded values.
pub fn fuzz_top_level_roundtrip(data: &[u8]) {
    let ctx = MemoryContext::new(CodecConfig::literal());
    let Ok(value) = from_bytes(&ctx, data) else {
        return;
    };
    if contains_nan(&value) {
        return;
    }
    let roundtrip = |value: &Value| {
        let encoded = to_bytes(&ctx, value).expect("Decoded value must re-encode");
        from_bytes(&ctx, &encoded).expect("Re-encoded value must decode")
    };
    let first = roundtrip(&value);
    let second = roundtrip(&first);
    assert_eq!(first, second, "Roundtrip mismatch");
}

fn contains_nan(value: &Value) -> bool {
    match value {
        Value::Double(f) => f.is_nan(),
        Value::Single(f) => f.is_nan(),
        Value::Array(items) => items.iter().any(contains_nan),
        Value::Object(record) => record.iter().any(|(_, v)| contains_nan(v)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{record_strategy, PropTestConfig};
    use dynobj_core::{BinaryWriter, CodecError, WireError};
    use proptest::prelude::*;

    #[test]
    fn fuzz_targets_survive_edge_inputs() {
        let inputs: [&[u8]; 6] = [
            &[],
            &[0x1f],
            &[0x1e, 0xff, 0xff, 0xff, 0xff, 0x0f],
            &[0xff; 40],
            &[0x00; 17],
            &[0x1f, 0x00, 0x00, 0x01, 0x41, 0x0f],
        ];
        for input in inputs {
            fuzz_top_level_decode(input);
            fuzz_embedded_decode(input);
            fuzz_embedded_roundtrip(input);
            fuzz_top_level_roundtrip(input);
        }
    }

    /// An embedded record holding `depth` nested one-element arrays.
    fn deeply_nested(depth: usize) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        writer.write_bits(31, 6);
        writer.write_bit(false);
        writer.write_str("");
        writer.write_str("Things");
        writer.write_str("f");
        for _ in 0..depth {
            writer.write_bits(30, 6);
            writer.write_var_u64(1);
            writer.write_bits(29, 6);
        }
        writer.into_bytes().to_vec()
    }

    #[test]
    fn fuzz_targets_survive_deep_nesting() {
        let embedded = deeply_nested(200_000);
        let mut framed = vec![0u8; 16];
        let mut len = BinaryWriter::new();
        len.write_var_u64(embedded.len() as u64);
        framed.extend_from_slice(&len.into_bytes());
        framed.extend_from_slice(&embedded);

        for input in [&embedded, &framed] {
            fuzz_top_level_decode(input);
            fuzz_embedded_decode(input);
            fuzz_embedded_roundtrip(input);
            fuzz_top_level_roundtrip(input);
        }

        let err = decode_embedded(&literal_context(), &embedded).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Wire(WireError::NestingTooDeep { .. })
        ));
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn fuzz_random_bytes(data in prop::collection::vec(any::<u8>(), 0..256)) {
            fuzz_top_level_decode(&data);
            fuzz_embedded_decode(&data);
            fuzz_embedded_roundtrip(&data);
            fuzz_top_level_roundtrip(&data);
        }

        #[test]
        fn fuzz_corrupted_records(record in record_strategy(1), flip in any::<prop::sample::Index>()) {
            let ctx = literal_context();
            let mut bytes = encode_embedded(&ctx, &Value::Object(record)).unwrap();
            let i = flip.index(bytes.len());
            bytes[i] ^= 0x5a;
            fuzz_embedded_decode(&bytes);
            fuzz_embedded_roundtrip(&bytes);
        }
    }
}
