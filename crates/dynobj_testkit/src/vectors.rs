//! Byte-exact test vectors.
//!
//! These vectors pin the wire format so that independent implementations
//! can be checked against the same bytes. All vectors use literal names,
//! which need no shared registry.

use dynobj_core::{CodecConfig, CodecResult, MemoryContext, Record, Value};
use serde::{Deserialize, Serialize};

use crate::fixtures::{decode_embedded, encode_embedded};

/// A test vector that can be shared across implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the bytes are a top-level frame rather than an embedded value.
    pub top_level: bool,
    /// Encoded bytes (hex).
    pub hex: String,
    /// Expected decode error message (if decoding should fail).
    pub expected_error: Option<String>,
}

/// A vector together with the value it encodes.
#[derive(Debug, Clone)]
pub struct ValueVector {
    /// The shareable vector.
    pub vector: TestVector,
    /// The value the bytes decode to.
    pub value: Value,
}

const EMPTY_GUID_HEX: &str = "00000000000000000000000000000000";

fn vector(id: &str, description: &str, top_level: bool, hex: String) -> TestVector {
    TestVector {
        id: id.into(),
        description: description.into(),
        top_level,
        hex,
        expected_error: None,
    }
}

/// Vectors for values that encode deterministically.
///
/// Top-level records are excluded, since they are framed with a freshly
/// minted id.
pub fn value_vectors() -> Vec<ValueVector> {
    vec![
        ValueVector {
            vector: vector(
                "embedded_record",
                "Record {CollectionName: Foo, Name: Alice} with literal names",
                false,
                "1f00".to_string() + "03466f6f" + "044e616d65" + "0f05416c696365" + "00",
            ),
            value: Value::Object(
                Record::new()
                    .with("CollectionName", "Foo")
                    .with("Name", "Alice"),
            ),
        },
        ValueVector {
            vector: vector("embedded_true", "Boolean true: tag then one bit", false, "40".into()),
            value: Value::Bool(true),
        },
        ValueVector {
            vector: vector(
                "embedded_var_int32_minus_one",
                "VarInt32 -1: sign bit set, magnitude one",
                false,
                "1641".into(),
            ),
            value: Value::VarInt32(-1),
        },
        ValueVector {
            vector: vector(
                "embedded_null",
                "Null: the bare tag",
                false,
                "1d".into(),
            ),
            value: Value::Null,
        },
        ValueVector {
            vector: vector(
                "top_level_null",
                "Null framed with the empty id",
                true,
                format!("{EMPTY_GUID_HEX}011d"),
            ),
            value: Value::Null,
        },
        ValueVector {
            vector: vector(
                "top_level_int32",
                "Int32 42 framed with the empty id",
                true,
                format!("{EMPTY_GUID_HEX}05032a000000"),
            ),
            value: Value::Int32(42),
        },
    ]
}

/// Vectors for inputs that must fail to decode.
pub fn error_vectors() -> Vec<TestVector> {
    let failing = |id: &str, description: &str, hex: &str, error: &str| TestVector {
        id: id.into(),
        description: description.into(),
        top_level: false,
        hex: hex.into(),
        expected_error: Some(error.into()),
    };
    vec![
        failing("reserved_tag_27", "Reserved tag 27", "1b", "unrecognized data type: 27"),
        failing("reserved_tag_28", "Reserved tag 28", "1c", "unrecognized data type: 28"),
        failing(
            "truncated_string",
            "String claiming five bytes with two present",
            "0f05416c",
            "unexpected end of input",
        ),
        failing(
            "invalid_date_time_kind",
            "DateTime with kind bits 3",
            "cc0000000000000000",
            "invalid date/time kind: 3",
        ),
        failing(
            "unterminated_record",
            "Record with no field terminator",
            "1f0003466f6f",
            "unexpected end of input",
        ),
    ]
}

/// Encodes bytes as lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decodes a hex string.
pub fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Decodes a vector's bytes with literal names.
pub fn decode_vector(vector: &TestVector) -> CodecResult<Value> {
    let ctx = MemoryContext::new(CodecConfig::literal());
    let bytes = hex_decode(&vector.hex).unwrap_or_default();
    if vector.top_level {
        dynobj_core::from_bytes(&ctx, &bytes)
    } else {
        decode_embedded(&ctx, &bytes)
    }
}

/// Encodes a value the way a vector expects, with literal names.
pub fn encode_vector(value: &Value, top_level: bool) -> CodecResult<Vec<u8>> {
    let ctx = MemoryContext::new(CodecConfig::literal());
    if top_level {
        Ok(dynobj_core::to_bytes(&ctx, value)?.to_vec())
    } else {
        encode_embedded(&ctx, value)
    }
}

/// Serializes all vectors as JSON.
pub fn vectors_json() -> String {
    let mut all: Vec<TestVector> = value_vectors().into_iter().map(|v| v.vector).collect();
    all.extend(error_vectors());
    serde_json::to_string_pretty(&all).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_vectors_encode_exactly() {
        for ValueVector { vector, value } in value_vectors() {
            let bytes = encode_vector(&value, vector.top_level).unwrap();
            assert_eq!(hex_encode(&bytes), vector.hex, "vector {}", vector.id);
        }
    }

    #[test]
    fn value_vectors_decode_exactly() {
        for ValueVector { vector, value } in value_vectors() {
            assert_eq!(decode_vector(&vector).unwrap(), value, "vector {}", vector.id);
        }
    }

    #[test]
    fn error_vectors_fail() {
        for vector in error_vectors() {
            let err = decode_vector(&vector).unwrap_err();
            let expected = vector.expected_error.as_deref().unwrap();
            assert!(
                err.to_string().contains(expected),
                "vector {}: {err}",
                vector.id
            );
        }
    }

    #[test]
    fn hex_roundtrip() {
        assert_eq!(hex_decode("00ff1a"), Some(vec![0x00, 0xff, 0x1a]));
        assert_eq!(hex_encode(&[0xde, 0xad]), "dead");
        assert_eq!(hex_decode("abc"), None);
        assert_eq!(hex_decode("zz"), None);
    }

    #[test]
    fn vectors_export_as_json() {
        let json = vectors_json();
        let parsed: Vec<TestVector> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), value_vectors().len() + error_vectors().len());
        assert!(parsed.iter().any(|v| v.id == "embedded_record"));
    }
}
