//! Conversion between decoded values and JSON.
//!
//! The mapping is lossy towards JSON: temporal values become objects of
//! ticks, decimals become strings and byte arrays become number arrays.

use dynobj_core::{Record, Value, OBJECT_ID_FIELD};
use serde_json::{json, Map, Number};
use thiserror::Error;
use uuid::Uuid;

/// Errors converting JSON input into a record.
#[derive(Debug, Error)]
pub enum JsonError {
    /// The input is not a JSON object.
    #[error("expected a JSON object, found {kind}")]
    NotAnObject {
        /// Kind of JSON value found.
        kind: &'static str,
    },

    /// A number fits none of the numeric value types.
    #[error("number {text} cannot be represented")]
    UnrepresentableNumber {
        /// The number as written.
        text: String,
    },
}

fn kind_of(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Converts a decoded value to JSON.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Byte(n) => json!(n),
        Value::SByte(n) => json!(n),
        Value::Int16(n) | Value::VarInt16(n) => json!(n),
        Value::Int32(n) | Value::VarInt32(n) => json!(n),
        Value::Int64(n) | Value::VarInt64(n) => json!(n),
        Value::UInt16(n) | Value::VarUInt16(n) => json!(n),
        Value::UInt32(n) | Value::VarUInt32(n) => json!(n),
        Value::UInt64(n) | Value::VarUInt64(n) => json!(n),
        Value::Decimal(d) => json!(d.to_string()),
        Value::Double(f) => float(*f),
        Value::Single(f) => float(f64::from(*f)),
        Value::DateTime(dt) => json!({ "ticks": dt.ticks, "kind": format!("{:?}", dt.kind) }),
        Value::DateTimeOffset(dto) => json!({ "ticks": dto.ticks, "offset": dto.offset.ticks() }),
        Value::TimeSpan(ts) => json!({ "ticks": ts.ticks() }),
        Value::Char(c) => json!(c.to_string()),
        Value::String(s) | Value::Enum(s) => json!(s),
        Value::CiString(s) => json!(s.as_str()),
        Value::ByteArray(bytes) => json!(bytes),
        Value::Guid(g) => json!(g.to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(record) => {
            let map: Map<String, serde_json::Value> = record
                .iter()
                .map(|(name, value)| (name.to_string(), to_json(value)))
                .collect();
            serde_json::Value::Object(map)
        }
        Value::Typed(object) => json!(format!("{object:?}")),
    }
}

fn float(f: f64) -> serde_json::Value {
    Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// Converts a JSON object into a record.
///
/// A string `ObjectId` that parses as a UUID becomes the record's id.
pub fn record_from_json(json: &serde_json::Value) -> Result<Record, JsonError> {
    let serde_json::Value::Object(map) = json else {
        return Err(JsonError::NotAnObject { kind: kind_of(json) });
    };

    let mut record = Record::with_capacity(map.len());
    for (name, field) in map {
        let value = match field {
            serde_json::Value::String(s) if name == OBJECT_ID_FIELD => match Uuid::parse_str(s) {
                Ok(id) => Value::Guid(id),
                Err(_) => Value::String(s.clone()),
            },
            other => value_from_json(other)?,
        };
        record.insert(name.as_str(), value);
    }
    Ok(record)
}

fn value_from_json(json: &serde_json::Value) -> Result<Value, JsonError> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => number(n)?,
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(
            items
                .iter()
                .map(value_from_json)
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(_) => Value::Object(record_from_json(json)?),
    })
}

fn number(n: &Number) -> Result<Value, JsonError> {
    if let Some(i) = n.as_i64() {
        return Ok(match i32::try_from(i) {
            Ok(small) => Value::Int32(small),
            Err(_) => Value::Int64(i),
        });
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::UInt64(u));
    }
    n.as_f64()
        .map(Value::Double)
        .ok_or_else(|| JsonError::UnrepresentableNumber { text: n.to_string() })
}
