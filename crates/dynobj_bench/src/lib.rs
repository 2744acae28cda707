//! Benchmark utilities.

#![warn(missing_docs)]

use dynobj_core::{ObjectId, Record, Value, COLLECTION_NAME_FIELD};

/// A flat record with a handful of common field types.
pub fn simple_record() -> Record {
    let mut record = Record::new()
        .with("Name", "Alice")
        .with("Email", "alice@example.com")
        .with("Age", 30i32)
        .with("Active", true)
        .with("Score", Value::Double(98.5));
    record.set_object_id(ObjectId::new_random());
    record
}

/// A record nested `depth` levels deep with `width` fields per level.
pub fn nested_record(depth: usize, width: usize) -> Record {
    let mut record = Record::new().with(COLLECTION_NAME_FIELD, "Bench");
    for i in 0..width {
        let value = if depth == 0 {
            Value::from(format!("leaf_{i}"))
        } else {
            Value::Object(nested_record(depth - 1, width))
        };
        record.insert(format!("key_{i}"), value);
    }
    record
}

/// A record holding one homogeneous and one mixed array of `len` items.
pub fn array_record(len: usize) -> Record {
    let homogeneous: Vec<Value> = (0..len).map(|i| Value::Int32(i as i32)).collect();
    let mixed: Vec<Value> = (0..len)
        .map(|i| match i % 3 {
            0 => Value::Int64(i as i64),
            1 => Value::from(format!("item_{i}")),
            _ => Value::Null,
        })
        .collect();
    let mut record = Record::new()
        .with("Numbers", Value::Array(homogeneous))
        .with("Mixed", Value::Array(mixed));
    record.set_object_id(ObjectId::new_random());
    record
}

/// A record with `count` scalar fields named `field_{i}`.
pub fn wide_record(count: usize) -> Record {
    let mut record: Record = (0..count)
        .map(|i| (format!("field_{i}"), Value::VarInt64(i as i64 * 1_000)))
        .collect();
    record.set_object_id(ObjectId::new_random());
    record
}
