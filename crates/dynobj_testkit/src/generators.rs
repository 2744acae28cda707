//! Property-based test generators using proptest.
//!
//! Provides strategies for generating values and records that survive a
//! round trip: finite floats only, and nested records that name their
//! collection.

use dynobj_core::{
    CiString, DateTime, DateTimeKind, DateTimeOffset, Decimal, ObjectId, Record, TimeSpan, Value,
    COLLECTION_NAME_FIELD,
};
use proptest::prelude::*;

/// Strategy for generating non-empty object ids.
pub fn object_id_strategy() -> impl Strategy<Value = ObjectId> {
    prop::array::uniform16(any::<u8>())
        .prop_filter("Object id must not be empty", |bytes| bytes != &[0u8; 16])
        .prop_map(ObjectId::from_bytes)
}

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-zA-Z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating field names that never clash with the
/// pseudo-fields.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-zA-Z0-9_]{0,15}").expect("Invalid regex")
}

fn decimal_strategy() -> impl Strategy<Value = Decimal> {
    (-(1i128 << 95) + 1..(1i128 << 95), 0u8..=28)
        .prop_filter_map("Decimal out of range", |(mantissa, scale)| {
            Decimal::new(mantissa, scale)
        })
}

fn date_time_strategy() -> impl Strategy<Value = DateTime> {
    (
        0i64..3_155_378_975_999_999_999,
        prop_oneof![
            Just(DateTimeKind::Unspecified),
            Just(DateTimeKind::Utc),
            Just(DateTimeKind::Local)
        ],
    )
        .prop_map(|(ticks, kind)| DateTime::new(ticks, kind))
}

/// Strategy for generating scalar values of every wire type.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<u8>().prop_map(Value::Byte),
        any::<i8>().prop_map(Value::SByte),
        any::<i16>().prop_map(Value::Int16),
        any::<i32>().prop_map(Value::Int32),
        any::<i64>().prop_map(Value::Int64),
        any::<u16>().prop_map(Value::UInt16),
        any::<u32>().prop_map(Value::UInt32),
        any::<u64>().prop_map(Value::UInt64),
        any::<i16>().prop_map(Value::VarInt16),
        any::<i32>().prop_map(Value::VarInt32),
        any::<i64>().prop_map(Value::VarInt64),
        any::<u16>().prop_map(Value::VarUInt16),
        any::<u32>().prop_map(Value::VarUInt32),
        any::<u64>().prop_map(Value::VarUInt64),
        decimal_strategy().prop_map(Value::Decimal),
        (-1.0e12f64..1.0e12).prop_map(Value::Double),
        (-1.0e6f32..1.0e6).prop_map(Value::Single),
        date_time_strategy().prop_map(Value::DateTime),
        (date_time_strategy(), -50_400i64..50_400).prop_map(|(dt, minutes)| {
            Value::DateTimeOffset(DateTimeOffset::new(dt.ticks, TimeSpan::from_seconds(minutes * 60)))
        }),
        any::<i64>().prop_map(|ticks| Value::TimeSpan(TimeSpan(ticks))),
        any::<char>().prop_map(Value::Char),
        ".{0,24}".prop_map(Value::String),
        "[a-zA-Z]{0,12}".prop_map(|s| Value::CiString(CiString::new(s))),
        "[A-Z][a-z]{0,10}".prop_map(Value::Enum),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::ByteArray),
        object_id_strategy().prop_map(|id| Value::Guid(id.to_uuid())),
    ]
}

/// Strategy for generating arrays, homogeneous or mixed.
pub fn array_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(any::<i32>().prop_map(Value::Int32), 0..16).prop_map(Value::Array),
        prop::collection::vec(any::<bool>().prop_map(Value::Bool), 0..16).prop_map(Value::Array),
        prop::collection::vec(scalar_value_strategy(), 0..8).prop_map(Value::Array),
    ]
}

/// Strategy for generating generic records nested up to `depth` levels.
///
/// Records carry no object id; nested records always name their
/// collection, as a decoder will materialize it.
pub fn record_strategy(depth: u32) -> BoxedStrategy<Record> {
    let fields = prop::collection::btree_map(
        field_name_strategy(),
        field_value_strategy(depth),
        0..8,
    );
    fields
        .prop_map(|fields| fields.into_iter().collect::<Record>())
        .boxed()
}

fn field_value_strategy(depth: u32) -> BoxedStrategy<Value> {
    if depth == 0 {
        return prop_oneof![4 => scalar_value_strategy(), 1 => array_value_strategy()].boxed();
    }
    prop_oneof![
        4 => scalar_value_strategy(),
        1 => array_value_strategy(),
        1 => (collection_name_strategy(), record_strategy(depth - 1)).prop_map(|(collection, record)| {
            Value::Object(record.with(COLLECTION_NAME_FIELD, collection))
        }),
    ]
    .boxed()
}

/// Strategy for generating top-level records: an id, an optional
/// collection and nested data.
pub fn top_level_record_strategy() -> impl Strategy<Value = Record> {
    (object_id_strategy(), record_strategy(2)).prop_map(|(id, mut record)| {
        record.set_object_id(id);
        record
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynobj_core::is_pseudo_field;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn object_ids_are_never_empty(id in object_id_strategy()) {
            prop_assert!(!id.is_empty());
        }

        #[test]
        fn field_names_avoid_pseudo_fields(name in field_name_strategy()) {
            prop_assert!(!name.is_empty());
            prop_assert!(!is_pseudo_field(&name));
        }

        #[test]
        fn scalars_are_not_compound(value in scalar_value_strategy()) {
            prop_assert!(value.as_array().is_none());
            prop_assert!(value.as_record().is_none());
        }

        #[test]
        fn nested_records_name_collection(record in record_strategy(2)) {
            for (_, value) in record.data_fields() {
                if let Some(nested) = value.as_record() {
                    prop_assert!(nested.collection_name().is_some());
                }
            }
        }
    }
}
