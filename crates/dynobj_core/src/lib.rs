//! # dynobj core
//!
//! Self-describing binary encoding of dynamic objects.
//!
//! This crate provides:
//! - A dynamic [`Value`] model with generic [`Record`]s
//! - The generic record codec, which can decode objects whose concrete
//!   type is unknown to the reader
//! - Hand-over to concrete serializers registered by type name
//! - Normalized (registry code) or literal field names
//! - Object identity: reading, assigning and minting object ids
//!
//! ## Wire Rules
//!
//! - Every value is preceded by a 6-bit type tag
//! - Top-level values are framed by a GUID and a length prefix
//! - Records end with a `0` field code or an empty field name
//! - Arrays are only legal inside objects
//!
//! ## Usage
//!
//! ```
//! use dynobj_core::{from_bytes, to_bytes, MemoryContext, ObjectId, Record, Value};
//!
//! let ctx = MemoryContext::default();
//!
//! let mut record = Record::new().with("Name", "Alice").with("Age", 30i32);
//! record.set_object_id(ObjectId::new_random());
//! let value = Value::Object(record);
//!
//! let bytes = to_bytes(&ctx, &value).unwrap();
//! let decoded = from_bytes(&ctx, &bytes).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod dispatch;
mod error;
mod generic;
mod object_id;
mod record;
mod registry;
mod resolver;
mod serializer;
mod tag;
mod value;

pub use config::{CodecConfig, DEFAULT_COLLECTION_NAME};
pub use context::{MemoryContext, SerializerContext};
pub use error::{CodecError, CodecResult};
pub use generic::{decode_all, from_bytes, from_bytes_in, to_bytes, GenericRecordCodec, GENERIC_TYPE_NAME};
pub use object_id::ObjectId;
pub use record::{is_pseudo_field, Record, COLLECTION_NAME_FIELD, OBJECT_ID_FIELD, TYPE_NAME_FIELD};
pub use registry::FieldNameRegistry;
pub use resolver::TypeRegistry;
pub use serializer::{ObjectSerializer, RecordMapped, RecordMappedSerializer};
pub use tag::{TypeTag, TAG_BITS};
pub use value::{NamedType, TypedObject, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use dynobj_wire::{
    BinaryReader, BinaryWriter, CiString, DateTime, DateTimeKind, DateTimeOffset, Decimal,
    TimeSpan, WireError, MAX_NESTING_DEPTH,
};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        id: ObjectId,
        x: i32,
        y: i32,
    }

    impl NamedType for Point {
        const TYPE_NAME: &'static str = "Point";
    }

    impl RecordMapped for Point {
        const COLLECTION_NAME: Option<&'static str> = Some("Points");
        const HAS_OBJECT_ID: bool = true;

        fn to_record(&self) -> Record {
            Record::new().with("X", self.x).with("Y", self.y)
        }

        fn from_record(record: &Record) -> CodecResult<Self> {
            let coord = |name: &str| match record.get(name) {
                Some(Value::Int32(n)) => Ok(*n),
                other => Err(CodecError::invalid_value(format!("{name}: {other:?}"))),
            };
            Ok(Point {
                id: record.object_id(),
                x: coord("X")?,
                y: coord("Y")?,
            })
        }

        fn object_id(&self) -> ObjectId {
            self.id
        }

        fn set_object_id(&mut self, id: ObjectId) {
            self.id = id;
        }
    }

    fn point(x: i32, y: i32) -> Point {
        Point {
            id: ObjectId::EMPTY,
            x,
            y,
        }
    }

    #[test]
    fn typed_value_roundtrip() {
        let ctx = MemoryContext::default();
        ctx.register::<Point>();

        let mut p = point(1, 2);
        p.id = ObjectId::new_random();
        let value = Value::typed(p.clone());

        let bytes = to_bytes(&ctx, &value).unwrap();
        let decoded = from_bytes_in(&ctx, &bytes, "Points").unwrap();
        assert_eq!(decoded.downcast_ref::<Point>(), Some(&p));
    }

    #[test]
    fn unregistered_reader_sees_a_record() {
        let writer_ctx = MemoryContext::new(CodecConfig::literal());
        writer_ctx.register::<Point>();
        let holder = Value::Object(
            Record::new()
                .with(COLLECTION_NAME_FIELD, "Shapes")
                .with("Origin", Value::typed(point(3, 4))),
        );
        let mut writer = BinaryWriter::new();
        GenericRecordCodec
            .serialize(&mut writer, &writer_ctx, true, true, &holder)
            .unwrap();
        let bytes = writer.into_bytes();

        let reader_ctx = MemoryContext::new(CodecConfig::literal());
        let mut reader = BinaryReader::new(&bytes);
        let decoded = GenericRecordCodec
            .deserialize(&mut reader, &reader_ctx, None, true)
            .unwrap();
        let origin = decoded.as_record().unwrap().get("Origin").unwrap();
        let origin = origin.as_record().unwrap();
        assert_eq!(origin.type_name(), Some("Point"));
        assert_eq!(origin.collection_name(), Some("Points"));
        assert_eq!(origin.get("X"), Some(&Value::Int32(3)));

        // once registered, the same bytes decode to the concrete type
        reader_ctx.register::<Point>();
        let mut reader = BinaryReader::new(&bytes);
        let decoded = GenericRecordCodec
            .deserialize(&mut reader, &reader_ctx, None, true)
            .unwrap();
        let origin = decoded.as_record().unwrap().get("Origin").unwrap();
        assert_eq!(origin.downcast_ref::<Point>(), Some(&point(3, 4)));
    }

    #[test]
    fn unresolvable_typed_value() {
        let ctx = MemoryContext::default();
        let err = to_bytes(&ctx, &Value::typed(point(0, 0))).unwrap_err();
        assert_eq!(err, CodecError::unresolvable("Point"));
    }

    #[test]
    fn typed_object_id_is_saved_once() {
        let ctx = MemoryContext::default();
        ctx.register::<Point>();
        let codec = GenericRecordCodec;
        let mut value = Value::typed(point(5, 6));

        assert!(!codec.has_object_id(&value, &ctx).unwrap());
        let id = codec.get_object_id(&mut value, true, &ctx).unwrap();
        assert_eq!(ctx.save_count(), 1);
        assert_eq!(value.downcast_ref::<Point>().unwrap().id, id);
        assert_eq!(codec.get_object_id(&mut value, true, &ctx).unwrap(), id);
        assert_eq!(ctx.save_count(), 1);

        let stored = ctx.load(id).unwrap();
        let reloaded = from_bytes_in(&ctx, &stored, "Points").unwrap();
        assert_eq!(reloaded.downcast_ref::<Point>().unwrap().id, id);
        assert_eq!(
            codec.collection_name(Some(&value), &ctx).unwrap(),
            "Points"
        );
    }

    #[test]
    fn redispatch_is_idempotent() {
        let ctx = MemoryContext::default();
        ctx.register::<Point>();
        let mut p = point(7, 8);
        p.id = ObjectId::new_random();

        let first = to_bytes(&ctx, &Value::typed(p)).unwrap();
        let decoded = from_bytes_in(&ctx, &first, "Points").unwrap();
        let second = to_bytes(&ctx, &decoded).unwrap();
        assert_eq!(first, second);
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::Int32),
            any::<i64>().prop_map(Value::VarInt64),
            any::<u16>().prop_map(Value::VarUInt16),
            any::<char>().prop_map(Value::Char),
            "[a-z]{0,12}".prop_map(Value::String),
            proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::ByteArray),
            Just(Value::Null),
        ]
    }

    proptest! {
        #[test]
        fn flat_records_roundtrip(
            fields in proptest::collection::btree_map("[A-Z][a-z]{0,8}", scalar(), 0..8),
            normalized in any::<bool>(),
        ) {
            let ctx = MemoryContext::new(CodecConfig::new().normalized_names(normalized));
            let mut record: Record = fields.into_iter().collect();
            record.set_object_id(ObjectId::new_random());
            let value = Value::Object(record);

            let bytes = to_bytes(&ctx, &value).unwrap();
            prop_assert_eq!(from_bytes(&ctx, &bytes).unwrap(), value);
        }
    }
}
