//! Object serializer trait and the record-mapped adapter for concrete types.

use std::fmt;
use std::marker::PhantomData;

use dynobj_wire::{BinaryReader, BinaryWriter};

use crate::context::SerializerContext;
use crate::error::{CodecError, CodecResult};
use crate::generic::{GenericRecordCodec, Redispatch};
use crate::object_id::ObjectId;
use crate::record::Record;
use crate::tag::TypeTag;
use crate::value::{NamedType, Value};

/// Encodes and decodes objects of one type.
///
/// The generic record codec implements this trait for every type without
/// a dedicated serializer; concrete types register their own.
///
/// # Parameters shared by `serialize` and `deserialize`
///
/// - `embedded`: the object is nested inside another object and is written
///   without the top-level id/length frame.
/// - `tag` / `write_type_code`: whether the 6-bit type tag was already
///   consumed by the caller, or must be written.
pub trait ObjectSerializer: Send + Sync {
    /// Name of the type this serializer handles.
    fn type_name(&self) -> &str;

    /// True for the generic record codec.
    fn is_generic(&self) -> bool {
        false
    }

    /// Decodes one object.
    fn deserialize(
        &self,
        reader: &mut BinaryReader<'_>,
        ctx: &dyn SerializerContext,
        tag: Option<TypeTag>,
        embedded: bool,
    ) -> CodecResult<Value>;

    /// Encodes one object.
    fn serialize(
        &self,
        writer: &mut BinaryWriter,
        ctx: &dyn SerializerContext,
        write_type_code: bool,
        embedded: bool,
        value: &Value,
    ) -> CodecResult<()>;

    /// Gets the value of a named field, if present.
    fn try_get_field_value(
        &self,
        field_name: &str,
        value: &Value,
        ctx: &dyn SerializerContext,
    ) -> CodecResult<Option<Value>>;

    /// Returns true if the object carries a non-empty id.
    fn has_object_id(&self, value: &Value, ctx: &dyn SerializerContext) -> CodecResult<bool>;

    /// Assigns an id. Returns false if the object cannot hold one.
    fn try_set_object_id(
        &self,
        value: &mut Value,
        id: ObjectId,
        ctx: &dyn SerializerContext,
    ) -> CodecResult<bool>;

    /// Returns the object's id.
    ///
    /// If absent and `insert_if_not_found` is set, the object is persisted
    /// through [`SerializerContext::save_new_object`] and the returned id is
    /// stored on it. Otherwise fails with [`CodecError::IdentityError`].
    fn get_object_id(
        &self,
        value: &mut Value,
        insert_if_not_found: bool,
        ctx: &dyn SerializerContext,
    ) -> CodecResult<ObjectId>;

    /// Collection the object belongs to.
    fn collection_name(&self, value: Option<&Value>, ctx: &dyn SerializerContext) -> CodecResult<String>;

    /// Whether a field holds its default value and may be omitted.
    fn is_default_value(&self, _field_name: &str, _value: &Value) -> bool {
        false
    }
}

/// A concrete type that maps to and from a [`Record`].
///
/// Such types are written with the generic record layout, so a reader
/// without the type registered still decodes them as records.
pub trait RecordMapped: NamedType + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Collection the type is stored in. `None` uses the default.
    const COLLECTION_NAME: Option<&'static str> = None;

    /// Whether the type has an object id member.
    const HAS_OBJECT_ID: bool = false;

    /// Converts to a record holding the data fields.
    fn to_record(&self) -> Record;

    /// Rebuilds the type from a decoded record.
    fn from_record(record: &Record) -> CodecResult<Self>;

    /// The object id member.
    fn object_id(&self) -> ObjectId {
        ObjectId::EMPTY
    }

    /// Sets the object id member.
    fn set_object_id(&mut self, _id: ObjectId) {}
}

/// [`ObjectSerializer`] for a [`RecordMapped`] type.
pub struct RecordMappedSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: RecordMapped> RecordMappedSerializer<T> {
    /// Creates the serializer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    fn record_of(object: &T) -> Record {
        let mut record = object.to_record();
        record.set_type_name(T::TYPE_NAME);
        if record.collection_name().is_none() {
            if let Some(collection) = T::COLLECTION_NAME {
                record.set_collection_name(collection);
            }
        }
        if T::HAS_OBJECT_ID && !object.object_id().is_empty() {
            record.set_object_id(object.object_id());
        }
        record
    }

    fn expect_ref(value: &Value) -> CodecResult<&T> {
        value.downcast_ref::<T>().ok_or_else(|| mismatch::<T>(value.tag()))
    }
}

impl<T: RecordMapped> Default for RecordMappedSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RecordMappedSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordMappedSerializer")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

fn mismatch<T: NamedType>(found: TypeTag) -> CodecError {
    CodecError::invalid_value(format!(
        "expected an object of type {}, found {found}",
        T::TYPE_NAME
    ))
}

impl<T: RecordMapped> ObjectSerializer for RecordMappedSerializer<T> {
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn deserialize(
        &self,
        reader: &mut BinaryReader<'_>,
        ctx: &dyn SerializerContext,
        tag: Option<TypeTag>,
        embedded: bool,
    ) -> CodecResult<Value> {
        match GenericRecordCodec::decode_value(reader, ctx, tag, embedded, Redispatch::Never)? {
            Value::Null => Ok(Value::Null),
            Value::Object(record) => {
                let mut object = T::from_record(&record)?;
                if T::HAS_OBJECT_ID && record.has_object_id() {
                    object.set_object_id(record.object_id());
                }
                Ok(Value::typed(object))
            }
            other => Err(mismatch::<T>(other.tag())),
        }
    }

    fn serialize(
        &self,
        writer: &mut BinaryWriter,
        ctx: &dyn SerializerContext,
        write_type_code: bool,
        embedded: bool,
        value: &Value,
    ) -> CodecResult<()> {
        if value.is_null() {
            return GenericRecordCodec::encode_value(writer, ctx, write_type_code, embedded, value);
        }
        let record = Self::record_of(Self::expect_ref(value)?);
        GenericRecordCodec::encode_record(writer, ctx, write_type_code, embedded, &record)
    }

    fn try_get_field_value(
        &self,
        field_name: &str,
        value: &Value,
        _ctx: &dyn SerializerContext,
    ) -> CodecResult<Option<Value>> {
        let record = Self::record_of(Self::expect_ref(value)?);
        Ok(record.get(field_name).cloned())
    }

    fn has_object_id(&self, value: &Value, _ctx: &dyn SerializerContext) -> CodecResult<bool> {
        Ok(T::HAS_OBJECT_ID && !Self::expect_ref(value)?.object_id().is_empty())
    }

    fn try_set_object_id(
        &self,
        value: &mut Value,
        id: ObjectId,
        _ctx: &dyn SerializerContext,
    ) -> CodecResult<bool> {
        if !T::HAS_OBJECT_ID {
            return Ok(false);
        }
        let found = value.tag();
        let Some(object) = value.downcast_mut::<T>() else {
            return Err(mismatch::<T>(found));
        };
        object.set_object_id(id);
        Ok(true)
    }

    fn get_object_id(
        &self,
        value: &mut Value,
        insert_if_not_found: bool,
        ctx: &dyn SerializerContext,
    ) -> CodecResult<ObjectId> {
        if !T::HAS_OBJECT_ID {
            return Err(CodecError::identity(format!(
                "type {} has no object id member",
                T::TYPE_NAME
            )));
        }
        let found = value.tag();
        let Some(object) = value.downcast_mut::<T>() else {
            return Err(mismatch::<T>(found));
        };

        let id = object.object_id();
        if !id.is_empty() {
            return Ok(id);
        }
        if !insert_if_not_found {
            return Err(CodecError::identity("object has no object id defined"));
        }

        let id = ctx.save_new_object(&Self::record_of(object))?;
        object.set_object_id(id);
        Ok(id)
    }

    fn collection_name(&self, value: Option<&Value>, ctx: &dyn SerializerContext) -> CodecResult<String> {
        if let Some(collection) = T::COLLECTION_NAME {
            return Ok(collection.to_string());
        }
        let from_value = value
            .and_then(|v| v.downcast_ref::<T>())
            .and_then(|object| object.to_record().collection_name().map(str::to_string));
        Ok(from_value.unwrap_or_else(|| ctx.config().default_collection_name.clone()))
    }
}
