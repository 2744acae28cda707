//! Generic record codec.
//!
//! Encodes and decodes any object as a [`Record`], including objects whose
//! concrete type is unknown to the reader. When a decoded type name has a
//! concrete serializer registered, decoding rewinds and hands over to it.
//!
//! ## Layout
//!
//! Top-level values are framed as `guid | varuint length | body`. An object
//! body is:
//!
//! ```text
//! [tag:6] [has_id:1 [guid]] type collection (name tag value)* terminator
//! ```
//!
//! The id bit is only present for embedded objects written after a
//! partial byte, and the collection only for embedded objects. Names are
//! registry codes (`0` terminates) in normalized mode, or strings (empty
//! terminates) in literal mode.

use bytes::Bytes;
use dynobj_wire::{BinaryReader, BinaryWriter};
use tracing::{debug, trace};

use crate::context::SerializerContext;
use crate::dispatch;
use crate::error::{CodecError, CodecResult};
use crate::object_id::ObjectId;
use crate::record::Record;
use crate::serializer::ObjectSerializer;
use crate::tag::{TypeTag, TAG_BITS};
use crate::value::Value;

/// Type name reported by the generic record codec.
pub const GENERIC_TYPE_NAME: &str = "Record";

/// Whether decoding may hand over to a concrete serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Redispatch {
    Allowed,
    Never,
}

/// The serializer used for objects without a dedicated one.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericRecordCodec;

/// Name used for a normalized code when codes are not checked.
fn synthetic_name(scope: Option<&str>, code: u64) -> String {
    match scope {
        Some(scope) => format!("{scope}.{code}"),
        None => code.to_string(),
    }
}

fn read_name(
    reader: &mut BinaryReader<'_>,
    ctx: &dyn SerializerContext,
    scope: Option<&str>,
) -> CodecResult<String> {
    let config = ctx.config();
    if !config.normalized_names {
        return Ok(reader.read_string()?);
    }
    let code = reader.read_var_u64()?;
    if code == 0 {
        Ok(String::new())
    } else if config.check_field_names {
        ctx.field_name(scope, code)
    } else {
        Ok(synthetic_name(scope, code))
    }
}

fn write_name(
    writer: &mut BinaryWriter,
    ctx: &dyn SerializerContext,
    scope: Option<&str>,
    name: &str,
) -> CodecResult<()> {
    if !ctx.config().normalized_names {
        writer.write_str(name);
    } else if name.is_empty() {
        writer.write_var_u64(0);
    } else {
        writer.write_var_u64(ctx.field_code(scope, name)?);
    }
    Ok(())
}

fn write_framed(writer: &mut BinaryWriter, id: ObjectId, body: &[u8]) {
    writer.write_guid(&id.to_uuid());
    writer.write_var_u64(body.len() as u64);
    writer.write_raw(body);
}

impl GenericRecordCodec {
    /// Decodes one value.
    ///
    /// With `tag` set, the caller has already consumed the type tag. With
    /// `embedded` unset, the value is expected to start with its
    /// id/length frame. Each call counts as one nesting level of the
    /// reader.
    pub(crate) fn decode_value(
        reader: &mut BinaryReader<'_>,
        ctx: &dyn SerializerContext,
        tag: Option<TypeTag>,
        embedded: bool,
        redispatch: Redispatch,
    ) -> CodecResult<Value> {
        reader.enter_nested()?;
        let value = Self::decode_nested(reader, ctx, tag, embedded, redispatch);
        reader.exit_nested();
        value
    }

    fn decode_nested(
        reader: &mut BinaryReader<'_>,
        ctx: &dyn SerializerContext,
        tag: Option<TypeTag>,
        embedded: bool,
        redispatch: Redispatch,
    ) -> CodecResult<Value> {
        let start = reader.bookmark();

        let mut object_id = ObjectId::EMPTY;
        if !embedded {
            object_id = ObjectId::from_uuid(reader.read_guid()?);
            reader.skip_var_int()?;
        }

        let data_type = match tag {
            Some(tag) => tag,
            None => dispatch::read_tag(reader)?,
        };
        match data_type {
            TypeTag::Object => {}
            TypeTag::Array => {
                return Err(CodecError::structural("arrays must be embedded in objects"))
            }
            other => return dispatch::read_scalar(reader, other),
        }

        if embedded && reader.bit_offset() > 0 && reader.read_bit()? {
            object_id = ObjectId::from_uuid(reader.read_guid()?);
        }

        let config = ctx.config();
        let (type_code, mut type_name) = if config.normalized_names {
            (reader.read_var_u64()?, String::new())
        } else {
            (0, reader.read_string()?)
        };

        let collection_name = if embedded {
            Some(read_name(reader, ctx, None)?)
        } else {
            reader.collection_name().map(str::to_string)
        }
        .filter(|name| !name.is_empty());

        let scope = collection_name
            .clone()
            .unwrap_or_else(|| config.default_collection_name.clone());

        if type_code != 0 {
            type_name = if config.check_field_names {
                ctx.field_name(Some(&scope), type_code)?
            } else {
                synthetic_name(Some(&scope), type_code)
            };
        }

        if redispatch == Redispatch::Allowed && !type_name.is_empty() {
            if let Some(serializer) = ctx.object_serializer(&type_name) {
                if !serializer.is_generic() {
                    debug!(type_name = %type_name, "handing object to concrete serializer");
                    reader.set_bookmark(start)?;
                    return serializer.deserialize(reader, ctx, tag, embedded);
                }
            }
        }

        let mut record = Record::new();
        if !object_id.is_empty() {
            record.set_object_id(object_id);
        }
        if !type_name.is_empty() {
            record.set_type_name(type_name);
        }
        if let Some(collection_name) = collection_name {
            record.set_collection_name(collection_name);
        }

        loop {
            let field_name = read_name(reader, ctx, Some(&scope))?;
            if field_name.is_empty() {
                break;
            }
            let field_tag = dispatch::read_tag(reader)?;
            let value = dispatch::read_value(reader, ctx, field_tag)?;
            trace!(field = %field_name, tag = %field_tag, "decoded field");
            record.insert(field_name, value);
        }

        Ok(Value::Object(record))
    }

    /// Encodes one value.
    pub(crate) fn encode_value(
        writer: &mut BinaryWriter,
        ctx: &dyn SerializerContext,
        write_type_code: bool,
        embedded: bool,
        value: &Value,
    ) -> CodecResult<()> {
        match value {
            Value::Object(record) => {
                Self::encode_record(writer, ctx, write_type_code, embedded, record)
            }
            Value::Typed(object) => {
                let type_name = object.type_name();
                match ctx.object_serializer(type_name) {
                    Some(serializer) if !serializer.is_generic() => {
                        serializer.serialize(writer, ctx, write_type_code, embedded, value)
                    }
                    _ => Err(CodecError::unresolvable(type_name)),
                }
            }
            Value::Null if !write_type_code => {
                Err(CodecError::structural("null values require a type code"))
            }
            Value::Array(_) if !embedded => {
                Err(CodecError::structural("arrays must be embedded in objects"))
            }
            scalar if embedded => dispatch::write_value(writer, ctx, scalar, write_type_code),
            scalar => {
                let mut body = writer.create_new();
                dispatch::write_value(&mut body, ctx, scalar, write_type_code)?;
                write_framed(writer, ObjectId::EMPTY, &body.get_serialization());
                Ok(())
            }
        }
    }

    /// Encodes a record with the generic layout.
    ///
    /// At top level a record without an id is given a fresh one from
    /// [`SerializerContext::create_guid`].
    pub(crate) fn encode_record(
        writer: &mut BinaryWriter,
        ctx: &dyn SerializerContext,
        write_type_code: bool,
        embedded: bool,
        record: &Record,
    ) -> CodecResult<()> {
        if embedded {
            return Self::write_body(writer, ctx, write_type_code, true, record);
        }

        let mut body = writer.create_new();
        Self::write_body(&mut body, ctx, write_type_code, false, record)?;

        let mut object_id = record.object_id();
        if object_id.is_empty() {
            object_id = ctx.create_guid();
            debug!(object_id = %object_id, "assigned id to top-level record");
        }
        write_framed(writer, object_id, &body.get_serialization());
        Ok(())
    }

    /// Writes an object body.
    ///
    /// An embedded object's id is only written when its tag leaves the
    /// writer inside a byte. A tag that ends on a byte boundary, such as
    /// the fourth 6-bit tag in a row, drops the id from the wire.
    fn write_body(
        writer: &mut BinaryWriter,
        ctx: &dyn SerializerContext,
        write_type_code: bool,
        embedded: bool,
        record: &Record,
    ) -> CodecResult<()> {
        if write_type_code {
            writer.write_bits(TypeTag::Object.code(), TAG_BITS);
        }

        if embedded && writer.bit_offset() > 0 {
            let object_id = record.object_id();
            let has_id = !object_id.is_empty();
            writer.write_bit(has_id);
            if has_id {
                writer.write_guid(&object_id.to_uuid());
            }
        }

        let config = ctx.config();
        let scope = record
            .collection_name()
            .unwrap_or(&config.default_collection_name);

        write_name(writer, ctx, Some(scope), record.type_name().unwrap_or(""))?;
        if embedded {
            write_name(writer, ctx, None, scope)?;
        }

        for (name, value) in record.data_fields() {
            if name.is_empty() {
                return Err(CodecError::structural("field names cannot be empty"));
            }
            write_name(writer, ctx, Some(scope), name)?;
            dispatch::write_value(writer, ctx, value, true)?;
        }
        write_name(writer, ctx, Some(scope), "")
    }

    /// Skips one top-level framed value without decoding it.
    ///
    /// Returns the id from the frame.
    pub fn skip_framed(reader: &mut BinaryReader<'_>) -> CodecResult<ObjectId> {
        let object_id = ObjectId::from_uuid(reader.read_guid()?);
        let len = reader.read_var_u64()?;
        let len = usize::try_from(len).map_err(|_| {
            CodecError::structural(format!("frame length {len} does not fit in memory"))
        })?;
        reader.read_raw(len)?;
        Ok(object_id)
    }
}

impl ObjectSerializer for GenericRecordCodec {
    fn type_name(&self) -> &str {
        GENERIC_TYPE_NAME
    }

    fn is_generic(&self) -> bool {
        true
    }

    fn deserialize(
        &self,
        reader: &mut BinaryReader<'_>,
        ctx: &dyn SerializerContext,
        tag: Option<TypeTag>,
        embedded: bool,
    ) -> CodecResult<Value> {
        Self::decode_value(reader, ctx, tag, embedded, Redispatch::Allowed)
    }

    fn serialize(
        &self,
        writer: &mut BinaryWriter,
        ctx: &dyn SerializerContext,
        write_type_code: bool,
        embedded: bool,
        value: &Value,
    ) -> CodecResult<()> {
        Self::encode_value(writer, ctx, write_type_code, embedded, value)
    }

    fn try_get_field_value(
        &self,
        field_name: &str,
        value: &Value,
        ctx: &dyn SerializerContext,
    ) -> CodecResult<Option<Value>> {
        match value {
            Value::Object(record) => Ok(record.get(field_name).cloned()),
            Value::Typed(object) => match ctx.object_serializer(object.type_name()) {
                Some(serializer) if !serializer.is_generic() => {
                    serializer.try_get_field_value(field_name, value, ctx)
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn has_object_id(&self, value: &Value, ctx: &dyn SerializerContext) -> CodecResult<bool> {
        match value {
            Value::Object(record) => Ok(record.has_object_id()),
            Value::Typed(object) => match ctx.object_serializer(object.type_name()) {
                Some(serializer) if !serializer.is_generic() => serializer.has_object_id(value, ctx),
                _ => Ok(false),
            },
            _ => Ok(false),
        }
    }

    fn try_set_object_id(
        &self,
        value: &mut Value,
        id: ObjectId,
        ctx: &dyn SerializerContext,
    ) -> CodecResult<bool> {
        match value {
            Value::Object(record) => {
                record.set_object_id(id);
                Ok(true)
            }
            Value::Typed(object) => match ctx.object_serializer(object.type_name()) {
                Some(serializer) if !serializer.is_generic() => {
                    serializer.try_set_object_id(value, id, ctx)
                }
                _ => Ok(false),
            },
            _ => Ok(false),
        }
    }

    fn get_object_id(
        &self,
        value: &mut Value,
        insert_if_not_found: bool,
        ctx: &dyn SerializerContext,
    ) -> CodecResult<ObjectId> {
        match value {
            Value::Object(record) => {
                if record.has_object_id() {
                    return Ok(record.object_id());
                }
                if !insert_if_not_found {
                    return Err(CodecError::identity("object has no object id defined"));
                }
                let object_id = ctx.save_new_object(record)?;
                record.set_object_id(object_id);
                debug!(object_id = %object_id, "persisted record to obtain its id");
                Ok(object_id)
            }
            Value::Typed(object) => {
                let type_name = object.type_name().to_string();
                match ctx.object_serializer(&type_name) {
                    Some(serializer) if !serializer.is_generic() => {
                        serializer.get_object_id(value, insert_if_not_found, ctx)
                    }
                    _ => Err(CodecError::identity(format!(
                        "unable to obtain an object id for type {type_name}"
                    ))),
                }
            }
            Value::Null => Err(CodecError::identity("null has no object id")),
            other => Err(CodecError::identity(format!(
                "values of type {} have no object id",
                other.tag()
            ))),
        }
    }

    fn collection_name(&self, value: Option<&Value>, ctx: &dyn SerializerContext) -> CodecResult<String> {
        if let Some(value) = value {
            match value {
                Value::Object(record) => {
                    if let Some(collection) = record.collection_name() {
                        return Ok(collection.to_string());
                    }
                }
                Value::Typed(object) => {
                    if let Some(serializer) = ctx.object_serializer(object.type_name()) {
                        if !serializer.is_generic() {
                            return serializer.collection_name(Some(value), ctx);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(ctx.config().default_collection_name.clone())
    }
}

/// Encodes a value at top level.
///
/// Objects are written with the generic layout, or with their concrete
/// serializer for [`Value::Typed`]. Scalars and null are framed with an
/// empty id. Arrays are rejected.
pub fn to_bytes(ctx: &dyn SerializerContext, value: &Value) -> CodecResult<Bytes> {
    let mut writer = BinaryWriter::new();
    GenericRecordCodec::encode_value(&mut writer, ctx, true, false, value)?;
    Ok(writer.into_bytes())
}

/// Decodes one top-level value.
///
/// The default collection is used as the field name scope.
pub fn from_bytes(ctx: &dyn SerializerContext, data: &[u8]) -> CodecResult<Value> {
    let mut reader = BinaryReader::new(data);
    GenericRecordCodec::decode_value(&mut reader, ctx, None, false, Redispatch::Allowed)
}

/// Decodes one top-level value belonging to `collection`.
pub fn from_bytes_in(ctx: &dyn SerializerContext, data: &[u8], collection: &str) -> CodecResult<Value> {
    let mut reader = BinaryReader::with_collection(data, collection);
    GenericRecordCodec::decode_value(&mut reader, ctx, None, false, Redispatch::Allowed)
}

/// Decodes a sequence of concatenated top-level values.
///
/// Each value is decoded from exactly the bytes its frame claims.
pub fn decode_all(
    ctx: &dyn SerializerContext,
    data: &[u8],
    collection: Option<&str>,
) -> CodecResult<Vec<Value>> {
    let mut values = Vec::new();
    let mut reader = BinaryReader::new(data);
    while !reader.is_empty() {
        let start = reader.position();
        GenericRecordCodec::skip_framed(&mut reader)?;
        let frame = &data[start..reader.position()];
        let value = match collection {
            Some(collection) => from_bytes_in(ctx, frame, collection)?,
            None => from_bytes(ctx, frame)?,
        };
        values.push(value);
    }
    Ok(values)
}
