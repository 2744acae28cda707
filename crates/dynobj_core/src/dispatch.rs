//! Tag-driven value dispatch for scalars and arrays.
//!
//! Objects are routed back into the generic record codec (or a concrete
//! serializer found through the context).

use dynobj_wire::{BinaryReader, BinaryWriter};

use crate::context::SerializerContext;
use crate::error::{CodecError, CodecResult};
use crate::generic::{GenericRecordCodec, Redispatch};
use crate::tag::{TypeTag, TAG_BITS};
use crate::value::Value;

/// Reads a 6-bit tag.
pub(crate) fn read_tag(reader: &mut BinaryReader<'_>) -> CodecResult<TypeTag> {
    TypeTag::parse(reader.read_bits(TAG_BITS)?)
}

/// Reads the payload of a non-compound value whose tag has been consumed.
pub(crate) fn read_scalar(reader: &mut BinaryReader<'_>, tag: TypeTag) -> CodecResult<Value> {
    Ok(match tag {
        TypeTag::Null => Value::Null,
        TypeTag::Boolean => Value::Bool(reader.read_bit()?),
        TypeTag::Byte => Value::Byte(reader.read_u8()?),
        TypeTag::SByte => Value::SByte(reader.read_i8()?),
        TypeTag::Int16 => Value::Int16(reader.read_i16()?),
        TypeTag::Int32 => Value::Int32(reader.read_i32()?),
        TypeTag::Int64 => Value::Int64(reader.read_i64()?),
        TypeTag::UInt16 => Value::UInt16(reader.read_u16()?),
        TypeTag::UInt32 => Value::UInt32(reader.read_u32()?),
        TypeTag::UInt64 => Value::UInt64(reader.read_u64()?),
        TypeTag::VarInt16 => Value::VarInt16(reader.read_var_i16()?),
        TypeTag::VarInt32 => Value::VarInt32(reader.read_var_i32()?),
        TypeTag::VarInt64 => Value::VarInt64(reader.read_var_i64()?),
        TypeTag::VarUInt16 => Value::VarUInt16(reader.read_var_u16()?),
        TypeTag::VarUInt32 => Value::VarUInt32(reader.read_var_u32()?),
        TypeTag::VarUInt64 => Value::VarUInt64(reader.read_var_u64()?),
        TypeTag::Decimal => Value::Decimal(reader.read_decimal()?),
        TypeTag::Double => Value::Double(reader.read_f64()?),
        TypeTag::Single => Value::Single(reader.read_f32()?),
        TypeTag::DateTime => Value::DateTime(reader.read_date_time()?),
        TypeTag::DateTimeOffset => Value::DateTimeOffset(reader.read_date_time_offset()?),
        TypeTag::TimeSpan => Value::TimeSpan(reader.read_time_span()?),
        TypeTag::Char => Value::Char(reader.read_char()?),
        TypeTag::String => Value::String(reader.read_string()?),
        TypeTag::CiString => Value::CiString(reader.read_ci_string()?),
        TypeTag::Enum => Value::Enum(reader.read_string()?),
        TypeTag::ByteArray => Value::ByteArray(reader.read_byte_array()?),
        TypeTag::Guid => Value::Guid(reader.read_guid()?),
        TypeTag::Array | TypeTag::Object => {
            return Err(CodecError::structural(format!(
                "{tag} is not valid as a homogeneous array element type"
            )))
        }
    })
}

/// Reads a field or array element value whose tag has been consumed.
pub(crate) fn read_value(
    reader: &mut BinaryReader<'_>,
    ctx: &dyn SerializerContext,
    tag: TypeTag,
) -> CodecResult<Value> {
    match tag {
        TypeTag::Array => read_array(reader, ctx),
        TypeTag::Object => {
            GenericRecordCodec::decode_value(reader, ctx, Some(tag), true, Redispatch::Allowed)
        }
        _ => read_scalar(reader, tag),
    }
}

/// Reads an array: element count, element tag, then the elements.
///
/// A `Null` element tag marks a heterogeneous array where every element
/// carries its own tag.
pub(crate) fn read_array(reader: &mut BinaryReader<'_>, ctx: &dyn SerializerContext) -> CodecResult<Value> {
    reader.enter_nested()?;
    let items = read_elements(reader, ctx);
    reader.exit_nested();
    items.map(Value::Array)
}

fn read_elements(reader: &mut BinaryReader<'_>, ctx: &dyn SerializerContext) -> CodecResult<Vec<Value>> {
    let count = reader.read_element_count()?;
    let element_tag = read_tag(reader)?;

    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let item = if element_tag == TypeTag::Null {
            let tag = read_tag(reader)?;
            read_value(reader, ctx, tag)?
        } else {
            read_scalar(reader, element_tag)?
        };
        items.push(item);
    }
    Ok(items)
}

/// Writes a field or array element value, with its tag if requested.
pub(crate) fn write_value(
    writer: &mut BinaryWriter,
    ctx: &dyn SerializerContext,
    value: &Value,
    write_type_code: bool,
) -> CodecResult<()> {
    if matches!(value, Value::Object(_) | Value::Typed(_)) {
        return GenericRecordCodec::encode_value(writer, ctx, write_type_code, true, value);
    }
    if write_type_code {
        writer.write_bits(value.tag().code(), TAG_BITS);
    }
    write_payload(writer, ctx, value)
}

fn write_payload(writer: &mut BinaryWriter, ctx: &dyn SerializerContext, value: &Value) -> CodecResult<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => writer.write_bit(*b),
        Value::Byte(n) => writer.write_u8(*n),
        Value::SByte(n) => writer.write_i8(*n),
        Value::Int16(n) => writer.write_i16(*n),
        Value::Int32(n) => writer.write_i32(*n),
        Value::Int64(n) => writer.write_i64(*n),
        Value::UInt16(n) => writer.write_u16(*n),
        Value::UInt32(n) => writer.write_u32(*n),
        Value::UInt64(n) => writer.write_u64(*n),
        Value::VarInt16(n) => writer.write_var_i16(*n),
        Value::VarInt32(n) => writer.write_var_i32(*n),
        Value::VarInt64(n) => writer.write_var_i64(*n),
        Value::VarUInt16(n) => writer.write_var_u16(*n),
        Value::VarUInt32(n) => writer.write_var_u32(*n),
        Value::VarUInt64(n) => writer.write_var_u64(*n),
        Value::Decimal(d) => writer.write_decimal(d),
        Value::Double(f) => writer.write_f64(*f),
        Value::Single(f) => writer.write_f32(*f),
        Value::DateTime(dt) => writer.write_date_time(dt),
        Value::DateTimeOffset(dto) => writer.write_date_time_offset(dto),
        Value::TimeSpan(ts) => writer.write_time_span(*ts),
        Value::Char(c) => writer.write_char(*c),
        Value::String(s) | Value::Enum(s) => writer.write_str(s),
        Value::CiString(s) => writer.write_ci_str(s),
        Value::ByteArray(b) => writer.write_byte_array(b),
        Value::Guid(g) => writer.write_guid(g),
        Value::Array(items) => write_array(writer, ctx, items)?,
        Value::Object(_) | Value::Typed(_) => {
            return Err(CodecError::structural("objects must be written with their own serializer"))
        }
    }
    Ok(())
}

/// Tag shared by every element, if the array is non-empty and all its
/// elements are scalars of the same type.
fn homogeneous_tag(items: &[Value]) -> Option<TypeTag> {
    let tag = items.first()?.tag();
    if matches!(tag, TypeTag::Null | TypeTag::Array | TypeTag::Object) {
        return None;
    }
    items.iter().all(|item| item.tag() == tag).then_some(tag)
}

fn write_array(writer: &mut BinaryWriter, ctx: &dyn SerializerContext, items: &[Value]) -> CodecResult<()> {
    writer.write_var_u64(items.len() as u64);
    match homogeneous_tag(items) {
        Some(tag) => {
            writer.write_bits(tag.code(), TAG_BITS);
            for item in items {
                write_payload(writer, ctx, item)?;
            }
        }
        None => {
            writer.write_bits(TypeTag::Null.code(), TAG_BITS);
            for item in items {
                write_value(writer, ctx, item, true)?;
            }
        }
    }
    Ok(())
}
