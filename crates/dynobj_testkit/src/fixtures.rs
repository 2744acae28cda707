//! Test fixtures and context helpers.
//!
//! Provides record-mapped fixture types and convenience functions for
//! encoding values in the common test configurations.

use std::io::Write;
use std::path::Path;

use dynobj_core::{
    decode_all, from_bytes_in, to_bytes, BinaryReader, BinaryWriter, CodecConfig, CodecError,
    CodecResult, GenericRecordCodec, MemoryContext, NamedType, ObjectId, ObjectSerializer,
    Record, RecordMapped, Value,
};
use tempfile::NamedTempFile;

/// Collection [`Person`] records are stored in.
pub const PEOPLE: &str = "People";

/// A postal address. Stored embedded, without an object id.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
}

impl Address {
    /// Creates an address.
    pub fn new(street: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
        }
    }
}

impl NamedType for Address {
    const TYPE_NAME: &'static str = "Address";
}

impl RecordMapped for Address {
    fn to_record(&self) -> Record {
        Record::new()
            .with("Street", self.street.as_str())
            .with("City", self.city.as_str())
    }

    fn from_record(record: &Record) -> CodecResult<Self> {
        Ok(Self {
            street: string_field(record, "Street")?,
            city: string_field(record, "City")?,
        })
    }
}

/// A person with an object id and an optional nested address.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Object id; empty until assigned.
    pub id: ObjectId,
    /// Name.
    pub name: String,
    /// Age in years.
    pub age: i32,
    /// Home address.
    pub address: Option<Address>,
}

impl Person {
    /// Creates a person without an id or address.
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            id: ObjectId::EMPTY,
            name: name.into(),
            age,
            address: None,
        }
    }

    /// Sets the address.
    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Sets the object id.
    #[must_use]
    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }
}

impl NamedType for Person {
    const TYPE_NAME: &'static str = "Person";
}

impl RecordMapped for Person {
    const COLLECTION_NAME: Option<&'static str> = Some(PEOPLE);
    const HAS_OBJECT_ID: bool = true;

    fn to_record(&self) -> Record {
        let address = match &self.address {
            Some(address) => Value::typed(address.clone()),
            None => Value::Null,
        };
        Record::new()
            .with("Name", self.name.as_str())
            .with("Age", self.age)
            .with("Address", address)
    }

    fn from_record(record: &Record) -> CodecResult<Self> {
        let age = match record.get("Age") {
            Some(Value::Int32(age)) => *age,
            other => return Err(CodecError::invalid_value(format!("Age: {other:?}"))),
        };
        let address = match record.get("Address") {
            None | Some(Value::Null) => None,
            Some(Value::Object(address)) => Some(Address::from_record(address)?),
            Some(value) => match value.downcast_ref::<Address>() {
                Some(address) => Some(address.clone()),
                None => return Err(CodecError::invalid_value(format!("Address: {value:?}"))),
            },
        };
        Ok(Self {
            id: record.object_id(),
            name: string_field(record, "Name")?,
            age,
            address,
        })
    }

    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn set_object_id(&mut self, id: ObjectId) {
        self.id = id;
    }
}

fn string_field(record: &Record, name: &str) -> CodecResult<String> {
    record
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CodecError::invalid_value(format!("missing string field {name}")))
}

/// A context with normalized names and the fixture types registered.
pub fn normalized_context() -> MemoryContext {
    registered(MemoryContext::new(CodecConfig::new()))
}

/// A context with literal names and the fixture types registered.
pub fn literal_context() -> MemoryContext {
    registered(MemoryContext::new(CodecConfig::literal()))
}

/// A context with nothing registered, as seen by a reader that does not
/// know the fixture types.
pub fn untyped_context(config: CodecConfig) -> MemoryContext {
    MemoryContext::new(config)
}

fn registered(ctx: MemoryContext) -> MemoryContext {
    ctx.register::<Person>();
    ctx.register::<Address>();
    ctx
}

/// Encodes a value as an embedded, tagged object.
pub fn encode_embedded(ctx: &MemoryContext, value: &Value) -> CodecResult<Vec<u8>> {
    let mut writer = BinaryWriter::new();
    GenericRecordCodec.serialize(&mut writer, ctx, true, true, value)?;
    Ok(writer.into_bytes().to_vec())
}

/// Decodes an embedded, tagged object.
pub fn decode_embedded(ctx: &MemoryContext, data: &[u8]) -> CodecResult<Value> {
    let mut reader = BinaryReader::new(data);
    GenericRecordCodec.deserialize(&mut reader, ctx, None, true)
}

/// Encodes and decodes an embedded value, panicking on error.
pub fn roundtrip_embedded(ctx: &MemoryContext, value: &Value) -> Value {
    let bytes = encode_embedded(ctx, value).expect("Failed to encode embedded value");
    decode_embedded(ctx, &bytes).expect("Failed to decode embedded value")
}

/// Encodes and decodes a top-level value, panicking on error.
pub fn roundtrip_top_level(ctx: &MemoryContext, value: &Value, collection: &str) -> Value {
    let bytes = to_bytes(ctx, value).expect("Failed to encode value");
    from_bytes_in(ctx, &bytes, collection).expect("Failed to decode value")
}

/// Writes top-level values back to back into a temporary file.
pub fn write_stream(ctx: &MemoryContext, values: &[Value]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for value in values {
        let bytes = to_bytes(ctx, value).expect("Failed to encode value");
        file.write_all(&bytes).expect("Failed to write value");
    }
    file.flush().expect("Failed to flush temp file");
    file
}

/// Reads every top-level value from a file.
pub fn read_stream(
    ctx: &MemoryContext,
    path: &Path,
    collection: Option<&str>,
) -> CodecResult<Vec<Value>> {
    let data = std::fs::read(path).expect("Failed to read stream file");
    decode_all(ctx, &data, collection)
}
