//! Dynamic value type.

use std::any::Any;
use std::fmt;

use dynobj_wire::{CiString, DateTime, DateTimeOffset, Decimal, TimeSpan};
use uuid::Uuid;

use crate::object_id::ObjectId;
use crate::record::Record;
use crate::tag::TypeTag;

/// A type with a registered name, used to find its serializer.
pub trait NamedType {
    /// Name under which the type's serializer is registered.
    const TYPE_NAME: &'static str;
}

/// A concretely typed object carried inside a [`Value`].
///
/// Implemented automatically for every `NamedType` that is `Clone`,
/// `PartialEq`, `Debug`, `Send` and `Sync`.
pub trait TypedObject: fmt::Debug + Send + Sync {
    /// Name of the concrete type.
    fn type_name(&self) -> &str;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clones into a new box.
    fn clone_boxed(&self) -> Box<dyn TypedObject>;

    /// Compares with another typed object of possibly different type.
    fn eq_dyn(&self, other: &dyn TypedObject) -> bool;
}

impl<T> TypedObject for T
where
    T: NamedType + Any + Clone + PartialEq + fmt::Debug + Send + Sync,
{
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn TypedObject> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn TypedObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

impl Clone for Box<dyn TypedObject> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

impl PartialEq for Box<dyn TypedObject> {
    fn eq(&self, other: &Self) -> bool {
        (**self).eq_dyn(&**other)
    }
}

/// A dynamic value.
///
/// One variant per wire tag, plus [`Value::Object`] for generic records
/// and [`Value::Typed`] for objects whose concrete type has its own
/// registered serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Unsigned byte.
    Byte(u8),
    /// Signed byte.
    SByte(i8),
    /// Fixed-width `i16`.
    Int16(i16),
    /// Fixed-width `i32`.
    Int32(i32),
    /// Fixed-width `i64`.
    Int64(i64),
    /// Fixed-width `u16`.
    UInt16(u16),
    /// Fixed-width `u32`.
    UInt32(u32),
    /// Fixed-width `u64`.
    UInt64(u64),
    /// Variable-length `i16`.
    VarInt16(i16),
    /// Variable-length `i32`.
    VarInt32(i32),
    /// Variable-length `i64`.
    VarInt64(i64),
    /// Variable-length `u16`.
    VarUInt16(u16),
    /// Variable-length `u32`.
    VarUInt32(u32),
    /// Variable-length `u64`.
    VarUInt64(u64),
    /// 96-bit decimal.
    Decimal(Decimal),
    /// Double-precision float.
    Double(f64),
    /// Single-precision float.
    Single(f32),
    /// Date and time.
    DateTime(DateTime),
    /// Date and time with UTC offset.
    DateTimeOffset(DateTimeOffset),
    /// Time span.
    TimeSpan(TimeSpan),
    /// Unicode scalar value.
    Char(char),
    /// UTF-8 string.
    String(String),
    /// Case-insensitive string.
    CiString(CiString),
    /// Enumeration value, carried by name.
    Enum(String),
    /// Byte array.
    ByteArray(Vec<u8>),
    /// GUID.
    Guid(Uuid),
    /// Sequence of values.
    Array(Vec<Value>),
    /// Generic record.
    Object(Record),
    /// Concretely typed object.
    Typed(Box<dyn TypedObject>),
}

impl Value {
    /// Wraps a concretely typed object.
    pub fn typed<T: TypedObject + 'static>(object: T) -> Self {
        Value::Typed(Box::new(object))
    }

    /// Builds an array value.
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// The wire tag this value is written with.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Byte(_) => TypeTag::Byte,
            Value::SByte(_) => TypeTag::SByte,
            Value::Int16(_) => TypeTag::Int16,
            Value::Int32(_) => TypeTag::Int32,
            Value::Int64(_) => TypeTag::Int64,
            Value::UInt16(_) => TypeTag::UInt16,
            Value::UInt32(_) => TypeTag::UInt32,
            Value::UInt64(_) => TypeTag::UInt64,
            Value::VarInt16(_) => TypeTag::VarInt16,
            Value::VarInt32(_) => TypeTag::VarInt32,
            Value::VarInt64(_) => TypeTag::VarInt64,
            Value::VarUInt16(_) => TypeTag::VarUInt16,
            Value::VarUInt32(_) => TypeTag::VarUInt32,
            Value::VarUInt64(_) => TypeTag::VarUInt64,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::Double(_) => TypeTag::Double,
            Value::Single(_) => TypeTag::Single,
            Value::DateTime(_) => TypeTag::DateTime,
            Value::DateTimeOffset(_) => TypeTag::DateTimeOffset,
            Value::TimeSpan(_) => TypeTag::TimeSpan,
            Value::Char(_) => TypeTag::Char,
            Value::String(_) => TypeTag::String,
            Value::CiString(_) => TypeTag::CiString,
            Value::Enum(_) => TypeTag::Enum,
            Value::ByteArray(_) => TypeTag::ByteArray,
            Value::Guid(_) => TypeTag::Guid,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) | Value::Typed(_) => TypeTag::Object,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get any integer variant as an `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(i64::from(*n)),
            Value::SByte(n) => Some(i64::from(*n)),
            Value::Int16(n) | Value::VarInt16(n) => Some(i64::from(*n)),
            Value::Int32(n) | Value::VarInt32(n) => Some(i64::from(*n)),
            Value::Int64(n) | Value::VarInt64(n) => Some(*n),
            Value::UInt16(n) | Value::VarUInt16(n) => Some(i64::from(*n)),
            Value::UInt32(n) | Value::VarUInt32(n) => Some(i64::from(*n)),
            Value::UInt64(n) | Value::VarUInt64(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Get this value as a string slice if it is a string, a
    /// case-insensitive string or an enum name.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            Value::CiString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get this value as a GUID, if it is one.
    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(g) => Some(*g),
            _ => None,
        }
    }

    /// Get this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get this value as a generic record, if it is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Get this value as a mutable generic record, if it is one.
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Downcast a typed object to its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Typed(obj) => obj.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Mutably downcast a typed object to its concrete type.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            Value::Typed(obj) => obj.as_any_mut().downcast_mut::<T>(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Value::Byte(n)
    }
}

impl From<i16> for Value {
    fn from(n: i16) -> Self {
        Value::Int16(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int64(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::UInt32(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<CiString> for Value {
    fn from(s: CiString) -> Self {
        Value::CiString(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::ByteArray(b)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Guid(id.to_uuid())
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Object(r)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl NamedType for Point {
        const TYPE_NAME: &'static str = "Geometry.Point";
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Other;

    impl NamedType for Other {
        const TYPE_NAME: &'static str = "Other";
    }

    #[test]
    fn typed_values_compare_by_concrete_type() {
        let a = Value::typed(Point { x: 1, y: 2 });
        let b = Value::typed(Point { x: 1, y: 2 });
        let c = Value::typed(Point { x: 3, y: 2 });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Value::typed(Other));
    }

    #[test]
    fn typed_values_clone_and_downcast() {
        let mut a = Value::typed(Point { x: 1, y: 2 });
        let b = a.clone();
        a.downcast_mut::<Point>().unwrap().x = 10;
        assert_eq!(b.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
        assert_eq!(a.downcast_ref::<Point>().unwrap().x, 10);
        assert!(a.downcast_ref::<Other>().is_none());
        assert_eq!(a.tag(), TypeTag::Object);
        if let Value::Typed(obj) = &a {
            assert_eq!(obj.type_name(), "Geometry.Point");
        }
    }

    #[test]
    fn value_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(true).is_null());

        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int32(42).as_bool(), None);

        assert_eq!(Value::VarInt32(-42).as_i64(), Some(-42));
        assert_eq!(Value::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(Value::Byte(7).as_i64(), Some(7));

        assert_eq!(Value::Enum("Red".into()).as_str(), Some("Red"));
        assert_eq!(Value::CiString("Abc".into()).as_str(), Some("Abc"));
        assert_eq!(Value::Int16(1).as_str(), None);
    }

    #[test]
    fn tags_follow_variants() {
        assert_eq!(Value::Null.tag(), TypeTag::Null);
        assert_eq!(Value::VarUInt16(1).tag(), TypeTag::VarUInt16);
        assert_eq!(Value::Enum("A".into()).tag(), TypeTag::Enum);
        assert_eq!(Value::Object(Record::new()).tag(), TypeTag::Object);
        assert_eq!(Value::array([1i32, 2]).tag(), TypeTag::Array);
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i64), Value::Int64(42));
        assert_eq!(Value::from(42i32), Value::Int32(42));
        assert_eq!(Value::from(42u32), Value::UInt32(42));
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
        assert_eq!(Value::from(vec![1u8, 2, 3]), Value::ByteArray(vec![1, 2, 3]));
        assert_eq!(Value::from(ObjectId::EMPTY), Value::Guid(Uuid::nil()));
        assert_eq!(Value::from(()), Value::Null);
    }
}
