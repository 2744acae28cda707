//! The 6-bit type tag enumeration.

use std::fmt;

use crate::error::{CodecError, CodecResult};

/// Number of bits a type tag occupies on the wire.
pub const TAG_BITS: u8 = 6;

/// Identifies the shape of the value that follows in the stream.
///
/// Codes 27 and 28 are reserved for index range markers and never appear
/// in a value stream. Field-name codes live in a separate numbering space,
/// so the field terminator `0` never collides with [`TypeTag::Boolean`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// Single bit.
    Boolean = 0,
    /// Unsigned byte.
    Byte = 1,
    /// Fixed-width `i16`.
    Int16 = 2,
    /// Fixed-width `i32`.
    Int32 = 3,
    /// Fixed-width `i64`.
    Int64 = 4,
    /// Signed byte.
    SByte = 5,
    /// Fixed-width `u16`.
    UInt16 = 6,
    /// Fixed-width `u32`.
    UInt32 = 7,
    /// Fixed-width `u64`.
    UInt64 = 8,
    /// 96-bit decimal.
    Decimal = 9,
    /// `f64`.
    Double = 10,
    /// `f32`.
    Single = 11,
    /// Date and time.
    DateTime = 12,
    /// Time span.
    TimeSpan = 13,
    /// Unicode scalar value.
    Char = 14,
    /// UTF-8 string.
    String = 15,
    /// Enumeration value, written as its name.
    Enum = 16,
    /// Length-prefixed bytes.
    ByteArray = 17,
    /// 16-byte GUID.
    Guid = 18,
    /// Date and time with UTC offset.
    DateTimeOffset = 19,
    /// Case-insensitive string.
    CiString = 20,
    /// Variable-length `i16`.
    VarInt16 = 21,
    /// Variable-length `i32`.
    VarInt32 = 22,
    /// Variable-length `i64`.
    VarInt64 = 23,
    /// Variable-length `u16`.
    VarUInt16 = 24,
    /// Variable-length `u32`.
    VarUInt32 = 25,
    /// Variable-length `u64`.
    VarUInt64 = 26,
    /// Null, with no payload.
    Null = 29,
    /// Sequence of values; only legal inside objects.
    Array = 30,
    /// Nested record.
    Object = 31,
}

impl TypeTag {
    /// Maps a raw 6-bit code to a tag.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::Boolean,
            1 => Self::Byte,
            2 => Self::Int16,
            3 => Self::Int32,
            4 => Self::Int64,
            5 => Self::SByte,
            6 => Self::UInt16,
            7 => Self::UInt32,
            8 => Self::UInt64,
            9 => Self::Decimal,
            10 => Self::Double,
            11 => Self::Single,
            12 => Self::DateTime,
            13 => Self::TimeSpan,
            14 => Self::Char,
            15 => Self::String,
            16 => Self::Enum,
            17 => Self::ByteArray,
            18 => Self::Guid,
            19 => Self::DateTimeOffset,
            20 => Self::CiString,
            21 => Self::VarInt16,
            22 => Self::VarInt32,
            23 => Self::VarInt64,
            24 => Self::VarUInt16,
            25 => Self::VarUInt32,
            26 => Self::VarUInt64,
            29 => Self::Null,
            30 => Self::Array,
            31 => Self::Object,
            _ => return None,
        })
    }

    /// Like [`from_code`](Self::from_code), failing with
    /// [`CodecError::MalformedTag`].
    pub fn parse(code: u32) -> CodecResult<Self> {
        Self::from_code(code).ok_or(CodecError::MalformedTag { tag: code })
    }

    /// The raw 6-bit code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
