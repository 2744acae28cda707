//! # dynobj wire
//!
//! Bit-packed binary primitives used by the dynobj object codec.
//!
//! This crate knows nothing about records or type tags. It provides:
//! - Bit-level packing (least significant bit first)
//! - Fixed-width little-endian integers and floats
//! - Variable-length integers (unsigned LEB128, signed sign-magnitude)
//! - Length-prefixed strings and byte arrays
//! - GUIDs, temporal values and 96-bit decimals
//! - Bookmarks for rewinding a reader
//!
//! ## Usage
//!
//! ```
//! use dynobj_wire::{BinaryReader, BinaryWriter};
//!
//! let mut writer = BinaryWriter::new();
//! writer.write_bits(31, 6);
//! writer.write_str("hello");
//! let bytes = writer.into_bytes();
//!
//! let mut reader = BinaryReader::new(&bytes);
//! assert_eq!(reader.read_bits(6).unwrap(), 31);
//! assert_eq!(reader.read_string().unwrap(), "hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod reader;
mod types;
mod writer;

pub use error::{WireError, WireResult};
pub use reader::{
    BinaryReader, Bookmark, MAX_ARRAY_ELEMENTS, MAX_BYTES_LENGTH, MAX_NESTING_DEPTH,
};
pub use types::{
    CiString, DateTime, DateTimeKind, DateTimeOffset, Decimal, TimeSpan, MAX_DECIMAL_SCALE,
    TICKS_PER_SECOND,
};
pub use uuid::Uuid;
pub use writer::BinaryWriter;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn var_u64_roundtrip(value in any::<u64>()) {
            let mut w = BinaryWriter::new();
            w.write_var_u64(value);
            let bytes = w.into_bytes();
            let mut r = BinaryReader::new(&bytes);
            prop_assert_eq!(r.read_var_u64().unwrap(), value);
            prop_assert!(r.is_empty());
        }

        #[test]
        fn var_i64_roundtrip(value in any::<i64>()) {
            let mut w = BinaryWriter::new();
            w.write_var_i64(value);
            let bytes = w.into_bytes();
            let mut r = BinaryReader::new(&bytes);
            prop_assert_eq!(r.read_var_i64().unwrap(), value);
            prop_assert!(r.is_empty());
        }

        #[test]
        fn interleaved_bits_and_bytes(bits in prop::collection::vec((any::<u32>(), 1u8..=32), 1..16)) {
            let mut w = BinaryWriter::new();
            for (value, count) in &bits {
                w.write_bits(*value, *count);
                w.write_u8(0x5A);
            }
            let bytes = w.into_bytes();
            let mut r = BinaryReader::new(&bytes);
            for (value, count) in &bits {
                let mask = if *count == 32 { u32::MAX } else { (1u32 << count) - 1 };
                prop_assert_eq!(r.read_bits(*count).unwrap(), value & mask);
                prop_assert_eq!(r.read_u8().unwrap(), 0x5A);
            }
        }
    }

    #[test]
    fn guid_roundtrip() {
        let id = Uuid::from_bytes([7; 16]);
        let mut w = BinaryWriter::new();
        w.write_bits(5, 3);
        w.write_guid(&id);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 17);
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(r.read_bits(3).unwrap(), 5);
        assert_eq!(r.read_guid().unwrap(), id);
    }
}
