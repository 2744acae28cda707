//! Bit-packed binary reader.

use uuid::Uuid;

use crate::error::{WireError, WireResult};
use crate::types::{CiString, DateTime, DateTimeKind, DateTimeOffset, Decimal, TimeSpan};

/// Maximum allowed byte/string length.
/// This prevents allocation-based DoS from untrusted input.
pub const MAX_BYTES_LENGTH: u64 = 256 * 1024 * 1024;

/// Maximum allowed element count for arrays.
pub const MAX_ARRAY_ELEMENTS: u64 = 16 * 1024 * 1024;

/// Maximum nesting of compound values (arrays and embedded objects).
/// Decoding recurses once per level, so this bounds stack use.
pub const MAX_NESTING_DEPTH: u32 = 64;

/// A saved reader position.
///
/// Restoring a bookmark puts the reader back exactly where it was,
/// including any partially consumed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    position: usize,
    bits: u8,
    bit_offset: u8,
}

impl Bookmark {
    /// Byte position of the bookmark.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// A binary reader mirroring [`crate::BinaryWriter`].
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    bits: u8,
    bit_offset: u8,
    depth: u32,
    collection_name: Option<String>,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bits: 0,
            bit_offset: 0,
            depth: 0,
            collection_name: None,
        }
    }

    /// Create a reader positioned in a named collection.
    pub fn with_collection(data: &'a [u8], collection_name: impl Into<String>) -> Self {
        let mut reader = Self::new(data);
        reader.collection_name = Some(collection_name.into());
        reader
    }

    /// Collection the data being read belongs to, if known.
    pub fn collection_name(&self) -> Option<&str> {
        self.collection_name.as_deref()
    }

    /// Position inside the current byte, in bits (0 means byte aligned).
    pub fn bit_offset(&self) -> u8 {
        self.bit_offset
    }

    /// Byte position of the next byte-aligned read.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// Current nesting depth of compound values.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Enters one level of compound value, enforcing [`MAX_NESTING_DEPTH`].
    ///
    /// Every successful call must be paired with [`exit_nested`](Self::exit_nested).
    pub fn enter_nested(&mut self) -> WireResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(WireError::NestingTooDeep {
                max_allowed: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves a level entered with [`enter_nested`](Self::enter_nested).
    pub fn exit_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Saves the current position.
    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            position: self.pos,
            bits: self.bits,
            bit_offset: self.bit_offset,
        }
    }

    /// Restores a position saved with [`bookmark`](Self::bookmark).
    pub fn set_bookmark(&mut self, bookmark: Bookmark) -> WireResult<()> {
        if bookmark.position > self.data.len() {
            return Err(WireError::InvalidBookmark {
                position: bookmark.position,
                len: self.data.len(),
            });
        }
        self.pos = bookmark.position;
        self.bits = bookmark.bits;
        self.bit_offset = bookmark.bit_offset;
        Ok(())
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> WireResult<bool> {
        if self.bit_offset == 0 {
            self.bits = self.next_byte()?;
        }
        let bit = self.bits & (1 << self.bit_offset) != 0;
        self.bit_offset = (self.bit_offset + 1) % 8;
        Ok(bit)
    }

    /// Reads `count` bits, least significant first.
    pub fn read_bits(&mut self, count: u8) -> WireResult<u32> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for i in 0..count {
            if self.read_bit()? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    /// Discards the rest of a partially consumed byte.
    pub fn flush_bits(&mut self) {
        self.bit_offset = 0;
        self.bits = 0;
    }

    /// Reads a boolean stored as a single bit.
    pub fn read_bool(&mut self) -> WireResult<bool> {
        self.read_bit()
    }

    /// Reads an unsigned byte.
    pub fn read_u8(&mut self) -> WireResult<u8> {
        self.flush_bits();
        self.next_byte()
    }

    /// Reads a signed byte.
    pub fn read_i8(&mut self) -> WireResult<i8> {
        Ok(i8::from_le_bytes([self.read_u8()?]))
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16(&mut self) -> WireResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> WireResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64(&mut self) -> WireResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> WireResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> WireResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> WireResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `f32`.
    pub fn read_f32(&mut self) -> WireResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `f64`.
    pub fn read_f64(&mut self) -> WireResult<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Reads a decimal from four little-endian words.
    pub fn read_decimal(&mut self) -> WireResult<Decimal> {
        let words = [
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ];
        Decimal::from_words(words).ok_or_else(|| {
            WireError::invalid_decimal(format!("words {words:?} out of range"))
        })
    }

    /// Reads a date/time: two kind bits followed by the ticks.
    pub fn read_date_time(&mut self) -> WireResult<DateTime> {
        let raw = self.read_bits(2)?;
        let kind = DateTimeKind::from_bits(raw).ok_or(WireError::InvalidDateTimeKind { kind: raw })?;
        let ticks = self.read_i64()?;
        Ok(DateTime::new(ticks, kind))
    }

    /// Reads a date/time with offset.
    pub fn read_date_time_offset(&mut self) -> WireResult<DateTimeOffset> {
        let ticks = self.read_i64()?;
        let offset = TimeSpan(self.read_i64()?);
        Ok(DateTimeOffset::new(ticks, offset))
    }

    /// Reads a time span.
    pub fn read_time_span(&mut self) -> WireResult<TimeSpan> {
        Ok(TimeSpan(self.read_i64()?))
    }

    /// Reads a char stored as the varint of its scalar value.
    pub fn read_char(&mut self) -> WireResult<char> {
        let code_point = self.read_var_u32()?;
        char::from_u32(code_point).ok_or(WireError::InvalidChar { code_point })
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> WireResult<String> {
        let bytes = self.read_length_prefixed()?;
        let text = std::str::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8)?;
        Ok(text.to_string())
    }

    /// Reads a case-insensitive string.
    pub fn read_ci_string(&mut self) -> WireResult<CiString> {
        Ok(CiString::new(self.read_string()?))
    }

    /// Reads a length-prefixed byte array.
    pub fn read_byte_array(&mut self) -> WireResult<Vec<u8>> {
        Ok(self.read_length_prefixed()?.to_vec())
    }

    /// Reads a GUID from 16 raw bytes.
    pub fn read_guid(&mut self) -> WireResult<Uuid> {
        Ok(Uuid::from_bytes(self.read_array()?))
    }

    /// Reads `len` raw bytes.
    pub fn read_raw(&mut self, len: usize) -> WireResult<&'a [u8]> {
        self.flush_bits();
        if len > self.data.len().saturating_sub(self.pos) {
            return Err(WireError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads an unsigned varint.
    pub fn read_var_u64(&mut self) -> WireResult<u64> {
        self.flush_bits();
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let b = self.next_byte()?;
            let group = u64::from(b & 0x7F);
            if shift >= 64 || (shift > 0 && group >> (64 - shift) != 0) {
                return Err(WireError::VarintOverflow { bits: 64 });
            }
            value |= group << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Reads an unsigned 32-bit varint.
    pub fn read_var_u32(&mut self) -> WireResult<u32> {
        u32::try_from(self.read_var_u64()?).map_err(|_| WireError::VarintOverflow { bits: 32 })
    }

    /// Reads an unsigned 16-bit varint.
    pub fn read_var_u16(&mut self) -> WireResult<u16> {
        u16::try_from(self.read_var_u64()?).map_err(|_| WireError::VarintOverflow { bits: 16 })
    }

    /// Reads a signed varint in sign-magnitude form.
    pub fn read_var_i64(&mut self) -> WireResult<i64> {
        self.flush_bits();
        let first = self.next_byte()?;
        let negative = first & 0x40 != 0;
        let mut magnitude = u64::from(first & 0x3F);
        let mut more = first & 0x80 != 0;
        let mut shift = 6u32;
        while more {
            let b = self.next_byte()?;
            let group = u64::from(b & 0x7F);
            if shift >= 64 || group >> (64 - shift) != 0 {
                return Err(WireError::VarintOverflow { bits: 64 });
            }
            magnitude |= group << shift;
            more = b & 0x80 != 0;
            shift += 7;
        }
        if negative {
            // i64::MIN has a magnitude one larger than i64::MAX
            if magnitude > i64::MAX as u64 + 1 {
                return Err(WireError::VarintOverflow { bits: 64 });
            }
            Ok(0i64.wrapping_sub_unsigned(magnitude))
        } else {
            i64::try_from(magnitude).map_err(|_| WireError::VarintOverflow { bits: 64 })
        }
    }

    /// Reads a signed 32-bit varint.
    pub fn read_var_i32(&mut self) -> WireResult<i32> {
        i32::try_from(self.read_var_i64()?).map_err(|_| WireError::VarintOverflow { bits: 32 })
    }

    /// Reads a signed 16-bit varint.
    pub fn read_var_i16(&mut self) -> WireResult<i16> {
        i16::try_from(self.read_var_i64()?).map_err(|_| WireError::VarintOverflow { bits: 16 })
    }

    /// Skips over one varint of either signedness.
    pub fn skip_var_int(&mut self) -> WireResult<()> {
        self.flush_bits();
        while self.next_byte()? & 0x80 != 0 {}
        Ok(())
    }

    /// Reads an array element count, enforcing [`MAX_ARRAY_ELEMENTS`].
    pub fn read_element_count(&mut self) -> WireResult<usize> {
        let count = self.read_var_u64()?;
        if count > MAX_ARRAY_ELEMENTS {
            return Err(WireError::LengthLimitExceeded {
                claimed: count,
                max_allowed: MAX_ARRAY_ELEMENTS,
            });
        }
        usize::try_from(count).map_err(|_| WireError::LengthLimitExceeded {
            claimed: count,
            max_allowed: MAX_ARRAY_ELEMENTS,
        })
    }

    fn read_length_prefixed(&mut self) -> WireResult<&'a [u8]> {
        let len = self.read_var_u64()?;
        if len > MAX_BYTES_LENGTH {
            return Err(WireError::LengthLimitExceeded {
                claimed: len,
                max_allowed: MAX_BYTES_LENGTH,
            });
        }
        let len = usize::try_from(len).map_err(|_| WireError::UnexpectedEof)?;
        self.read_raw(len)
    }

    fn read_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let bytes = self.read_raw(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    #[inline]
    fn next_byte(&mut self) -> WireResult<u8> {
        if self.pos >= self.data.len() {
            return Err(WireError::UnexpectedEof);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }
}
