//! Bit-packed binary writer.

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

use crate::types::{CiString, DateTime, DateTimeOffset, Decimal, TimeSpan};

/// A binary writer that packs bits and byte-aligned primitives.
///
/// Bits are accumulated least-significant-bit first in a pending byte.
/// Every byte-oriented write flushes the pending byte first, so a run of
/// bit writes followed by a byte write always starts the byte write on a
/// fresh boundary.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buffer: BytesMut,
    bits: u8,
    bit_offset: u8,
}

impl BinaryWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            bits: 0,
            bit_offset: 0,
        }
    }

    /// Creates an independent writer for a buffered sub-encoding.
    ///
    /// The caller measures the sub-encoding with
    /// [`get_serialization`](Self::get_serialization) and splices it back
    /// with [`write_raw`](Self::write_raw).
    #[must_use]
    pub fn create_new(&self) -> Self {
        Self::new()
    }

    /// Position inside the pending byte, in bits (0 means byte aligned).
    pub fn bit_offset(&self) -> u8 {
        self.bit_offset
    }

    /// Number of complete bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.bit_offset == 0
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        if value {
            self.bits |= 1 << self.bit_offset;
        }
        self.bit_offset += 1;
        if self.bit_offset == 8 {
            self.buffer.put_u8(self.bits);
            self.bits = 0;
            self.bit_offset = 0;
        }
    }

    /// Writes the low `count` bits of `value`, least significant first.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_bits(&mut self, mut value: u32, mut count: u8) {
        debug_assert!(count <= 32);
        while count > 0 {
            let room = 8 - self.bit_offset;
            let n = count.min(room);
            let mask = if n == 8 { 0xFF } else { (1u32 << n) - 1 };
            self.bits |= ((value & mask) as u8) << self.bit_offset;
            self.bit_offset += n;
            count -= n;
            value = value.checked_shr(u32::from(n)).unwrap_or(0);
            if self.bit_offset == 8 {
                self.buffer.put_u8(self.bits);
                self.bits = 0;
                self.bit_offset = 0;
            }
        }
    }

    /// Emits the pending partial byte, if any.
    pub fn flush_bits(&mut self) {
        if self.bit_offset > 0 {
            self.buffer.put_u8(self.bits);
            self.bits = 0;
            self.bit_offset = 0;
        }
    }

    /// Writes a boolean as a single bit.
    pub fn write_bool(&mut self, value: bool) {
        self.write_bit(value);
    }

    /// Writes an unsigned byte.
    pub fn write_u8(&mut self, value: u8) {
        self.flush_bits();
        self.buffer.put_u8(value);
    }

    /// Writes a signed byte.
    pub fn write_i8(&mut self, value: i8) {
        self.flush_bits();
        self.buffer.put_i8(value);
    }

    /// Writes a little-endian `i16`.
    pub fn write_i16(&mut self, value: i16) {
        self.flush_bits();
        self.buffer.put_i16_le(value);
    }

    /// Writes a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.flush_bits();
        self.buffer.put_i32_le(value);
    }

    /// Writes a little-endian `i64`.
    pub fn write_i64(&mut self, value: i64) {
        self.flush_bits();
        self.buffer.put_i64_le(value);
    }

    /// Writes a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) {
        self.flush_bits();
        self.buffer.put_u16_le(value);
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.flush_bits();
        self.buffer.put_u32_le(value);
    }

    /// Writes a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) {
        self.flush_bits();
        self.buffer.put_u64_le(value);
    }

    /// Writes a little-endian `f32`.
    pub fn write_f32(&mut self, value: f32) {
        self.flush_bits();
        self.buffer.put_f32_le(value);
    }

    /// Writes a little-endian `f64`.
    pub fn write_f64(&mut self, value: f64) {
        self.flush_bits();
        self.buffer.put_f64_le(value);
    }

    /// Writes a decimal as four little-endian words.
    pub fn write_decimal(&mut self, value: &Decimal) {
        for word in value.to_words() {
            self.write_i32(word);
        }
    }

    /// Writes a date/time: two kind bits followed by the ticks.
    pub fn write_date_time(&mut self, value: &DateTime) {
        self.write_bits(value.kind as u32, 2);
        self.write_i64(value.ticks);
    }

    /// Writes a date/time with offset.
    pub fn write_date_time_offset(&mut self, value: &DateTimeOffset) {
        self.write_i64(value.ticks);
        self.write_i64(value.offset.ticks());
    }

    /// Writes a time span.
    pub fn write_time_span(&mut self, value: TimeSpan) {
        self.write_i64(value.ticks());
    }

    /// Writes a char as the varint of its scalar value.
    pub fn write_char(&mut self, value: char) {
        self.write_var_u32(u32::from(value));
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, value: &str) {
        self.write_byte_array(value.as_bytes());
    }

    /// Writes a case-insensitive string with its original casing.
    pub fn write_ci_str(&mut self, value: &CiString) {
        self.write_str(value.as_str());
    }

    /// Writes a length-prefixed byte array.
    pub fn write_byte_array(&mut self, value: &[u8]) {
        self.write_var_u64(value.len() as u64);
        self.buffer.extend_from_slice(value);
    }

    /// Writes a GUID as 16 raw bytes.
    pub fn write_guid(&mut self, value: &Uuid) {
        self.flush_bits();
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// Writes raw bytes without a length prefix.
    pub fn write_raw(&mut self, value: &[u8]) {
        self.flush_bits();
        self.buffer.extend_from_slice(value);
    }

    /// Writes an unsigned varint.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_var_u64(&mut self, mut value: u64) {
        self.flush_bits();
        while value >= 0x80 {
            self.buffer.put_u8((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.buffer.put_u8(value as u8);
    }

    /// Writes an unsigned 32-bit varint.
    pub fn write_var_u32(&mut self, value: u32) {
        self.write_var_u64(u64::from(value));
    }

    /// Writes an unsigned 16-bit varint.
    pub fn write_var_u16(&mut self, value: u16) {
        self.write_var_u64(u64::from(value));
    }

    /// Writes a signed varint in sign-magnitude form.
    ///
    /// The first byte holds six magnitude bits and the sign in bit 6.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_var_i64(&mut self, value: i64) {
        self.flush_bits();
        let mut magnitude = value.unsigned_abs();
        let mut b = (magnitude & 0x3F) as u8;
        if value < 0 {
            b |= 0x40;
        }
        magnitude >>= 6;
        while magnitude > 0 {
            self.buffer.put_u8(b | 0x80);
            b = (magnitude & 0x7F) as u8;
            magnitude >>= 7;
        }
        self.buffer.put_u8(b);
    }

    /// Writes a signed 32-bit varint.
    pub fn write_var_i32(&mut self, value: i32) {
        self.write_var_i64(i64::from(value));
    }

    /// Writes a signed 16-bit varint.
    pub fn write_var_i16(&mut self, value: i16) {
        self.write_var_i64(i64::from(value));
    }

    /// Flushes pending bits and returns everything written so far.
    pub fn get_serialization(&mut self) -> Bytes {
        self.flush_bits();
        self.buffer.clone().freeze()
    }

    /// Consume this writer and return the written bytes.
    pub fn into_bytes(mut self) -> Bytes {
        self.flush_bits();
        self.buffer.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_packed_lsb_first() {
        let mut w = BinaryWriter::new();
        w.write_bits(0b10_1101, 6);
        assert_eq!(w.bit_offset(), 6);
        w.write_bit(true);
        w.write_bit(false);
        assert_eq!(w.bit_offset(), 0);
        assert_eq!(w.into_bytes().as_ref(), &[0b0110_1101]);
    }

    #[test]
    fn bits_span_byte_boundary() {
        let mut w = BinaryWriter::new();
        w.write_bits(0b11_1111, 6);
        w.write_bits(0b1010, 4);
        assert_eq!(w.bit_offset(), 2);
        assert_eq!(w.into_bytes().as_ref(), &[0b1011_1111, 0b10]);
    }

    #[test]
    fn byte_write_flushes_pending_bits() {
        let mut w = BinaryWriter::new();
        w.write_bit(true);
        w.write_u8(0xAB);
        assert_eq!(w.into_bytes().as_ref(), &[0x01, 0xAB]);
    }

    #[test]
    fn fixed_width_is_little_endian() {
        let mut w = BinaryWriter::new();
        w.write_i16(0x0102);
        w.write_u32(0x0304_0506);
        assert_eq!(w.into_bytes().as_ref(), &[0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);
    }

    #[test]
    fn unsigned_varints() {
        let mut w = BinaryWriter::new();
        w.write_var_u64(0);
        w.write_var_u64(127);
        w.write_var_u64(128);
        w.write_var_u64(300);
        assert_eq!(
            w.into_bytes().as_ref(),
            &[0x00, 0x7F, 0x80, 0x01, 0xAC, 0x02]
        );
    }

    #[test]
    fn signed_varints() {
        let mut w = BinaryWriter::new();
        w.write_var_i64(1);
        w.write_var_i64(-1);
        w.write_var_i64(63);
        w.write_var_i64(64);
        w.write_var_i64(-64);
        assert_eq!(
            w.into_bytes().as_ref(),
            &[0x01, 0x41, 0x3F, 0x80, 0x01, 0xC0, 0x01]
        );
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut w = BinaryWriter::new();
        w.write_str("hi");
        w.write_str("");
        assert_eq!(w.into_bytes().as_ref(), &[0x02, b'h', b'i', 0x00]);
    }

    #[test]
    fn nested_serialization_splices() {
        let mut outer = BinaryWriter::new();
        let mut inner = outer.create_new();
        inner.write_bits(31, 6);
        inner.write_var_u64(0);
        let body = inner.get_serialization();
        outer.write_var_u64(body.len() as u64);
        outer.write_raw(&body);
        assert_eq!(outer.into_bytes().as_ref(), &[0x02, 0x1F, 0x00]);
    }

    #[test]
    fn date_time_writes_kind_bits() {
        let mut w = BinaryWriter::new();
        w.write_date_time(&DateTime::utc(1));
        assert_eq!(
            w.into_bytes().as_ref(),
            &[0x01, 0x01, 0, 0, 0, 0, 0, 0, 0]
        );
    }
}
