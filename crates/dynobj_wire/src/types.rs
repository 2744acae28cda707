//! Value types with a dedicated wire representation.
//!
//! Temporal values are measured in ticks of 100 nanoseconds, counted from
//! 0001-01-01T00:00:00 for points in time.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Number of ticks in one second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Largest scale a [`Decimal`] may carry.
pub const MAX_DECIMAL_SCALE: u8 = 28;

/// How a [`DateTime`] relates to a time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DateTimeKind {
    /// No time zone information.
    #[default]
    Unspecified = 0,
    /// Coordinated universal time.
    Utc = 1,
    /// Local time of the producing machine.
    Local = 2,
}

impl DateTimeKind {
    /// Maps the 2-bit wire value back to a kind.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Utc),
            2 => Some(Self::Local),
            _ => None,
        }
    }
}

/// A point in time, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DateTime {
    /// Ticks since 0001-01-01T00:00:00.
    pub ticks: i64,
    /// Time zone relation.
    pub kind: DateTimeKind,
}

impl DateTime {
    /// Creates a date/time from ticks and kind.
    #[must_use]
    pub const fn new(ticks: i64, kind: DateTimeKind) -> Self {
        Self { ticks, kind }
    }

    /// Creates a UTC date/time.
    #[must_use]
    pub const fn utc(ticks: i64) -> Self {
        Self::new(ticks, DateTimeKind::Utc)
    }
}

/// A span of time, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeSpan(pub i64);

impl TimeSpan {
    /// Creates a span from whole seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds * TICKS_PER_SECOND)
    }

    /// Returns the span in ticks.
    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.0
    }
}

/// A point in time together with its offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DateTimeOffset {
    /// Local ticks since 0001-01-01T00:00:00.
    pub ticks: i64,
    /// Offset from UTC.
    pub offset: TimeSpan,
}

impl DateTimeOffset {
    /// Creates a date/time with offset.
    #[must_use]
    pub const fn new(ticks: i64, offset: TimeSpan) -> Self {
        Self { ticks, offset }
    }
}

/// A 96-bit scaled decimal number.
///
/// The value is `mantissa / 10^scale`, with `|mantissa| < 2^96` and
/// `scale <= 28`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

impl Decimal {
    /// Creates a decimal, or `None` if the mantissa or scale is out of range.
    #[must_use]
    pub fn new(mantissa: i128, scale: u8) -> Option<Self> {
        if mantissa.unsigned_abs() >> 96 != 0 || scale > MAX_DECIMAL_SCALE {
            return None;
        }
        Some(Self { mantissa, scale })
    }

    /// Returns the signed mantissa.
    #[must_use]
    pub const fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Returns the number of decimal places.
    #[must_use]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Splits the decimal into its four wire words: low, mid, high, flags.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    #[must_use]
    pub fn to_words(&self) -> [i32; 4] {
        let magnitude = self.mantissa.unsigned_abs();
        let mut flags = u32::from(self.scale) << 16;
        if self.mantissa < 0 {
            flags |= 0x8000_0000;
        }
        [
            magnitude as u32 as i32,
            (magnitude >> 32) as u32 as i32,
            (magnitude >> 64) as u32 as i32,
            flags as i32,
        ]
    }

    /// Rebuilds a decimal from its four wire words.
    ///
    /// Lossy for negative zero: a set sign bit with a zero magnitude
    /// decodes as zero and re-encodes without the sign bit. The scale is
    /// kept.
    #[allow(clippy::cast_sign_loss)]
    #[must_use]
    pub fn from_words(words: [i32; 4]) -> Option<Self> {
        let flags = words[3] as u32;
        if flags & 0x7F00_FFFF != 0 {
            return None;
        }
        let scale = ((flags >> 16) & 0xFF) as u8;
        let magnitude = u128::from(words[0] as u32)
            | (u128::from(words[1] as u32) << 32)
            | (u128::from(words[2] as u32) << 64);
        // magnitude < 2^96, so it always fits an i128
        let mantissa = if flags & 0x8000_0000 != 0 {
            -(magnitude as i128)
        } else {
            magnitude as i128
        };
        Self::new(mantissa, scale)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = usize::from(self.scale);
        let sign = if self.mantissa < 0 { "-" } else { "" };
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (whole, frac) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{whole}.{frac}")
    }
}

/// A string that compares and hashes without regard to case.
///
/// The original casing is kept and written to the wire unchanged.
#[derive(Debug, Clone, Default)]
pub struct CiString(String);

impl CiString {
    /// Wraps a string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the string with its original casing.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl PartialEq for CiString {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl Eq for CiString {}

impl Hash for CiString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_lowercase().hash(state);
    }
}

impl fmt::Display for CiString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CiString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CiString {
    fn from(s: String) -> Self {
        Self(s)
    }
}
