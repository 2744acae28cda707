//! Error types for the wire crate.

use thiserror::Error;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while reading or writing primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// A char value is not a Unicode scalar value.
    #[error("invalid char code point: {code_point:#x}")]
    InvalidChar {
        /// The offending code point.
        code_point: u32,
    },

    /// A variable-length integer does not fit its target width.
    #[error("variable-length integer overflows {bits}-bit target")]
    VarintOverflow {
        /// Width of the target integer type.
        bits: u32,
    },

    /// Decimal words are out of range.
    #[error("invalid decimal: {message}")]
    InvalidDecimal {
        /// Description of the problem.
        message: String,
    },

    /// A date/time kind outside the defined range.
    #[error("invalid date/time kind: {kind}")]
    InvalidDateTimeKind {
        /// The raw kind bits.
        kind: u32,
    },

    /// A bookmark points outside the buffer.
    #[error("invalid bookmark: position {position} beyond length {len}")]
    InvalidBookmark {
        /// Bookmarked byte position.
        position: usize,
        /// Buffer length.
        len: usize,
    },

    /// A declared length exceeds the allowed maximum.
    #[error("length limit exceeded: claimed {claimed}, max allowed {max_allowed}")]
    LengthLimitExceeded {
        /// The length claimed in the input.
        claimed: u64,
        /// The maximum allowed length.
        max_allowed: u64,
    },

    /// Compound values are nested deeper than allowed.
    #[error("nesting depth exceeds {max_allowed}")]
    NestingTooDeep {
        /// The maximum allowed depth.
        max_allowed: u32,
    },
}

impl WireError {
    /// Create an invalid decimal error.
    pub fn invalid_decimal(message: impl Into<String>) -> Self {
        Self::InvalidDecimal {
            message: message.into(),
        }
    }
}
