//! Error types for the object codec.

use dynobj_wire::WireError;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding objects.
///
/// Every error is fatal to the encode/decode call that raised it. No
/// partially decoded record is ever returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// Primitive read/write failure.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// A 6-bit type tag outside the defined set.
    #[error("unrecognized data type: {tag}")]
    MalformedTag {
        /// The raw tag value.
        tag: u32,
    },

    /// A value in a position where its shape is not allowed.
    #[error("structural violation: {message}")]
    StructuralViolation {
        /// Description of the violation.
        message: String,
    },

    /// A concrete type could not be located by the type resolver.
    #[error("unresolvable type: {type_name}")]
    UnresolvableType {
        /// Name of the type.
        type_name: String,
    },

    /// An object id was requested from a value that cannot supply one.
    #[error("identity error: {message}")]
    IdentityError {
        /// Description of the failure.
        message: String,
    },

    /// A normalized field code is unknown to the field name registry.
    #[error("unknown field code {code} in scope {scope:?}")]
    UnknownFieldCode {
        /// The registry scope (`None` is global).
        scope: Option<String>,
        /// The code read from the stream.
        code: u64,
    },

    /// A value does not match what a concrete serializer expects.
    #[error("invalid value: {message}")]
    InvalidValue {
        /// Description of the mismatch.
        message: String,
    },
}

impl CodecError {
    /// Creates a structural violation error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralViolation {
            message: message.into(),
        }
    }

    /// Creates an unresolvable type error.
    pub fn unresolvable(type_name: impl Into<String>) -> Self {
        Self::UnresolvableType {
            type_name: type_name.into(),
        }
    }

    /// Creates an identity error.
    pub fn identity(message: impl Into<String>) -> Self {
        Self::IdentityError {
            message: message.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }
}
