//! # dynobj testkit
//!
//! Test utilities for the dynobj object codec.
//!
//! This crate provides:
//! - Fixture types and context helpers
//! - Property-based test generators using proptest
//! - Fuzz testing harnesses
//! - Concurrency stress utilities
//! - Byte-exact test vectors
//!
//! ## Usage
//!
//! ```rust
//! use dynobj_testkit::prelude::*;
//!
//! let ctx = literal_context();
//! let person = Person::new("Alice", 30);
//! let decoded = roundtrip_embedded(&ctx, &Value::typed(person.clone()));
//! assert_eq!(decoded.downcast_ref::<Person>(), Some(&person));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
    pub use dynobj_core::{CodecConfig, MemoryContext, ObjectId, Record, Value};
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use stress::*;
pub use vectors::*;
