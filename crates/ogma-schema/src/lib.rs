//! Ogma Schema: Vertex Class Declarations and Record Validation
//!
//! A vertex class is declared as a field structure: a mapping from field
//! name to a typed field descriptor. This crate owns that vocabulary and
//! the validation pipeline that gates every write:
//!
//! ```text
//! declared structure ──► Schema::new ──► fail fast on malformed declarations
//!                              │
//!        record ──► coercion ──► kind check ──► pattern check ──► FieldErrors
//! ```
//!
//! Construction is strict: every offending field is reported at once, and a
//! structure that names an unsupported scalar type never produces a usable
//! validator. Validation is lenient about shape: unknown record keys are
//! ignored and declared fields are optional, so a record only fails on the
//! fields it actually carries.

pub mod error;
pub mod schema;
pub mod types;

pub use error::SchemaError;
pub use schema::{FieldError, FieldSpec, FieldStructure, Record, Schema, ViolationKind};
pub use types::{Coercion, IndexType, ScalarType, ValueKind};
