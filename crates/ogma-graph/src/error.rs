//! Error taxonomy for the mapper layer.

use ogma_schema::{FieldError, SchemaError};
use ogma_store::StoreError;

/// Everything a mapper operation can fail with.
///
/// Construction-time errors (`ConfigurationSchema`, `ConnectionNotFound`,
/// `Schema`) abort the caller's setup path: no partial instance is usable.
/// `Validation` is recoverable and surfaced to the immediate caller of a
/// write. Store errors pass through unretried and untranslated.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("invalid configuration schema: {}", errors.join("; "))]
    ConfigurationSchema { errors: Vec<String> },

    #[error("connection `{name}` not defined in configuration")]
    ConnectionNotFound { name: String },

    /// Class reconciliation was attempted before the database was resolved.
    #[error("database not resolved for connection `{connection}`")]
    DatabaseUndefined { connection: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("record validation failed with {} violation(s)", errors.len())]
    Validation { errors: Vec<FieldError> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GraphError {
    /// The per-field violation list, when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}
