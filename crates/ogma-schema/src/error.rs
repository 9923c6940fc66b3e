//! Schema construction errors.

/// Raised when a declared field structure fails structural validation.
///
/// Construction accumulates every offending field before failing, so one
/// pass over the error list is enough to fix a declaration.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid vertex schema: {}", errors.join("; "))]
    VertexSchema { errors: Vec<String> },
}

impl SchemaError {
    /// The accumulated per-field diagnostics.
    pub fn errors(&self) -> &[String] {
        match self {
            Self::VertexSchema { errors } => errors,
        }
    }
}
