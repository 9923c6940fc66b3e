//! Store-reported failures, passed through to callers untranslated.

/// Errors surfaced by a [`GraphStore`](crate::GraphStore) backend.
///
/// The mapper layer adds no retry and no wrapping; whatever the store
/// reports is what the caller sees.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database `{name}` does not exist")]
    DatabaseNotFound { name: String },

    #[error("class `{name}` does not exist")]
    ClassNotFound { name: String },

    #[error("record `{rid}` does not exist")]
    RecordNotFound { rid: String },

    #[error("operation `{operation}` is not supported by this store")]
    Unsupported { operation: &'static str },

    /// Anything else the backend reports.
    #[error("store error: {0}")]
    Backend(String),
}
