//! Ogma Graph: Schema Synchronization and Typed Vertex Access
//!
//! The mapper core: declared vertex models are reconciled against a remote
//! graph store, then read and written through validation-gated collections.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          GRAPH CONTEXT                               │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  declared models ──► model registry ──┐                              │
//! │                                       │ connect()                    │
//! │  configuration ───► GraphManager ◄────┘                              │
//! │                      per connection                                  │
//! │                          │                                           │
//! │              ensure database ─► ensure class ─► reconcile            │
//! │                          │                      properties/indexes   │
//! │                          ▼                                           │
//! │                    remote store (opaque, async)                      │
//! │                          ▲                                           │
//! │  VertexCollection ───────┘                                           │
//! │   validate ─► coerce ─► insert/upsert/select/delete/edges            │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reconciliation is idempotent and convergent: repeated bootstrap runs
//! against an already-converged deployment touch nothing structural, and a
//! run interrupted mid-way resumes from wherever it stopped.

pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod manager;

pub use collection::{VertexCollection, VertexRecord};
pub use config::{ConnectionConfig, GraphConfiguration, DEFAULT_CONNECTION};
pub use context::{GraphContext, ModelRegistration, DEFAULT_SUPER_CLASS};
pub use error::GraphError;
pub use manager::{ClassState, GraphManager};

// Re-export the declaration and boundary vocabulary for convenience.
pub use ogma_schema::{
    FieldError, FieldSpec, FieldStructure, IndexType, Record, ScalarType, Schema, SchemaError,
};
pub use ogma_store::{
    DatabaseDescriptor, DatabaseHandle, GraphStore, ServerDescriptor, StoreConnector, StoreError,
};
