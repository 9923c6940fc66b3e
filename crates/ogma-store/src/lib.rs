//! Ogma Store: The Remote Graph Store Boundary
//!
//! The mapper treats the graph database as an opaque collaborator behind
//! three traits:
//!
//! ```text
//! StoreConnector ──open──► GraphStore ──open_database──► DatabaseHandle
//!  (per deployment)         (server-level:                (class/property/
//!                            list/create/open              index metadata +
//!                            databases)                    record and edge ops)
//! ```
//!
//! Every operation is a single remote round trip that either succeeds with
//! a typed result or fails with a [`StoreError`]; orchestration, retries,
//! and state live above this boundary. The crate also ships an in-memory
//! implementation ([`memory::MemoryServer`]) used by tests and local
//! development, with an operation log for asserting exact call counts.

pub mod error;
pub mod memory;
pub mod types;

use async_trait::async_trait;
use ogma_schema::Record;
use std::sync::Arc;

pub use error::StoreError;
pub use memory::{MemoryConnector, MemoryServer, OpLog};
pub use types::{
    ClassInfo, DatabaseDescriptor, DatabaseInfo, DatabaseKind, HostPort, IndexSpec, PropertyInfo,
    ServerDescriptor, StorageKind, StoredRecord,
};

/// Opens server handles from connection configuration.
///
/// Implementations own the wire protocol; the mapper only ever sees the
/// returned [`GraphStore`].
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn open(&self, server: &ServerDescriptor) -> Result<Arc<dyn GraphStore>, StoreError>;
}

/// Server-level operations: database existence and resolution.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, StoreError>;

    async fn create_database(
        &self,
        descriptor: &DatabaseDescriptor,
    ) -> Result<DatabaseInfo, StoreError>;

    /// Resolve a handle to an existing database.
    async fn open_database(&self, name: &str) -> Result<Arc<dyn DatabaseHandle>, StoreError>;
}

/// Database-level operations: class/property/index metadata plus record
/// and edge primitives.
#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    // -- structure -----------------------------------------------------------

    async fn list_classes(&self) -> Result<Vec<ClassInfo>, StoreError>;

    async fn create_class(&self, name: &str, super_class: &str) -> Result<ClassInfo, StoreError>;

    async fn list_properties(&self, class: &str) -> Result<Vec<PropertyInfo>, StoreError>;

    async fn create_property(
        &self,
        class: &str,
        property: &PropertyInfo,
    ) -> Result<(), StoreError>;

    async fn drop_property(&self, class: &str, name: &str) -> Result<(), StoreError>;

    async fn create_index(&self, index: &IndexSpec) -> Result<(), StoreError>;

    // -- records -------------------------------------------------------------

    async fn insert(&self, class: &str, fields: &Record) -> Result<StoredRecord, StoreError>;

    /// Update the first record matching `criteria`, or insert
    /// `criteria ∪ fields` when nothing matches. Returns the record after
    /// the write.
    async fn upsert(
        &self,
        class: &str,
        criteria: &Record,
        fields: &Record,
    ) -> Result<StoredRecord, StoreError>;

    async fn select_one(
        &self,
        class: &str,
        criteria: &Record,
    ) -> Result<Option<StoredRecord>, StoreError>;

    async fn delete_where(&self, class: &str, criteria: &Record) -> Result<u64, StoreError>;

    async fn update_record(&self, rid: &str, fields: &Record) -> Result<StoredRecord, StoreError>;

    async fn delete_record(&self, rid: &str) -> Result<(), StoreError>;

    // -- edges ---------------------------------------------------------------

    async fn create_edge(
        &self,
        label: &str,
        from: &str,
        to: &str,
        fields: &Record,
    ) -> Result<StoredRecord, StoreError>;

    async fn find_edge(&self, from: &str, to: &str) -> Result<Option<StoredRecord>, StoreError>;

    async fn delete_edge(&self, from: &str, to: &str) -> Result<u64, StoreError>;

    // -- queries -------------------------------------------------------------

    /// Raw query passthrough for stores that expose a query language.
    async fn query(&self, text: &str, params: &Record) -> Result<Vec<StoredRecord>, StoreError>;
}
