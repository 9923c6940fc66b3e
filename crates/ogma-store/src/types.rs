//! Boundary data types exchanged with a remote graph store.

use ogma_schema::{IndexType, Record, ScalarType};
use serde::{Deserialize, Serialize};

// ============================================================================
// Connection Descriptors
// ============================================================================

/// How to reach a remote store server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Optional cluster fallbacks tried after the primary host.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<HostPort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

/// Database flavor understood by the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Graph,
    Document,
}

/// Storage engine the database is created on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Plocal,
    Memory,
}

/// Everything the store needs to create (or authenticate against) a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "type", default)]
    pub kind: DatabaseKind,
    #[serde(default)]
    pub storage: StorageKind,
}

// ============================================================================
// Remote Metadata
// ============================================================================

/// A database as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
}

/// A class as listed by a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub super_class: String,
}

/// A property as listed on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: ScalarType,
}

/// A single-property index, named `"<class>.<field>"` by convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub index_type: IndexType,
}

// ============================================================================
// Records
// ============================================================================

/// A stored record: the store-issued record id plus its field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub rid: String,
    #[serde(flatten)]
    pub fields: Record,
}
