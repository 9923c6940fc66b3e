//! In-memory store implementation.
//!
//! Backs tests and local development with the same trait surface as a real
//! backend. Every call is appended to a shared [`OpLog`] so tests can
//! assert exactly which remote operations a reconciliation run issued.

use crate::error::StoreError;
use crate::types::{
    ClassInfo, DatabaseDescriptor, DatabaseInfo, IndexSpec, PropertyInfo, ServerDescriptor,
    StoredRecord,
};
use crate::{DatabaseHandle, GraphStore, StoreConnector};
use async_trait::async_trait;
use ogma_schema::Record;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// ============================================================================
// Operation Log
// ============================================================================

/// Append-only log of store calls, shared by a server and its databases.
#[derive(Debug, Clone, Default)]
pub struct OpLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OpLog {
    fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// All entries, in call order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of entries starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

// ============================================================================
// Connector & Server
// ============================================================================

/// Connector handing out one shared [`MemoryServer`] regardless of the
/// server descriptor. Keep a clone of [`MemoryConnector::server`] around to
/// inspect state and the op log after the mapper has run.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    server: Arc<MemoryServer>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(&self) -> Arc<MemoryServer> {
        Arc::clone(&self.server)
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn open(&self, _server: &ServerDescriptor) -> Result<Arc<dyn GraphStore>, StoreError> {
        Ok(self.server())
    }
}

#[derive(Default)]
pub struct MemoryServer {
    databases: RwLock<BTreeMap<String, Arc<MemoryDatabase>>>,
    ops: OpLog,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &OpLog {
        &self.ops
    }

    /// Direct handle to a database, bypassing the boundary (test helper).
    pub fn database(&self, name: &str) -> Option<Arc<MemoryDatabase>> {
        self.databases.read().get(name).cloned()
    }
}

#[async_trait]
impl GraphStore for MemoryServer {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, StoreError> {
        self.ops.record("server.list");
        Ok(self
            .databases
            .read()
            .keys()
            .map(|name| DatabaseInfo { name: name.clone() })
            .collect())
    }

    async fn create_database(
        &self,
        descriptor: &DatabaseDescriptor,
    ) -> Result<DatabaseInfo, StoreError> {
        self.ops.record(format!("server.create {}", descriptor.name));
        let mut databases = self.databases.write();
        if databases.contains_key(&descriptor.name) {
            return Err(StoreError::Backend(format!(
                "database `{}` already exists",
                descriptor.name
            )));
        }
        tracing::debug!(database = %descriptor.name, "creating in-memory database");
        databases.insert(
            descriptor.name.clone(),
            Arc::new(MemoryDatabase::new(&descriptor.name, self.ops.clone())),
        );
        Ok(DatabaseInfo {
            name: descriptor.name.clone(),
        })
    }

    async fn open_database(&self, name: &str) -> Result<Arc<dyn DatabaseHandle>, StoreError> {
        self.ops.record(format!("server.open {name}"));
        self.databases
            .read()
            .get(name)
            .cloned()
            .map(|db| db as Arc<dyn DatabaseHandle>)
            .ok_or_else(|| StoreError::DatabaseNotFound {
                name: name.to_string(),
            })
    }
}

// ============================================================================
// Database
// ============================================================================

struct ClassEntry {
    info: ClassInfo,
    properties: Vec<PropertyInfo>,
    cluster: u64,
}

#[derive(Default)]
struct DatabaseState {
    /// Keyed by declared-case class name; lookups are case-insensitive.
    classes: BTreeMap<String, ClassEntry>,
    edge_labels: BTreeSet<String>,
    indexes: Vec<IndexSpec>,
    /// rid → (class, fields)
    records: BTreeMap<String, (String, Record)>,
    next_cluster: u64,
    next_position: u64,
}

impl DatabaseState {
    /// Resolve the stored key for a class, matching case-insensitively.
    fn class_key(&self, name: &str) -> Option<String> {
        self.classes
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn require_class(&self, name: &str) -> Result<String, StoreError> {
        self.class_key(name).ok_or_else(|| StoreError::ClassNotFound {
            name: name.to_string(),
        })
    }

    fn add_class(&mut self, name: &str, super_class: &str) -> ClassInfo {
        let info = ClassInfo {
            name: name.to_string(),
            super_class: super_class.to_string(),
        };
        self.next_cluster += 1;
        self.classes.insert(
            name.to_string(),
            ClassEntry {
                info: info.clone(),
                properties: Vec::new(),
                cluster: 8 + self.next_cluster,
            },
        );
        info
    }

    fn issue_rid(&mut self, class_key: &str) -> String {
        let cluster = self.classes[class_key].cluster;
        self.next_position += 1;
        format!("#{cluster}:{}", self.next_position)
    }
}

pub struct MemoryDatabase {
    name: String,
    state: RwLock<DatabaseState>,
    ops: OpLog,
}

fn matches(fields: &Record, criteria: &Record) -> bool {
    criteria.iter().all(|(k, v)| fields.get(k) == Some(v))
}

impl MemoryDatabase {
    fn new(name: &str, ops: OpLog) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(DatabaseState::default()),
            ops,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indexes created so far (test helper).
    pub fn indexes(&self) -> Vec<IndexSpec> {
        self.state.read().indexes.clone()
    }

    /// Properties of a class (test helper).
    pub fn properties(&self, class: &str) -> Vec<PropertyInfo> {
        let state = self.state.read();
        match state.class_key(class) {
            Some(key) => state.classes[&key].properties.clone(),
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl DatabaseHandle for MemoryDatabase {
    async fn list_classes(&self) -> Result<Vec<ClassInfo>, StoreError> {
        self.ops.record("class.list");
        Ok(self
            .state
            .read()
            .classes
            .values()
            .map(|c| c.info.clone())
            .collect())
    }

    async fn create_class(&self, name: &str, super_class: &str) -> Result<ClassInfo, StoreError> {
        self.ops.record(format!("class.create {name}"));
        let mut state = self.state.write();
        if state.class_key(name).is_some() {
            return Err(StoreError::Backend(format!("class `{name}` already exists")));
        }
        tracing::debug!(class = %name, super_class = %super_class, "creating class");
        Ok(state.add_class(name, super_class))
    }

    async fn list_properties(&self, class: &str) -> Result<Vec<PropertyInfo>, StoreError> {
        self.ops.record(format!("property.list {class}"));
        let state = self.state.read();
        let key = state.require_class(class)?;
        Ok(state.classes[&key].properties.clone())
    }

    async fn create_property(
        &self,
        class: &str,
        property: &PropertyInfo,
    ) -> Result<(), StoreError> {
        self.ops
            .record(format!("property.create {class}.{}", property.name));
        let mut state = self.state.write();
        let key = state.require_class(class)?;
        let entry = state.classes.get_mut(&key).expect("class resolved above");
        if entry
            .properties
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(&property.name))
        {
            return Err(StoreError::Backend(format!(
                "property `{}.{}` already exists",
                class, property.name
            )));
        }
        entry.properties.push(property.clone());
        Ok(())
    }

    async fn drop_property(&self, class: &str, name: &str) -> Result<(), StoreError> {
        self.ops.record(format!("property.drop {class}.{name}"));
        let mut state = self.state.write();
        let key = state.require_class(class)?;
        let entry = state.classes.get_mut(&key).expect("class resolved above");
        let before = entry.properties.len();
        entry
            .properties
            .retain(|p| !p.name.eq_ignore_ascii_case(name));
        if entry.properties.len() == before {
            return Err(StoreError::Backend(format!(
                "property `{class}.{name}` does not exist"
            )));
        }
        Ok(())
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<(), StoreError> {
        self.ops.record(format!("index.create {}", index.name));
        let mut state = self.state.write();
        if state.indexes.iter().any(|i| i.name == index.name) {
            return Err(StoreError::Backend(format!(
                "index `{}` already exists",
                index.name
            )));
        }
        state.indexes.push(index.clone());
        Ok(())
    }

    async fn insert(&self, class: &str, fields: &Record) -> Result<StoredRecord, StoreError> {
        self.ops.record(format!("record.insert {class}"));
        let mut state = self.state.write();
        let key = state.require_class(class)?;
        let rid = state.issue_rid(&key);
        state.records.insert(rid.clone(), (key, fields.clone()));
        Ok(StoredRecord {
            rid,
            fields: fields.clone(),
        })
    }

    async fn upsert(
        &self,
        class: &str,
        criteria: &Record,
        fields: &Record,
    ) -> Result<StoredRecord, StoreError> {
        self.ops.record(format!("record.upsert {class}"));
        let mut state = self.state.write();
        let key = state.require_class(class)?;

        let found = state
            .records
            .iter()
            .find(|(_, (cls, rec))| *cls == key && matches(rec, criteria))
            .map(|(rid, _)| rid.clone());

        match found {
            Some(rid) => {
                let (_, rec) = state.records.get_mut(&rid).expect("rid resolved above");
                for (k, v) in fields {
                    rec.insert(k.clone(), v.clone());
                }
                let fields = rec.clone();
                Ok(StoredRecord { rid, fields })
            }
            None => {
                let mut merged = criteria.clone();
                for (k, v) in fields {
                    merged.insert(k.clone(), v.clone());
                }
                let rid = state.issue_rid(&key);
                state.records.insert(rid.clone(), (key, merged.clone()));
                Ok(StoredRecord {
                    rid,
                    fields: merged,
                })
            }
        }
    }

    async fn select_one(
        &self,
        class: &str,
        criteria: &Record,
    ) -> Result<Option<StoredRecord>, StoreError> {
        self.ops.record(format!("record.select {class}"));
        let state = self.state.read();
        let key = state.require_class(class)?;
        Ok(state
            .records
            .iter()
            .find(|(_, (cls, rec))| *cls == key && matches(rec, criteria))
            .map(|(rid, (_, rec))| StoredRecord {
                rid: rid.clone(),
                fields: rec.clone(),
            }))
    }

    async fn delete_where(&self, class: &str, criteria: &Record) -> Result<u64, StoreError> {
        self.ops.record(format!("record.delete {class}"));
        let mut state = self.state.write();
        let key = state.require_class(class)?;
        let before = state.records.len();
        state
            .records
            .retain(|_, (cls, rec)| *cls != key || !matches(rec, criteria));
        Ok((before - state.records.len()) as u64)
    }

    async fn update_record(&self, rid: &str, fields: &Record) -> Result<StoredRecord, StoreError> {
        self.ops.record(format!("record.update {rid}"));
        let mut state = self.state.write();
        let (_, rec) = state
            .records
            .get_mut(rid)
            .ok_or_else(|| StoreError::RecordNotFound {
                rid: rid.to_string(),
            })?;
        for (k, v) in fields {
            rec.insert(k.clone(), v.clone());
        }
        Ok(StoredRecord {
            rid: rid.to_string(),
            fields: rec.clone(),
        })
    }

    async fn delete_record(&self, rid: &str) -> Result<(), StoreError> {
        self.ops.record(format!("record.delete {rid}"));
        self.state
            .write()
            .records
            .remove(rid)
            .map(|_| ())
            .ok_or_else(|| StoreError::RecordNotFound {
                rid: rid.to_string(),
            })
    }

    async fn create_edge(
        &self,
        label: &str,
        from: &str,
        to: &str,
        fields: &Record,
    ) -> Result<StoredRecord, StoreError> {
        self.ops.record(format!("edge.create {label}"));
        let mut state = self.state.write();
        let key = match state.class_key(label) {
            Some(key) => key,
            // Edge classes spring into existence on first use, under `E`.
            None => state.add_class(label, "E").name,
        };
        state.edge_labels.insert(key.clone());

        let mut rec = fields.clone();
        rec.insert("out".to_string(), from.into());
        rec.insert("in".to_string(), to.into());
        let rid = state.issue_rid(&key);
        state.records.insert(rid.clone(), (key, rec.clone()));
        Ok(StoredRecord { rid, fields: rec })
    }

    async fn find_edge(&self, from: &str, to: &str) -> Result<Option<StoredRecord>, StoreError> {
        self.ops.record("edge.find");
        let state = self.state.read();
        Ok(state
            .records
            .iter()
            .find(|(_, (cls, rec))| {
                state.edge_labels.contains(cls)
                    && rec.get("out").and_then(|v| v.as_str()) == Some(from)
                    && rec.get("in").and_then(|v| v.as_str()) == Some(to)
            })
            .map(|(rid, (_, rec))| StoredRecord {
                rid: rid.clone(),
                fields: rec.clone(),
            }))
    }

    async fn delete_edge(&self, from: &str, to: &str) -> Result<u64, StoreError> {
        self.ops.record("edge.delete");
        let mut state = self.state.write();
        let edge_labels = state.edge_labels.clone();
        let before = state.records.len();
        state.records.retain(|_, (cls, rec)| {
            !(edge_labels.contains(cls)
                && rec.get("out").and_then(|v| v.as_str()) == Some(from)
                && rec.get("in").and_then(|v| v.as_str()) == Some(to))
        });
        Ok((before - state.records.len()) as u64)
    }

    async fn query(&self, _text: &str, _params: &Record) -> Result<Vec<StoredRecord>, StoreError> {
        Err(StoreError::Unsupported { operation: "query" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogma_schema::ScalarType;
    use serde_json::json;

    fn descriptor(name: &str) -> DatabaseDescriptor {
        DatabaseDescriptor {
            name: name.to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            kind: Default::default(),
            storage: Default::default(),
        }
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    async fn open_db(server: &MemoryServer, name: &str) -> Arc<dyn DatabaseHandle> {
        server.create_database(&descriptor(name)).await.unwrap();
        server.open_database(name).await.unwrap()
    }

    #[tokio::test]
    async fn database_lifecycle_is_logged() {
        let server = MemoryServer::new();
        assert!(server.list_databases().await.unwrap().is_empty());

        server.create_database(&descriptor("social")).await.unwrap();
        let listed = server.list_databases().await.unwrap();
        assert_eq!(listed[0].name, "social");

        assert!(server.open_database("social").await.is_ok());
        assert!(matches!(
            server.open_database("missing").await,
            Err(StoreError::DatabaseNotFound { .. })
        ));

        assert_eq!(server.ops().count("server.list"), 2);
        assert_eq!(server.ops().count("server.create"), 1);
    }

    #[tokio::test]
    async fn class_and_property_metadata() {
        let server = MemoryServer::new();
        let db = open_db(&server, "social").await;

        db.create_class("Person", "V").await.unwrap();
        assert!(db.create_class("person", "V").await.is_err());

        db.create_property(
            "Person",
            &PropertyInfo {
                name: "name".to_string(),
                property_type: ScalarType::String,
            },
        )
        .await
        .unwrap();

        // Lookup is case-insensitive, listing preserves declared case.
        let props = db.list_properties("PERSON").await.unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].name, "name");

        db.drop_property("Person", "NAME").await.unwrap();
        assert!(db.list_properties("Person").await.unwrap().is_empty());
        assert!(db.drop_property("Person", "name").await.is_err());
    }

    #[tokio::test]
    async fn record_crud_and_upsert() {
        let server = MemoryServer::new();
        let db = open_db(&server, "social").await;
        db.create_class("Person", "V").await.unwrap();

        let stored = db
            .insert("Person", &record(json!({"name": "Ada", "age": 36})))
            .await
            .unwrap();
        assert!(stored.rid.starts_with('#'));

        let found = db
            .select_one("Person", &record(json!({"name": "Ada"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.rid, stored.rid);

        // Upsert against an existing record updates it in place.
        let updated = db
            .upsert(
                "Person",
                &record(json!({"name": "Ada"})),
                &record(json!({"age": 37})),
            )
            .await
            .unwrap();
        assert_eq!(updated.rid, stored.rid);
        assert_eq!(updated.fields["age"], json!(37));

        // Upsert with no match inserts criteria ∪ fields.
        let inserted = db
            .upsert(
                "Person",
                &record(json!({"name": "Grace"})),
                &record(json!({"age": 45})),
            )
            .await
            .unwrap();
        assert_ne!(inserted.rid, stored.rid);
        assert_eq!(inserted.fields["name"], json!("Grace"));

        assert_eq!(
            db.delete_where("Person", &record(json!({"name": "Grace"})))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn edges_spring_into_existence() {
        let server = MemoryServer::new();
        let db = open_db(&server, "social").await;

        let edge = db
            .create_edge("knows", "#9:1", "#9:2", &record(json!({"since": 2020})))
            .await
            .unwrap();
        assert_eq!(edge.fields["out"], json!("#9:1"));
        assert_eq!(edge.fields["in"], json!("#9:2"));

        let found = db.find_edge("#9:1", "#9:2").await.unwrap().unwrap();
        assert_eq!(found.rid, edge.rid);
        assert!(db.find_edge("#9:2", "#9:1").await.unwrap().is_none());

        assert_eq!(db.delete_edge("#9:1", "#9:2").await.unwrap(), 1);
        assert!(db.find_edge("#9:1", "#9:2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_is_unsupported() {
        let server = MemoryServer::new();
        let db = open_db(&server, "social").await;
        assert!(matches!(
            db.query("select from Person", &Record::new()).await,
            Err(StoreError::Unsupported { .. })
        ));
    }
}
