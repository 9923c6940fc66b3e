//! Graph Context: connection registry, model registry, and bootstrap.
//!
//! The context replaces process-wide singletons with an explicit object:
//! it owns the configuration, caches one [`GraphManager`] per connection
//! name (lazily, first use guarded by a lock), collects model
//! registrations, and runs the two-phase convergence sequence:
//!
//! ```text
//! Phase 1   every configured connection ──► create_database_if_not_exist
//! Phase 2   every registered model      ──► create_class_if_not_exist
//!                                          └─► sync_class_properties
//! ```
//!
//! Phase 2 never starts while Phase 1 has an outstanding failure, and both
//! phases fail fast on the first error. Partial convergence is always
//! resumable by calling [`GraphContext::connect`] again.

use crate::collection::VertexCollection;
use crate::config::{GraphConfiguration, DEFAULT_CONNECTION};
use crate::error::GraphError;
use crate::manager::GraphManager;
use ogma_schema::Schema;
use ogma_store::StoreConnector;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Super class used when callers do not name one.
pub const DEFAULT_SUPER_CLASS: &str = "V";

/// A declared vertex model, as read by the bootstrap sequence.
#[derive(Clone)]
pub struct ModelRegistration {
    pub class_name: String,
    pub super_class: String,
    pub connection: String,
    pub schema: Schema,
}

struct ContextInner {
    configuration: GraphConfiguration,
    connector: Arc<dyn StoreConnector>,
    /// Connection name → manager. The lock is held across lazy
    /// construction, so racing first users cannot build two managers for
    /// one connection.
    managers: Mutex<HashMap<String, Arc<GraphManager>>>,
    /// Registration key `"<super>_<class>"` → model. Append-only; first
    /// registration wins.
    models: RwLock<BTreeMap<String, ModelRegistration>>,
}

/// Cheaply clonable handle over the shared mapper state.
#[derive(Clone)]
pub struct GraphContext {
    inner: Arc<ContextInner>,
}

impl GraphContext {
    pub fn new(configuration: GraphConfiguration, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                configuration,
                connector,
                managers: Mutex::new(HashMap::new()),
                models: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    pub fn configuration(&self) -> &GraphConfiguration {
        &self.inner.configuration
    }

    /// The manager for a connection, constructed and cached on first use.
    pub async fn manager(&self, connection: &str) -> Result<Arc<GraphManager>, GraphError> {
        let mut managers = self.inner.managers.lock().await;
        if let Some(manager) = managers.get(connection) {
            return Ok(Arc::clone(manager));
        }

        let manager = Arc::new(
            GraphManager::open(
                connection,
                &self.inner.configuration,
                self.inner.connector.as_ref(),
            )
            .await?,
        );
        managers.insert(connection.to_string(), Arc::clone(&manager));
        Ok(manager)
    }

    /// Declare a vertex model on the default super class and connection.
    pub fn vertex(&self, class_name: &str, schema: &Schema) -> VertexCollection {
        self.vertex_on(class_name, schema, DEFAULT_SUPER_CLASS, DEFAULT_CONNECTION)
    }

    /// Declare a vertex model, returning a typed collection bound to it.
    ///
    /// Registration is keyed by `"<super>_<class>"`; declaring the same
    /// pair twice reuses the first registration.
    pub fn vertex_on(
        &self,
        class_name: &str,
        schema: &Schema,
        super_class: &str,
        connection: &str,
    ) -> VertexCollection {
        let identifier = format!("{super_class}_{class_name}");
        self.inner
            .models
            .write()
            .entry(identifier)
            .or_insert_with(|| ModelRegistration {
                class_name: class_name.to_string(),
                super_class: super_class.to_string(),
                connection: connection.to_string(),
                schema: schema.clone(),
            });

        VertexCollection::new(self.clone(), class_name, schema.clone(), connection)
    }

    /// Snapshot of registered models, in registration-key order.
    pub fn models(&self) -> Vec<ModelRegistration> {
        self.inner.models.read().values().cloned().collect()
    }

    /// Run the full convergence sequence across every connection and model.
    pub async fn connect(&self) -> Result<(), GraphError> {
        // Phase 1: databases. Fail fast before any class work starts.
        let connections: Vec<String> = self
            .inner
            .configuration
            .connections
            .keys()
            .cloned()
            .collect();
        for connection in &connections {
            let manager = self.manager(connection).await?;
            manager.create_database_if_not_exist().await?;
        }

        // Phase 2: classes and their properties/indexes.
        for model in self.models() {
            let manager = self.manager(&model.connection).await?;
            manager
                .create_class_if_not_exist(&model.class_name, &model.super_class)
                .await?;
            manager
                .sync_class_properties(&model.class_name, &model.schema)
                .await?;
        }

        Ok(())
    }
}
