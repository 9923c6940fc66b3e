//! Graph Manager: one connection's reconciliation state machine.
//!
//! A manager owns the server handle for one named connection and converges
//! remote structure toward the declared one:
//!
//! ```text
//! database dimension:   unresolved ──ensure──► resolved        (once per manager)
//! class dimension:      unknown ──confirm──► created, unsynced ──reconcile──► synced
//! ```
//!
//! Reconciliation runs at most once per class per manager lifetime; failures
//! propagate unretried and leave resumable state (a class parked at
//! `created, unsynced` is picked up by the next bootstrap run).

use crate::config::{ConnectionConfig, GraphConfiguration};
use crate::error::GraphError;
use ogma_schema::{FieldStructure, Schema};
use ogma_store::{
    DatabaseHandle, GraphStore, IndexSpec, PropertyInfo, StoreConnector,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// Class Reconciliation State
// ============================================================================

/// Local view of one class's convergence progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassState {
    /// Remote existence has been confirmed (created or pre-existing).
    pub created: bool,
    /// Property/index reconciliation has completed at least once.
    pub sync: bool,
}

impl ClassState {
    /// Transition applied when a class's remote existence is (re)confirmed.
    ///
    /// A pre-existing class whose prior state is already synced stays
    /// synced: re-confirming existence observes no structural change, so it
    /// must not force a re-sync. Everything else lands at `created,
    /// unsynced` — including a class that had to be recreated remotely.
    pub fn confirmed(prior: Option<ClassState>, pre_existing: bool) -> ClassState {
        ClassState {
            created: true,
            sync: pre_existing && prior.is_some_and(|state| state.sync),
        }
    }
}

/// The property diff driving reconciliation: declared fields missing
/// remotely, and remote properties no longer declared. Name comparison is
/// case-insensitive in both directions.
fn property_diff<'a>(
    declared: &'a FieldStructure,
    remote: &'a [PropertyInfo],
) -> (Vec<&'a str>, Vec<&'a str>) {
    let to_add = declared
        .keys()
        .map(String::as_str)
        .filter(|field| !remote.iter().any(|p| p.name.eq_ignore_ascii_case(field)))
        .collect();
    let to_remove = remote
        .iter()
        .map(|p| p.name.as_str())
        .filter(|prop| !declared.keys().any(|field| field.eq_ignore_ascii_case(prop)))
        .collect();
    (to_add, to_remove)
}

// ============================================================================
// Graph Manager
// ============================================================================

struct ManagerState {
    database: Option<Arc<dyn DatabaseHandle>>,
    database_synchronized: bool,
    created_classes: HashMap<String, ClassState>,
}

/// Reconciles one connection's remote structure against declared models.
///
/// All operations serialize on one internal lock held across their store
/// calls, so concurrent callers cannot double-issue structural writes for
/// the same database or class.
pub struct GraphManager {
    connection: String,
    config: ConnectionConfig,
    server: Arc<dyn GraphStore>,
    state: Mutex<ManagerState>,
}

impl std::fmt::Debug for GraphManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphManager")
            .field("connection", &self.connection)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GraphManager {
    /// Validate the configuration, resolve the named connection, and open
    /// its server handle.
    pub async fn open(
        connection: &str,
        configuration: &GraphConfiguration,
        connector: &dyn StoreConnector,
    ) -> Result<Self, GraphError> {
        configuration.validate()?;

        let config = configuration
            .connection(connection)
            .cloned()
            .ok_or_else(|| GraphError::ConnectionNotFound {
                name: connection.to_string(),
            })?;

        let server = connector.open(&config.server).await?;

        Ok(Self {
            connection: connection.to_string(),
            config,
            server,
            state: Mutex::new(ManagerState {
                database: None,
                database_synchronized: false,
                created_classes: HashMap::new(),
            }),
        })
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// The resolved database handle; fails if the database has not been
    /// ensured yet.
    pub async fn database(&self) -> Result<Arc<dyn DatabaseHandle>, GraphError> {
        self.state
            .lock()
            .await
            .database
            .clone()
            .ok_or_else(|| GraphError::DatabaseUndefined {
                connection: self.connection.clone(),
            })
    }

    /// Ensure the configured database exists, resolving a handle to it.
    ///
    /// Idempotent: once synchronized, later calls return the cached handle
    /// with no remote traffic. The name match against the server's listing
    /// is exact (case-sensitive).
    pub async fn create_database_if_not_exist(
        &self,
    ) -> Result<Arc<dyn DatabaseHandle>, GraphError> {
        let mut state = self.state.lock().await;

        if state.database_synchronized {
            if let Some(database) = &state.database {
                return Ok(Arc::clone(database));
            }
        }

        let name = &self.config.database.name;
        let databases = self.server.list_databases().await?;
        if !databases.iter().any(|db| db.name == *name) {
            tracing::debug!(database = %name, connection = %self.connection, "database missing, creating");
            self.server.create_database(&self.config.database).await?;
        }

        let database = self.server.open_database(name).await?;
        state.database = Some(Arc::clone(&database));
        state.database_synchronized = true;
        Ok(database)
    }

    /// Ensure a class exists remotely (case-insensitive name match) and
    /// record its local reconciliation state.
    ///
    /// Precondition: the database is resolved; fails with
    /// [`GraphError::DatabaseUndefined`] otherwise.
    pub async fn create_class_if_not_exist(
        &self,
        name: &str,
        super_class: &str,
    ) -> Result<ClassState, GraphError> {
        let mut state = self.state.lock().await;

        let database =
            state
                .database
                .clone()
                .ok_or_else(|| GraphError::DatabaseUndefined {
                    connection: self.connection.clone(),
                })?;

        let classes = database.list_classes().await?;
        let pre_existing = classes.iter().any(|c| c.name.eq_ignore_ascii_case(name));
        if !pre_existing {
            tracing::debug!(class = %name, super_class = %super_class, "class missing, creating");
            database.create_class(name, super_class).await?;
        }

        let prior = state.created_classes.get(name).copied();
        let confirmed = ClassState::confirmed(prior, pre_existing);
        state.created_classes.insert(name.to_string(), confirmed);
        Ok(confirmed)
    }

    /// Reconcile a class's remote properties and indexes against a schema.
    ///
    /// No-op (`Ok(None)`) for a class never confirmed through
    /// [`GraphManager::create_class_if_not_exist`]; no-op with zero remote
    /// calls when the class is already synced. Otherwise creates every
    /// declared-but-missing property, drops every remote-but-undeclared
    /// one, marks the class synced, and creates one `"<class>.<field>"`
    /// index per newly added field that declares one.
    pub async fn sync_class_properties(
        &self,
        name: &str,
        schema: &Schema,
    ) -> Result<Option<ClassState>, GraphError> {
        let mut state = self.state.lock().await;

        let Some(current) = state.created_classes.get(name).copied() else {
            return Ok(None);
        };
        if current.sync {
            return Ok(Some(current));
        }

        let database =
            state
                .database
                .clone()
                .ok_or_else(|| GraphError::DatabaseUndefined {
                    connection: self.connection.clone(),
                })?;

        let remote = database.list_properties(name).await?;
        let declared = schema.structure();
        let (to_add, to_remove) = property_diff(declared, &remote);

        tracing::debug!(
            class = %name,
            adding = to_add.len(),
            dropping = to_remove.len(),
            "reconciling class properties"
        );

        for field in &to_add {
            database
                .create_property(
                    name,
                    &PropertyInfo {
                        name: (*field).to_string(),
                        property_type: declared[*field].field_type,
                    },
                )
                .await?;
        }
        for property in &to_remove {
            database.drop_property(name, property).await?;
        }

        let entry = state
            .created_classes
            .get_mut(name)
            .expect("entry present: checked above");
        entry.sync = true;
        let synced = *entry;

        // Index creation follows the sync mark, as the add/remove pass is
        // what decides which fields are new.
        for field in &to_add {
            if let Some(index_type) = declared[*field].index {
                database
                    .create_index(&IndexSpec {
                        name: format!("{name}.{field}"),
                        index_type,
                    })
                    .await?;
            }
        }

        Ok(Some(synced))
    }
}
