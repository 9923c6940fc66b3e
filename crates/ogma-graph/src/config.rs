//! Multi-connection configuration.
//!
//! Loading from files or the environment is out of scope; callers hand the
//! mapper an already-deserialized [`GraphConfiguration`]. Structural
//! validation happens once, at manager construction, and accumulates every
//! violation before failing.

use crate::error::GraphError;
use ogma_store::{DatabaseDescriptor, ServerDescriptor};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Connection used when callers do not name one.
pub const DEFAULT_CONNECTION: &str = "default";

const IDENTIFIER_PATTERN: &str = r"^[$A-Za-z_][0-9A-Za-z_$]*$";

/// The full multi-connection configuration: connection name → connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfiguration {
    pub connections: BTreeMap<String, ConnectionConfig>,
}

/// One named connection: how to reach the server, which database to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub server: ServerDescriptor,
    pub database: DatabaseDescriptor,
}

impl GraphConfiguration {
    /// A configuration with a single `default` connection.
    pub fn single(server: ServerDescriptor, database: DatabaseDescriptor) -> Self {
        Self {
            connections: BTreeMap::from([(
                DEFAULT_CONNECTION.to_string(),
                ConnectionConfig { server, database },
            )]),
        }
    }

    pub fn connection(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.get(name)
    }

    /// Structural validation, accumulating every violation.
    pub fn validate(&self) -> Result<(), GraphError> {
        let identifier = Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid");
        let mut errors = Vec::new();

        for (name, connection) in &self.connections {
            if !identifier.is_match(name) {
                errors.push(format!("connection `{name}`: name is not a valid identifier"));
            }

            let server = &connection.server;
            if server.host.is_empty() {
                errors.push(format!("connection `{name}`: server.host must not be empty"));
            }
            if server.port == 0 {
                errors.push(format!("connection `{name}`: server.port must not be zero"));
            }
            if server.username.is_empty() {
                errors.push(format!(
                    "connection `{name}`: server.username must not be empty"
                ));
            }
            for (i, fallback) in server.servers.iter().enumerate() {
                if fallback.host.is_empty() || fallback.port == 0 {
                    errors.push(format!(
                        "connection `{name}`: servers[{i}] must carry a host and a port"
                    ));
                }
            }

            let database = &connection.database;
            if database.name.is_empty() {
                errors.push(format!("connection `{name}`: database.name must not be empty"));
            }
            if database.username.is_empty() {
                errors.push(format!(
                    "connection `{name}`: database.username must not be empty"
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GraphError::ConfigurationSchema { errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> GraphConfiguration {
        serde_json::from_value(json!({
            "connections": {
                "default": {
                    "server": {
                        "host": "localhost",
                        "port": 2424,
                        "username": "root",
                        "password": "root",
                    },
                    "database": {
                        "name": "social",
                        "username": "admin",
                        "password": "admin",
                    },
                },
            },
        }))
        .unwrap()
    }

    #[test]
    fn database_defaults_apply() {
        let config = valid();
        let database = &config.connection("default").unwrap().database;
        assert_eq!(database.kind, ogma_store::DatabaseKind::Graph);
        assert_eq!(database.storage, ogma_store::StorageKind::Plocal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn violations_are_accumulated() {
        let mut config = valid();
        let mut bad = config.connections["default"].clone();
        bad.server.host.clear();
        bad.database.name.clear();
        config.connections.insert("bad name!".to_string(), bad);

        let err = config.validate().unwrap_err();
        let GraphError::ConfigurationSchema { errors } = err else {
            panic!("expected a configuration schema error");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.contains("bad name!")));
    }

    #[test]
    fn cluster_fallbacks_are_checked() {
        let mut config = valid();
        let connection = config.connections.get_mut("default").unwrap();
        connection.server.servers = vec![ogma_store::HostPort {
            host: String::new(),
            port: 2425,
        }];

        assert!(config.validate().is_err());
    }
}
