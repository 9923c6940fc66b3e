//! Integration tests for the complete Ogma pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - Schema declaration → validation/coercion
//! - GraphContext bootstrap → database/class/property/index convergence
//! - VertexCollection → validation-gated CRUD and edges
//!
//! Run with: cargo test --test integration_tests

use ogma_graph::{GraphConfiguration, GraphContext, Record, Schema};
use ogma_schema::{FieldSpec, FieldStructure, IndexType, ScalarType};
use ogma_store::MemoryConnector;
use serde_json::json;
use std::sync::Arc;

fn configuration() -> GraphConfiguration {
    serde_json::from_value(json!({
        "connections": {
            "default": {
                "server": {"host": "localhost", "port": 2424, "username": "root", "password": "root"},
                "database": {"name": "social", "username": "admin", "password": "admin"},
            },
            "analytics": {
                "server": {"host": "localhost", "port": 2425, "username": "root", "password": "root"},
                "database": {"name": "metrics", "username": "admin", "password": "admin", "storage": "memory"},
            },
        },
    }))
    .expect("configuration should deserialize")
}

fn person_schema() -> Schema {
    Schema::new(FieldStructure::from([
        (
            "name".to_string(),
            FieldSpec::new(ScalarType::String).with_pattern("^[A-Z]", "name must be capitalized"),
        ),
        (
            "age".to_string(),
            FieldSpec::indexed(ScalarType::Integer, IndexType::NotUnique),
        ),
    ]))
    .expect("schema should construct")
}

fn event_schema() -> Schema {
    Schema::from_json(&json!({
        "kind": {"type": "string"},
        "at": {"type": "datetime"},
    }))
    .expect("schema should construct")
}

fn record(value: serde_json::Value) -> Record {
    value.as_object().unwrap().clone()
}

// ============================================================================
// Bootstrap across connections
// ============================================================================

#[tokio::test]
async fn bootstrap_converges_every_connection_and_model() {
    let connector = MemoryConnector::new();
    let server = connector.server();
    let context = GraphContext::new(configuration(), Arc::new(connector));

    context.vertex("Person", &person_schema());
    context.vertex_on("Event", &event_schema(), "V", "analytics");

    context.connect().await.expect("bootstrap should converge");

    // Both databases exist, each with its model's class and properties.
    assert!(server.database("social").is_some());
    assert!(server.database("metrics").is_some());
    assert_eq!(server.database("social").unwrap().properties("Person").len(), 2);
    assert_eq!(server.database("metrics").unwrap().properties("Event").len(), 2);
    assert_eq!(server.database("social").unwrap().indexes()[0].name, "Person.age");

    // Re-running the whole bootstrap is a structural no-op.
    let before = server.ops().entries().len();
    let structural_before = server.ops().count("server.create")
        + server.ops().count("class.create")
        + server.ops().count("property.create")
        + server.ops().count("property.drop")
        + server.ops().count("index.create");

    context.connect().await.expect("second bootstrap should succeed");

    let structural_after = server.ops().count("server.create")
        + server.ops().count("class.create")
        + server.ops().count("property.create")
        + server.ops().count("property.drop")
        + server.ops().count("index.create");
    assert_eq!(structural_before, structural_after);
    assert!(server.ops().entries().len() > before, "listing calls still happen");
}

// ============================================================================
// CRUD and edges through collections
// ============================================================================

#[tokio::test]
async fn collection_crud_round_trip() {
    let connector = MemoryConnector::new();
    let context = GraphContext::new(configuration(), Arc::new(connector));
    let people = context.vertex("Person", &person_schema());
    context.connect().await.unwrap();

    // Create coerces "36" into a number before storing.
    let ada = people
        .create(record(json!({"name": "Ada", "age": "36"})))
        .await
        .unwrap();
    assert_eq!(ada.fields["age"], json!(36));

    let grace = people
        .create(record(json!({"name": "Grace", "age": 45})))
        .await
        .unwrap();

    // Upsert updates the matching record in place.
    let updated = people
        .upsert(
            &record(json!({"name": "Ada"})),
            record(json!({"age": 37})),
        )
        .await
        .unwrap();
    assert_eq!(updated.rid, ada.rid);
    assert_eq!(updated.fields["age"], json!(37));

    // Edges: create on first upsert, update on the second.
    let edge = people
        .upsert_edge("knows", &ada.rid, &grace.rid, &record(json!({"since": 1970})))
        .await
        .unwrap();
    let same_edge = people
        .upsert_edge("knows", &ada.rid, &grace.rid, &record(json!({"since": 1980})))
        .await
        .unwrap();
    assert_eq!(edge.rid, same_edge.rid);
    assert_eq!(same_edge.fields["since"], json!(1980));

    assert_eq!(people.delete_edge(&ada.rid, &grace.rid).await.unwrap(), 1);
    assert_eq!(people.delete(&record(json!({"name": "Grace"}))).await.unwrap(), 1);
    assert!(people
        .find_one(&record(json!({"name": "Grace"})))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn writes_surface_the_validation_error_list() {
    let connector = MemoryConnector::new();
    let context = GraphContext::new(configuration(), Arc::new(connector));
    let people = context.vertex("Person", &person_schema());
    context.connect().await.unwrap();

    let err = people
        .create(record(json!({"name": "lowercase", "age": "abc"})))
        .await
        .unwrap_err();

    let errors = err.validation_errors().expect("should be a validation failure");
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| e.field == "name" && e.message == "name must be capitalized"));
    assert!(errors.iter().any(|e| e.field == "age"));
}
