//! Typed vertex collections: validation-gated CRUD and edge helpers.

use crate::context::GraphContext;
use crate::error::GraphError;
use ogma_schema::{FieldError, Record, Schema};
use ogma_store::{DatabaseHandle, StoredRecord};
use serde::Serialize;
use std::sync::Arc;

/// A stored vertex, inflated to the schema's view: the record id plus the
/// declared fields only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexRecord {
    pub rid: String,
    #[serde(flatten)]
    pub fields: Record,
}

/// CRUD/edge surface for one declared model.
///
/// A collection is a value binding class name + [`Schema`] + connection
/// into operations; structural concerns stay with the
/// [`GraphManager`](crate::GraphManager) and validation with the schema.
/// Every write validates (and coerces) first — invalid data never reaches
/// the store.
#[derive(Clone)]
pub struct VertexCollection {
    context: GraphContext,
    class_name: String,
    connection: String,
    schema: Schema,
}

impl VertexCollection {
    pub(crate) fn new(
        context: GraphContext,
        class_name: &str,
        schema: Schema,
        connection: &str,
    ) -> Self {
        Self {
            context,
            class_name: class_name.to_string(),
            connection: connection.to_string(),
            schema,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate (and coerce) a record against the model's schema without
    /// touching the store.
    pub fn is_valid(&self, data: &mut Record) -> Result<(), Vec<FieldError>> {
        self.schema.check(data)
    }

    async fn database(&self) -> Result<Arc<dyn DatabaseHandle>, GraphError> {
        self.context
            .manager(&self.connection)
            .await?
            .database()
            .await
    }

    fn validated(&self, data: &mut Record) -> Result<(), GraphError> {
        self.schema
            .check(data)
            .map_err(|errors| GraphError::Validation { errors })
    }

    /// Create a vertex from validated data.
    pub async fn create(&self, mut data: Record) -> Result<VertexRecord, GraphError> {
        self.validated(&mut data)?;
        let stored = self.database().await?.insert(&self.class_name, &data).await?;
        Ok(self.inflate(stored))
    }

    /// Update the first vertex matching `criteria`, or create it.
    pub async fn upsert(
        &self,
        criteria: &Record,
        mut data: Record,
    ) -> Result<VertexRecord, GraphError> {
        self.validated(&mut data)?;
        let stored = self
            .database()
            .await?
            .upsert(&self.class_name, criteria, &data)
            .await?;
        Ok(self.inflate(stored))
    }

    /// First vertex matching `criteria`, if any.
    pub async fn find_one(&self, criteria: &Record) -> Result<Option<VertexRecord>, GraphError> {
        Ok(self
            .database()
            .await?
            .select_one(&self.class_name, criteria)
            .await?
            .map(|stored| self.inflate(stored)))
    }

    /// Delete every vertex matching `criteria`; returns the count.
    pub async fn delete(&self, criteria: &Record) -> Result<u64, GraphError> {
        Ok(self
            .database()
            .await?
            .delete_where(&self.class_name, criteria)
            .await?)
    }

    /// Delete one vertex by record id.
    pub async fn delete_record(&self, rid: &str) -> Result<(), GraphError> {
        Ok(self.database().await?.delete_record(rid).await?)
    }

    /// Create an edge between two record ids.
    pub async fn create_edge(
        &self,
        label: &str,
        from: &str,
        to: &str,
        data: &Record,
    ) -> Result<StoredRecord, GraphError> {
        Ok(self
            .database()
            .await?
            .create_edge(label, from, to, data)
            .await?)
    }

    /// Update the existing from→to edge, or create it under `label`.
    pub async fn upsert_edge(
        &self,
        label: &str,
        from: &str,
        to: &str,
        data: &Record,
    ) -> Result<StoredRecord, GraphError> {
        let database = self.database().await?;
        match database.find_edge(from, to).await? {
            Some(edge) => Ok(database.update_record(&edge.rid, data).await?),
            None => Ok(database.create_edge(label, from, to, data).await?),
        }
    }

    /// Delete every from→to edge; returns the count.
    pub async fn delete_edge(&self, from: &str, to: &str) -> Result<u64, GraphError> {
        Ok(self.database().await?.delete_edge(from, to).await?)
    }

    /// Raw query passthrough.
    pub async fn query(
        &self,
        text: &str,
        params: &Record,
    ) -> Result<Vec<StoredRecord>, GraphError> {
        Ok(self.database().await?.query(text, params).await?)
    }

    fn inflate(&self, stored: StoredRecord) -> VertexRecord {
        let mut fields = Record::new();
        for name in self.schema.field_names() {
            if let Some(value) = stored.fields.get(name) {
                fields.insert(name.to_string(), value.clone());
            }
        }
        VertexRecord {
            rid: stored.rid,
            fields,
        }
    }
}
