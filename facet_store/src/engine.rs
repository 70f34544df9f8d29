//! Data-engine traits
//!
//! The engine is an external collaborator: anything that can resolve a
//! model name to a strongly-typed accessor and execute find/create/update/
//! delete calls against it. Repositories resolve their accessor once, at
//! construction, and never dispatch on the model name again.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::EngineError;
use crate::query::EngineQuery;

/// One row of a model, schema-free
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Unique-key equality match for one/update/delete calls
pub type KeyMatch = BTreeMap<String, serde_json::Value>;

/// CRUD capabilities of a single model
#[async_trait]
pub trait ModelAccessor: Send + Sync {
    /// Fetch all records matching the query
    async fn find_many(&self, query: EngineQuery) -> Result<Vec<Record>, EngineError>;

    /// Fetch the first record matching the key, if any
    async fn find_unique(&self, key: KeyMatch) -> Result<Option<Record>, EngineError>;

    /// Insert a record and return it as stored
    async fn create(&self, data: Record) -> Result<Record, EngineError>;

    /// Update the record matching the key and return the updated row
    async fn update(&self, key: KeyMatch, data: Record) -> Result<Record, EngineError>;

    /// Delete the record matching the key and return the removed row
    async fn delete(&self, key: KeyMatch) -> Result<Record, EngineError>;
}

/// A connected data-engine client
#[async_trait]
pub trait DataEngine: Send + Sync {
    /// Look up the accessor for one model; `None` means the name is unknown
    fn model(&self, name: &str) -> Option<Arc<dyn ModelAccessor>>;

    /// Names of all models this engine serves
    fn model_names(&self) -> Vec<String>;

    /// Tear down the underlying connection
    async fn disconnect(&self) -> Result<(), EngineError>;
}

/// Factory that opens engine clients; injected into [`crate::EnginePool`]
#[async_trait]
pub trait EngineConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn DataEngine>, EngineError>;
}
