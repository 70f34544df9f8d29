//! Convenience re-exports for common facet-store usage

// Engine seam
pub use crate::engine::{DataEngine, EngineConnector, KeyMatch, ModelAccessor, Record};

// Error types
pub use crate::errors::{EngineError, FacetError};

// Execution
pub use crate::executor::{QueryExecutor, RetryPolicy};
pub use crate::pool::EnginePool;

// Repository façade
pub use crate::repository::FacetRepository;

// Query building
pub use crate::query::{render_predicate, EngineQuery, QueryOptions, SortOrder, WhereNode, WhereTree};

// In-memory reference engine
pub use crate::memory::{MemoryConnector, MemoryEngine};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use uuid::Uuid;
