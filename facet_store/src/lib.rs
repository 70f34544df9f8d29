//! Facet Store - Core data-access layer for FacetHaus
//!
//! This crate provides the foundational types and traits for engine-neutral
//! data access: query options and predicate trees, the retrying executor,
//! the reference-counted engine pool, per-model repositories, and the
//! in-memory reference engine.

pub mod engine;
pub mod errors;
pub mod executor;
pub mod memory;
pub mod pool;
pub mod prelude;
pub mod query;
pub mod repository;

pub use engine::{DataEngine, EngineConnector, KeyMatch, ModelAccessor, Record};
pub use errors::{log_engine_error, EngineError, FacetError};
pub use executor::{QueryExecutor, RetryPolicy};
pub use memory::{MemoryConnector, MemoryEngine};
pub use pool::EnginePool;
pub use query::{render_predicate, EngineQuery, QueryOptions, SortOrder, WhereNode, WhereTree};
pub use repository::FacetRepository;
