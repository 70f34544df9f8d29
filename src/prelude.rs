//! Convenience re-exports for common FacetHaus usage
//!
//! This prelude module re-exports the most commonly used items from the
//! FacetHaus ecosystem, making it easier to import everything you need
//! with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use facethaus::prelude::*;
//!
//! // Now you have access to all the common FacetHaus types and traits
//! ```

// Core FacetHaus components
pub use crate::binding::{DataOperation, QueryBinding};
pub use crate::core::FacetHaus;
pub use crate::errors::FacetHausError;

// Re-export centralized config
pub use config::{AppConfig, ConfigError, EngineConfig, RetryConfig};

// Re-export commonly used facet-store types for convenience
pub use facet_store::prelude::*;

// Re-export the notification channel
pub use change_notifier::prelude::*;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use chrono;
pub use tokio;
pub use uuid::Uuid;
