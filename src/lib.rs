//! # FacetHaus
//!
//! An engine-neutral Rust data-access layer: generic filter/sort/paginate/
//! CRUD repositories over named models, bounded retry with timing
//! instrumentation, a reference-counted shared engine connection, and
//! change signals keeping consumers consistent with writes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use facethaus::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connector = MemoryConnector::new()
//!         .with_rows("Widget", vec![
//!             json!({"id": "w1", "name": "anvil", "status": "open"})
//!                 .as_object().unwrap().clone(),
//!         ]);
//!
//!     let haus = FacetHaus::new(Arc::new(connector));
//!
//!     haus.notifier().on(EventKind::DataChanged, |event| {
//!         println!("{} changed", event.model());
//!     });
//!
//!     let widgets = haus.repository("Widget").await?;
//!
//!     let open = widgets
//!         .many(QueryOptions::new()
//!             .filter(WhereTree::eq("status", json!("open")))
//!             .order_by("name", SortOrder::Asc))
//!         .await;
//!     println!("{} open widgets", open.len());
//!
//!     widgets
//!         .create(json!({"id": "w2", "name": "widget"}).as_object().unwrap().clone())
//!         .await?;
//!
//!     widgets.close().await?;
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod binding;
pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use binding::{DataOperation, QueryBinding};
pub use core::FacetHaus;
pub use errors::FacetHausError;

// Re-export centralized config
pub use config::{AppConfig, ConfigError, EngineConfig, RetryConfig};

// Re-export internal crates used by the public API
pub use change_notifier;
pub use facet_store;

// Re-export external dependencies used in public API
pub use async_trait;
pub use serde_json;
