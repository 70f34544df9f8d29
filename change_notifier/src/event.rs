//! Change event types and definitions
//!
//! This module defines the structure of the events that flow
//! through the notification channel.

use serde::{Deserialize, Serialize};

/// Event kind, used to key subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A record was created, updated, or deleted
    DataChanged,
    /// An engine call completed and was timed
    Query,
}

/// Change event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChangeEvent {
    DataChanged {
        /// Model the mutation ran against
        model: String,
        /// The record as returned by the engine
        record: serde_json::Map<String, serde_json::Value>,
        /// Event timestamp (UTC)
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    QueryMeasured {
        /// Model the query ran against
        model: String,
        /// Elapsed wall-clock time of the successful attempt
        duration_ms: f64,
        /// Event timestamp (UTC)
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ChangeEvent {
    pub fn data_changed(
        model: impl Into<String>,
        record: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self::DataChanged {
            model: model.into(),
            record,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn query_measured(model: impl Into<String>, duration_ms: f64) -> Self {
        Self::QueryMeasured {
            model: model.into(),
            duration_ms,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::DataChanged { .. } => EventKind::DataChanged,
            Self::QueryMeasured { .. } => EventKind::Query,
        }
    }

    /// Model name this event concerns
    pub fn model(&self) -> &str {
        match self {
            Self::DataChanged { model, .. } => model,
            Self::QueryMeasured { model, .. } => model,
        }
    }
}
