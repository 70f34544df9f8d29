//! Core FacetHaus functionality
//!
//! This module contains the main FacetHaus struct and its implementation,
//! providing centralized coordination: it owns the engine pool, the change
//! notifier, and the retry policy, and hands out connected repositories.

use std::sync::Arc;

use change_notifier::ChangeNotifier;
use config::AppConfig;
use facet_store::{EngineConnector, EnginePool, FacetRepository, RetryPolicy};

use crate::errors::FacetHausError;

/// Main FacetHaus coordinator that composes the engine pool, the change
/// notifier, and per-model repositories
pub struct FacetHaus {
    pool: Arc<EnginePool>,
    notifier: Arc<ChangeNotifier>,
    retry: RetryPolicy,
}

impl FacetHaus {
    /// Create a new FacetHaus around an engine connector with the default
    /// retry policy
    pub fn new(connector: Arc<dyn EngineConnector>) -> Self {
        Self::with_retry(connector, RetryPolicy::default())
    }

    /// Create a new FacetHaus with an explicit retry policy
    pub fn with_retry(connector: Arc<dyn EngineConnector>, retry: RetryPolicy) -> Self {
        Self {
            pool: Arc::new(EnginePool::new(connector)),
            notifier: Arc::new(ChangeNotifier::new()),
            retry,
        }
    }

    /// Create a new FacetHaus from loaded configuration
    pub fn from_config(config: &AppConfig, connector: Arc<dyn EngineConnector>) -> Self {
        Self::with_retry(connector, RetryPolicy::from(&config.retry))
    }

    /// Get the shared engine pool
    pub fn pool(&self) -> Arc<EnginePool> {
        Arc::clone(&self.pool)
    }

    /// Get the change notifier owned by this coordinator
    pub fn notifier(&self) -> Arc<ChangeNotifier> {
        Arc::clone(&self.notifier)
    }

    /// Retry policy applied to repositories built here
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Build a connected repository for one model.
    ///
    /// Fails with an invalid-model error when the connected engine does
    /// not serve the given name. Pair with [`FacetRepository::close`].
    pub async fn repository(&self, model: &str) -> Result<FacetRepository, FacetHausError> {
        let repository = FacetRepository::connect(
            Arc::clone(&self.pool),
            model,
            self.retry,
            Some(Arc::clone(&self.notifier)),
        )
        .await?;
        Ok(repository)
    }

    /// Whether the shared engine is currently connected
    pub async fn is_connected(&self) -> bool {
        self.pool.is_connected().await
    }
}

impl std::fmt::Debug for FacetHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetHaus")
            .field("pool", &self.pool)
            .field("retry", &self.retry)
            .finish()
    }
}
