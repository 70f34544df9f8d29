//! Per-model repository façade
//!
//! A [`FacetRepository`] binds one model name to the shared engine: it
//! acquires the pool on construction, resolves the model's accessor from
//! the engine's capability table (failing fast on unknown names), and runs
//! every operation through the timed, retrying executor.
//!
//! Read paths (`many`, `load_more`) never fail: engine errors are
//! classified, logged, and collapsed into an empty result so list-rendering
//! callers stay total. Write paths and single-record lookup propagate
//! errors, and successful mutations publish a data-changed event.

use std::sync::Arc;

use change_notifier::{ChangeEvent, ChangeNotifier};

use crate::engine::{DataEngine, KeyMatch, ModelAccessor, Record};
use crate::errors::{log_engine_error, FacetError};
use crate::executor::{QueryExecutor, RetryPolicy};
use crate::pool::EnginePool;
use crate::query::QueryOptions;

#[derive(Clone)]
pub struct FacetRepository {
    model: String,
    accessor: Arc<dyn ModelAccessor>,
    engine: Arc<dyn DataEngine>,
    executor: QueryExecutor,
    notifier: Option<Arc<ChangeNotifier>>,
    pool: Arc<EnginePool>,
}

impl std::fmt::Debug for FacetRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetRepository")
            .field("model", &self.model)
            .field("has_notifier", &self.notifier.is_some())
            .finish()
    }
}

impl FacetRepository {
    /// Connect a repository for one model.
    ///
    /// Acquires the shared engine (connecting on first use) and resolves
    /// the model's accessor. An unknown model name releases the
    /// acquisition again, leaving the pool's reference count unchanged,
    /// and fails with [`FacetError::InvalidModel`].
    ///
    /// The acquisition is paired with exactly one [`FacetRepository::close`]
    /// per connect; clones share it.
    pub async fn connect(
        pool: Arc<EnginePool>,
        model: &str,
        policy: RetryPolicy,
        notifier: Option<Arc<ChangeNotifier>>,
    ) -> Result<Self, FacetError> {
        let engine = pool.acquire().await?;

        let Some(accessor) = engine.model(model) else {
            if let Err(error) = pool.release().await {
                tracing::warn!(model = %model, error = %error, "release after failed construction");
            }
            return Err(FacetError::InvalidModel(model.to_string()));
        };

        let mut executor = QueryExecutor::new(policy);
        if let Some(notifier) = &notifier {
            executor = executor.with_notifier(Arc::clone(notifier));
        }

        Ok(Self {
            model: model.to_string(),
            accessor,
            engine,
            executor,
            notifier,
            pool,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The engine this repository runs against
    pub fn engine(&self) -> Arc<dyn DataEngine> {
        Arc::clone(&self.engine)
    }

    /// Fetch all records matching the options. Never fails: engine errors
    /// are logged and collapsed into an empty list.
    pub async fn many(&self, options: QueryOptions) -> Vec<Record> {
        self.find_contained(options, "many").await
    }

    /// Fetch the next page for incremental pagination. Same error
    /// containment as [`FacetRepository::many`]; appending the page to
    /// previously held rows is the caller's concern.
    pub async fn load_more(&self, options: QueryOptions) -> Vec<Record> {
        self.find_contained(options, "load_more").await
    }

    async fn find_contained(&self, options: QueryOptions, context: &str) -> Vec<Record> {
        let query = options.compile();
        let result = self
            .executor
            .execute(&self.model, || self.accessor.find_many(query.clone()))
            .await;

        match result {
            Ok(records) => records,
            Err(error) => {
                log_engine_error(&error, &self.model, context);
                Vec::new()
            }
        }
    }

    /// Fetch the record matching the unique key, if any. Errors propagate.
    pub async fn one(&self, key: KeyMatch) -> Result<Option<Record>, FacetError> {
        let record = self
            .executor
            .execute(&self.model, || self.accessor.find_unique(key.clone()))
            .await?;
        Ok(record)
    }

    /// Insert a record. Publishes a data-changed event on success.
    pub async fn create(&self, data: Record) -> Result<Record, FacetError> {
        let record = self
            .executor
            .execute(&self.model, || self.accessor.create(data.clone()))
            .await?;
        self.notify_changed(&record);
        Ok(record)
    }

    /// Update the record matching the unique key. Publishes a data-changed
    /// event on success.
    pub async fn update(&self, key: KeyMatch, data: Record) -> Result<Record, FacetError> {
        let record = self
            .executor
            .execute(&self.model, || {
                self.accessor.update(key.clone(), data.clone())
            })
            .await?;
        self.notify_changed(&record);
        Ok(record)
    }

    /// Delete the record matching the unique key. Publishes a data-changed
    /// event on success.
    pub async fn delete(&self, key: KeyMatch) -> Result<Record, FacetError> {
        let record = self
            .executor
            .execute(&self.model, || self.accessor.delete(key.clone()))
            .await?;
        self.notify_changed(&record);
        Ok(record)
    }

    /// Release the pool acquisition taken at [`FacetRepository::connect`].
    pub async fn close(self) -> Result<(), FacetError> {
        self.pool.release().await
    }

    fn notify_changed(&self, record: &Record) {
        if let Some(notifier) = &self.notifier {
            notifier.emit(ChangeEvent::data_changed(&self.model, record.clone()));
        }
    }
}
