//! Reactive query bindings
//!
//! A [`QueryBinding`] holds the latest result set of a base query and
//! re-issues repository calls for filter/refine/sort requests. It
//! subscribes to data-changed events for its model: a matching event marks
//! the binding stale, and [`QueryBinding::refresh`] re-runs the base query.
//! Call [`QueryBinding::detach`] when the consumer goes away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use change_notifier::{CallbackId, ChangeNotifier, EventKind};
use facet_store::{FacetRepository, QueryOptions, Record, SortOrder, WhereTree};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One declarative operation over a bound result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataOperation {
    /// Replace the filter tree
    Filter(WhereTree),
    /// Conjunction of refinement trees
    Refine(Vec<WhereTree>),
    /// Order by a single field
    Sort { field: String, order: SortOrder },
    /// Single-field equality filter
    Eq { field: String, value: Value },
}

/// Holds the latest results of a base query and keeps them fresh
pub struct QueryBinding {
    repository: FacetRepository,
    notifier: Arc<ChangeNotifier>,
    base: QueryOptions,
    data: Arc<Mutex<Vec<Record>>>,
    stale: Arc<AtomicBool>,
    subscription: CallbackId,
}

impl QueryBinding {
    /// Bind a repository and base query, seeding the held result set.
    ///
    /// Subscribes to data-changed events for the repository's model.
    pub fn new(
        repository: FacetRepository,
        notifier: Arc<ChangeNotifier>,
        base: QueryOptions,
        initial: Vec<Record>,
    ) -> Self {
        let data = Arc::new(Mutex::new(initial));
        let stale = Arc::new(AtomicBool::new(false));

        let model = repository.model().to_string();
        let flag = Arc::clone(&stale);
        let subscription = notifier.on(EventKind::DataChanged, move |event| {
            if event.model() == model {
                flag.store(true, Ordering::SeqCst);
            }
        });

        Self {
            repository,
            notifier,
            base,
            data,
            stale,
            subscription,
        }
    }

    /// The latest held result set
    pub fn data(&self) -> Vec<Record> {
        self.data.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    /// Whether a matching data-changed event arrived since the last run
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Re-run the base query and replace the held results
    pub async fn refresh(&self) -> Vec<Record> {
        let rows = self.run(self.base.clone()).await;
        self.stale.store(false, Ordering::SeqCst);
        rows
    }

    /// Re-run with a replacement filter
    pub async fn filter(&self, filter: WhereTree) -> Vec<Record> {
        self.run(self.base.clone().filter(filter)).await
    }

    /// Re-run with a conjunction of refinements
    pub async fn refine(&self, refinements: Vec<WhereTree>) -> Vec<Record> {
        self.run(self.base.clone().filter(WhereTree::all(refinements)))
            .await
    }

    /// Re-run ordered by a single field
    pub async fn sort(&self, field: &str, order: SortOrder) -> Vec<Record> {
        let mut options = self.base.clone();
        options.order_by = vec![(field.to_string(), order)];
        self.run(options).await
    }

    /// Re-run with a single-field equality filter
    pub async fn eq(&self, field: &str, value: Value) -> Vec<Record> {
        self.filter(WhereTree::eq(field, value)).await
    }

    /// Apply operations sequentially; the held results end up reflecting
    /// the last one
    pub async fn apply(&self, operations: Vec<DataOperation>) -> Vec<Record> {
        for operation in operations {
            match operation {
                DataOperation::Filter(filter) => {
                    self.filter(filter).await;
                }
                DataOperation::Refine(refinements) => {
                    self.refine(refinements).await;
                }
                DataOperation::Sort { field, order } => {
                    self.sort(&field, order).await;
                }
                DataOperation::Eq { field, value } => {
                    self.eq(&field, value).await;
                }
            }
        }
        self.data()
    }

    /// Unsubscribe from change notifications
    pub fn detach(&self) {
        self.notifier.off(self.subscription);
    }

    async fn run(&self, options: QueryOptions) -> Vec<Record> {
        let rows = self.repository.many(options).await;
        if let Ok(mut data) = self.data.lock() {
            *data = rows.clone();
        }
        rows
    }
}

impl std::fmt::Debug for QueryBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBinding")
            .field("model", &self.repository.model())
            .field("stale", &self.is_stale())
            .finish()
    }
}
