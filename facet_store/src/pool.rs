//! Reference-counted engine connection pool
//!
//! One shared engine client for any number of repositories: the first
//! acquire connects, later acquires reuse the handle, and the client is
//! disconnected when the last holder releases. The pool is an explicit,
//! injectable object so tests can substitute fake connectors without
//! touching shared state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::engine::{DataEngine, EngineConnector};
use crate::errors::{EngineError, FacetError};

struct PoolState {
    client: Option<Arc<dyn DataEngine>>,
    ref_count: usize,
}

/// Shared, reference-counted holder of a single engine client
///
/// Invariant: `client` is present iff the reference count is positive.
pub struct EnginePool {
    connector: Arc<dyn EngineConnector>,
    state: Mutex<PoolState>,
}

impl std::fmt::Debug for EnginePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (connected, ref_count) = match self.state.try_lock() {
            Ok(state) => (state.client.is_some(), state.ref_count),
            Err(_) => (false, 0),
        };
        f.debug_struct("EnginePool")
            .field("connected", &connected)
            .field("ref_count", &ref_count)
            .finish()
    }
}

impl EnginePool {
    pub fn new(connector: Arc<dyn EngineConnector>) -> Self {
        Self {
            connector,
            state: Mutex::new(PoolState {
                client: None,
                ref_count: 0,
            }),
        }
    }

    /// Acquire a handle to the shared engine, connecting on first use.
    ///
    /// The connect runs while the state lock is held, so two concurrent
    /// first callers cannot both open a client.
    pub async fn acquire(&self) -> Result<Arc<dyn DataEngine>, FacetError> {
        let mut state = self.state.lock().await;

        if state.client.is_none() {
            let client = self.connector.connect().await?;
            state.client = Some(client);
        }
        state.ref_count += 1;

        state.client.clone().ok_or_else(|| {
            FacetError::Engine(EngineError::Connection(
                "engine handle missing after connect".to_string(),
            ))
        })
    }

    /// Release one handle; the engine is disconnected when the count
    /// reaches zero.
    ///
    /// Teardown is best-effort: the local handle is cleared before the
    /// disconnect result is inspected, so a failing close never blocks a
    /// later reconnect. The close error is still reported to the caller.
    pub async fn release(&self) -> Result<(), FacetError> {
        let client = {
            let mut state = self.state.lock().await;

            if state.ref_count == 0 {
                return Err(FacetError::ReleaseUnderflow);
            }
            state.ref_count -= 1;

            if state.ref_count == 0 {
                state.client.take()
            } else {
                None
            }
        };

        if let Some(client) = client {
            client.disconnect().await?;
        }
        Ok(())
    }

    /// Current number of outstanding acquisitions
    pub async fn ref_count(&self) -> usize {
        self.state.lock().await.ref_count
    }

    /// Whether a live client is held
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.client.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryConnector;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FragileEngine {
        disconnects: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DataEngine for FragileEngine {
        fn model(&self, _name: &str) -> Option<Arc<dyn crate::engine::ModelAccessor>> {
            None
        }

        fn model_names(&self) -> Vec<String> {
            Vec::new()
        }

        async fn disconnect(&self) -> Result<(), EngineError> {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            Err(EngineError::Connection("socket already closed".to_string()))
        }
    }

    struct FragileConnector {
        connects: Arc<AtomicUsize>,
        disconnects: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EngineConnector for FragileConnector {
        async fn connect(&self) -> Result<Arc<dyn DataEngine>, EngineError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FragileEngine {
                disconnects: Arc::clone(&self.disconnects),
            }))
        }
    }

    #[tokio::test]
    async fn test_paired_acquire_release_leaves_pool_empty() {
        let pool = EnginePool::new(Arc::new(MemoryConnector::new().with_model("Widget")));

        for _ in 0..3 {
            pool.acquire().await.unwrap();
        }
        assert_eq!(pool.ref_count().await, 3);
        assert!(pool.is_connected().await);

        pool.release().await.unwrap();
        pool.release().await.unwrap();
        assert!(pool.is_connected().await);

        pool.release().await.unwrap();
        assert!(!pool.is_connected().await);
        assert_eq!(pool.ref_count().await, 0);
    }

    #[tokio::test]
    async fn test_release_without_acquire_is_underflow() {
        let pool = EnginePool::new(Arc::new(MemoryConnector::new()));

        assert!(matches!(
            pool.release().await,
            Err(FacetError::ReleaseUnderflow)
        ));
    }

    #[tokio::test]
    async fn test_acquires_share_one_client() {
        let connects = Arc::new(AtomicUsize::new(0));
        let connector = FragileConnector {
            connects: Arc::clone(&connects),
            disconnects: Arc::new(AtomicUsize::new(0)),
        };
        let pool = EnginePool::new(Arc::new(connector));

        pool.acquire().await.unwrap();
        pool.acquire().await.unwrap();
        pool.acquire().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_disconnect_still_clears_handle() {
        let connects = Arc::new(AtomicUsize::new(0));
        let disconnects = Arc::new(AtomicUsize::new(0));
        let connector = FragileConnector {
            connects: Arc::clone(&connects),
            disconnects: Arc::clone(&disconnects),
        };
        let pool = EnginePool::new(Arc::new(connector));

        pool.acquire().await.unwrap();
        let result = pool.release().await;

        assert!(result.is_err());
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
        assert!(!pool.is_connected().await);

        // A fresh acquire reconnects after the failed teardown.
        pool.acquire().await.unwrap();
        assert_eq!(connects.load(Ordering::SeqCst), 2);
        assert!(pool.is_connected().await);
    }
}
