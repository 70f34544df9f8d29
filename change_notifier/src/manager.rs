use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::event::{ChangeEvent, EventKind};

/// Callback invoked for every published event of the subscribed kind
pub type EventCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Handle returned by [`ChangeNotifier::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(Uuid);

struct Subscription {
    id: CallbackId,
    kind: EventKind,
    callback: EventCallback,
}

/// Publish/subscribe channel for data-change and query-timing notifications
///
/// Dispatch is synchronous on the publishing context, in registration order.
/// The registry lock is not held while a callback runs, so callbacks may
/// register or remove subscriptions reentrantly; a subscription removed
/// mid-dispatch is skipped if its turn has not come yet.
pub struct ChangeNotifier {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe a callback to one event kind
    pub fn on<F>(&self, kind: EventKind, callback: F) -> CallbackId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = CallbackId(Uuid::new_v4());
        if let Ok(mut subscriptions) = self.subscriptions.lock() {
            subscriptions.push(Subscription {
                id,
                kind,
                callback: Arc::new(callback),
            });
        }
        id
    }

    /// Remove a subscription; returns false if the id is unknown
    pub fn off(&self, id: CallbackId) -> bool {
        if let Ok(mut subscriptions) = self.subscriptions.lock() {
            let before = subscriptions.len();
            subscriptions.retain(|s| s.id != id);
            before != subscriptions.len()
        } else {
            false
        }
    }

    /// Publish an event to all subscribers of its kind
    pub fn emit(&self, event: ChangeEvent) {
        let kind = event.kind();
        tracing::trace!(kind = ?kind, model = %event.model(), "dispatching change event");
        let pass: Vec<CallbackId> = match self.subscriptions.lock() {
            Ok(subscriptions) => subscriptions
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| s.id)
                .collect(),
            Err(_) => return,
        };

        for id in pass {
            // Re-check registration each turn so off() during dispatch
            // prevents invocation of not-yet-reached callbacks.
            let callback = match self.subscriptions.lock() {
                Ok(subscriptions) => subscriptions
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| Arc::clone(&s.callback)),
                Err(_) => return,
            };

            if let Some(callback) = callback {
                callback(&event);
            }
        }
    }

    /// Remove all subscriptions
    pub fn clear(&self) {
        if let Ok(mut subscriptions) = self.subscriptions.lock() {
            subscriptions.clear();
        }
    }

    /// Number of registered subscriptions
    pub fn callback_count(&self) -> usize {
        self.subscriptions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record() -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), serde_json::json!("w1"));
        map
    }

    #[test]
    fn test_emit_reaches_subscribers_of_kind() {
        let notifier = ChangeNotifier::new();
        let data_hits = Arc::new(AtomicUsize::new(0));
        let query_hits = Arc::new(AtomicUsize::new(0));

        let d = Arc::clone(&data_hits);
        notifier.on(EventKind::DataChanged, move |_| {
            d.fetch_add(1, Ordering::SeqCst);
        });
        let q = Arc::clone(&query_hits);
        notifier.on(EventKind::Query, move |_| {
            q.fetch_add(1, Ordering::SeqCst);
        });

        notifier.emit(ChangeEvent::data_changed("Widget", record()));
        notifier.emit(ChangeEvent::query_measured("Widget", 1.5));
        notifier.emit(ChangeEvent::query_measured("Widget", 2.5));

        assert_eq!(data_hits.load(Ordering::SeqCst), 1);
        assert_eq!(query_hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let notifier = ChangeNotifier::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            notifier.on(EventKind::DataChanged, move |_| {
                order.lock().unwrap().push(label);
            });
        }

        notifier.emit(ChangeEvent::data_changed("Widget", record()));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_off_removes_subscription() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        let id = notifier.on(EventKind::DataChanged, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        notifier.emit(ChangeEvent::data_changed("Widget", record()));
        assert!(notifier.off(id));
        assert!(!notifier.off(id));
        notifier.emit(ChangeEvent::data_changed("Widget", record()));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.callback_count(), 0);
    }

    #[test]
    fn test_off_during_dispatch_skips_pending_callback() {
        let notifier = Arc::new(ChangeNotifier::new());
        let second_hits = Arc::new(AtomicUsize::new(0));

        // The second callback's id is not known until after registration, so
        // route the removal through a shared slot.
        let victim: Arc<Mutex<Option<CallbackId>>> = Arc::new(Mutex::new(None));

        let n = Arc::clone(&notifier);
        let v = Arc::clone(&victim);
        notifier.on(EventKind::DataChanged, move |_| {
            if let Some(id) = *v.lock().unwrap() {
                n.off(id);
            }
        });

        let h = Arc::clone(&second_hits);
        let id = notifier.on(EventKind::DataChanged, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        *victim.lock().unwrap() = Some(id);

        notifier.emit(ChangeEvent::data_changed("Widget", record()));

        // First callback removed the second before its turn.
        assert_eq!(second_hits.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.callback_count(), 1);
    }

    #[test]
    fn test_event_accessors() {
        let event = ChangeEvent::data_changed("Widget", record());
        assert_eq!(event.kind(), EventKind::DataChanged);
        assert_eq!(event.model(), "Widget");

        let event = ChangeEvent::query_measured("Gadget", 12.0);
        assert_eq!(event.kind(), EventKind::Query);
        assert_eq!(event.model(), "Gadget");
    }
}
