//! End-to-end tests for the composed stack: coordinator, pool, repository,
//! notifier, and binding over the in-memory engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use facethaus::prelude::*;
use serde_json::json;

fn row(value: serde_json::Value) -> Record {
    value.as_object().expect("test rows are objects").clone()
}

fn key(field: &str, value: serde_json::Value) -> KeyMatch {
    [(field.to_string(), value)].into_iter().collect()
}

fn seeded_connector() -> MemoryConnector {
    MemoryConnector::new()
        .with_rows(
            "Widget",
            vec![
                row(json!({"id": "w1", "name": "anvil", "price": 30, "status": "open"})),
                row(json!({"id": "w2", "name": "widget", "price": 10, "status": "open"})),
                row(json!({"id": "w3", "name": "wide widget", "price": 20, "status": "closed"})),
            ],
        )
        .with_model("Gadget")
}

#[tokio::test]
async fn many_with_search_and_order() {
    let haus = FacetHaus::new(Arc::new(seeded_connector()));
    let widgets = haus.repository("Widget").await.unwrap();

    let rows = widgets
        .many(
            QueryOptions::new()
                .search("name", "widget")
                .order_by("price", SortOrder::Asc),
        )
        .await;

    let ids: Vec<_> = rows.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!("w2"), json!("w3")]);

    widgets.close().await.unwrap();
}

#[tokio::test]
async fn load_more_pages_through_results() {
    let haus = FacetHaus::new(Arc::new(seeded_connector()));
    let widgets = haus.repository("Widget").await.unwrap();

    let base = QueryOptions::new().order_by("price", SortOrder::Asc).take(2);
    let first = widgets.many(base.clone()).await;
    let rest = widgets.load_more(base.skip(2)).await;

    assert_eq!(first.len(), 2);
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["id"], json!("w1"));

    widgets.close().await.unwrap();
}

#[tokio::test]
async fn repository_lifecycle_drives_the_shared_connection() {
    let haus = FacetHaus::new(Arc::new(seeded_connector()));
    assert!(!haus.is_connected().await);

    let widgets = haus.repository("Widget").await.unwrap();
    let gadgets = haus.repository("Gadget").await.unwrap();
    assert!(haus.is_connected().await);
    assert_eq!(haus.pool().ref_count().await, 2);

    widgets.close().await.unwrap();
    assert!(haus.is_connected().await);

    gadgets.close().await.unwrap();
    assert!(!haus.is_connected().await);
}

#[tokio::test]
async fn unknown_model_fails_construction_without_leaking_a_reference() {
    let haus = FacetHaus::new(Arc::new(seeded_connector()));

    let result = haus.repository("Sprocket").await;

    assert!(matches!(
        result,
        Err(FacetHausError::Facet(FacetError::InvalidModel(name))) if name == "Sprocket"
    ));
    assert_eq!(haus.pool().ref_count().await, 0);
}

#[tokio::test]
async fn mutations_publish_data_changed_for_their_model_only() {
    let haus = FacetHaus::new(Arc::new(seeded_connector()));
    let widgets = haus.repository("Widget").await.unwrap();

    let widget_events = Arc::new(AtomicUsize::new(0));
    let gadget_events = Arc::new(AtomicUsize::new(0));

    let notifier = haus.notifier();
    let seen = Arc::clone(&widget_events);
    notifier.on(EventKind::DataChanged, move |event| {
        if event.model() == "Widget" {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });
    let seen = Arc::clone(&gadget_events);
    notifier.on(EventKind::DataChanged, move |event| {
        if event.model() == "Gadget" {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });

    let updated = widgets
        .update(key("id", json!("w1")), row(json!({"name": "rebranded anvil"})))
        .await
        .unwrap();

    assert_eq!(updated["name"], json!("rebranded anvil"));
    assert_eq!(widget_events.load(Ordering::SeqCst), 1);
    assert_eq!(gadget_events.load(Ordering::SeqCst), 0);

    widgets.close().await.unwrap();
}

#[tokio::test]
async fn every_engine_call_publishes_a_query_timing_event() {
    let haus = FacetHaus::new(Arc::new(seeded_connector()));
    let widgets = haus.repository("Widget").await.unwrap();

    let timings = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&timings);
    haus.notifier().on(EventKind::Query, move |event| {
        assert_eq!(event.model(), "Widget");
        seen.fetch_add(1, Ordering::SeqCst);
    });

    widgets.many(QueryOptions::new()).await;
    widgets.one(key("id", json!("w1"))).await.unwrap();

    assert_eq!(timings.load(Ordering::SeqCst), 2);

    widgets.close().await.unwrap();
}

#[tokio::test]
async fn binding_tracks_filters_refinements_and_staleness() {
    let haus = FacetHaus::new(Arc::new(seeded_connector()));
    let widgets = haus.repository("Widget").await.unwrap();

    let initial = widgets.many(QueryOptions::new()).await;
    let binding = QueryBinding::new(
        widgets.clone(),
        haus.notifier(),
        QueryOptions::new().order_by("price", SortOrder::Asc),
        initial,
    );
    assert_eq!(binding.data().len(), 3);

    let open = binding
        .filter(WhereTree::eq("status", json!("open")))
        .await;
    assert_eq!(open.len(), 2);
    assert_eq!(binding.data().len(), 2);

    let refined = binding
        .refine(vec![
            WhereTree::eq("status", json!("open")),
            WhereTree::op("price", "gt", json!(15)),
        ])
        .await;
    assert_eq!(refined.len(), 1);
    assert_eq!(refined[0]["id"], json!("w1"));

    // A write to the bound model marks the binding stale...
    assert!(!binding.is_stale());
    widgets
        .create(row(json!({"id": "w4", "name": "sprocket", "price": 5})))
        .await
        .unwrap();
    assert!(binding.is_stale());

    // ...and refresh re-runs the base query over the new data.
    let refreshed = binding.refresh().await;
    assert_eq!(refreshed.len(), 4);
    assert_eq!(refreshed[0]["id"], json!("w4"));
    assert!(!binding.is_stale());

    // Detached bindings stop tracking writes.
    binding.detach();
    widgets
        .delete(key("id", json!("w4")))
        .await
        .unwrap();
    assert!(!binding.is_stale());

    widgets.close().await.unwrap();
}

#[tokio::test]
async fn binding_applies_operations_sequentially() {
    let haus = FacetHaus::new(Arc::new(seeded_connector()));
    let widgets = haus.repository("Widget").await.unwrap();

    let binding = QueryBinding::new(widgets.clone(), haus.notifier(), QueryOptions::new(), vec![]);

    let rows = binding
        .apply(vec![
            DataOperation::Filter(WhereTree::eq("status", json!("open"))),
            DataOperation::Sort {
                field: "price".to_string(),
                order: SortOrder::Desc,
            },
        ])
        .await;

    // The last operation wins: a full sort over the base query.
    let ids: Vec<_> = rows.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!("w1"), json!("w3"), json!("w2")]);

    binding.detach();
    widgets.close().await.unwrap();
}

mod failing_engine {
    use super::*;
    use facethaus::facet_store::EngineQuery;

    pub struct DeadModel;

    #[async_trait]
    impl ModelAccessor for DeadModel {
        async fn find_many(&self, _query: EngineQuery) -> Result<Vec<Record>, EngineError> {
            Err(EngineError::Unknown("connection reset".to_string()))
        }

        async fn find_unique(&self, _key: KeyMatch) -> Result<Option<Record>, EngineError> {
            Err(EngineError::Unknown("connection reset".to_string()))
        }

        async fn create(&self, _data: Record) -> Result<Record, EngineError> {
            Err(EngineError::Unknown("connection reset".to_string()))
        }

        async fn update(&self, _key: KeyMatch, _data: Record) -> Result<Record, EngineError> {
            Err(EngineError::Unknown("connection reset".to_string()))
        }

        async fn delete(&self, _key: KeyMatch) -> Result<Record, EngineError> {
            Err(EngineError::Unknown("connection reset".to_string()))
        }
    }

    pub struct DeadEngine;

    #[async_trait]
    impl DataEngine for DeadEngine {
        fn model(&self, name: &str) -> Option<Arc<dyn ModelAccessor>> {
            (name == "Widget").then(|| Arc::new(DeadModel) as Arc<dyn ModelAccessor>)
        }

        fn model_names(&self) -> Vec<String> {
            vec!["Widget".to_string()]
        }

        async fn disconnect(&self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    pub struct DeadConnector;

    #[async_trait]
    impl EngineConnector for DeadConnector {
        async fn connect(&self) -> Result<Arc<dyn DataEngine>, EngineError> {
            Ok(Arc::new(DeadEngine))
        }
    }
}

#[tokio::test]
async fn read_path_collapses_engine_failures_into_empty_results() {
    let haus = FacetHaus::new(Arc::new(failing_engine::DeadConnector));
    let widgets = haus.repository("Widget").await.unwrap();

    let rows = widgets.many(QueryOptions::new()).await;
    assert!(rows.is_empty());

    let more = widgets.load_more(QueryOptions::new().skip(10)).await;
    assert!(more.is_empty());

    widgets.close().await.unwrap();
}

#[tokio::test]
async fn write_path_surfaces_engine_failures() {
    let haus = FacetHaus::new(Arc::new(failing_engine::DeadConnector));
    let widgets = haus.repository("Widget").await.unwrap();

    let created = widgets.create(row(json!({"id": "w9"}))).await;
    assert!(matches!(
        created,
        Err(FacetError::Engine(EngineError::Unknown(_)))
    ));

    let looked_up = widgets.one(key("id", json!("w9"))).await;
    assert!(looked_up.is_err());

    widgets.close().await.unwrap();
}
