mod common;

use common::{doc, put, MockStore, Operation};
use scheduler_service::calendar::{seed_defaults, ReferenceData};
use scheduler_service::error::Error;
use scheduler_service::store::Collection;
use serde_json::json;
use std::fs;
use std::sync::Arc;

#[tokio::test]
async fn test_delete_calendar_cascades_to_its_events() {
    let store = Arc::new(MockStore::new());
    put(
        &store,
        Collection::Calendars,
        vec![
            json!({ "id": "work", "text": "Work", "color": "#1d5d9b" }),
            json!({ "id": "home", "text": "Home", "color": "#75c2f6" }),
        ],
    )
    .await;
    put(
        &store,
        Collection::Events,
        vec![
            json!({ "id": "e1", "calendar": "work", "start_date": "2024-01-01" }),
            json!({ "id": "e2", "calendar": "work", "start_date": "2024-01-02" }),
            json!({ "id": "e3", "calendar": "home", "start_date": "2024-01-03" }),
        ],
    )
    .await;
    let reference = ReferenceData::new(store.clone());

    reference.delete_calendar("work").await.unwrap();

    assert_eq!(store.ids(Collection::Calendars).await, vec!["home"]);
    assert_eq!(store.ids(Collection::Events).await, vec!["e3"]);
    assert_eq!(store.batch_delete_calls(), 1);
}

#[tokio::test]
async fn test_delete_calendar_failure_ordering() {
    let store = Arc::new(MockStore::failing_on(Operation::BatchDelete));
    put(&store, Collection::Calendars, vec![json!({ "id": "work" })]).await;
    put(
        &store,
        Collection::Events,
        vec![json!({ "id": "e1", "calendar": "work" })],
    )
    .await;
    let reference = ReferenceData::new(store.clone());

    let result = reference.delete_calendar("work").await;
    assert!(matches!(result, Err(Error::Store(_))));
    assert!(store.peek(Collection::Calendars, "work").await.is_none());
    assert!(store.peek(Collection::Events, "e1").await.is_some());
}

#[tokio::test]
async fn test_calendar_crud() {
    let store = Arc::new(MockStore::new());
    let reference = ReferenceData::new(store.clone());

    let id = reference
        .create_calendar(doc(json!({ "text": "Team", "color": "#e55807" })))
        .await
        .unwrap();

    reference
        .update_calendar(&id, doc(json!({ "id": "renamed", "color": "#7e1717" })))
        .await
        .unwrap();

    let calendars = reference.list_calendars().await.unwrap();
    assert_eq!(calendars.len(), 1);
    assert_eq!(calendars[0]["id"], json!(id));
    assert_eq!(calendars[0]["text"], json!("Team"));
    assert_eq!(calendars[0]["color"], json!("#7e1717"));

    let missing = reference
        .update_calendar("nope", doc(json!({ "color": "#000000" })))
        .await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_units_and_sections_are_listed() {
    let store = Arc::new(MockStore::new());
    put(
        &store,
        Collection::Units,
        vec![json!({ "id": "1", "value": "Room A" }), json!({ "id": "2", "value": "Room B" })],
    )
    .await;
    put(&store, Collection::Sections, vec![json!({ "id": "s1", "label": "Ops" })]).await;
    let reference = ReferenceData::new(store);

    assert_eq!(reference.list_units().await.unwrap().len(), 2);
    assert_eq!(reference.list_sections().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_seed_fills_only_empty_collections() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("events.json"),
        r#"[{"id": "1", "text": "Seeded", "start_date": "2024-01-01 09:00"}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("calendars.json"),
        r#"[{"id": "c1", "text": "Default"}, {"id": "c2", "text": "Holidays"}]"#,
    )
    .unwrap();
    fs::write(dir.path().join("units.json"), r#"[{"id": "u9", "value": "Extra"}]"#).unwrap();

    let store = MockStore::new();
    put(&store, Collection::Units, vec![json!({ "id": "u1", "value": "Existing" })]).await;

    let inserted = seed_defaults(&store, dir.path()).await.unwrap();

    assert_eq!(inserted, 3);
    assert_eq!(store.ids(Collection::Events).await, vec!["1"]);
    assert_eq!(store.ids(Collection::Calendars).await, vec!["c1", "c2"]);
    assert_eq!(store.ids(Collection::Units).await, vec!["u1"]);
    assert!(store.ids(Collection::Sections).await.is_empty());
}

#[tokio::test]
async fn test_seed_rejects_documents_without_id() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("sections.json"),
        r#"[{"id": "s1", "label": "Ops"}, {"label": "No id"}]"#,
    )
    .unwrap();

    let store = MockStore::new();
    let result = seed_defaults(&store, dir.path()).await;
    assert!(matches!(result, Err(Error::Config(_))));
    assert!(store.ids(Collection::Sections).await.is_empty());

    fs::write(dir.path().join("sections.json"), "not json").unwrap();
    let result = seed_defaults(&store, dir.path()).await;
    assert!(matches!(result, Err(Error::Serialization(_))));
}
