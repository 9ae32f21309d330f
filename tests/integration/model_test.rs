//! Integration tests for persisted model operations.

use serde_json::json;

use loopback::prelude::*;
use loopback::PersistedState;

use crate::helpers::TestServer;

fn props(value: serde_json::Value) -> Properties {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_create_then_update() {
    let server = TestServer::start().await;
    let widgets = server.registry.persisted("widgets");

    let mut widget = widgets.model(props(json!({"name": "gear", "price": 3})));
    widget.save().await.unwrap();
    let id = widget.id().cloned().unwrap();
    assert_eq!(server.hits(), 1);

    widget.set("price", 4).unwrap();
    widget.save().await.unwrap();
    assert_eq!(server.hits(), 2);
    assert_eq!(widget.id(), Some(&id));

    let fetched = widgets.find_by_id(&id).await.unwrap();
    assert_eq!(fetched.get_i64("price"), Some(4));
    assert_eq!(fetched.get_str("name"), Some("gear"));
}

#[tokio::test]
async fn test_server_validation_error() {
    let server = TestServer::start().await;
    let mut widget = server
        .registry
        .persisted("widgets")
        .model(props(json!({"name": ""})));

    let err = widget.save().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.status, Some(422));
    assert_eq!(err.message, "name can't be blank");
    assert_eq!(widget.state(), PersistedState::Unsaved);
}

#[tokio::test]
async fn test_find_missing_id_fails() {
    let server = TestServer::start().await;
    let err = server
        .registry
        .persisted("widgets")
        .find_by_id(&ModelId::from(404))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_all_returns_every_record() {
    let server = TestServer::start().await;
    for name in ["gear", "cog", "sprocket"] {
        server.seed_model("widgets", json!({ "name": name }));
    }

    let models = server.registry.persisted("widgets").all().await.unwrap();
    assert_eq!(models.len(), 3);
    let mut ids: Vec<String> = models
        .iter()
        .filter_map(|m| m.id().map(ToString::to_string))
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_exists_and_find_one() {
    let server = TestServer::start().await;
    let id = server.seed_model("widgets", json!({"name": "gear"}));
    server.seed_model("widgets", json!({"name": "cog"}));
    let widgets = server.registry.persisted("widgets");

    assert!(widgets.exists(&ModelId::from(id)).await.unwrap());
    assert!(!widgets.exists(&ModelId::from(999)).await.unwrap());

    let cog = widgets
        .find_one(&json!({"where": {"name": "cog"}}))
        .await
        .unwrap();
    assert_eq!(cog.get_str("name"), Some("cog"));

    let err = widgets
        .find_one(&json!({"where": {"name": "none"}}))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_destroy_removes_record() {
    let server = TestServer::start().await;
    let id = server.seed_model("widgets", json!({"name": "gear"}));
    let widgets = server.registry.persisted("widgets");

    let mut widget = widgets.find_by_id(&ModelId::from(id)).await.unwrap();
    widget.destroy().await.unwrap();

    assert_eq!(widget.state(), PersistedState::Destroyed);
    assert!(!server.has_model("widgets", id));

    let mut unsaved = widgets.model(Properties::new());
    let hits = server.hits();
    assert!(unsaved.destroy().await.is_err());
    assert_eq!(server.hits(), hits);
}

#[tokio::test]
async fn test_dispatch_calls_one_callback() {
    let server = TestServer::start().await;
    let widgets = server.registry.persisted("widgets");
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let ok = tx.clone();
    let failed = tx.clone();
    let repo = widgets.clone();
    loopback::dispatch(
        async move { repo.find_by_id(&ModelId::from(1)).await },
        move |_| {
            let _ = ok.send("success");
        },
        move |_| {
            let _ = failed.send("failure");
        },
    )
    .await
    .unwrap();
    drop(tx);

    assert_eq!(rx.recv().await, Some("failure"));
    assert_eq!(rx.recv().await, None);
}
