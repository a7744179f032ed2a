use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use shelf_app::{modules::books, BookStore};
use shelf_http::AppService;
use shelf_kernel::{
    settings::{IdStrategy, Settings},
    ModuleRegistry,
};
use tower::ServiceExt;

struct TestApp {
    app: AppService,
    store: BookStore,
}

impl TestApp {
    fn new() -> Self {
        Self::with_settings(Settings::default(), BookStore::default())
    }

    fn with_settings(settings: Settings, store: BookStore) -> Self {
        let mut registry = ModuleRegistry::new();
        registry.register(books::create_module(store.clone()));
        let app = shelf_http::build_service(&registry, &settings);
        Self { app, store }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header(header::CONTENT_TYPE, "application/json");
        }
        let request = request
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
        self.send(method, uri, Some(&body.to_string())).await
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, bytes) = self.send(Method::GET, uri, None).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, body: Value) -> Value {
        let (status, bytes) = self.send_json(Method::POST, "/books", body).await;
        assert_eq!(status, StatusCode::CREATED);
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[tokio::test]
async fn create_defaults_finished_and_get_returns_it() {
    let app = TestApp::new();
    let created = app.create(json!({"title": "A", "author": "B"})).await;

    let (status, fetched) = app
        .get_json(&format!("/books/{}", created["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["finished"], false);
    assert_eq!(fetched["title"], "A");
    assert_eq!(fetched["author"], "B");
}

#[tokio::test]
async fn list_includes_finished_books() {
    let app = TestApp::new();
    app.create(json!({"title": "C", "author": "D", "finished": true}))
        .await;

    let (status, list) = app.get_json("/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["finished"], true);
}

#[tokio::test]
async fn empty_collection_lists_as_empty_array() {
    let app = TestApp::new();
    let (status, list) = app.get_json("/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn unknown_and_non_numeric_ids_are_404_with_empty_body() {
    let app = TestApp::new();
    for uri in ["/books/1", "/books/abc", "/books/1.5"] {
        let (status, body) = app.send(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body.is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn ids_are_compared_loosely() {
    let app = TestApp::new();
    app.create(json!({"title": "A", "author": "B"})).await;

    for uri in [
        "/books/1",
        "/books/1.0",
        "/books/%201",
        "/books/+1",
        "/books/01",
        "/books/0x1",
        "/books/0b1",
    ] {
        let (status, book) = app.get_json(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(book["id"], 1);
    }
}

#[tokio::test]
async fn update_sets_finished_and_keeps_the_rest() {
    let app = TestApp::new();
    let created = app.create(json!({"title": "A", "author": "B"})).await;

    let (status, body) = app
        .send_json(Method::PUT, "/books/1", json!({"finished": true}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (_, fetched) = app.get_json("/books/1").await;
    assert_eq!(fetched["finished"], true);
    assert_eq!(fetched["title"], created["title"]);
    assert_eq!(fetched["author"], created["author"]);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn update_treats_explicit_null_as_provided() {
    let app = TestApp::new();
    app.create(json!({"title": "A", "author": "B"})).await;

    let (status, _) = app
        .send_json(Method::PUT, "/books/1", json!({"title": null}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = app.get_json("/books/1").await;
    assert_eq!(fetched["title"], Value::Null);
    assert_eq!(fetched["author"], "B");
}

#[tokio::test]
async fn update_unknown_id_is_404_and_leaves_collection() {
    let app = TestApp::new();
    app.create(json!({"title": "A", "author": "B"})).await;

    let (status, body) = app
        .send_json(Method::PUT, "/books/9", json!({"title": "Z"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn delete_removes_the_book() {
    let app = TestApp::new();
    app.create(json!({"title": "A", "author": "B"})).await;
    app.create(json!({"title": "C", "author": "D"})).await;

    let (status, body) = app.send(Method::DELETE, "/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert_eq!(app.store.len().await, 1);

    let (status, _) = app.send(Method::GET, "/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_id_is_404_and_leaves_collection() {
    let app = TestApp::new();
    app.create(json!({"title": "A", "author": "B"})).await;

    let (status, body) = app.send(Method::DELETE, "/books/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn create_get_delete_scenario() {
    let app = TestApp::new();

    let first = app.create(json!({"title": "A", "author": "B"})).await;
    assert_eq!(first["id"], 1);
    assert_eq!(first["title"], "A");
    assert_eq!(first["author"], "B");
    assert_eq!(first["finished"], false);
    assert!(first["createdAt"].as_str().is_some_and(|ts| ts.ends_with('Z')));

    let second = app
        .create(json!({"title": "C", "author": "D", "finished": true}))
        .await;
    assert_eq!(second["id"], 2);

    let (_, list) = app.get_json("/books").await;
    assert_eq!(list, json!([first, second.clone()]));

    let (status, _) = app.send(Method::DELETE, "/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::GET, "/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get_json("/books").await;
    assert_eq!(list, json!([second]));
}

#[tokio::test]
async fn create_accepts_missing_and_mistyped_fields() {
    let app = TestApp::new();

    let created = app.create(json!({"title": 42})).await;
    assert_eq!(created["title"], 42);
    assert!(created.get("author").is_none());
    assert_eq!(created["finished"], false);

    let (status, bytes) = app.send(Method::POST, "/books", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let empty: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(empty["id"], 2);
}

#[tokio::test]
async fn create_without_title_or_author_omits_the_keys() {
    let app = TestApp::new();
    let created = app.create(json!({})).await;

    assert!(created.get("title").is_none());
    assert!(created.get("author").is_none());
    assert_eq!(created["finished"], false);

    let (_, fetched) = app.get_json("/books/1").await;
    assert_eq!(fetched, created);

    let (status, _) = app
        .send_json(Method::PUT, "/books/1", json!({"author": "B"}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = app.get_json("/books/1").await;
    assert!(fetched.get("title").is_none());
    assert_eq!(fetched["author"], "B");
}

#[tokio::test]
async fn trailing_slashes_reach_the_same_routes() {
    let app = TestApp::new();

    let (status, bytes) = app
        .send_json(Method::POST, "/books/", json!({"title": "A", "author": "B"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&bytes).unwrap();

    let (status, list) = app.get_json("/books/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created.clone()]));

    let (status, fetched) = app.get_json("/books/1/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _) = app.send(Method::DELETE, "/books/1/", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn malformed_json_is_rejected_without_storing() {
    let app = TestApp::new();

    let (status, bytes) = app
        .send(Method::POST, "/books", Some("{\"title\": "))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn length_strategy_reproduces_count_plus_one() {
    let mut settings = Settings::default();
    settings.books.id_strategy = IdStrategy::Length;
    let app = TestApp::with_settings(settings, BookStore::new(IdStrategy::Length));

    app.create(json!({"title": "A", "author": "B"})).await;
    app.create(json!({"title": "C", "author": "D"})).await;
    app.send(Method::DELETE, "/books/1", None).await;

    let third = app.create(json!({"title": "E", "author": "F"})).await;
    assert_eq!(third["id"], 2);
}

#[tokio::test]
async fn base_path_prefixes_module_routes() {
    let mut settings = Settings::default();
    settings.server.base_path = "/api".to_string();
    let app = TestApp::with_settings(settings, BookStore::default());

    let (status, _) = app.get_json("/api/books").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_lists_book_operations() {
    let app = TestApp::new();
    let (status, doc) = app.get_json("/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);

    assert!(doc["paths"]["/books"]["get"].is_object());
    assert!(doc["paths"]["/books"]["post"].is_object());
    for method in ["get", "put", "delete"] {
        assert!(doc["paths"]["/books/{id}"][method].is_object());
    }
    assert!(doc["components"]["schemas"]["Book"]["properties"]["createdAt"].is_object());
}
