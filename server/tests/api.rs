use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use todo_core::{KeyValueStore, Keyspace, ListId, MemoryStore, StoreError, TodoList, TodoRepository};
use todo_server::{app, Created, ErrorBody, Message};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn memory() -> (TodoRepository, MemoryStore) {
    let store = MemoryStore::new();
    let repo = TodoRepository::new(Arc::new(store.clone()), Keyspace::default());
    (repo, store)
}

struct DownStore;

#[async_trait]
impl KeyValueStore for DownStore {
    async fn incr(&self, _key: &str) -> Result<u64, StoreError> {
        Err(StoreError::Connection("refused".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Connection("refused".into()))
    }

    async fn set(&self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Connection("refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<u64, StoreError> {
        Err(StoreError::Connection("refused".into()))
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Connection("refused".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Connection("refused".into()))
    }
}

fn down() -> TodoRepository {
    TodoRepository::new(Arc::new(DownStore), Keyspace::default())
}

// --- welcome / health ---

#[tokio::test]
async fn welcome_lists_endpoints() {
    let (repo, _) = memory();
    let resp = app(repo).oneshot(request("GET", "/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["endpoints"]["POST /todo"].is_string());
    assert!(body["endpoints"]["GET /todos"].is_string());
}

#[tokio::test]
async fn health_reports_ok() {
    let (repo, _) = memory();
    let resp = app(repo).oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_store_outage() {
    let resp = app(down()).oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// --- create ---

#[tokio::test]
async fn create_list_returns_201() {
    let (repo, _) = memory();
    let resp = app(repo)
        .oneshot(json_request("POST", "/todo", r#"{"tasks":["Buy milk","Walk dog"]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Created = body_json(resp).await;
    assert_eq!(created.id, ListId::new(1));
    assert_eq!(created.message, "To-Do List saved successfully");
}

#[tokio::test]
async fn create_list_rejects_bad_payloads_without_using_ids() {
    let (repo, store) = memory();
    let payloads = [
        r#"{"tasks":[]}"#,
        r#"{"tasks":"not-a-list"}"#,
        r#"{"tasks":["ok", 3]}"#,
        r#"{"title":"Buy milk"}"#,
        r#"["Buy milk"]"#,
        "not json",
    ];

    for payload in payloads {
        let resp = app(repo.clone())
            .oneshot(json_request("POST", "/todo", payload))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body: ErrorBody = body_json(resp).await;
        assert_eq!(body.code, "INVALID_INPUT", "{payload}");
    }

    assert_eq!(store.get(repo.keys().counter_key()).await.unwrap(), None);
}

#[tokio::test]
async fn create_list_missing_content_type_is_rejected() {
    let (repo, _) = memory();
    let req = Request::builder()
        .method("POST")
        .uri("/todo")
        .body(r#"{"tasks":["a"]}"#.to_string())
        .unwrap();
    let resp = app(repo).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get ---

#[tokio::test]
async fn get_list_not_found() {
    let (repo, _) = memory();
    let resp = app(repo).oneshot(request("GET", "/todo/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.code, "NOT_FOUND");
}

#[tokio::test]
async fn get_list_bad_id_returns_400() {
    let (repo, _) = memory();
    for uri in ["/todo/not-a-number", "/todo/-1", "/todo/1.5", "/todo/0", "/todo/+1", "/todo/01"] {
        let resp = app(repo.clone()).oneshot(request("GET", uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: ErrorBody = body_json(resp).await;
        assert_eq!(body.code, "INVALID_ID");
    }
}

#[tokio::test]
async fn non_canonical_id_does_not_reach_existing_list() {
    let (repo, _) = memory();
    repo.create_list(vec!["a".to_string()]).await.unwrap();

    for method in ["GET", "DELETE"] {
        let resp = app(repo.clone()).oneshot(request(method, "/todo/+1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{method}");
    }
    // Still there under its canonical id.
    let resp = app(repo).oneshot(request("GET", "/todo/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn get_corrupt_list_returns_500() {
    let (repo, store) = memory();
    store.set("todo:list:1", b"['a', 'b']").await.unwrap();

    let resp = app(repo).oneshot(request("GET", "/todo/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.code, "CORRUPT_DATA");
}

#[tokio::test]
async fn store_outage_returns_503() {
    for req in [
        request("GET", "/todo/1"),
        request("DELETE", "/todo/1"),
        request("GET", "/todos"),
        json_request("POST", "/todo", r#"{"tasks":["a"]}"#),
    ] {
        let resp = app(down()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorBody = body_json(resp).await;
        assert_eq!(body.code, "STORE_UNAVAILABLE");
    }
}

// --- delete ---

#[tokio::test]
async fn delete_list_not_found() {
    let (repo, _) = memory();
    let resp = app(repo).oneshot(request("DELETE", "/todo/7")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- list ---

#[tokio::test]
async fn list_all_skips_corrupt_entries() {
    let (repo, store) = memory();
    let id = repo.create_list(vec!["kept".to_string()]).await.unwrap();
    store.set("todo:list:99", b"garbage").await.unwrap();

    let resp = app(repo).oneshot(request("GET", "/todos")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let all: BTreeMap<String, Vec<String>> = body_json(resp).await;
    assert_eq!(all, BTreeMap::from([(id.to_string(), vec!["kept".to_string()])]));
}

// --- full lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let (repo, _) = memory();
    let mut app = app(repo).into_service();

    // create three lists
    let mut ids = Vec::new();
    for tasks in [r#"["one"]"#, r#"["two"]"#, r#"["three","3"]"#] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/todo", &format!(r#"{{"tasks":{tasks}}}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Created = body_json(resp).await;
        ids.push(created.id);
    }
    assert_eq!(ids, vec![ListId::new(1), ListId::new(2), ListId::new(3)]);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/todo/3"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: TodoList = body_json(resp).await;
    assert_eq!(fetched.id, ListId::new(3));
    assert_eq!(fetched.tasks, vec!["three", "3"]);

    // delete the middle one
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", "/todo/2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let message: Message = body_json(resp).await;
    assert_eq!(message.message, "To-Do List deleted");

    // delete again is 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", "/todo/2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // ids 1 and 3 remain
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/todos"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let all: BTreeMap<String, Vec<String>> = body_json(resp).await;
    assert_eq!(
        all,
        BTreeMap::from([
            ("1".to_string(), vec!["one".to_string()]),
            ("3".to_string(), vec!["three".to_string(), "3".to_string()]),
        ])
    );

    // the next create does not reuse id 2
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todo", r#"{"tasks":["four"]}"#))
        .await
        .unwrap();
    let created: Created = body_json(resp).await;
    assert_eq!(created.id, ListId::new(4));
}
