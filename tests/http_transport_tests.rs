/// HTTP transport tests
///
/// Runs the reqwest-backed transport against an in-process axum server.
/// Run with: cargo test --test http_transport_tests
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use collection_memberships::{
    ApiConfig, ApiTransport, ClientError, CollectionPermission, CreateMembership,
    DeleteMembership, HttpTransport, PageParams, RootStore,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Seen {
    fn record(&self, headers: &HeaderMap, body: Value) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push((auth, body));
    }

    fn all(&self) -> Vec<(Option<String>, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn group_memberships(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.record(&headers, body);
    Json(json!({
        "ok": true,
        "status": 200,
        "pagination": { "offset": 0, "limit": 10, "nextPath": "/api/collections.group_memberships?offset=10" },
        "data": {
            "groups": [{ "id": "g1", "name": "Design", "memberCount": 4 }],
            "collectionGroupMemberships": [
                { "id": "m1", "collectionId": "c1", "groupId": "g1", "permission": "read" }
            ]
        }
    }))
}

async fn add_group(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.record(&headers, body.clone());
    Json(json!({
        "ok": true,
        "data": {
            "collectionGroupMemberships": [{
                "id": "m2",
                "collectionId": body["id"],
                "groupId": body["groupId"],
                "permission": body["permission"],
            }]
        }
    }))
}

async fn remove_group(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.record(&headers, body);
    Json(json!({ "ok": true, "success": true }))
}

async fn forbidden() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "ok": false,
            "error": "authorization_error",
            "status": 403,
            "message": "Authorization error"
        })),
    )
}

async fn broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn spawn_server(seen: Seen) -> String {
    let app = Router::new()
        .route("/api/collections.group_memberships", post(group_memberships))
        .route("/api/collections.add_group", post(add_group))
        .route("/api/collections.remove_group", post(remove_group))
        .route("/api/forbidden", post(forbidden))
        .route("/api/broken", post(broken))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base_url: &str) -> ApiConfig {
    ApiConfig::from_url(base_url)
        .unwrap()
        .token("secret-token")
        .timeout(Duration::from_secs(5))
        .no_proxy()
}

#[tokio::test]
async fn test_fetch_page_over_http() {
    let seen = Seen::default();
    let base_url = spawn_server(seen.clone()).await;
    let root = RootStore::connect(config(&base_url)).unwrap();

    let page = root
        .collection_group_memberships()
        .fetch_page(&PageParams::new().collection("c1").limit(10))
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].permission, CollectionPermission::Read);
    assert_eq!(page.pagination().unwrap().limit, 10);
    assert_eq!(root.groups().get("g1").await.unwrap().member_count, 4);

    let requests = seen.all();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.as_deref(), Some("Bearer secret-token"));
    assert_eq!(requests[0].1, json!({ "id": "c1", "limit": 10 }));
}

#[tokio::test]
async fn test_create_and_delete_over_http() {
    let seen = Seen::default();
    let base_url = spawn_server(seen.clone()).await;
    let root = RootStore::connect(config(&base_url)).unwrap();
    let store = root.collection_group_memberships();

    let created = store
        .create(CreateMembership::new("c3", "g3").permission(CollectionPermission::Admin))
        .await
        .unwrap();
    assert_eq!(created.permission, CollectionPermission::Admin);
    assert!(store.find("c3", "g3").await.is_some());

    let removed = store.delete(DeleteMembership::new("c3", "g3")).await.unwrap();
    assert_eq!(removed.map(|m| m.id), Some("m2".to_string()));
    assert!(store.find("c3", "g3").await.is_none());

    let bodies: Vec<Value> = seen.all().into_iter().map(|(_, body)| body).collect();
    assert_eq!(
        bodies,
        vec![
            json!({ "id": "c3", "groupId": "g3", "permission": "admin" }),
            json!({ "id": "c3", "groupId": "g3" }),
        ]
    );
}

#[tokio::test]
async fn test_error_body_maps_to_api_error() {
    let base_url = spawn_server(Seen::default()).await;
    let transport = HttpTransport::new(config(&base_url)).unwrap();

    let err = transport.post("/forbidden", json!({})).await.unwrap_err();

    match err {
        ClientError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 403);
            assert_eq!(code, "authorization_error");
            assert_eq!(message, "Authorization error");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_keeps_body_as_message() {
    let base_url = spawn_server(Seen::default()).await;
    let transport = HttpTransport::new(config(&base_url)).unwrap();

    let err = transport.post("broken", json!({})).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    match err {
        ClientError::Api { code, message, .. } => {
            assert_eq!(code, "internal_server_error");
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_route_is_reported_as_not_found() {
    let base_url = spawn_server(Seen::default()).await;
    let root = RootStore::connect(config(&base_url)).unwrap();

    let err = root.groups().fetch("g1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    match err {
        ClientError::Api { code, message, .. } => {
            assert_eq!(code, "not_found");
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(config(&format!("http://{addr}"))).unwrap();
    let err = transport
        .post("/collections.group_memberships", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
