use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;

use super::routes::with_request_timeout;
use super::{AppState, create_router, create_router_with_limits};
use crate::http::routes::DEFAULT_REQUEST_TIMEOUT;

async fn test_state(allowed_roles: Vec<String>) -> AppState<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    rolekeep_db::run_migrations(&db).await.unwrap();
    AppState::with_allowed_roles(db, allowed_roles)
}

async fn test_router() -> Router {
    create_router(test_state(Vec::new()).await)
}

async fn send_raw(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(text)
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, text) = send_raw(router, method, uri, body.map(|b| b.to_string())).await;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, value)
}

fn roles_by_key(data: &Value) -> Vec<(String, String, String)> {
    let mut rows: Vec<_> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            (
                p["user_id"].as_str().unwrap().to_string(),
                p["org_name"].as_str().unwrap().to_string(),
                p["role"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    rows.sort();
    rows
}

fn triple(user: &str, org: &str, role: &str) -> (String, String, String) {
    (user.into(), org.into(), role.into())
}

// ============================================================
// Health and docs
// ============================================================

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router().await;
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn docs_page_points_at_openapi_document() {
    let router = test_router().await;
    let (status, html) = send_raw(&router, Method::GET, "/docs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("/openapi.json"));
}

#[tokio::test]
async fn openapi_document_lists_every_route() {
    let router = test_router().await;
    let (status, doc) = send(&router, Method::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);

    let paths = doc["paths"].as_object().unwrap();
    for path in ["/users", "/users/{user_id}", "/orgs", "/permissions"] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(paths["/permissions"].get("delete").is_some());
}

// ============================================================
// Users
// ============================================================

#[tokio::test]
async fn create_then_fetch_user() {
    let router = test_router().await;
    let (status, created) = send(
        &router,
        Method::POST,
        "/users",
        Some(json!({ "name": "Ann", "email": "ann@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&router, Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Ann");
    assert_eq!(fetched["email"], "ann@example.com");
}

#[tokio::test]
async fn unknown_user_is_404() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::GET,
        "/users/6f1c2b1e-5d7a-4c39-9a43-0b8f3b6f2a10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn malformed_user_id_is_400() {
    let router = test_router().await;
    let (status, body) = send(&router, Method::GET, "/users/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn duplicate_user_id_is_409() {
    let router = test_router().await;
    let user = json!({
        "id": "0d5e4a52-96a4-4f4e-9d1b-3c2a6f7e8b90",
        "name": "Ann",
        "email": "ann@example.com"
    });

    let (status, _) = send(&router, Method::POST, "/users", Some(user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, Method::POST, "/users", Some(user)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn user_with_bad_email_is_400() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/users",
        Some(json!({ "name": "Ann", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn malformed_json_is_400_with_api_error_body() {
    let router = test_router().await;
    let (status, text) = send_raw(
        &router,
        Method::POST,
        "/users",
        Some("{\"name\": ".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn user_name_filter_is_case_insensitive_substring() {
    let router = test_router().await;
    for name in ["Ann", "Bob", "annette", "JoANNa"] {
        let email = format!("{}@example.com", name.to_lowercase());
        let (status, _) = send(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "name": name, "email": email })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&router, Method::GET, "/users?name=ann", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let mut names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Ann", "JoANNa", "annette"]);

    let (_, all) = send(&router, Method::GET, "/users", None).await;
    assert_eq!(all["count"], 4);
}

#[tokio::test]
async fn malformed_query_string_is_400_with_api_error_body() {
    let router = test_router().await;
    let (status, text) = send_raw(&router, Method::GET, "/users?name=a&name=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(&router, Method::GET, "/orgs?name=a&name=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn slow_request_times_out_with_api_error_body() {
    let slow = Router::new().route(
        "/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "done"
        }),
    );
    let router = with_request_timeout(slow, Duration::from_millis(20));

    let (status, body) = send(&router, Method::GET, "/slow", None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["code"], "request_timeout");
}

// ============================================================
// Organizations
// ============================================================

#[tokio::test]
async fn duplicate_org_name_is_409_and_keeps_original() {
    let router = test_router().await;
    let (status, original) = send(
        &router,
        Method::POST,
        "/orgs",
        Some(json!({ "name": "acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        Method::POST,
        "/orgs",
        Some(json!({ "name": "acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (_, listed) = send(&router, Method::GET, "/orgs?name=acme", None).await;
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["data"][0]["id"], original["id"]);
}

#[tokio::test]
async fn blank_org_name_is_400() {
    let router = test_router().await;
    let (status, _) = send(&router, Method::POST, "/orgs", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================
// Permissions
// ============================================================

#[tokio::test]
async fn upsert_then_delete_round() {
    let router = test_router().await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/permissions",
        Some(json!([
            { "user_id": "u1", "org_name": "orgA", "role": "admin" },
            { "user_id": "u1", "org_name": "orgA", "role": "viewer" },
            { "user_id": "u2", "org_name": "orgB", "role": "editor" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["created"], 2);
    assert_eq!(body["updated"], 0);
    assert_eq!(
        roles_by_key(&body["data"]),
        vec![triple("u1", "orgA", "viewer"), triple("u2", "orgB", "editor")]
    );

    let (status, body) = send(
        &router,
        Method::DELETE,
        "/permissions",
        Some(json!([
            { "user_id": "u1", "org_name": "orgA" },
            { "user_id": "u1", "org_name": "orgA" },
            { "user_id": "u9", "org_name": "orgZ" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_count"], 1);
    assert_eq!(body["deleted"], json!([{ "user_id": "u1", "org_name": "orgA" }]));
    assert_eq!(body["not_found"], json!([{ "user_id": "u9", "org_name": "orgZ" }]));
    assert_eq!(body["message"], "1 permissions removed");

    let (_, body) = send(
        &router,
        Method::POST,
        "/permissions",
        Some(json!([{ "user_id": "u2", "org_name": "orgB", "role": "editor" }])),
    )
    .await;
    assert_eq!(body["created"], 0);
    assert_eq!(body["updated"], 1);
}

#[tokio::test]
async fn deleting_unknown_keys_reports_nothing_removed() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::DELETE,
        "/permissions",
        Some(json!([{ "user_id": "ghost", "org_name": "nowhere", "role": "READ" }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_count"], 0);
    assert_eq!(body["message"], "No permission matched the given keys");
}

#[tokio::test]
async fn incomplete_entry_rejects_whole_batch() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/permissions",
        Some(json!([
            { "user_id": "u1", "org_name": "orgA", "role": "READ" },
            { "user_id": "u2", "org_name": "orgB" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("entry 1"));

    let (_, body) = send(
        &router,
        Method::DELETE,
        "/permissions",
        Some(json!([{ "user_id": "u1", "org_name": "orgA" }])),
    )
    .await;
    assert_eq!(body["deleted_count"], 0);
}

#[tokio::test]
async fn empty_batch_is_400() {
    let router = test_router().await;
    let (status, _) = send(&router, Method::POST, "/permissions", Some(json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, Method::DELETE, "/permissions", Some(json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_outside_allow_list_is_400() {
    let state = test_state(vec!["READ".into(), "WRITE".into(), "ADMIN".into()]).await;
    let router = create_router(state);

    let (status, body) = send(
        &router,
        Method::POST,
        "/permissions",
        Some(json!([{ "user_id": "u1", "org_name": "orgA", "role": "OWNER" }])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("OWNER"));

    let (status, _) = send(
        &router,
        Method::POST,
        "/permissions",
        Some(json!([{ "user_id": "u1", "org_name": "orgA", "role": "ADMIN" }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn oversized_body_is_413() {
    let state = test_state(Vec::new()).await;
    let router = create_router_with_limits(state, 64, DEFAULT_REQUEST_TIMEOUT);

    let entries: Vec<Value> = (0..10)
        .map(|i| json!({ "user_id": format!("user-{i}"), "org_name": "orgA", "role": "READ" }))
        .collect();
    let (status, _) = send_raw(
        &router,
        Method::POST,
        "/permissions",
        Some(Value::Array(entries).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
