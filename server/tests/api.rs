use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{json, Value};
use tower::ServiceExt;
use unistate_users::{
    config::ServerConfig,
    db::UserRepository,
    error::{Operation, UsersError},
    routes::{build_router, AppState},
};

fn app() -> Router {
    let repo = UserRepository::open_in_memory().unwrap();
    build_router(AppState::new(repo, &ServerConfig::default()).unwrap())
}

async fn send(app: &Router, method: Method, path: &str, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, path: &str, body: Value) -> Value {
    let (status, value) = send(app, Method::POST, path, &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    value
}

async fn all_users(app: &Router) -> Value {
    let (status, value) = send(app, Method::GET, "/all-users", "").await;
    assert_eq!(status, StatusCode::OK);
    value
}

#[tokio::test]
async fn empty_table_reports_no_user() {
    let app = app();
    assert_eq!(
        all_users(&app).await,
        json!({ "success": 0, "msg": "No User Found!" })
    );
}

#[tokio::test]
async fn insert_then_list() {
    let app = app();
    let res = post(
        &app,
        "/add-user",
        json!({ "user_name": " Bob ", "user_email": "bob@example.com" }),
    )
    .await;
    assert_eq!(res["success"], 1);
    assert_eq!(res["msg"], "User Inserted.");
    let id = res["id"].as_i64().unwrap();

    assert_eq!(
        all_users(&app).await,
        json!({
            "success": 1,
            "users": [{ "id": id, "user_name": "Bob", "user_email": "bob@example.com" }]
        })
    );
}

#[rstest]
#[case(json!({ "user_name": "", "user_email": "bob@example.com" }), "Please fill all the required fields!")]
#[case(json!({ "user_email": "bob@example.com" }), "Please fill all the required fields!")]
#[case(json!({ "user_name": "Bob", "user_email": "   " }), "Please fill all the required fields!")]
#[case(json!({ "user_name": "Bob", "user_email": "bob" }), "Invalid Email Address!")]
#[case(json!({ "user_name": "Bob", "user_email": "bob@localhost" }), "Invalid Email Address!")]
#[tokio::test]
async fn invalid_insert_is_rejected(#[case] body: Value, #[case] msg: &str) {
    let app = app();
    assert_eq!(
        post(&app, "/add-user", body).await,
        json!({ "success": 0, "msg": msg })
    );
    assert_eq!(all_users(&app).await["success"], 0);
}

#[tokio::test]
async fn malformed_body_is_missing_fields() {
    let app = app();
    let (status, res) = send(&app, Method::POST, "/add-user", "{not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        res,
        json!({ "success": 0, "msg": "Please fill all the required fields!" })
    );
}

#[tokio::test]
async fn update_and_delete() {
    let app = app();
    let id = post(
        &app,
        "/add-user",
        json!({ "user_name": "a", "user_email": "a@example.com" }),
    )
    .await["id"]
        .as_i64()
        .unwrap();

    let res = post(
        &app,
        "/update-user",
        json!({ "id": id, "user_name": "z", "user_email": "z@example.com" }),
    )
    .await;
    assert_eq!(res, json!({ "success": 1, "msg": "User Updated." }));
    assert_eq!(all_users(&app).await["users"][0]["user_name"], "z");

    let res = post(
        &app,
        "/update-user",
        json!({ "id": id + 1, "user_name": "z", "user_email": "z@example.com" }),
    )
    .await;
    assert_eq!(res, json!({ "success": 0, "msg": "User Not Updated!" }));

    let res = post(&app, "/delete-user", json!({ "id": id })).await;
    assert_eq!(res, json!({ "success": 1, "msg": "User Deleted." }));

    let res = post(&app, "/delete-user", json!({ "id": id })).await;
    assert_eq!(res, json!({ "success": 0, "msg": "User Not Deleted!" }));

    let res = post(&app, "/delete-user", json!({})).await;
    assert_eq!(
        res,
        json!({ "success": 0, "msg": "Please fill all the required fields!" })
    );
}

#[tokio::test]
async fn php_paths_are_served() {
    let app = app();
    let res = post(
        &app,
        "/add-user.php",
        json!({ "user_name": "a", "user_email": "a@example.com" }),
    )
    .await;
    assert_eq!(res["success"], 1);
    let (_, res) = send(&app, Method::GET, "/all-users.php", "").await;
    assert_eq!(res["users"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[case("/all-users")]
#[case("/add-user")]
#[case("/update-user")]
#[case("/delete-user")]
#[tokio::test]
async fn preflight_has_cors_headers(#[case] path: &str) {
    let app = app();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let headers = res.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .contains("POST"));
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
}

#[tokio::test]
async fn responses_carry_configured_origin() {
    let repo = UserRepository::open_in_memory().unwrap();
    let config = ServerConfig {
        allow_origin: "http://localhost:3000".into(),
        ..ServerConfig::default()
    };
    let app = build_router(AppState::new(repo, &config).unwrap());
    let req = Request::builder()
        .uri("/all-users")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn state_shares_repository() {
    let repo = UserRepository::open_in_memory().unwrap();
    let state = AppState::new(repo, &ServerConfig::default()).unwrap();
    let repo = Arc::clone(&state.repo);
    let app = build_router(state);
    post(
        &app,
        "/add-user",
        json!({ "user_name": "a", "user_email": "a@example.com" }),
    )
    .await;
    assert_eq!(repo.all().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_inserts_all_land() {
    let app = app();
    let inserts = (0..8).map(|i| {
        let app = app.clone();
        async move {
            post(
                &app,
                "/add-user",
                json!({ "user_name": format!("u{i}"), "user_email": format!("u{i}@example.com") }),
            )
            .await
        }
    });
    let results = futures::future::join_all(inserts).await;
    let mut ids: Vec<i64> = results
        .iter()
        .map(|res| {
            assert_eq!(res["success"], 1);
            res["id"].as_i64().unwrap()
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(all_users(&app).await["users"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn failed_blocking_task_reports_operation_failure() {
    let err = tokio::task::spawn_blocking(|| panic!("worker failed"))
        .await
        .unwrap_err();
    let err = UsersError::task(Operation::Insert)(err);
    assert_eq!(err.message(), "User Not Inserted!");
    assert_eq!(
        serde_json::to_value(err.to_response()).unwrap(),
        json!({ "success": 0, "msg": "User Not Inserted!" })
    );
}
