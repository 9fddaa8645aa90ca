//! End-to-end HTTP tests. They need a Postgres server reachable through
//! `DATABASE_URL`; run with `cargo test -- --ignored`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use expense_tracker::{app::build_app, config::AppConfig, state::AppState};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

fn test_app(pool: PgPool) -> Router {
    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused".into()),
        "JWT_SECRET" => Some("integration-secret".into()),
        _ => None,
    })
    .expect("test config");
    build_app(AppState::from_parts(pool, Arc::new(config)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn register(app: &Router, username: &str, email: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/v1/auth/register",
        None,
        Some(json!({ "username": username, "email": email, "password": "password123" })),
    )
    .await
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/v1/auth/token",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

async fn token_for(app: &Router, username: &str) -> String {
    let (status, body) = login(app, username, "password123").await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

async fn make_admin(pool: &PgPool, username: &str) {
    sqlx::query("UPDATE users SET is_admin = TRUE WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a postgres server via DATABASE_URL"]
async fn register_login_and_fetch_profile(pool: PgPool) {
    let app = test_app(pool);

    let (status, body) = register(&app, "alice", "alice@x.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert!(body.get("hashed_password").is_none());

    let (status, _) = login(&app, "alice", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, unknown) = login(&app, "nobody", "password123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = login(&app, "alice", "password123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 3600);
    let token = body["access_token"].as_str().unwrap();

    let (_, wrong) = login(&app, "alice", "wrong-password").await;
    assert_eq!(wrong["message"], unknown["message"]);

    let (status, me) = send(&app, Method::GET, "/v1/users/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["email"], "alice@x.com");
    assert_eq!(me["expenses"], json!([]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a postgres server via DATABASE_URL"]
async fn duplicate_username_and_email_conflict(pool: PgPool) {
    let app = test_app(pool);
    assert_eq!(register(&app, "alice", "alice@x.com").await.0, StatusCode::CREATED);

    let (status, body) = register(&app, "alice", "other@x.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already registered");

    let (status, body) = register(&app, "alice2", "ALICE@x.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a postgres server via DATABASE_URL"]
async fn profile_update_and_account_removal(pool: PgPool) {
    let app = test_app(pool);
    register(&app, "alice", "alice@x.com").await;
    let token = token_for(&app, "alice").await;

    let (status, me) = send(
        &app,
        Method::PATCH,
        "/v1/users/me",
        Some(&token),
        Some(json!({ "first_name": "Alice", "password": "new-password-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["first_name"], "Alice");
    assert!(me["last_name"].is_null());
    assert!(!me["updated_at"].is_null());

    assert_eq!(login(&app, "alice", "password123").await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "alice", "new-password-1").await.0, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, "/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a postgres server via DATABASE_URL"]
async fn categories_are_admin_only(pool: PgPool) {
    let app = test_app(pool.clone());
    register(&app, "alice", "alice@x.com").await;
    register(&app, "root", "root@x.com").await;
    make_admin(&pool, "root").await;
    let alice = token_for(&app, "alice").await;
    let root = token_for(&app, "root").await;

    let category = json!({ "category_name": "Groceries" });
    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/categories",
        Some(&alice),
        Some(category.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(
        &app,
        Method::POST,
        "/v1/categories",
        Some(&root),
        Some(category.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::POST, "/v1/categories", Some(&root), Some(category)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = send(&app, Method::GET, "/v1/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/v1/categories/{id}");
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&root), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&root), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a postgres server via DATABASE_URL"]
async fn expenses_belong_to_their_owner(pool: PgPool) {
    let app = test_app(pool.clone());
    register(&app, "alice", "alice@x.com").await;
    register(&app, "bob", "bob@x.com").await;
    register(&app, "root", "root@x.com").await;
    make_admin(&pool, "root").await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;
    let root = token_for(&app, "root").await;

    let (_, category) = send(
        &app,
        Method::POST,
        "/v1/categories",
        Some(&root),
        Some(json!({ "category_name": "Food" })),
    )
    .await;
    let category_id = category["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/expenses",
        Some(&alice),
        Some(json!({ "amount": 12.5, "description": "lunch", "date": "2025-03-11", "category_id": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "category_id");

    let (status, expense) = send(
        &app,
        Method::POST,
        "/v1/expenses",
        Some(&alice),
        Some(json!({ "amount": 12.5, "description": "lunch", "date": "2025-03-11", "category_id": category_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["category"]["category_name"], "Food");
    let expense_id = expense["id"].as_i64().unwrap();
    let uri = format!("/v1/expenses/{expense_id}");

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/expenses",
        Some(&bob),
        Some(json!({ "amount": 3.0, "description": "lunch", "date": "2025-03-12", "category_id": category_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::PATCH, &uri, Some(&bob), Some(json!({ "amount": 0 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(&app, Method::PATCH, &uri, Some(&alice), Some(json!({ "amount": 15.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount"], 15.0);
    assert_eq!(updated["description"], "lunch");
    assert_eq!(updated["date"], "2025-03-11");

    let (_, bobs) = send(&app, Method::GET, "/v1/expenses", Some(&bob), None).await;
    assert_eq!(bobs, json!([]));
    let (_, me) = send(&app, Method::GET, "/v1/users/me", Some(&alice), None).await;
    assert_eq!(me["expenses"].as_array().unwrap().len(), 1);

    let category_uri = format!("/v1/categories/{category_id}");
    let (status, _) = send(&app, Method::DELETE, &category_uri, Some(&root), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
