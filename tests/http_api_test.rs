mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use teamchat_service::routes::build_router;

use common::test_state;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, first: &str, last: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "first_name": first,
            "last_name": last,
            "email": email,
            "password": "hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = build_router(test_state().await);
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let app = build_router(test_state().await);
    register(&app, "Alice", "Ivanova", "a@x.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["first_name"], "Alice");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTHENTICATION_FAULT");
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let app = build_router(test_state().await);
    register(&app, "Alice", "Ivanova", "a@x.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "first_name": "Other",
            "last_name": "Alice",
            "email": "a@x.com",
            "password": "hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn secured_routes_reject_missing_and_garbage_tokens() {
    let app = build_router(test_state().await);

    let (status, body) = send(&app, "GET", "/api/teams", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTHENTICATION_FAULT");

    let (status, _) = send(&app, "GET", "/api/teams", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn team_lifecycle_over_http() {
    let app = build_router(test_state().await);
    let alice = register(&app, "Alice", "Ivanova", "a@x.com").await;
    let bob = register(&app, "Bob", "Petrov", "b@x.com").await;

    let (status, team) = send(
        &app,
        "POST",
        "/api/teams",
        Some(&alice),
        Some(json!({ "name": "Rocket" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(team["team_chats"][0]["name"], "Чат команды Rocket");
    let team_id = team["id"].as_str().unwrap().to_string();
    let chat_id = team["team_chats"][0]["id"].as_str().unwrap().to_string();

    let (status, view) = send(
        &app,
        "POST",
        &format!("/api/teams/{team_id}/members"),
        Some(&alice),
        Some(json!({ "email": "b@x.com", "role": "frontend" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["members"].as_array().unwrap().len(), 2);

    // Bob now sees the mirrored team chat in his chat list.
    let (status, chats) = send(&app, "GET", "/api/chats", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(chats
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"] == chat_id.as_str()));

    // Bob is not the creator and cannot manage membership.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/teams/{team_id}/members"),
        Some(&bob),
        Some(json!({ "email": "a@x.com", "role": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let bob_id = view["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["user"]["first_name"] == "Bob")
        .unwrap()["user"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, view) = send(
        &app,
        "DELETE",
        &format!("/api/teams/{team_id}/members/{bob_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["members"].as_array().unwrap().len(), 1);

    // After removal the team is invisible to Bob again.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/teams/{team_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/teams/{team_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn user_search_finds_by_email_fragment() {
    let app = build_router(test_state().await);
    let alice = register(&app, "Alice", "Ivanova", "a@x.com").await;
    register(&app, "Bob", "Petrov", "b@x.com").await;
    register(&app, "Carol", "Sidorova", "c@other.org").await;

    let (status, body) = send(&app, "GET", "/api/users/search?email=x.com", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["a@x.com", "b@x.com"]);

    let (status, body) = send(&app, "GET", "/api/users/search?email=", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app, "GET", "/api/users/search?email=x.com", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_authenticated_profile() {
    let app = build_router(test_state().await);
    let alice = register(&app, "Alice", "Ivanova", "a@x.com").await;

    let (status, body) = send(&app, "GET", "/api/users/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Alice");
    assert_eq!(body["email"], "a@x.com");
}

#[tokio::test]
async fn message_history_is_participant_only() {
    let app = build_router(test_state().await);
    let alice = register(&app, "Alice", "Ivanova", "a@x.com").await;
    let carol = register(&app, "Carol", "Sidorova", "c@x.com").await;

    let (_, team) = send(
        &app,
        "POST",
        "/api/teams",
        Some(&alice),
        Some(json!({ "name": "Rocket" })),
    )
    .await;
    let chat_id = team["team_chats"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/chats/{chat_id}/messages"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/chats/{chat_id}/messages"),
        Some(&carol),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_ERROR");
}
