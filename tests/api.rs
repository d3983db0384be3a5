use std::str::FromStr;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tower::ServiceExt;

use travel_journal::database::{user_repo, MIGRATOR};
use travel_journal::services::user_service::{self, CreateUser};
use travel_journal::state::AppState;
use travel_journal::web::routes;

struct TestUser {
    id: String,
    cookie: String,
}

async fn setup() -> (Router, SqlitePool) {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();

    (routes::router(AppState::new(pool.clone())), pool)
}

async fn sign_up(pool: &SqlitePool, username: &str) -> TestUser {
    let user = user_service::create_user(
        pool,
        CreateUser {
            first_name: "Test".to_string(),
            last_name: username.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            hash_pwd: "$2b$10$hash".to_string(),
        },
    )
    .await
    .unwrap();

    let session = format!("session-{username}");
    user_repo::set_jwt_id(pool, &user.id, Some(&session))
        .await
        .unwrap();

    let payload =
        general_purpose::URL_SAFE_NO_PAD.encode(json!({ "jwtId": session }).to_string());
    TestUser {
        id: user.id,
        cookie: format!("access_token=eyJhbGciOiJIUzI1NiJ9.{payload}.sig"),
    }
}

async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    user: Option<&TestUser>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(u) = user {
        builder = builder.header(header::COOKIE, &u.cookie);
    }
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let resp = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn requests_without_session_are_rejected() {
    let (app, pool) = setup().await;
    let alice = sign_up(&pool, "alice").await;

    let (status, body) = call(&app, "GET", &format!("/api/user/{}", alice.id), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let forged = TestUser {
        id: alice.id.clone(),
        cookie: "access_token=a.bm90LWpzb24.c".to_string(),
    };
    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/user/{}", alice.id),
        Some(&forged),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invite_accept_and_remove() {
    let (app, pool) = setup().await;
    let alice = sign_up(&pool, "alice").await;
    let bob = sign_up(&pool, "bob").await;

    let (status, sent) = call(
        &app,
        "POST",
        &format!("/api/user/{}/friend", alice.id),
        Some(&alice),
        Some(json!({ "friendId": bob.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["status"], "waiting");
    assert_eq!(sent["userId"], alice.id.as_str());
    assert_eq!(sent["friend"]["id"], bob.id.as_str());
    assert!(sent["friend"].get("email").is_none());

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/user/{}/friend", bob.id),
        Some(&bob),
        Some(json!({ "friendId": alice.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A pending invitation does not open alice's profile to bob.
    let (status, _) = call(&app, "GET", &format!("/api/user/{}", alice.id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/friend/{}", sent["id"].as_str().unwrap()),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, invitations) = call(
        &app,
        "GET",
        &format!("/api/user/{}/friend?status=invitation", bob.id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invitations["totalCount"], 1);
    let invitation_id = invitations["items"][0]["id"].as_str().unwrap().to_string();

    let (status, accepted) = call(
        &app,
        "PATCH",
        &format!("/api/friend/{invitation_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (status, profile) = call(
        &app,
        "GET",
        &format!("/api/user/{}", alice.id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "alice");
    assert!(profile.get("email").is_none());

    let (status, own) = call(
        &app,
        "GET",
        &format!("/api/user/{}", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["email"], "alice@example.com");

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/friend/{invitation_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/friend/{invitation_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, alice_friends) = call(
        &app,
        "GET",
        &format!("/api/user/{}/friend", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(alice_friends["totalCount"], 0);
}

#[tokio::test]
async fn invite_input_is_validated() {
    let (app, pool) = setup().await;
    let alice = sign_up(&pool, "alice").await;
    let bob = sign_up(&pool, "bob").await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/user/{}/friend", alice.id),
        Some(&alice),
        Some(json!({ "friendId": "too-short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    // Acting on someone else's list.
    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/user/{}/friend", bob.id),
        Some(&alice),
        Some(json!({ "friendId": alice.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/user/{}/friend?status=blocked", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/user/{}/friend?page=0", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_excludes_related_users() {
    let (app, pool) = setup().await;
    let alice = sign_up(&pool, "alice").await;
    let bob = sign_up(&pool, "bob_traveller").await;
    let carol = sign_up(&pool, "carol_traveller").await;

    call(
        &app,
        "POST",
        &format!("/api/user/{}/friend", alice.id),
        Some(&alice),
        Some(json!({ "friendId": bob.id })),
    )
    .await;

    let (status, page) = call(
        &app,
        "GET",
        &format!("/api/user/{}/friend/search?search=traveller", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["items"][0]["id"], carol.id.as_str());

    let (status, short) = call(
        &app,
        "GET",
        &format!("/api/user/{}/friend/search?search=t", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(short, json!({ "items": [], "totalPages": 0, "totalCount": 0 }));
}

#[tokio::test]
async fn travels_and_posts_follow_friendship() {
    let (app, pool) = setup().await;
    let alice = sign_up(&pool, "alice").await;
    let bob = sign_up(&pool, "bob").await;

    let (status, travel) = call(
        &app,
        "POST",
        &format!("/api/user/{}/travel", alice.id),
        Some(&alice),
        Some(json!({
            "title": "Patagonia",
            "destination": "El Chaltén",
            "comradesCount": 2,
            "startAt": "2024-02-01",
            "endAt": "2024-02-20"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let travel_id = travel["id"].as_str().unwrap().to_string();
    assert_eq!(travel["authorId"], alice.id.as_str());

    let (status, post) = call(
        &app,
        "POST",
        &format!("/api/travel/{travel_id}/post"),
        Some(&alice),
        Some(json!({ "title": "Fitz Roy", "destination": "Laguna de los Tres" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let post_id = post["id"].as_str().unwrap().to_string();

    for uri in [
        format!("/api/travel/{travel_id}"),
        format!("/api/travel/{travel_id}/post"),
        format!("/api/post/{post_id}"),
        format!("/api/user/{}/travel", alice.id),
    ] {
        let (status, _) = call(&app, "GET", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }

    let (status, _) = call(
        &app,
        "GET",
        "/api/travel/00000000-0000-0000-0000-000000000000",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, sent) = call(
        &app,
        "POST",
        &format!("/api/user/{}/friend", alice.id),
        Some(&alice),
        Some(json!({ "friendId": bob.id })),
    )
    .await;
    let (_, invitations) = call(
        &app,
        "GET",
        &format!("/api/user/{}/friend?status=invitation", bob.id),
        Some(&bob),
        None,
    )
    .await;
    assert_ne!(sent["id"], invitations["items"][0]["id"]);
    call(
        &app,
        "PATCH",
        &format!("/api/friend/{}", invitations["items"][0]["id"].as_str().unwrap()),
        Some(&bob),
        None,
    )
    .await;

    let (status, seen) = call(&app, "GET", &format!("/api/post/{post_id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seen["title"], "Fitz Roy");

    let (status, feed) = call(
        &app,
        "GET",
        &format!("/api/user/{}/index", bob.id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["totalCount"], 1);
    assert_eq!(feed["items"][0]["travel"]["id"], travel_id.as_str());
    assert_eq!(feed["items"][0]["user"]["id"], alice.id.as_str());

    // Friends read, only the owner writes.
    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/post/{post_id}"),
        Some(&bob),
        Some(json!({ "title": "Mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/travel/{travel_id}"),
        Some(&alice),
        Some(json!({ "startAt": "2024-03-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, stats) = call(
        &app,
        "GET",
        &format!("/api/user/{}/stats", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "travelsCount": 1, "postsCount": 1 }));

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/travel/{travel_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", &format!("/api/post/{post_id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (app, pool) = setup().await;
    let alice = sign_up(&pool, "alice").await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &alice.cookie)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        resp.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("access_token=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/user/{}", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_needs_no_session() {
    let (app, pool) = setup().await;

    let (status, created) = call(
        &app,
        "POST",
        "/api/user",
        None,
        Some(json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "username": "grace",
            "email": "Grace@Example.com",
            "hashPwd": "$2b$10$hash"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["username"], "grace");
    assert_eq!(created["email"], "grace@example.com");
    assert!(created.get("hashPwd").is_none());

    let stored = user_repo::find_user_by_id(&pool, created["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.hash_pwd, "$2b$10$hash");

    let (status, body) = call(
        &app,
        "POST",
        "/api/user",
        None,
        Some(json!({
            "firstName": "Grace",
            "lastName": "Again",
            "username": "grace",
            "email": "other@example.com",
            "hashPwd": "$2b$10$hash"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn deleting_an_account_removes_its_friendships() {
    let (app, pool) = setup().await;
    let alice = sign_up(&pool, "alice").await;
    let bob = sign_up(&pool, "bob").await;

    call(
        &app,
        "POST",
        &format!("/api/user/{}/friend", alice.id),
        Some(&alice),
        Some(json!({ "friendId": bob.id })),
    )
    .await;

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/user/{}", alice.id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, deleted) = call(
        &app,
        "DELETE",
        &format!("/api/user/{}", alice.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], alice.id.as_str());

    let (status, friends) = call(
        &app,
        "GET",
        &format!("/api/user/{}/friend", bob.id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(friends["totalCount"], 0);

    // The old session no longer resolves to anyone.
    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/user/{}", bob.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn out_of_range_page_is_a_bad_request() {
    let (app, pool) = setup().await;
    let alice = sign_up(&pool, "alice").await;

    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/user/{}/travel?page={}", alice.id, i64::MAX),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}
