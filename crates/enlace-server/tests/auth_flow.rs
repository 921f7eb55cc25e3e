// End-to-end auth flow against the in-memory backend.
// Run with: cargo test -p enlace-server --test auth_flow

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use enlace_core::{CreatorProfile, UserRole, UserStatus};
use enlace_server::auth::AuthConfig;
use enlace_server::storage::password::hash_password;
use enlace_server::storage::{CreateUserRow, StorageBackend, UpdateUserRow};
use enlace_server::{build_router, seed_admin, AppContext};

const CRON_SECRET: &str = "test-cron-secret";

struct TestApp {
    router: Router,
    db: StorageBackend,
}

async fn test_app() -> TestApp {
    let db = StorageBackend::in_memory();
    seed_admin(&db, "admin@enlace.local", "adminpass").await.unwrap();

    let profile = CreatorProfile {
        name: "Ana".to_string(),
        subtitle: None,
        bio: "Daily words".to_string(),
        avatar_url: None,
        links: vec![],
    };

    let ctx = AppContext::new(
        db.clone(),
        AuthConfig::default(),
        profile,
        Some(CRON_SECRET.to_string()),
    );

    TestApp {
        router: build_router(&ctx),
        db,
    }
}

async fn create_user(db: &StorageBackend, email: &str, password: &str, status: UserStatus) {
    db.create_user(CreateUserRow {
        name: "Member".to_string(),
        email: email.to_string(),
        password_hash: hash_password(password).unwrap(),
        role: UserRole::User.to_string(),
        status: status.to_string(),
    })
    .await
    .unwrap();
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Pull the `session_token=...` pair out of a login response.
fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set a cookie")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/v1/auth/login",
            json!({"email": email, "password": password}),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_login_me_deactivate_logout_flow() {
    let app = test_app().await;
    create_user(&app.db, "a@x.com", "secret1", UserStatus::Active).await;

    // Login returns the public user and sets the session cookie
    let response = login(&app.router, "a@x.com", "secret1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    assert!(cookie.starts_with("session_token="));

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"].get("password_hash").is_none());

    // The session resolves
    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/v1/auth/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["is_admin"], false);

    // Deactivate the user behind the live session
    let row = app
        .db
        .get_user_by_email_with_password("a@x.com")
        .await
        .unwrap()
        .unwrap();
    app.db
        .update_user(
            row.id,
            UpdateUserRow {
                status: Some(UserStatus::Inactive.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The unexpired token no longer authenticates
    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/v1/auth/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = test_app().await;
    create_user(&app.db, "a@x.com", "secret1", UserStatus::Active).await;

    let response = login(&app.router, "a@x.com", "secret1").await;
    let cookie = session_cookie(&response);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/v1/auth/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_cookie_succeeds() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app().await;
    create_user(&app.db, "a@x.com", "secret1", UserStatus::Active).await;
    create_user(&app.db, "off@x.com", "secret1", UserStatus::Inactive).await;

    // Wrong password, unknown email, inactive account with correct password:
    // same status, same body
    let wrong_password = login(&app.router, "a@x.com", "nope").await;
    let unknown_email = login(&app.router, "ghost@x.com", "secret1").await;
    let inactive = login(&app.router, "off@x.com", "secret1").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(inactive.status(), StatusCode::UNAUTHORIZED);

    let first = body_json(wrong_password).await;
    let second = body_json(unknown_email).await;
    let third = body_json(inactive).await;
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[tokio::test]
async fn test_admin_gate_distinguishes_401_from_403() {
    let app = test_app().await;
    create_user(&app.db, "a@x.com", "secret1", UserStatus::Active).await;

    // Anonymous: 401
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/v1/users").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Authenticated non-admin: 403
    let cookie = session_cookie(&login(&app.router, "a@x.com", "secret1").await);
    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/v1/users", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin: 200
    let admin_cookie = session_cookie(&login(&app.router, "admin@enlace.local", "adminpass").await);
    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/v1/users", &admin_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_deactivate_own_account() {
    let app = test_app().await;
    let admin_cookie = session_cookie(&login(&app.router, "admin@enlace.local", "adminpass").await);

    let admin_row = app
        .db
        .get_user_by_email_with_password("admin@enlace.local")
        .await
        .unwrap()
        .unwrap();

    let mut request = json_request(
        "PATCH",
        &format!("/v1/users/{}", admin_row.id),
        json!({"status": "inactive"}),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, admin_cookie.parse().unwrap());

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_profile_needs_no_auth() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/v1/profile").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Ana");
}

#[tokio::test]
async fn test_collector_trigger_requires_secret() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/cron/collector")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/cron/collector")
                .header(header::AUTHORIZATION, format!("Bearer {}", CRON_SECRET))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"]["processed"], 0);
}
