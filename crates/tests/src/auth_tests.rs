use crate::fixtures::test_app::TestApp;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

#[tokio::test]
async fn register_creates_user_and_returns_tokens() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": "alice@test.com",
            "full_name": "Alice Tenant",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 201);
    assert!(resp.headers().get("set-cookie").is_some());

    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["email"], "alice@test.com");
    assert_eq!(json["user"]["full_name"], "Alice Tenant");
    assert_eq!(json["user"]["role"], "client");
    assert!(json["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let app = TestApp::spawn().await;
    app.register_user("dup@test.com", "First User", "client").await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": "dup@test.com",
            "full_name": "Second User",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 409);
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn register_as_admin_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": "root@test.com",
            "full_name": "Would Be Admin",
            "password": "Password123!",
            "role": "admin",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn register_missing_fields_reports_details() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "email": "not-an-email" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "validation");
    assert!(json["details"]["email"].is_array());
    assert!(json["details"]["password"].is_array());
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = TestApp::spawn().await;
    app.register_user("bob@test.com", "Bob Builder", "owner").await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "bob@test.com", "password": "nope-nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "ghost@test.com", "password": "Password123!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn me_returns_current_user() {
    let app = TestApp::spawn().await;
    let user = app.register_user("me@test.com", "Mia Me", "owner").await;
    let logged_in = app.login_user("me@test.com", "Password123!").await;
    assert_eq!(logged_in.id, user.id);

    let resp = app
        .auth_get("/api/auth/me", &logged_in.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["id"], user.id);
    assert_eq!(json["role"], "owner");
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let app = TestApp::spawn().await;
    let user = app.register_user("cookie@test.com", "Cookie Monster", "client").await;

    let resp = app
        .client
        .get(app.url("/api/auth/me"))
        .header("Cookie", format!("access_token={}", user.access_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn refresh_issues_new_tokens() {
    let app = TestApp::spawn().await;
    let user = app.register_user("fresh@test.com", "Fresh Prince", "client").await;

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&json!({ "refresh_token": user.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["user"]["id"], user.id);

    // An access token is not accepted as a refresh token.
    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&json!({ "refresh_token": user.access_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let cookie = resp.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn writes_without_or_with_expired_token_are_rejected() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("expired").await;
    let path = format!("/api/properties/{}", listing.property_id);

    let resp = app
        .client
        .put(app.url(&path))
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": listing.owner.id,
        "email": listing.owner.email,
        "role": "owner",
        "iat": now - 7200,
        "exp": now - 3600,
        "iss": app.settings.jwt.issuer,
        "token_type": "access",
    });
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app.settings.jwt.secret.as_bytes()),
    )
    .unwrap();

    let resp = app
        .auth_put(&path, &expired)
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app.auth_delete(&path, &expired).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let property = app.get_json(&path).await;
    assert_eq!(property["name"], "expired flat");
}
