use crate::fixtures::test_app::TestApp;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

#[tokio::test]
async fn update_profile_with_avatar() {
    let app = TestApp::spawn().await;
    let user = app.register_user("pic@test.com", "Pat Picture", "client").await;

    let avatar = Part::bytes(vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3])
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap();
    let form = Form::new()
        .text("full_name", "Pat Portrait")
        .text("phone_number", "+43 660 000000")
        .part("avatar", avatar);

    let resp = app
        .auth_put(&format!("/api/users/{}", user.id), &user.access_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.status().as_u16(),
        200,
        "Update failed: {}",
        resp.text().await.unwrap_or_default()
    );

    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["full_name"], "Pat Portrait");
    assert_eq!(updated["phone_number"], "+43 660 000000");

    let avatar_path = updated["avatar"].as_str().unwrap();
    assert!(avatar_path.starts_with(&format!("/uploads/avatars/{}/", user.id)));
    assert!(avatar_path.ends_with(".png"));

    let on_disk = app
        .upload_dir
        .path()
        .join(avatar_path.trim_start_matches("/uploads/"));
    assert!(on_disk.exists());

    let resp = app.client.get(app.url(avatar_path)).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn password_change_requires_current_password() {
    let app = TestApp::spawn().await;
    let user = app.register_user("pw@test.com", "Paula Word", "client").await;
    let path = format!("/api/users/{}", user.id);

    let form = Form::new()
        .text("current_password", "wrong-password")
        .text("new_password", "NewPassword456!");
    let resp = app
        .auth_put(&path, &user.access_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let form = Form::new()
        .text("current_password", "Password123!")
        .text("new_password", "NewPassword456!");
    let resp = app
        .auth_put(&path, &user.access_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    app.login_user("pw@test.com", "NewPassword456!").await;
}

#[tokio::test]
async fn users_cannot_edit_others_or_promote_themselves() {
    let app = TestApp::spawn().await;
    let alice = app.register_user("alice@edit.test", "Alice Edit", "client").await;
    let bob = app.register_user("bob@edit.test", "Bob Edit", "client").await;

    let resp = app
        .auth_put(&format!("/api/users/{}", bob.id), &alice.access_token)
        .multipart(Form::new().text("full_name", "Bobby Tables"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_put(&format!("/api/users/{}", alice.id), &alice.access_token)
        .multipart(Form::new().text("role", "admin"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_put(&format!("/api/users/{}", alice.id), &alice.access_token)
        .multipart(Form::new().text("role", "owner"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["role"], "owner");
}

#[tokio::test]
async fn list_filters_by_role() {
    let app = TestApp::spawn().await;
    app.register_user("o1@role.test", "Owner One", "owner").await;
    app.register_user("c1@role.test", "Client One", "client").await;
    app.register_user("c2@role.test", "Client Two", "client").await;

    let clients = app.get_json("/api/users?role=client").await;
    assert_eq!(clients.as_array().unwrap().len(), 2);
    let everyone = app.get_json("/api/users").await;
    assert_eq!(everyone.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn non_image_avatar_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app.register_user("xss@test.com", "Xavier Script", "client").await;

    let page = Part::bytes(b"<script>alert(1)</script>".to_vec())
        .file_name("evil.html")
        .mime_str("text/html")
        .unwrap();
    let resp = app
        .auth_put(&format!("/api/users/{}", user.id), &user.access_token)
        .multipart(Form::new().part("avatar", page))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "validation");

    assert!(!app.upload_dir.path().join("avatars").exists());
    let profile = app.get_json(&format!("/api/users/{}", user.id)).await;
    assert!(profile["avatar"].is_null());
}
