use crate::fixtures::{seed::occurrences, test_app::TestApp};
use serde_json::{Value, json};

#[tokio::test]
async fn notification_lifecycle() {
    let app = TestApp::spawn().await;
    let user = app.register_user("ping@test.com", "Pia Ping", "client").await;

    let resp = app
        .auth_post("/api/notifications", &user.access_token)
        .json(&json!({
            "title": "Rent due",
            "description": "Your rent for October is due in three days",
            "notification_type": "warning",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let notification: Value = resp.json().await.unwrap();
    let id = notification["id"].as_str().unwrap();
    assert_eq!(notification["status"], "unread");
    assert_eq!(notification["user_id"], user.id);

    let profile = app.get_json(&format!("/api/users/{}", user.id)).await;
    assert_eq!(occurrences(&profile["notification_ids"], id), 1);

    let resp = app
        .auth_put(&format!("/api/notifications/{id}"), &user.access_token)
        .json(&json!({ "status": "read" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let unread = app
        .get_json(&format!("/api/notifications?user_id={}&status=unread", user.id))
        .await;
    assert!(unread.as_array().unwrap().is_empty());

    let resp = app
        .auth_delete(&format!("/api/notifications/{id}"), &user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let profile = app.get_json(&format!("/api/users/{}", user.id)).await;
    assert_eq!(occurrences(&profile["notification_ids"], id), 0);
}

#[tokio::test]
async fn unknown_notification_is_not_found() {
    let app = TestApp::spawn().await;
    let user = app.register_user("nf@test.com", "Nils Found", "client").await;

    let resp = app
        .auth_delete(
            &format!("/api/notifications/{}", bson::oid::ObjectId::new().to_hex()),
            &user.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
