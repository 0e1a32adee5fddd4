use crate::fixtures::test_app::TestApp;
use serde_json::{Value, json};

async fn created(resp: reqwest::Response) -> Value {
    assert_eq!(
        resp.status().as_u16(),
        201,
        "Create failed: {}",
        resp.text().await.unwrap_or_default()
    );
    resp.json().await.unwrap()
}

#[tokio::test]
async fn other_clients_cannot_touch_a_booking() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("mine").await;
    let intruder = app.register_user("intruder@mine.test", "Ivan Intruder", "client").await;

    let booking = created(
        app.auth_post("/api/bookings", &listing.client.access_token)
            .json(&json!({
                "property_id": listing.property_id,
                "check_in_date": "2026-07-01T14:00:00Z",
                "check_out_date": "2026-07-08T10:00:00Z",
                "total_amount": 840.0,
            }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let path = format!("/api/bookings/{}", booking["id"].as_str().unwrap());

    let resp = app
        .auth_put(&path, &intruder.access_token)
        .json(&json!({ "status": "canceled" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app.auth_delete(&path, &intruder.access_token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "forbidden");

    let unchanged = app.get_json(&path).await;
    assert_eq!(unchanged["status"], "pending");
    assert_eq!(app.count("bookings").await, 1);
}

#[tokio::test]
async fn notifications_belong_to_their_recipient() {
    let app = TestApp::spawn().await;
    let alice = app.register_user("alice@inbox.test", "Alice Inbox", "client").await;
    let bob = app.register_user("bob@inbox.test", "Bob Inbox", "owner").await;

    let notification = created(
        app.auth_post("/api/notifications", &alice.access_token)
            .json(&json!({
                "title": "Rent due",
                "description": "Your rent for October is due in three days",
                "notification_type": "warning",
            }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let path = format!("/api/notifications/{}", notification["id"].as_str().unwrap());

    let resp = app
        .auth_put(&path, &bob.access_token)
        .json(&json!({ "status": "read" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app.auth_delete(&path, &bob.access_token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    assert_eq!(app.get_json(&path).await["status"], "unread");
}

#[tokio::test]
async fn outsiders_cannot_settle_a_transaction() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("ledger").await;
    let outsider = app.register_user("outsider@ledger.test", "Olga Outsider", "client").await;

    let transaction = created(
        app.auth_post("/api/transactions", &listing.client.access_token)
            .json(&json!({
                "receiver_id": listing.owner.id,
                "property_id": listing.property_id,
                "amount": 1450.0,
                "currency": "EUR",
                "transaction_type": "rent",
                "payment_method": "bank_transfer",
            }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let path = format!("/api/transactions/{}", transaction["id"].as_str().unwrap());

    let resp = app
        .auth_put(&path, &outsider.access_token)
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    assert_eq!(app.get_json(&path).await["status"], "pending");

    // The receiver confirms the payment.
    let resp = app
        .auth_put(&path, &listing.owner.access_token)
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn only_the_author_edits_a_review() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("critic").await;
    let rival = app.register_user("rival@critic.test", "Rita Rival", "client").await;

    let review = created(
        app.auth_post("/api/reviews", &listing.client.access_token)
            .json(&json!({ "property_id": listing.property_id, "rating": 4 }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let path = format!("/api/reviews/{}", review["id"].as_str().unwrap());

    let resp = app
        .auth_put(&path, &rival.access_token)
        .json(&json!({ "rating": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app.auth_delete(&path, &rival.access_token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    assert_eq!(app.get_json(&path).await["rating"], 4);
}

#[tokio::test]
async fn owners_only_manage_their_own_properties_children() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("own").await;
    let other_owner = app.register_user("other@own.test", "Otto Other", "owner").await;

    let lease = created(
        app.auth_post("/api/leases", &listing.client.access_token)
            .json(&json!({
                "property_id": listing.property_id,
                "start_date": "2026-09-01T00:00:00Z",
                "end_date": "2027-08-31T00:00:00Z",
                "rent_amount": 1450.0,
            }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let lease_path = format!("/api/leases/{}", lease["id"].as_str().unwrap());

    let resp = app
        .auth_put(&lease_path, &other_owner.access_token)
        .json(&json!({ "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    assert_eq!(app.get_json(&lease_path).await["status"], "pending");

    let request = created(
        app.auth_post("/api/maintenance", &listing.client.access_token)
            .json(&json!({
                "property_id": listing.property_id,
                "description": "Bathroom fan stopped working",
            }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let request_path = format!("/api/maintenance/{}", request["id"].as_str().unwrap());

    let resp = app
        .auth_put(&request_path, &other_owner.access_token)
        .json(&json!({ "status": "resolved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    assert_eq!(app.get_json(&request_path).await["status"], "pending");
}

#[tokio::test]
async fn clients_cannot_sign_leases_for_someone_else() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("proxy").await;
    let victim = app.register_user("victim@proxy.test", "Vera Victim", "client").await;
    let body = json!({
        "property_id": listing.property_id,
        "client_id": victim.id,
        "start_date": "2026-09-01T00:00:00Z",
        "end_date": "2027-08-31T00:00:00Z",
        "rent_amount": 1450.0,
    });

    let resp = app
        .auth_post("/api/leases", &listing.client.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    assert_eq!(app.count("leases").await, 0);

    // The property owner may draw one up for a client.
    let lease = created(
        app.auth_post("/api/leases", &listing.owner.access_token)
            .json(&body)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(lease["client_id"], victim.id);
}
