use crate::fixtures::{seed::occurrences, test_app::TestApp};
use serde_json::{Value, json};

async fn sign_lease(app: &TestApp, token: &str, property_id: &str) -> Value {
    let resp = app
        .auth_post("/api/leases", token)
        .json(&json!({
            "property_id": property_id,
            "start_date": "2026-09-01T00:00:00Z",
            "end_date": "2027-08-31T00:00:00Z",
            "rent_amount": 1450.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.status().as_u16(),
        201,
        "Create lease failed: {}",
        resp.text().await.unwrap_or_default()
    );
    resp.json().await.unwrap()
}

#[tokio::test]
async fn deleted_lease_leaves_no_references() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("lease").await;

    let lease = sign_lease(&app, &listing.client.access_token, &listing.property_id).await;
    let lease_id = lease["id"].as_str().unwrap();
    assert_eq!(lease["client_id"], listing.client.id);
    assert_eq!(lease["status"], "pending");

    let property = app
        .get_json(&format!("/api/properties/{}", listing.property_id))
        .await;
    assert_eq!(occurrences(&property["lease_ids"], lease_id), 1);
    let client = app.get_json(&format!("/api/users/{}", listing.client.id)).await;
    assert_eq!(occurrences(&client["lease_ids"], lease_id), 1);

    let resp = app
        .auth_delete(&format!("/api/leases/{lease_id}"), &listing.client.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let property = app
        .get_json(&format!("/api/properties/{}", listing.property_id))
        .await;
    assert_eq!(occurrences(&property["lease_ids"], lease_id), 0);
    let client = app.get_json(&format!("/api/users/{}", listing.client.id)).await;
    assert_eq!(occurrences(&client["lease_ids"], lease_id), 0);
}

#[tokio::test]
async fn only_owners_update_leases() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("activate").await;
    let lease = sign_lease(&app, &listing.client.access_token, &listing.property_id).await;
    let path = format!("/api/leases/{}", lease["id"].as_str().unwrap());

    let resp = app
        .auth_put(&path, &listing.client.access_token)
        .json(&json!({ "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_put(&path, &listing.owner.access_token)
        .json(&json!({ "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["status"], "active");
}

#[tokio::test]
async fn owner_and_client_aliases_list_leases() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("alias").await;
    let lease = sign_lease(&app, &listing.client.access_token, &listing.property_id).await;

    let by_owner = app
        .get_json(&format!("/api/leases/owner/{}", listing.owner.id))
        .await;
    assert_eq!(by_owner.as_array().unwrap().len(), 1);
    assert_eq!(by_owner[0]["id"], lease["id"]);

    let by_client = app
        .get_json(&format!("/api/leases/client/{}", listing.client.id))
        .await;
    assert_eq!(by_client.as_array().unwrap().len(), 1);

    // An owner without properties has no leases.
    let stranger = app.register_user("none@alias.test", "Nora None", "owner").await;
    let empty = app
        .get_json(&format!("/api/leases/owner/{}", stranger.id))
        .await;
    assert!(empty.as_array().unwrap().is_empty());
}
