use crate::fixtures::{seed::occurrences, test_app::TestApp};
use serde_json::{Value, json};

#[tokio::test]
async fn request_is_routed_to_property_owner() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("leak").await;

    let resp = app
        .auth_post("/api/maintenance", &listing.client.access_token)
        .json(&json!({
            "property_id": listing.property_id,
            "description": "Kitchen tap has been dripping for a week",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let request: Value = resp.json().await.unwrap();
    let request_id = request["id"].as_str().unwrap();
    assert_eq!(request["owner_id"], listing.owner.id);
    assert_eq!(request["status"], "pending");

    let property = app
        .get_json(&format!("/api/properties/{}", listing.property_id))
        .await;
    assert_eq!(occurrences(&property["maintenance_request_ids"], request_id), 1);

    let for_owner = app
        .get_json(&format!("/api/maintenance/owner/{}", listing.owner.id))
        .await;
    assert_eq!(for_owner.as_array().unwrap().len(), 1);

    let resp = app
        .auth_put(
            &format!("/api/maintenance/{request_id}"),
            &listing.owner.access_token,
        )
        .json(&json!({ "status": "in-progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["status"], "in-progress");
}

#[tokio::test]
async fn short_description_is_rejected() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("terse").await;

    let resp = app
        .auth_post("/api/maintenance", &listing.client.access_token)
        .json(&json!({ "property_id": listing.property_id, "description": "broken" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert!(json["details"]["description"].is_array());
    assert_eq!(app.count("maintenance_requests").await, 0);
}
