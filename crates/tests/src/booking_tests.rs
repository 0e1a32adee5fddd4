use crate::fixtures::{seed::occurrences, test_app::TestApp};
use bson::oid::ObjectId;
use dwellhub_services::references::{ParentRef, RefField};
use serde_json::{Value, json};

async fn book(app: &TestApp, token: &str, property_id: &str) -> reqwest::Response {
    app.auth_post("/api/bookings", token)
        .json(&json!({
            "property_id": property_id,
            "check_in_date": "2026-07-01T14:00:00Z",
            "check_out_date": "2026-07-08T10:00:00Z",
            "total_amount": 840.0,
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn booking_is_listed_once_on_property_and_client() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("stay").await;

    let resp = book(&app, &listing.client.access_token, &listing.property_id).await;
    assert_eq!(resp.status().as_u16(), 201);
    let booking: Value = resp.json().await.unwrap();
    let booking_id = booking["id"].as_str().unwrap();
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["client_id"], listing.client.id);

    // Retrying the link must not duplicate the entry.
    let child = ObjectId::parse_str(booking_id).unwrap();
    let parents = [
        ParentRef::property(
            ObjectId::parse_str(&listing.property_id).unwrap(),
            RefField::BookingIds,
        ),
        ParentRef::user(ObjectId::parse_str(&listing.client.id).unwrap(), RefField::BookingIds),
    ];
    app.state.refs.link(child, &parents).await;

    let property = app
        .get_json(&format!("/api/properties/{}", listing.property_id))
        .await;
    assert_eq!(occurrences(&property["booking_ids"], booking_id), 1);

    let client = app.get_json(&format!("/api/users/{}", listing.client.id)).await;
    assert_eq!(occurrences(&client["booking_ids"], booking_id), 1);
}

#[tokio::test]
async fn deleting_booking_removes_references() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("cancel").await;

    let booking: Value = book(&app, &listing.client.access_token, &listing.property_id)
        .await
        .json()
        .await
        .unwrap();
    let booking_id = booking["id"].as_str().unwrap();

    let resp = app
        .auth_delete(
            &format!("/api/bookings/{booking_id}"),
            &listing.client.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Booking deleted successfully");

    let property = app
        .get_json(&format!("/api/properties/{}", listing.property_id))
        .await;
    assert_eq!(occurrences(&property["booking_ids"], booking_id), 0);
    let client = app.get_json(&format!("/api/users/{}", listing.client.id)).await;
    assert_eq!(occurrences(&client["booking_ids"], booking_id), 0);
}

#[tokio::test]
async fn get_is_stable_without_mutation() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("stable").await;

    let booking: Value = book(&app, &listing.client.access_token, &listing.property_id)
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/api/bookings/{}", booking["id"].as_str().unwrap());

    let first = app.get_json(&path).await;
    let second = app.get_json(&path).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn check_out_before_check_in_is_rejected() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("backwards").await;

    let resp = app
        .auth_post("/api/bookings", &listing.client.access_token)
        .json(&json!({
            "property_id": listing.property_id,
            "check_in_date": "2026-07-08T10:00:00Z",
            "check_out_date": "2026-07-01T14:00:00Z",
            "total_amount": 840.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(app.count("bookings").await, 0);
}

#[tokio::test]
async fn booking_unknown_property_is_not_found() {
    let app = TestApp::spawn().await;
    let client = app.register_user("lost@test.com", "Lost Client", "client").await;

    let resp = book(&app, &client.access_token, &ObjectId::new().to_hex()).await;
    assert_eq!(resp.status().as_u16(), 404);
    assert_eq!(app.count("bookings").await, 0);
}

#[tokio::test]
async fn status_update_and_filtered_list() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("confirm").await;

    let booking: Value = book(&app, &listing.client.access_token, &listing.property_id)
        .await
        .json()
        .await
        .unwrap();
    let booking_id = booking["id"].as_str().unwrap();

    let resp = app
        .auth_put(
            &format!("/api/bookings/{booking_id}"),
            &listing.owner.access_token,
        )
        .json(&json!({ "status": "confirmed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let confirmed: Vec<Value> = app
        .client
        .get(app.url(&format!(
            "/api/bookings?property_id={}&status=confirmed",
            listing.property_id
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0]["id"], booking_id);
}
