use crate::fixtures::{seed::occurrences, test_app::TestApp};
use serde_json::{Value, json};

#[tokio::test]
async fn rating_bounds_are_enforced() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("rated").await;

    for rating in [0, 6, -1] {
        let resp = app
            .auth_post("/api/reviews", &listing.client.access_token)
            .json(&json!({ "property_id": listing.property_id, "rating": rating }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400, "rating {rating}");
    }
    assert_eq!(app.count("reviews").await, 0);

    for rating in [1, 5] {
        let resp = app
            .auth_post("/api/reviews", &listing.client.access_token)
            .json(&json!({
                "property_id": listing.property_id,
                "rating": rating,
                "comment": "Quiet street, friendly owner",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201, "rating {rating}");
    }
    assert_eq!(app.count("reviews").await, 2);
}

#[tokio::test]
async fn review_is_linked_to_property() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("linked").await;

    let resp = app
        .auth_post("/api/reviews", &listing.client.access_token)
        .json(&json!({ "property_id": listing.property_id, "rating": 4 }))
        .send()
        .await
        .unwrap();
    let review: Value = resp.json().await.unwrap();
    let review_id = review["id"].as_str().unwrap();

    let property = app
        .get_json(&format!("/api/properties/{}", listing.property_id))
        .await;
    assert_eq!(occurrences(&property["review_ids"], review_id), 1);

    let reviews = app
        .get_json(&format!("/api/reviews?property_id={}", listing.property_id))
        .await;
    assert_eq!(reviews.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn owners_cannot_review() {
    let app = TestApp::spawn().await;
    let listing = app.seed_listing("selfpraise").await;

    let resp = app
        .auth_post("/api/reviews", &listing.owner.access_token)
        .json(&json!({ "property_id": listing.property_id, "rating": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}
