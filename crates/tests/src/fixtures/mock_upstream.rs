//! In-process stand-ins for the Google userinfo endpoint and the price
//! prediction service.

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const GOOGLE_TOKEN: &str = "valid-google-token";
pub const GOOGLE_EMAIL: &str = "gina@gmail.test";

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn userinfo(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if bearer != Some(GOOGLE_TOKEN) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "sub": "google-sub-1",
        "email": GOOGLE_EMAIL,
        "name": "Gina Google",
        "picture": "https://example.test/gina.png",
    })))
}

/// Returns the userinfo URL of a fresh mock Google server. Only
/// [`GOOGLE_TOKEN`] is accepted.
pub async fn spawn_google() -> String {
    let base = serve(Router::new().route("/userinfo", get(userinfo))).await;
    format!("{base}/userinfo")
}

async fn score(Json(features): Json<Value>) -> Json<Value> {
    let bedrooms = features["bedrooms"].as_f64().unwrap_or(0.0);
    Json(json!({
        "predicted_price": 100_000.0 + bedrooms * 25_000.0,
        "input": features,
    }))
}

/// Returns the scoring URL of a fresh mock prediction server.
pub async fn spawn_prediction() -> String {
    let base = serve(Router::new().route("/predict", post(score))).await;
    format!("{base}/predict")
}
