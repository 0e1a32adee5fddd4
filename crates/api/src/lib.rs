pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);
    let uploads = ServeDir::new(&state.settings.app.upload_dir);

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/google-login", post(routes::auth::google_login))
        .route("/google-register", post(routes::auth::google_register))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me));

    let user_routes = Router::new()
        .route("/", get(routes::user::list))
        .route(
            "/{user_id}",
            get(routes::user::get).put(routes::user::update),
        )
        // Room for the form fields around a maximum-size avatar.
        .layer(DefaultBodyLimit::max(routes::user::MAX_AVATAR_BYTES + 64 * 1024));

    let property_routes = Router::new()
        .route(
            "/",
            get(routes::property::list).post(routes::property::create),
        )
        .route("/search", get(routes::property::search))
        .route("/predict", post(routes::property::predict))
        .route(
            "/{property_id}",
            get(routes::property::get)
                .put(routes::property::update)
                .delete(routes::property::delete),
        );

    let booking_routes = Router::new()
        .route("/", get(routes::booking::list).post(routes::booking::create))
        .route(
            "/{booking_id}",
            get(routes::booking::get)
                .put(routes::booking::update)
                .delete(routes::booking::delete),
        );

    let lease_routes = Router::new()
        .route("/", get(routes::lease::list).post(routes::lease::create))
        .route("/owner/{owner_id}", get(routes::lease::list_by_owner))
        .route("/client/{client_id}", get(routes::lease::list_by_client))
        .route(
            "/{lease_id}",
            get(routes::lease::get)
                .put(routes::lease::update)
                .delete(routes::lease::delete),
        );

    let maintenance_routes = Router::new()
        .route(
            "/",
            get(routes::maintenance::list).post(routes::maintenance::create),
        )
        .route("/owner/{owner_id}", get(routes::maintenance::list_by_owner))
        .route(
            "/{request_id}",
            get(routes::maintenance::get)
                .put(routes::maintenance::update)
                .delete(routes::maintenance::delete),
        );

    let notification_routes = Router::new()
        .route(
            "/",
            get(routes::notification::list).post(routes::notification::create),
        )
        .route(
            "/{notification_id}",
            get(routes::notification::get)
                .put(routes::notification::update)
                .delete(routes::notification::delete),
        );

    let review_routes = Router::new()
        .route("/", get(routes::review::list).post(routes::review::create))
        .route(
            "/{review_id}",
            get(routes::review::get)
                .put(routes::review::update)
                .delete(routes::review::delete),
        );

    let transaction_routes = Router::new()
        .route(
            "/",
            get(routes::transaction::list).post(routes::transaction::create),
        )
        .route(
            "/{transaction_id}",
            get(routes::transaction::get)
                .put(routes::transaction::update)
                .delete(routes::transaction::delete),
        );

    let message_routes = Router::new()
        .route("/send", post(routes::message::send))
        .route("/{conversation_id}", get(routes::message::list));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/properties", property_routes)
        .nest("/bookings", booking_routes)
        .nest("/leases", lease_routes)
        .nest("/maintenance", maintenance_routes)
        .nest("/notifications", notification_routes)
        .nest("/reviews", review_routes)
        .nest("/transactions", transaction_routes)
        .nest("/messages", message_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .nest_service("/uploads", uploads)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured, otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
