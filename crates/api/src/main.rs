use std::time::Duration;

use dwellhub_api::{build_router, state::AppState};
use dwellhub_config::Settings;
use dwellhub_db::{connect, indexes::ensure_indexes};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "dwellhub_api=debug,dwellhub_services=debug,dwellhub_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!("Starting DwellHub API on {}:{}", settings.app.host, settings.app.port);
    info!(
        upload_dir = %settings.app.upload_dir,
        prediction = settings.prediction.url.is_some(),
        reconcile_secs = settings.reconcile.interval_secs,
        "Runtime config"
    );

    let db = connect(&settings.database).await?;
    ensure_indexes(&db).await?;

    let app_state = AppState::new(db, settings.clone());

    // Kept alive until the server exits.
    let _reconciler = if settings.reconcile.interval_secs > 0 {
        let every = Duration::from_secs(settings.reconcile.interval_secs);
        Some(app_state.refs.clone().spawn_reconciler(every).await?)
    } else {
        None
    };

    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
