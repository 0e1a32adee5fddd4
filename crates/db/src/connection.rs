use std::time::Duration;

use dwellhub_config::DatabaseSettings;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;

/// Opens a pooled client for `settings` and pings the deployment before
/// handing back the configured database.
pub async fn connect(settings: &DatabaseSettings) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&settings.url).await?;
    options.app_name = Some("dwellhub".to_string());
    options.server_selection_timeout = Some(Duration::from_secs(10));
    options.max_pool_size = settings.max_pool_size.or(options.max_pool_size);
    options.min_pool_size = settings.min_pool_size.or(options.min_pool_size);

    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    info!(db = %settings.name, "Connected to MongoDB");
    Ok(client.database(&settings.name))
}
