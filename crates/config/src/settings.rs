use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub google: GoogleSettings,
    pub prediction: PredictionSettings,
    pub reconcile: ReconcileSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Directory where uploaded avatars are written.
    pub upload_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleSettings {
    pub userinfo_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionSettings {
    /// Scoring endpoint; prediction requests fail with 503 when unset.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconcileSettings {
    /// 0 disables the background sweep.
    pub interval_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("DWELLHUB"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 5000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("app.upload_dir", "/tmp/dwellhub-uploads")?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "dwellhub")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 604800)?
            .set_default("jwt.refresh_token_ttl_secs", 2592000)?
            .set_default("jwt.issuer", "dwellhub")?
            .set_default(
                "google.userinfo_url",
                "https://www.googleapis.com/oauth2/v3/userinfo",
            )?
            .set_default("prediction.timeout_secs", 10)?
            .set_default("reconcile.interval_secs", 3600)?
            .build()?;

        config.try_deserialize()
    }
}
