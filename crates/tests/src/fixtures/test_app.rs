use dwellhub_api::{build_router, state::AppState};
use dwellhub_config::Settings;
use dwellhub_db::indexes::ensure_indexes;
use mongodb::{Client, Database, options::ClientOptions};
use std::net::SocketAddr;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A running test application with its own MongoDB database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub db: Database,
    pub state: AppState,
    pub settings: Settings,
    pub client: reqwest::Client,
    /// Avatar uploads land here and vanish with the app.
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Spawn a new test server connected to the test MongoDB.
    ///
    /// Requires a running MongoDB at localhost:27017.
    /// Set DWELLHUB__DATABASE__URL to override the connection string.
    /// Each test gets a unique database name for isolation.
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(|_| {}).await
    }

    /// Spawn a test server with customized settings.
    ///
    /// The `mutator` closure receives a `&mut Settings` after the test
    /// defaults are applied, e.g. to point upstream URLs at a mock.
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Self {
        let db_name = format!("dwellhub_test_{}", uuid::Uuid::new_v4().simple());
        let upload_dir = TempDir::new().expect("Failed to create upload dir");

        let mut settings = Settings::load().expect("Failed to load settings");
        if let Ok(url) = std::env::var("DWELLHUB__DATABASE__URL") {
            settings.database.url = url;
        }
        settings.database.name = db_name.clone();
        settings.app.upload_dir = upload_dir.path().to_string_lossy().into_owned();
        settings.jwt.secret = "test-secret-key-for-jwt-signing-minimum-32-chars".to_string();
        settings.prediction.url = None;
        settings.reconcile.interval_secs = 0;

        mutator(&mut settings);

        let client_options = ClientOptions::parse(&settings.database.url)
            .await
            .expect("Failed to parse MongoDB URL");
        let mongo_client =
            Client::with_options(client_options).expect("Failed to create MongoDB client");
        let db = mongo_client.database(&db_name);

        ensure_indexes(&db).await.expect("Failed to create indexes");

        let state = AppState::new(db.clone(), settings.clone());
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            base_url,
            db,
            state,
            settings,
            client,
            upload_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> u64 {
        self.db
            .collection::<bson::Document>(collection)
            .count_documents(bson::doc! {})
            .await
            .expect("count failed")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let db = self.db.clone();
        // Best effort cleanup: drop the test database
        tokio::spawn(async move {
            let _ = db.drop().await;
        });
    }
}
