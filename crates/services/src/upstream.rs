use std::time::Duration;

use dwellhub_config::{GoogleSettings, PredictionSettings};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Google rejected the token")]
    TokenRejected,
    #[error("{service} answered with status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Subset of Google's OpenID userinfo document.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

pub struct GoogleClient {
    client: reqwest::Client,
    userinfo_url: String,
}

impl GoogleClient {
    pub fn new(settings: &GoogleSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            userinfo_url: settings.userinfo_url.clone(),
        }
    }

    /// Exchanges a Google access token for the profile it was issued to.
    pub async fn profile(&self, access_token: &str) -> Result<GoogleProfile, UpstreamError> {
        const SERVICE: &str = "Google userinfo";

        let resp = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(UpstreamError::TokenRejected);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Google userinfo call failed");
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        resp.json::<GoogleProfile>()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })
    }
}

/// Forwards property features to the external price model.
pub struct PredictionClient {
    client: reqwest::Client,
    url: Option<String>,
}

impl PredictionClient {
    pub fn new(settings: &PredictionSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: settings.url.clone().filter(|url| !url.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Posts `features` as-is and hands back the model's JSON verdict
    /// untouched.
    pub async fn predict(
        &self,
        features: &serde_json::Value,
    ) -> Result<serde_json::Value, UpstreamError> {
        const SERVICE: &str = "Price prediction";

        let url = self
            .url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured(SERVICE))?;

        let resp = self
            .client
            .post(url)
            .json(features)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Price prediction call failed");
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let verdict = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;
        debug!("Price prediction received");
        Ok(verdict)
    }
}
