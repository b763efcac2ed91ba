//! Pure Replicate REST API client
//!
//! A clean, minimal client for the Replicate predictions API with no
//! domain-specific logic. Predictions run asynchronously on Replicate's
//! side: `create_prediction` submits a job and returns immediately, and the
//! caller re-reads it with `get_prediction` until the status is terminal.
//!
//! # Example
//!
//! ```rust,ignore
//! use replicate_client::ReplicateClient;
//!
//! let client = ReplicateClient::from_env()?;
//!
//! let mut prediction = client
//!     .create_prediction("64ad94c7...", serde_json::json!({"prompt": "a cat"}))
//!     .await?;
//!
//! while !prediction.status.is_terminal() {
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     prediction = client.get_prediction(&prediction.id).await?;
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{ReplicateError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Pure Replicate API client.
#[derive(Clone)]
pub struct ReplicateClient {
    http_client: Client,
    api_token: String,
    base_url: String,
}

impl ReplicateClient {
    /// Create a new Replicate client with the given API token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_token: api_token.into(),
            base_url: "https://api.replicate.com/v1".to_string(),
        }
    }

    /// Create from environment variable `REPLICATE_API_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("REPLICATE_API_TOKEN")
            .map_err(|_| ReplicateError::Config("REPLICATE_API_TOKEN not set".into()))?;
        Ok(Self::new(api_token))
    }

    /// Set a custom base URL (for proxies or test doubles).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a prediction for the given model version.
    ///
    /// Returns the freshly created prediction, normally still in
    /// `starting` state.
    pub async fn create_prediction(
        &self,
        version: &str,
        input: serde_json::Value,
    ) -> Result<Prediction> {
        let request = PredictionRequest {
            version: version.to_string(),
            input,
        };

        let response = self
            .http_client
            .post(format!("{}/predictions", self.base_url))
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Replicate request failed");
                ReplicateError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Replicate API error");
            return Err(ReplicateError::Api(format!(
                "Replicate API error: {}",
                error_text
            )));
        }

        let prediction: Prediction = response
            .json()
            .await
            .map_err(|e| ReplicateError::Parse(e.to_string()))?;

        debug!(
            prediction_id = %prediction.id,
            version = %version,
            "Replicate prediction created"
        );

        Ok(prediction)
    }

    /// Fetch the current state of a prediction.
    pub async fn get_prediction(&self, id: &str) -> Result<Prediction> {
        let response = self
            .http_client
            .get(format!("{}/predictions/{}", self.base_url, id))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Replicate request failed");
                ReplicateError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Replicate API error");
            return Err(ReplicateError::Api(format!(
                "Replicate API error: {}",
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ReplicateError::Parse(e.to_string()))
    }
}
