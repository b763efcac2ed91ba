//! Webhook delivery client.
//!
//! Delivers finished job results to the calling service. Delivery is
//! fire-and-forget: the HTTP status is logged and never retried, and a
//! failed delivery does not fail the job that produced the result.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::domains::character::types::CharacterPayload;
use crate::domains::webtoon::types::WebtoonPayload;

use super::traits::BaseCallbackService;

pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn post<T: Serialize + Sync>(&self, url: &str, payload: &T) -> Result<()> {
        info!("posting webhook to {}", url);

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("webhook request to {} failed", url))?;

        let status = response.status();
        if status.is_success() {
            info!("webhook data successfully posted to {}", url);
        } else {
            error!("failed to post webhook data to {}. Status code: {}", url, status);
        }

        Ok(())
    }
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCallbackService for WebhookClient {
    async fn post_character(&self, callback_host: &str, payload: &CharacterPayload) -> Result<()> {
        let url = format!("http://{}/api/v1/webhook/ai/character", callback_host);
        self.post(&url, payload).await
    }

    async fn post_webtoon(&self, callback_host: &str, payload: &WebtoonPayload) -> Result<()> {
        let url = format!("http://{}/api/v1/webhook/ai/webtoon", callback_host);
        self.post(&url, payload).await
    }
}
