//! Server dependencies for workflows (using traits for testability)
//!
//! This module provides the central dependency container used by both
//! workflows, plus the adapters that wrap the raw client crates into the
//! kernel's trait seams.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use openai_client::{ChatRequest, OpenAIClient};
use replicate_client::{Prediction, ReplicateClient};

use super::traits::{
    BaseAssetRelay, BaseCallbackService, BaseChatModel, BaseFeatureExtractor,
    BaseImageSynthesizer, BasePredictionBackend, BaseScenarioWriter,
};

// =============================================================================
// OpenAIClient Adapter (implements BaseChatModel trait)
// =============================================================================

/// Wrapper around OpenAIClient that implements the BaseChatModel trait
pub struct OpenAiChatModel(pub Arc<OpenAIClient>);

impl OpenAiChatModel {
    pub fn new(client: Arc<OpenAIClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseChatModel for OpenAiChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let response = self.0.chat_completion(request).await?;
        Ok(response.content)
    }
}

// =============================================================================
// ReplicateClient Adapter (implements BasePredictionBackend trait)
// =============================================================================

/// Wrapper around ReplicateClient that implements the BasePredictionBackend trait
pub struct ReplicateBackend(pub Arc<ReplicateClient>);

impl ReplicateBackend {
    pub fn new(client: Arc<ReplicateClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BasePredictionBackend for ReplicateBackend {
    async fn create_prediction(
        &self,
        version: &str,
        input: serde_json::Value,
    ) -> Result<Prediction> {
        Ok(self.0.create_prediction(version, input).await?)
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction> {
        Ok(self.0.get_prediction(id).await?)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies accessible to workflows (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub extractor: Arc<dyn BaseFeatureExtractor>,
    pub scenario_writer: Arc<dyn BaseScenarioWriter>,
    pub synthesizer: Arc<dyn BaseImageSynthesizer>,
    pub asset_relay: Arc<dyn BaseAssetRelay>,
    pub callbacks: Arc<dyn BaseCallbackService>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        extractor: Arc<dyn BaseFeatureExtractor>,
        scenario_writer: Arc<dyn BaseScenarioWriter>,
        synthesizer: Arc<dyn BaseImageSynthesizer>,
        asset_relay: Arc<dyn BaseAssetRelay>,
        callbacks: Arc<dyn BaseCallbackService>,
    ) -> Self {
        Self {
            extractor,
            scenario_writer,
            synthesizer,
            asset_relay,
            callbacks,
        }
    }
}
