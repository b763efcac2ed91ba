// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (workflow sequencing, abort rules) lives in domain
// functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseChatModel)

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use openai_client::ChatRequest;
use replicate_client::Prediction;

use crate::domains::character::types::CharacterPayload;
use crate::domains::webtoon::types::{Scenario, WebtoonPayload};

// =============================================================================
// Chat Model Trait (Infrastructure - LLM chat completions, incl. vision)
// =============================================================================

#[async_trait]
pub trait BaseChatModel: Send + Sync {
    /// Run one chat completion and return the assistant's raw text.
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}

// =============================================================================
// Prediction Backend Trait (Infrastructure - async image generation)
// =============================================================================

#[async_trait]
pub trait BasePredictionBackend: Send + Sync {
    /// Submit a generation job for a model version. Returns immediately;
    /// the prediction is normally still pending.
    async fn create_prediction(
        &self,
        version: &str,
        input: serde_json::Value,
    ) -> Result<Prediction>;

    /// Fetch the current state of a prediction.
    async fn get_prediction(&self, id: &str) -> Result<Prediction>;
}

// =============================================================================
// Object Store Trait (Infrastructure - durable image storage)
// =============================================================================

#[async_trait]
pub trait BaseObjectStore: Send + Sync {
    /// Upload bytes under the key. Returns the public URL of the object.
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Public URL for a key. Constructed, not verified against contents.
    fn public_url(&self, key: &str) -> String;
}

// =============================================================================
// Callback Service Trait (Infrastructure - outbound result webhooks)
// =============================================================================

#[async_trait]
pub trait BaseCallbackService: Send + Sync {
    /// Deliver a finished character profile to the caller's webhook.
    async fn post_character(&self, callback_host: &str, payload: &CharacterPayload) -> Result<()>;

    /// Deliver finished webtoon images to the caller's webhook.
    async fn post_webtoon(&self, callback_host: &str, payload: &WebtoonPayload) -> Result<()>;
}

// =============================================================================
// Pipeline Component Traits
// =============================================================================
//
// The workflows in domains/*/workflows only see these seams, so tests can
// script any stage of the pipeline independently.

/// Result of feature extraction: the echoed subject id plus the raw trait
/// description. The profile text is opaque - nothing validates its shape.
#[derive(Debug, Clone)]
pub struct ExtractedProfile {
    pub subject_id: String,
    pub profile: String,
}

#[async_trait]
pub trait BaseFeatureExtractor: Send + Sync {
    /// Extract a character profile from a photo.
    async fn extract(&self, subject_id: &str, image: &[u8]) -> Result<ExtractedProfile>;
}

#[async_trait]
pub trait BaseScenarioWriter: Send + Sync {
    /// Turn diary text into a four-scene scenario.
    async fn write(&self, subject_id: &str, diary_text: &str) -> Result<(String, Scenario)>;
}

/// Result of profile synthesis. Either slot may be absent: a missing seed or
/// a missing output is an error condition at the caller's discretion, not a
/// failure of the synthesis call itself.
#[derive(Debug, Clone)]
pub struct ProfileImage {
    pub seed: Option<String>,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait BaseImageSynthesizer: Send + Sync {
    /// Generate a character profile image for the given style.
    async fn synthesize_profile(&self, style: &str, profile: &str) -> Result<ProfileImage>;

    /// Generate images for one scene, reusing the profile seed so the
    /// character stays visually consistent. Returns every output URL.
    async fn synthesize_scene(
        &self,
        style: &str,
        character_info: &str,
        seed: i64,
        scene: &str,
    ) -> Result<Vec<String>>;
}

#[async_trait]
pub trait BaseAssetRelay: Send + Sync {
    /// Download a generated asset into transient local storage.
    async fn relay(&self, remote_url: &str, name_hint: &str) -> Result<PathBuf>;

    /// Upload a transient file to durable storage under the canonical key,
    /// deleting the transient copy. Returns the durable URL, or None if the
    /// upload failed (logged, never raised).
    async fn publish(
        &self,
        local_path: &Path,
        owner_id: &str,
        date: Option<&str>,
        is_profile: bool,
    ) -> Option<String>;

    /// Deterministic URL of the folder holding one day's webtoon images.
    fn folder_url(&self, owner_id: &str, date: &str) -> String;
}
