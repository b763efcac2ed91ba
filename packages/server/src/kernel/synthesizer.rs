//! Image synthesis over an asynchronous prediction backend.
//!
//! Submission is fire-and-poll: the backend accepts a generation job and the
//! synthesizer re-reads it on a fixed interval until it reaches a terminal
//! state. The wait is bounded - a job that never settles within the poll
//! budget is an error instead of an indefinite block.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use replicate_client::Prediction;
use serde::Serialize;
use tracing::{debug, error, info};

use super::styles::StyleRegistry;
use super::traits::{BaseImageSynthesizer, BasePredictionBackend, ProfileImage};

/// Bounded fixed-interval polling schedule.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay between status checks
    pub interval: Duration,
    /// Maximum number of status checks before giving up
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

/// Baseline generation parameters, frozen for every job.
///
/// Only the prompt and (for scenes) the seed vary per call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSettings {
    pub model: String,
    pub lora_scale: f32,
    pub num_outputs: u32,
    pub aspect_ratio: String,
    pub guidance_scale: f32,
    pub output_quality: u32,
    pub prompt_strength: f32,
    pub extra_lora_scale: f32,
    pub num_inference_steps: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "dev".to_string(),
            lora_scale: 1.0,
            num_outputs: 1,
            aspect_ratio: "1:1".to_string(),
            guidance_scale: 3.5,
            output_quality: 70,
            prompt_strength: 0.8,
            extra_lora_scale: 1.0,
            num_inference_steps: 28,
        }
    }
}

/// Drives image generation jobs to completion.
pub struct ImageSynthesizer {
    backend: Arc<dyn BasePredictionBackend>,
    styles: StyleRegistry,
    settings: GenerationSettings,
    poll: PollPolicy,
}

impl ImageSynthesizer {
    pub fn new(backend: Arc<dyn BasePredictionBackend>, styles: StyleRegistry) -> Self {
        Self {
            backend,
            styles,
            settings: GenerationSettings::default(),
            poll: PollPolicy::default(),
        }
    }

    /// Override the polling schedule.
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    fn resolve_version(&self, style: &str) -> Result<String> {
        self.styles
            .resolve(style)
            .map(|model| model.version.clone())
            .ok_or_else(|| anyhow!("unknown character style: {}", style))
    }

    /// Assemble the model input: frozen settings + prompt (+ optional seed).
    fn input(&self, prompt: String, seed: Option<i64>) -> serde_json::Value {
        let mut input = serde_json::to_value(&self.settings)
            .unwrap_or_else(|_| serde_json::json!({}));
        input["prompt"] = serde_json::Value::String(prompt);
        if let Some(seed) = seed {
            input["seed"] = serde_json::Value::from(seed);
        }
        input
    }

    /// Submit a job and poll it until terminal.
    async fn run_to_terminal(
        &self,
        version: &str,
        input: serde_json::Value,
    ) -> Result<Prediction> {
        let mut prediction = self.backend.create_prediction(version, input).await?;
        info!(prediction_id = %prediction.id, "generation job submitted");

        let mut attempts = 0u32;
        while !prediction.status.is_terminal() {
            if attempts >= self.poll.max_attempts {
                bail!(
                    "timed out waiting for prediction {} after {} status checks",
                    prediction.id,
                    attempts
                );
            }
            tokio::time::sleep(self.poll.interval).await;
            prediction = self.backend.get_prediction(&prediction.id).await?;
            attempts += 1;
            debug!(
                prediction_id = %prediction.id,
                status = ?prediction.status,
                attempts,
                "generation job polled"
            );
        }

        info!(
            prediction_id = %prediction.id,
            status = ?prediction.status,
            "generation job settled"
        );
        Ok(prediction)
    }
}

#[async_trait]
impl BaseImageSynthesizer for ImageSynthesizer {
    async fn synthesize_profile(&self, style: &str, profile: &str) -> Result<ProfileImage> {
        let version = self.resolve_version(style)?;
        let prompt = format!(
            "{}\na character of the upper body facing the front.",
            profile
        );

        let prediction = self.run_to_terminal(&version, self.input(prompt, None)).await?;

        let seed = prediction.seed_from_logs();
        if seed.is_none() {
            error!(prediction_id = %prediction.id, "no seed number found in the prediction logs");
        }

        let image_url = prediction.output_urls().into_iter().next();
        if image_url.is_none() {
            error!(prediction_id = %prediction.id, "no output available");
        }

        Ok(ProfileImage { seed, image_url })
    }

    async fn synthesize_scene(
        &self,
        style: &str,
        character_info: &str,
        seed: i64,
        scene: &str,
    ) -> Result<Vec<String>> {
        let version = self.resolve_version(style)?;
        let prompt = format!(
            "Make a cartoon scene using character information and scene information.\n\
             Don't draw anyone other than the main character.\n\
             [character_info]\n{}\n[scene]\n{}\n",
            character_info, scene
        );

        let prediction = self
            .run_to_terminal(&version, self.input(prompt, Some(seed)))
            .await?;

        Ok(prediction.output_urls())
    }
}
