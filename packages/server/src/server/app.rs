//! Application setup and server configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use openai_client::OpenAIClient;
use replicate_client::ReplicateClient;

use crate::config::Config;
use crate::domains::character::FeatureExtractor;
use crate::domains::webtoon::ScenarioWriter;
use crate::kernel::{
    AssetRelay, BaseChatModel, BaseObjectStore, BasePredictionBackend, ImageSynthesizer,
    JobSpawner, OpenAiChatModel, PollPolicy, ReplicateBackend, S3ObjectStore, ServerDeps,
    StyleRegistry, WebhookClient,
};

use super::routes;

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
    pub jobs: JobSpawner,
    pub upload_dir: PathBuf,
}

/// Build the production dependency container from configuration.
pub async fn build_deps(config: &Config) -> Result<Arc<ServerDeps>> {
    // Chat model (feature extraction + scenario writing)
    let openai = Arc::new(OpenAIClient::new(config.openai_api_key.clone()));
    let chat_model: Arc<dyn BaseChatModel> = Arc::new(OpenAiChatModel::new(openai));

    // Prediction backend (image generation)
    let replicate = Arc::new(ReplicateClient::new(config.replicate_api_token.clone()));
    let backend: Arc<dyn BasePredictionBackend> = Arc::new(ReplicateBackend::new(replicate));

    // Durable object store
    let store: Arc<dyn BaseObjectStore> = Arc::new(
        S3ObjectStore::from_env(config.bucket_name.clone(), config.aws_region.clone()).await,
    );

    let synthesizer = ImageSynthesizer::new(backend, StyleRegistry::defaults())
        .with_poll_policy(PollPolicy {
            interval: config.poll_interval,
            max_attempts: config.poll_max_attempts,
        });

    Ok(Arc::new(ServerDeps::new(
        Arc::new(FeatureExtractor::new(chat_model.clone())),
        Arc::new(ScenarioWriter::new(chat_model)),
        Arc::new(synthesizer),
        Arc::new(AssetRelay::new(store, config.upload_dir.clone())),
        Arc::new(WebhookClient::new()),
    )))
}

/// Build the Axum application router
pub fn build_app(deps: Arc<ServerDeps>, jobs: JobSpawner, upload_dir: PathBuf) -> Router {
    let state = AxumAppState {
        deps,
        jobs,
        upload_dir,
    };

    // CORS configuration - the callers are backend services, keep it permissive
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/character", post(routes::start_character))
        .route("/webtoon", post(routes::start_webtoon))
        .route("/health", get(routes::health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
