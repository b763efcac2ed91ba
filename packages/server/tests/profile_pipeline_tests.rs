//! End-to-end profile pipeline test.
//!
//! Runs the real asset relay and webhook client against a throwaway axum
//! server that plays both the generation backend's asset host and the
//! calling service's webhook receiver. Only the model-facing seams
//! (extractor, synthesizer) are scripted.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use server_core::domains::character::workflows::{create_profile, CreateProfileRequest};
use server_core::kernel::test_dependencies::{
    MemoryObjectStore, MockFeatureExtractor, MockImageSynthesizer, MockScenarioWriter,
};
use server_core::kernel::{AssetRelay, ProfileImage, ServerDeps, WebhookClient};

#[derive(Clone, Default)]
struct ReceivedWebhooks {
    character: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn record_character(
    State(received): State<ReceivedWebhooks>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    received.character.lock().unwrap().push(body);
    Json(serde_json::json!({ "ok": true }))
}

async fn serve_asset() -> Vec<u8> {
    vec![0x52, 0x49, 0x46, 0x46]
}

/// Bind the stub host on an ephemeral port.
async fn spawn_stub_host(received: ReceivedWebhooks) -> SocketAddr {
    let app = Router::new()
        .route("/asset.webp", get(serve_asset))
        .route("/api/v1/webhook/ai/character", post(record_character))
        .with_state(received);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_profile_pipeline_end_to_end() {
    let received = ReceivedWebhooks::default();
    let addr = spawn_stub_host(received.clone()).await;
    let callback_host = addr.to_string();

    // Scripted model seams
    let extractor = Arc::new(MockFeatureExtractor::new());
    extractor.push_profile("{\"gender\": \"female\", \"hair\": \"short, brown\"}");

    let synthesizer = Arc::new(MockImageSynthesizer::new());
    synthesizer.push_profile_image(ProfileImage {
        seed: Some("777".to_string()),
        image_url: Some(format!("http://{}/asset.webp", callback_host)),
    });

    // Real relay + real webhook client
    let store = Arc::new(MemoryObjectStore::new());
    let upload_dir = std::env::temp_dir().join(format!("profile-e2e-{}", Uuid::new_v4()));
    let deps = ServerDeps::new(
        extractor,
        Arc::new(MockScenarioWriter::new()),
        synthesizer,
        Arc::new(AssetRelay::new(store.clone(), upload_dir.clone())),
        Arc::new(WebhookClient::new()),
    );

    // The member's saved upload
    tokio::fs::create_dir_all(&upload_dir).await.unwrap();
    let photo = upload_dir.join("photo.webp");
    tokio::fs::write(&photo, b"source-photo").await.unwrap();

    create_profile::run(
        CreateProfileRequest {
            member_id: "u1".to_string(),
            character_style: "romance".to_string(),
            image_path: photo.clone(),
            callback_host,
        },
        &deps,
    )
    .await
    .unwrap();

    // The downloaded asset was republished under the canonical key
    assert_eq!(store.keys(), vec!["webtoon-ai/u1/temp_profile.webp"]);
    assert_eq!(
        store.get("webtoon-ai/u1/temp_profile.webp").unwrap(),
        vec![0x52, 0x49, 0x46, 0x46]
    );

    // The source photo and the transient download are both gone
    assert!(!photo.exists());
    assert!(!upload_dir.join("temp_profile.webp").exists());

    // Exactly one webhook fired, with the seed and durable URL
    let bodies = received.character.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["memberId"], "u1");
    assert_eq!(body["characterStyle"], "romance");
    assert_eq!(body["seedNum"], "777");
    assert!(body["characterProfileImageUrl"]
        .as_str()
        .unwrap()
        .ends_with("webtoon-ai/u1/temp_profile.webp"));
}

#[tokio::test]
async fn test_profile_pipeline_mismatched_echo_sends_no_webhook() {
    let received = ReceivedWebhooks::default();
    let addr = spawn_stub_host(received.clone()).await;
    let callback_host = addr.to_string();

    let extractor = Arc::new(MockFeatureExtractor::new());
    extractor.echo_subject_id("someone-else");

    let store = Arc::new(MemoryObjectStore::new());
    let upload_dir = std::env::temp_dir().join(format!("profile-e2e-{}", Uuid::new_v4()));
    let deps = ServerDeps::new(
        extractor,
        Arc::new(MockScenarioWriter::new()),
        Arc::new(MockImageSynthesizer::new()),
        Arc::new(AssetRelay::new(store.clone(), upload_dir.clone())),
        Arc::new(WebhookClient::new()),
    );

    tokio::fs::create_dir_all(&upload_dir).await.unwrap();
    let photo = upload_dir.join("photo.webp");
    tokio::fs::write(&photo, b"source-photo").await.unwrap();

    let result = create_profile::run(
        CreateProfileRequest {
            member_id: "u1".to_string(),
            character_style: "romance".to_string(),
            image_path: photo,
            callback_host,
        },
        &deps,
    )
    .await;

    assert!(result.is_err());
    assert!(store.keys().is_empty());
    assert!(received.character.lock().unwrap().is_empty());
}
