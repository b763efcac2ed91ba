// TestDependencies - mock implementations for testing
//
// Provides scripted implementations of every kernel trait seam so workflow
// and component tests can run without any external service.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use openai_client::ChatRequest;
use replicate_client::{Prediction, PredictionStatus};

use crate::common::utils::sanitize_member_id;
use crate::domains::character::types::CharacterPayload;
use crate::domains::webtoon::types::{Scenario, WebtoonPayload, SCENE_COUNT};
use crate::kernel::assets::STORAGE_ROOT;

use super::deps::ServerDeps;
use super::traits::{
    BaseAssetRelay, BaseCallbackService, BaseChatModel, BaseFeatureExtractor,
    BaseImageSynthesizer, BaseObjectStore, BasePredictionBackend, BaseScenarioWriter,
    ExtractedProfile, ProfileImage,
};

// =============================================================================
// Mock Chat Model
// =============================================================================

#[derive(Clone)]
pub struct MockChatModel {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockChatModel {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful completion.
    pub fn with_response(self, content: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(content.to_string()));
        self
    }

    /// Queue a failed completion.
    pub fn with_failure(self, error: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(error.to_string()));
        self
    }

    /// All requests seen so far.
    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseChatModel for MockChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request);

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(content),
            Some(Err(error)) => Err(anyhow!(error)),
            None => Ok("mock response".to_string()),
        }
    }
}

// =============================================================================
// Mock Prediction Backend
// =============================================================================

#[derive(Clone)]
pub struct MockPredictionBackend {
    statuses: Arc<Mutex<VecDeque<PredictionStatus>>>,
    logs: Arc<Mutex<Option<String>>>,
    output: Arc<Mutex<Option<serde_json::Value>>>,
    create_calls: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    get_calls: Arc<Mutex<u32>>,
}

impl MockPredictionBackend {
    pub fn new() -> Self {
        Self {
            statuses: Arc::new(Mutex::new(VecDeque::new())),
            logs: Arc::new(Mutex::new(None)),
            output: Arc::new(Mutex::new(None)),
            create_calls: Arc::new(Mutex::new(Vec::new())),
            get_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Script the status returned by each successive `get_prediction` call.
    /// Once the sequence is exhausted the prediction reports `Succeeded`.
    pub fn with_status_sequence(self, statuses: Vec<PredictionStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    /// Logs attached once the prediction is terminal.
    pub fn with_logs(self, logs: &str) -> Self {
        *self.logs.lock().unwrap() = Some(logs.to_string());
        self
    }

    /// Output attached once the prediction is terminal.
    pub fn with_output(self, output: serde_json::Value) -> Self {
        *self.output.lock().unwrap() = Some(output);
        self
    }

    /// All (version, input) pairs submitted so far.
    pub fn create_calls(&self) -> Vec<(String, serde_json::Value)> {
        self.create_calls.lock().unwrap().clone()
    }

    /// Number of status checks performed so far.
    pub fn get_calls(&self) -> u32 {
        *self.get_calls.lock().unwrap()
    }

    fn prediction(&self, status: PredictionStatus) -> Prediction {
        let terminal = status.is_terminal();
        Prediction {
            id: "pred-1".to_string(),
            status,
            output: if terminal {
                self.output.lock().unwrap().clone()
            } else {
                None
            },
            logs: if terminal {
                self.logs.lock().unwrap().clone()
            } else {
                None
            },
            error: None,
        }
    }
}

impl Default for MockPredictionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePredictionBackend for MockPredictionBackend {
    async fn create_prediction(
        &self,
        version: &str,
        input: serde_json::Value,
    ) -> Result<Prediction> {
        self.create_calls
            .lock()
            .unwrap()
            .push((version.to_string(), input));
        Ok(self.prediction(PredictionStatus::Starting))
    }

    async fn get_prediction(&self, _id: &str) -> Result<Prediction> {
        *self.get_calls.lock().unwrap() += 1;
        let status = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PredictionStatus::Succeeded);
        Ok(self.prediction(status))
    }
}

// =============================================================================
// Mock Feature Extractor
// =============================================================================

pub struct MockFeatureExtractor {
    profiles: Mutex<VecDeque<String>>,
    echoed_subject_id: Mutex<Option<String>>,
    calls: Mutex<u32>,
}

impl MockFeatureExtractor {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(VecDeque::new()),
            echoed_subject_id: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    /// Queue a profile description to return.
    pub fn push_profile(&self, profile: &str) {
        self.profiles.lock().unwrap().push_back(profile.to_string());
    }

    /// Echo a fixed subject id instead of the one passed in (simulates
    /// cross-talk from the extraction backend).
    pub fn echo_subject_id(&self, subject_id: &str) {
        *self.echoed_subject_id.lock().unwrap() = Some(subject_id.to_string());
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl Default for MockFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseFeatureExtractor for MockFeatureExtractor {
    async fn extract(&self, subject_id: &str, _image: &[u8]) -> Result<ExtractedProfile> {
        *self.calls.lock().unwrap() += 1;

        let subject_id = self
            .echoed_subject_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| subject_id.to_string());
        let profile = self
            .profiles
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "mock profile".to_string());

        Ok(ExtractedProfile {
            subject_id,
            profile,
        })
    }
}

// =============================================================================
// Mock Scenario Writer
// =============================================================================

pub struct MockScenarioWriter {
    scenarios: Mutex<VecDeque<Result<Scenario, String>>>,
}

impl MockScenarioWriter {
    pub fn new() -> Self {
        Self {
            scenarios: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a scenario to return.
    pub fn push_scenario(&self, scenario: Scenario) {
        self.scenarios.lock().unwrap().push_back(Ok(scenario));
    }

    /// Make the next call fail outright (transport-level failure).
    pub fn fail_next(&self, error: &str) {
        self.scenarios
            .lock()
            .unwrap()
            .push_back(Err(error.to_string()));
    }
}

impl Default for MockScenarioWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseScenarioWriter for MockScenarioWriter {
    async fn write(&self, subject_id: &str, _diary_text: &str) -> Result<(String, Scenario)> {
        let scenario = match self.scenarios.lock().unwrap().pop_front() {
            Some(Ok(scenario)) => scenario,
            Some(Err(error)) => return Err(anyhow!(error)),
            None => Scenario::new(
                (1..=SCENE_COUNT)
                    .map(|n| format!("mock scene {}", n))
                    .collect(),
            ),
        };
        Ok((subject_id.to_string(), scenario))
    }
}

// =============================================================================
// Mock Image Synthesizer
// =============================================================================

pub struct MockImageSynthesizer {
    profile_images: Mutex<VecDeque<ProfileImage>>,
    scene_results: Mutex<VecDeque<Result<Vec<String>, String>>>,
    profile_calls: Mutex<u32>,
    scene_calls: Mutex<u32>,
}

impl MockImageSynthesizer {
    pub fn new() -> Self {
        Self {
            profile_images: Mutex::new(VecDeque::new()),
            scene_results: Mutex::new(VecDeque::new()),
            profile_calls: Mutex::new(0),
            scene_calls: Mutex::new(0),
        }
    }

    pub fn push_profile_image(&self, image: ProfileImage) {
        self.profile_images.lock().unwrap().push_back(image);
    }

    pub fn push_scene_output(&self, urls: Vec<String>) {
        self.scene_results.lock().unwrap().push_back(Ok(urls));
    }

    pub fn push_scene_failure(&self, error: &str) {
        self.scene_results
            .lock()
            .unwrap()
            .push_back(Err(error.to_string()));
    }

    pub fn profile_calls(&self) -> u32 {
        *self.profile_calls.lock().unwrap()
    }

    pub fn scene_calls(&self) -> u32 {
        *self.scene_calls.lock().unwrap()
    }
}

impl Default for MockImageSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseImageSynthesizer for MockImageSynthesizer {
    async fn synthesize_profile(&self, _style: &str, _profile: &str) -> Result<ProfileImage> {
        *self.profile_calls.lock().unwrap() += 1;

        Ok(self
            .profile_images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ProfileImage {
                seed: Some("1234".to_string()),
                image_url: Some("https://gen/mock.webp".to_string()),
            }))
    }

    async fn synthesize_scene(
        &self,
        _style: &str,
        _character_info: &str,
        _seed: i64,
        _scene: &str,
    ) -> Result<Vec<String>> {
        *self.scene_calls.lock().unwrap() += 1;

        match self.scene_results.lock().unwrap().pop_front() {
            Some(Ok(urls)) => Ok(urls),
            Some(Err(error)) => Err(anyhow!(error)),
            None => Ok(vec!["https://gen/mock.webp".to_string()]),
        }
    }
}

// =============================================================================
// Memory Object Store
// =============================================================================

pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Keys stored so far, sorted for stable assertions.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseObjectStore for MemoryObjectStore {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes);
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://test-bucket.s3.test-region-1.amazonaws.com/{}", key)
    }
}

// =============================================================================
// Mock Asset Relay
// =============================================================================

/// In-memory relay: no network, no filesystem. Keys follow the same scheme
/// as the real relay so URL assertions carry over.
pub struct MockAssetRelay {
    relayed: Mutex<Vec<String>>,
    published: Mutex<Vec<String>>,
}

impl MockAssetRelay {
    pub fn new() -> Self {
        Self {
            relayed: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn relayed_urls(&self) -> Vec<String> {
        self.relayed.lock().unwrap().clone()
    }

    pub fn published_keys(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

impl Default for MockAssetRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAssetRelay for MockAssetRelay {
    async fn relay(&self, remote_url: &str, name_hint: &str) -> Result<PathBuf> {
        self.relayed.lock().unwrap().push(remote_url.to_string());
        Ok(PathBuf::from(format!("/tmp/mock-relay/{}.webp", name_hint)))
    }

    async fn publish(
        &self,
        local_path: &Path,
        owner_id: &str,
        date: Option<&str>,
        is_profile: bool,
    ) -> Option<String> {
        let owner = sanitize_member_id(owner_id);
        if owner.is_empty() {
            return None;
        }

        let key = if is_profile {
            format!("{}/{}/temp_profile.webp", STORAGE_ROOT, owner)
        } else {
            let basename = local_path.file_name()?.to_string_lossy().to_string();
            format!("{}/{}/{}/{}", STORAGE_ROOT, owner, date?, basename)
        };

        self.published.lock().unwrap().push(key.clone());
        Some(format!(
            "https://test-bucket.s3.test-region-1.amazonaws.com/{}",
            key
        ))
    }

    fn folder_url(&self, owner_id: &str, date: &str) -> String {
        format!(
            "https://test-bucket.s3.test-region-1.amazonaws.com/{}/{}/{}/",
            STORAGE_ROOT,
            sanitize_member_id(owner_id),
            date
        )
    }
}

// =============================================================================
// Recording Callback Service
// =============================================================================

pub struct RecordingCallbackService {
    character: Mutex<Vec<(String, CharacterPayload)>>,
    webtoon: Mutex<Vec<(String, WebtoonPayload)>>,
}

impl RecordingCallbackService {
    pub fn new() -> Self {
        Self {
            character: Mutex::new(Vec::new()),
            webtoon: Mutex::new(Vec::new()),
        }
    }

    pub fn character_deliveries(&self) -> Vec<(String, CharacterPayload)> {
        self.character.lock().unwrap().clone()
    }

    pub fn webtoon_deliveries(&self) -> Vec<(String, WebtoonPayload)> {
        self.webtoon.lock().unwrap().clone()
    }
}

impl Default for RecordingCallbackService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCallbackService for RecordingCallbackService {
    async fn post_character(&self, callback_host: &str, payload: &CharacterPayload) -> Result<()> {
        self.character
            .lock()
            .unwrap()
            .push((callback_host.to_string(), payload.clone()));
        Ok(())
    }

    async fn post_webtoon(&self, callback_host: &str, payload: &WebtoonPayload) -> Result<()> {
        self.webtoon
            .lock()
            .unwrap()
            .push((callback_host.to_string(), payload.clone()));
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of mock services wired into a [`ServerDeps`].
pub struct TestDependencies {
    pub extractor: Arc<MockFeatureExtractor>,
    pub scenario_writer: Arc<MockScenarioWriter>,
    pub synthesizer: Arc<MockImageSynthesizer>,
    pub asset_relay: Arc<MockAssetRelay>,
    pub callbacks: Arc<RecordingCallbackService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            extractor: Arc::new(MockFeatureExtractor::new()),
            scenario_writer: Arc::new(MockScenarioWriter::new()),
            synthesizer: Arc::new(MockImageSynthesizer::new()),
            asset_relay: Arc::new(MockAssetRelay::new()),
            callbacks: Arc::new(RecordingCallbackService::new()),
        }
    }

    /// ServerDeps backed entirely by the mocks.
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.extractor.clone(),
            self.scenario_writer.clone(),
            self.synthesizer.clone(),
            self.asset_relay.clone(),
            self.callbacks.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
