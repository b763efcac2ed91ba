//! Kernel module - server infrastructure and dependencies.

pub mod assets;
pub mod deps;
pub mod jobs;
pub mod s3;
pub mod styles;
pub mod synthesizer;
pub mod test_dependencies;
pub mod traits;
pub mod webhook;

/// Model used for feature extraction and scenario writing.
pub const GPT_4O_MINI: &str = "gpt-4o-mini";

pub use assets::{AssetRelay, STORAGE_ROOT};
pub use deps::{OpenAiChatModel, ReplicateBackend, ServerDeps};
pub use jobs::{JobHandle, JobOutcome, JobSpawner, JobStatus};
pub use s3::S3ObjectStore;
pub use styles::{ModelRef, StyleRegistry};
pub use synthesizer::{GenerationSettings, ImageSynthesizer, PollPolicy};
pub use traits::*;
pub use webhook::WebhookClient;
