//! Character domain: a member's photo becomes a styled 2D character profile.

pub mod extractor;
pub mod types;
pub mod workflows;

pub use extractor::FeatureExtractor;
