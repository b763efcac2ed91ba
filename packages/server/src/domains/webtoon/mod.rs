//! Webtoon domain: a diary entry becomes a four-scene illustrated strip.

pub mod scenario;
pub mod types;
pub mod workflows;

pub use scenario::ScenarioWriter;
