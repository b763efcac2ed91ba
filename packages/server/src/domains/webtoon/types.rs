//! Webtoon domain types.

use serde::{Deserialize, Serialize};

/// Scenes per webtoon.
pub const SCENE_COUNT: usize = 4;

/// Placeholder stored in a scene slot whose generation turn failed.
pub const SCENE_FAILURE_PLACEHOLDER: &str = "Error generating scene.";

/// An ordered four-scene script derived from diary text.
///
/// The length is always [`SCENE_COUNT`]: when a generation turn fails, the
/// failed slot and every later slot hold [`SCENE_FAILURE_PLACEHOLDER`]
/// instead of real scene text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenes: Vec<String>,
}

impl Scenario {
    pub fn new(scenes: Vec<String>) -> Self {
        debug_assert_eq!(scenes.len(), SCENE_COUNT);
        Self { scenes }
    }

    /// Whether every slot holds real scene text.
    pub fn is_complete(&self) -> bool {
        self.scenes.len() == SCENE_COUNT
            && self.scenes.iter().all(|s| s != SCENE_FAILURE_PLACEHOLDER)
    }
}

/// Outcome of one scene's synthesize/fetch/publish chain.
///
/// Failures stay visible here instead of silently disappearing; only the
/// webhook wire format reduces the set to its survivors.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOutcome {
    Rendered { scenario: String, images: Vec<String> },
    Failed { scenario: String, reason: String },
}

impl SceneOutcome {
    /// Wire entries for this scene: one per published image, none on failure.
    pub fn wire_images(&self) -> Vec<WebtoonImage> {
        match self {
            SceneOutcome::Rendered { scenario, images } => images
                .iter()
                .map(|image| WebtoonImage {
                    scenario: scenario.clone(),
                    image: image.clone(),
                })
                .collect(),
            SceneOutcome::Failed { .. } => Vec::new(),
        }
    }
}

/// One `{scenario, image}` pair in the webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebtoonImage {
    pub scenario: String,
    pub image: String,
}

/// Webhook payload delivered when a webtoon job finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebtoonPayload {
    pub member_id: String,
    pub date: String,
    pub webtoon_folder_url: String,
    pub webtoon_images: Vec<WebtoonImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_completeness() {
        let complete = Scenario::new(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        assert!(complete.is_complete());

        let partial = Scenario::new(vec![
            "a".into(),
            SCENE_FAILURE_PLACEHOLDER.into(),
            SCENE_FAILURE_PLACEHOLDER.into(),
            SCENE_FAILURE_PLACEHOLDER.into(),
        ]);
        assert!(!partial.is_complete());
    }

    #[test]
    fn test_wire_images_flatten_rendered_scenes() {
        let outcome = SceneOutcome::Rendered {
            scenario: "rainy street".into(),
            images: vec!["https://s3/1.webp".into(), "https://s3/1b.webp".into()],
        };
        let images = outcome.wire_images();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].scenario, "rainy street");

        let failed = SceneOutcome::Failed {
            scenario: "rainy street".into(),
            reason: "no output".into(),
        };
        assert!(failed.wire_images().is_empty());
    }

    #[test]
    fn test_payload_uses_camel_case_wire_names() {
        let payload = WebtoonPayload {
            member_id: "u1".into(),
            date: "2024-11-02".into(),
            webtoon_folder_url: "https://bucket/webtoon-ai/u1/2024-11-02/".into(),
            webtoon_images: vec![WebtoonImage {
                scenario: "scene".into(),
                image: "https://bucket/webtoon-ai/u1/2024-11-02/1.webp".into(),
            }],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["memberId"], "u1");
        assert_eq!(json["webtoonFolderUrl"], "https://bucket/webtoon-ai/u1/2024-11-02/");
        assert_eq!(json["webtoonImages"][0]["scenario"], "scene");
    }
}
