//! Scenario writing: diary text in, a four-scene script out.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::error;

use openai_client::{ChatRequest, Message};

use crate::domains::webtoon::types::{Scenario, SCENE_COUNT, SCENE_FAILURE_PLACEHOLDER};
use crate::kernel::{BaseChatModel, BaseScenarioWriter, GPT_4O_MINI};

/// Build the system instruction around the member's diary entry. The diary
/// is embedded in the instruction once; the per-scene requests are the user
/// turns.
fn scenario_instructions(diary_text: &str) -> String {
    format!(
        "You are responsible for making the user's diary into a FOUR-SCENE scenario.\n\
         I will draw a cartoon with the scene information you made.\n\
         Use a way of describing the scene, not the content.\n\
         Describe the background and scene simply.\n\
         #Be careful not to let other people come out when you describe the situation.(Don't use 'they', 'friends', etc)\n\
         #Not an incidental depiction, but a scene\n\
         DON'T USE MARKDOWN\n\
         [user's diary]\n\t{}\n\
         [output]\n\tscene: \n\tbackground: \n",
        diary_text
    )
}

/// Writes the scenario through a single growing conversation: each turn sees
/// every scene written so far, which keeps scene N coherent with scenes
/// 1..N-1. Exactly four turns are attempted. A failed turn short-circuits:
/// the failed slot and all later slots get the placeholder and no further
/// model calls are made.
pub struct ScenarioWriter {
    model: Arc<dyn BaseChatModel>,
}

impl ScenarioWriter {
    pub fn new(model: Arc<dyn BaseChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl BaseScenarioWriter for ScenarioWriter {
    async fn write(&self, subject_id: &str, diary_text: &str) -> Result<(String, Scenario)> {
        let mut messages = vec![
            Message::system(scenario_instructions(diary_text)),
            Message::user("make scene 1"),
        ];
        let mut scenes: Vec<String> = Vec::with_capacity(SCENE_COUNT);

        for turn in 1..=SCENE_COUNT {
            let request = ChatRequest::new(GPT_4O_MINI)
                .messages(messages.clone())
                .temperature(0.5)
                .max_tokens(1000);

            match self.model.complete(request).await {
                Ok(content) => {
                    let scene = content.trim().to_string();
                    messages.push(Message::assistant(scene.clone()));
                    scenes.push(scene);
                    if turn < SCENE_COUNT {
                        messages.push(Message::user(format!("make scene {}", turn + 1)));
                    }
                }
                Err(e) => {
                    error!(turn, error = %format!("{e:#}"), "scene generation turn failed");
                    while scenes.len() < SCENE_COUNT {
                        scenes.push(SCENE_FAILURE_PLACEHOLDER.to_string());
                    }
                    break;
                }
            }
        }

        Ok((subject_id.to_string(), Scenario::new(scenes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockChatModel;
    use openai_client::MessageContent;

    #[tokio::test]
    async fn test_four_turns_yield_four_scenes() {
        let model = MockChatModel::new()
            .with_response("scene one")
            .with_response("scene two")
            .with_response("scene three")
            .with_response("scene four");
        let handle = model.clone();

        let writer = ScenarioWriter::new(Arc::new(model));
        let (subject_id, scenario) = writer.write("u1", "walked in the rain").await.unwrap();

        assert_eq!(subject_id, "u1");
        assert_eq!(
            scenario.scenes,
            vec!["scene one", "scene two", "scene three", "scene four"]
        );
        assert!(scenario.is_complete());
        assert_eq!(handle.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_conversation_grows_turn_by_turn() {
        let model = MockChatModel::new()
            .with_response("scene one")
            .with_response("scene two")
            .with_response("scene three")
            .with_response("scene four");
        let handle = model.clone();

        let writer = ScenarioWriter::new(Arc::new(model));
        writer.write("u1", "walked in the rain").await.unwrap();

        let calls = handle.calls();
        // system + "make scene 1" on the first turn; each later turn adds
        // the previous assistant reply and the next user request.
        assert_eq!(calls[0].messages.len(), 2);
        assert_eq!(calls[1].messages.len(), 4);
        assert_eq!(calls[3].messages.len(), 8);

        match &calls[3].messages[2].content {
            MessageContent::Text(text) => assert_eq!(text, "scene one"),
            _ => panic!("assistant replies should be plain text"),
        }
        match &calls[3].messages[7].content {
            MessageContent::Text(text) => assert_eq!(text, "make scene 4"),
            _ => panic!("user turns should be plain text"),
        }
    }

    #[tokio::test]
    async fn test_diary_is_embedded_in_system_instruction() {
        let model = MockChatModel::new();
        let handle = model.clone();

        let writer = ScenarioWriter::new(Arc::new(model));
        writer.write("u1", "ate tteokbokki at the market").await.unwrap();

        let calls = handle.calls();
        match &calls[0].messages[0].content {
            MessageContent::Text(text) => {
                assert!(text.contains("ate tteokbokki at the market"));
                assert!(text.contains("FOUR-SCENE"));
            }
            _ => panic!("system instruction should be plain text"),
        }
    }

    #[tokio::test]
    async fn test_failed_turn_short_circuits_with_placeholders() {
        let model = MockChatModel::new()
            .with_response("scene one")
            .with_failure("model unavailable");
        let handle = model.clone();

        let writer = ScenarioWriter::new(Arc::new(model));
        let (_, scenario) = writer.write("u1", "diary").await.unwrap();

        assert_eq!(scenario.scenes.len(), SCENE_COUNT);
        assert_eq!(scenario.scenes[0], "scene one");
        for slot in &scenario.scenes[1..] {
            assert_eq!(slot, SCENE_FAILURE_PLACEHOLDER);
        }
        assert!(!scenario.is_complete());
        // No calls after the failing turn
        assert_eq!(handle.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_first_turn_failure_yields_all_placeholders() {
        let model = MockChatModel::new().with_failure("model unavailable");
        let handle = model.clone();

        let writer = ScenarioWriter::new(Arc::new(model));
        let (_, scenario) = writer.write("u1", "diary").await.unwrap();

        assert_eq!(
            scenario.scenes,
            vec![SCENE_FAILURE_PLACEHOLDER; SCENE_COUNT]
        );
        assert_eq!(handle.calls().len(), 1);
    }
}
