//! Feature extraction from member photos.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;

use openai_client::{data_url, ChatRequest, Message};

use crate::kernel::{BaseChatModel, BaseFeatureExtractor, ExtractedProfile, GPT_4O_MINI};

/// Instruction given to the vision model. Only stable physical traits are
/// wanted; anything that changes between photos (clothes, expression,
/// background) would poison later scene renders and is excluded.
const EXTRACTION_INSTRUCTIONS: &str = "\
You are responsible for extracting features from the user's photos.\n\
The data you extract is used to create a 2D character profile picture through the RoLA model.\n\
Extract the user's features and return the data in JSON format.\n\
data format: gender, age(ex: 20s, 30s, 40s, ...), hair, glasses(if yes -> {shape, color} else: don't write), eyes, mouth, skin-tone\n\
In particular, extract detailed data on hairstyles(length, style, color, bang).\n\
#Don't extract information that changes every time(ex: clothes, emotion, back_ground, etc.)\n\
#Don't extract information that is unknown";

/// Extracts a character trait description from a photo with a single
/// vision-model call. The model's text comes back verbatim - the description
/// is an opaque prompt fragment, not a schema this service validates.
pub struct FeatureExtractor {
    model: Arc<dyn BaseChatModel>,
}

impl FeatureExtractor {
    pub fn new(model: Arc<dyn BaseChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl BaseFeatureExtractor for FeatureExtractor {
    async fn extract(&self, subject_id: &str, image: &[u8]) -> Result<ExtractedProfile> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);

        let request = ChatRequest::new(GPT_4O_MINI)
            .message(Message::system(EXTRACTION_INSTRUCTIONS))
            .message(Message::user_image(data_url("image/webp", &encoded)))
            .temperature(0.5)
            .max_tokens(1000);

        let profile = self.model.complete(request).await?;

        Ok(ExtractedProfile {
            subject_id: subject_id.to_string(),
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockChatModel;
    use openai_client::MessageContent;

    #[tokio::test]
    async fn test_echoes_subject_id_and_returns_raw_text() {
        let model = MockChatModel::new().with_response("{\"gender\": \"female\"}");
        let handle = model.clone();

        let extractor = FeatureExtractor::new(Arc::new(model));
        let extracted = extractor.extract("u1", b"not-a-real-webp").await.unwrap();

        assert_eq!(extracted.subject_id, "u1");
        assert_eq!(extracted.profile, "{\"gender\": \"female\"}");
        assert_eq!(handle.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_sends_single_turn_with_inlined_image() {
        let model = MockChatModel::new().with_response("traits");
        let handle = model.clone();

        let extractor = FeatureExtractor::new(Arc::new(model));
        extractor.extract("u1", &[1, 2, 3]).await.unwrap();

        let request = handle.calls().pop().unwrap();
        assert_eq!(request.model, GPT_4O_MINI);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");

        match &request.messages[1].content {
            MessageContent::Parts(parts) => {
                let json = serde_json::to_value(parts).unwrap();
                let url = json[0]["image_url"]["url"].as_str().unwrap();
                assert!(url.starts_with("data:image/webp;base64,"));
            }
            MessageContent::Text(_) => panic!("photo should be sent as an image part"),
        }
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let model = MockChatModel::new().with_failure("rate limited");

        let extractor = FeatureExtractor::new(Arc::new(model));
        assert!(extractor.extract("u1", b"img").await.is_err());
    }
}
