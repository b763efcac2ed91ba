//! Basic OpenAI client usage example

use base64::Engine;
use openai_client::{data_url, ChatRequest, Message, OpenAIClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize from environment
    let client = OpenAIClient::from_env()?;

    // Simple chat completion
    println!("=== Chat Completion ===");
    let response = client
        .chat_completion(
            ChatRequest::new("gpt-4o-mini")
                .message(Message::system("You are a helpful assistant."))
                .message(Message::user("What is Rust in one sentence?"))
                .temperature(0.7)
                .max_tokens(100),
        )
        .await?;

    println!("Response: {}", response.content);

    // Vision: describe an image passed inline as a data URL
    println!("\n=== Vision ===");
    let image_bytes = std::fs::read("photo.webp")?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&image_bytes);
    let response = client
        .chat_completion(
            ChatRequest::new("gpt-4o-mini")
                .message(Message::system("Describe the subject of the photo."))
                .message(Message::user_image(data_url("image/webp", &encoded)))
                .max_tokens(500),
        )
        .await?;

    println!("Response: {}", response.content);

    Ok(())
}
