use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    pub replicate_api_token: String,
    pub aws_region: String,
    pub bucket_name: String,
    pub upload_dir: PathBuf,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            replicate_api_token: env::var("REPLICATE_API_TOKEN")
                .context("REPLICATE_API_TOKEN must be set")?,
            aws_region: env::var("AWS_REGION")
                .unwrap_or_else(|_| "ap-northeast-2".to_string()),
            bucket_name: env::var("BUCKET_NAME").context("BUCKET_NAME must be set")?,
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./uploads".to_string())
                .into(),
            poll_interval: Duration::from_secs(
                env::var("PREDICTION_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("PREDICTION_POLL_INTERVAL_SECS must be a valid number")?,
            ),
            poll_max_attempts: env::var("PREDICTION_POLL_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .context("PREDICTION_POLL_MAX_ATTEMPTS must be a valid number")?,
        })
    }
}
