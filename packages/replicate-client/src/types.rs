//! Replicate API request and response types.

use serde::{Deserialize, Serialize};

/// Request body for creating a prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    /// Model version id (the 64-char hash, not the model name)
    pub version: String,

    /// Model input. Shape is model-specific, so this stays untyped here.
    pub input: serde_json::Value,
}

/// Prediction lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    /// Whether the prediction has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// One prediction, as returned by create/get.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,

    /// Raw model output. For image models this is usually a list of URLs,
    /// occasionally a single URL string.
    #[serde(default)]
    pub output: Option<serde_json::Value>,

    /// Accumulated run logs.
    #[serde(default)]
    pub logs: Option<String>,

    /// Error detail for failed predictions.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

const SEED_MARKER: &str = "Using seed: ";

impl Prediction {
    /// View the output as a list of URL strings.
    ///
    /// A bare string output becomes a one-element list; anything that is not
    /// a string or a list of strings yields an empty list.
    pub fn output_urls(&self) -> Vec<String> {
        match &self.output {
            Some(serde_json::Value::String(url)) => vec![url.clone()],
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Extract the generation seed from the run logs.
    ///
    /// Compatibility shim: these models only report the seed as a
    /// `"Using seed: <digits>"` log line, not as a structured output field.
    pub fn seed_from_logs(&self) -> Option<String> {
        let logs = self.logs.as_deref()?;
        let start = logs.find(SEED_MARKER)? + SEED_MARKER.len();
        let digits: String = logs[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            None
        } else {
            Some(digits)
        }
    }
}
