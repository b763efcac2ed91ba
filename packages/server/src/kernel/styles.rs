//! Character style registry.
//!
//! Maps a style tag to the generation model/version pair that renders it.
//! The registry is immutable after construction and injected into the image
//! synthesizer - there is no process-wide mutable model table.

use std::collections::HashMap;

/// A generation model pinned to one published version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub model: String,
    pub version: String,
}

impl ModelRef {
    pub fn new(model: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            version: version.into(),
        }
    }
}

/// Immutable style tag -> model mapping.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: HashMap<String, ModelRef>,
}

impl StyleRegistry {
    /// Build a registry from explicit entries.
    pub fn new(entries: impl IntoIterator<Item = (String, ModelRef)>) -> Self {
        Self {
            styles: entries.into_iter().collect(),
        }
    }

    /// The styles shipped with the service.
    pub fn defaults() -> Self {
        Self::new([
            (
                "romance".to_string(),
                ModelRef::new(
                    "tpals0409/romance-webtoon-character",
                    "64ad94c7f1fe7cfe73ee7b3d0f7deae8a59d201689eb12d07f74baa9325949e0",
                ),
            ),
            (
                "pixar".to_string(),
                ModelRef::new(
                    "tpals0409/test_pixar",
                    "32c27ef90bb8b1b2c272809059306a6ecc3e7b903b694857fefa0175d7726ca6",
                ),
            ),
        ])
    }

    /// Look up the model for a style tag.
    pub fn resolve(&self, style: &str) -> Option<&ModelRef> {
        self.styles.get(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_shipped_styles() {
        let registry = StyleRegistry::defaults();
        assert!(registry.resolve("romance").is_some());
        assert!(registry.resolve("pixar").is_some());
    }

    #[test]
    fn test_unknown_style_resolves_to_none() {
        let registry = StyleRegistry::defaults();
        assert!(registry.resolve("noir").is_none());
    }

    #[test]
    fn test_custom_entries() {
        let registry = StyleRegistry::new([(
            "mono".to_string(),
            ModelRef::new("acme/mono", "abc123"),
        )]);
        assert_eq!(registry.resolve("mono").unwrap().model, "acme/mono");
        assert!(registry.resolve("romance").is_none());
    }
}
