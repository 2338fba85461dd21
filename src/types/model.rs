//! Normalized model metadata, as consumed by the host application.
//!
//! All prices are expressed in USD per million tokens.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model metadata record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    pub context_window: u64,
    pub supports_images: bool,
    pub supports_computer_use: bool,
    pub supports_prompt_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_writes_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_reads_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_thinking_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<PricingTier>>,
}

impl ModelInfo {
    /// Label used by pickers: the description when present, otherwise the id.
    pub fn display_label<'a>(&'a self, id: &'a str) -> &'a str {
        match self.description.as_deref() {
            Some(desc) if !desc.is_empty() => desc,
            _ => id,
        }
    }
}

/// Context-window dependent pricing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub context_window: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_writes_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_reads_price: Option<f64>,
}

/// Model id → metadata. Ordered so pickers list models deterministically.
pub type ModelRecord = BTreeMap<String, ModelInfo>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_and_skips_absent_prices() {
        let info = ModelInfo {
            context_window: 128_000,
            input_price: Some(1.5),
            output_price: Some(2.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["contextWindow"], 128_000);
        assert_eq!(json["inputPrice"], 1.5);
        assert!(json.get("cacheReadsPrice").is_none());
        assert!(json.get("tiers").is_none());
    }

    #[test]
    fn display_label_falls_back_to_id() {
        let mut info = ModelInfo::default();
        assert_eq!(info.display_label("openai/gpt-4o"), "openai/gpt-4o");
        info.description = Some(String::new());
        assert_eq!(info.display_label("openai/gpt-4o"), "openai/gpt-4o");
        info.description = Some("GPT-4o".into());
        assert_eq!(info.display_label("openai/gpt-4o"), "GPT-4o");
    }
}
