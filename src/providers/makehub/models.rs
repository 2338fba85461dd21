//! MakeHub model constants and default model metadata
//!
//! <https://makehub.ai/models>

use crate::traits::ResolvedModel;
use crate::types::{ModelInfo, ModelRecord};

/// Default API endpoint
pub const MAKEHUB_BASE_URL: &str = "https://api.makehub.ai/v1";

/// Provider identifier used in logs, errors and host messages
pub const PROVIDER_ID: &str = "makehub";

/// Temperature sent when the host does not configure one
pub const MAKEHUB_DEFAULT_TEMPERATURE: f64 = 0.0;

/// Balanced price/performance preference
pub const DEFAULT_PERF_RATIO: f64 = 0.5;

/// Anthropic models
pub mod anthropic {
    pub const CLAUDE_4_SONNET: &str = "anthropic/claude-4-sonnet";
}

pub const DEFAULT_MODEL_ID: &str = anthropic::CLAUDE_4_SONNET;

const CLAUDE_4_SONNET_DESCRIPTION: &str = "The best coding model, optimized by MakeHub, and automatically routed to the fastest provider. Claude 4 Sonnet is an advanced large language model with improved reasoning, coding, and problem-solving capabilities.";

/// Metadata used when the catalog is unavailable or lacks the selected model
pub fn default_model_info() -> ModelInfo {
    ModelInfo {
        max_tokens: Some(8192),
        context_window: 200_000,
        supports_images: true,
        supports_computer_use: true,
        supports_prompt_cache: true,
        input_price: Some(3.0),
        output_price: Some(15.0),
        cache_writes_price: Some(3.75),
        cache_reads_price: Some(0.3),
        description: Some(CLAUDE_4_SONNET_DESCRIPTION.to_string()),
        ..Default::default()
    }
}

/// Pick the active model.
///
/// The selected id (or the default id) is used when the record knows it;
/// otherwise the default id and its built-in metadata are returned.
pub fn resolve_model(models: Option<&ModelRecord>, selected: Option<&str>) -> ResolvedModel {
    let id = selected
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(DEFAULT_MODEL_ID);

    match models.and_then(|m| m.get(id)) {
        Some(info) => ResolvedModel {
            id: id.to_string(),
            info: info.clone(),
        },
        None => ResolvedModel {
            id: DEFAULT_MODEL_ID.to_string(),
            info: default_model_info(),
        },
    }
}

/// Temperature is accepted by every routed model except OpenAI's o3-mini family.
pub fn supports_temperature(model_id: &str) -> bool {
    !model_id.to_lowercase().contains("o3-mini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_selected_model_from_record() {
        let mut models = ModelRecord::new();
        let info = ModelInfo {
            context_window: 64_000,
            input_price: Some(0.5),
            output_price: Some(1.0),
            ..Default::default()
        };
        models.insert("openai/gpt-4o".into(), info.clone());

        let resolved = resolve_model(Some(&models), Some("openai/gpt-4o"));
        assert_eq!(resolved.id, "openai/gpt-4o");
        assert_eq!(resolved.info, info);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        let models = ModelRecord::new();
        let resolved = resolve_model(Some(&models), Some("nobody/nothing"));
        assert_eq!(resolved.id, DEFAULT_MODEL_ID);
        assert_eq!(resolved.info, default_model_info());

        let resolved = resolve_model(None, None);
        assert_eq!(resolved.id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn catalog_entry_for_default_id_wins_over_builtin() {
        let mut models = ModelRecord::new();
        let info = ModelInfo {
            input_price: Some(2.5),
            output_price: Some(12.0),
            ..Default::default()
        };
        models.insert(DEFAULT_MODEL_ID.into(), info.clone());
        let resolved = resolve_model(Some(&models), Some("  "));
        assert_eq!(resolved.info, info);
    }

    #[test]
    fn o3_mini_has_no_temperature() {
        assert!(!supports_temperature("openai/o3-mini"));
        assert!(!supports_temperature("openai/O3-Mini-High"));
        assert!(supports_temperature("openai/o3"));
        assert!(supports_temperature(DEFAULT_MODEL_ID));
    }
}
