//! Provider settings
//!
//! The host persists provider configuration as a flat camelCase record. This
//! module owns the MakeHub slice of that record and the headless model of the
//! settings panel that edits it.

pub mod panel;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::LlmError;
use crate::providers::makehub::models::DEFAULT_PERF_RATIO;

pub use panel::{
    DropdownOption, MAKEHUB_API_KEYS_URL, MakeHubSettingsPanel, ModelDetails, ModelDropdown,
    PanelView, PerfRatioLabel, PerfRatioSlider,
};

/// Host configuration fields read by the MakeHub provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub makehub_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub makehub_model_id: Option<String>,

    /// Price (0.0) ↔ performance (1.0) preference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub makehub_perf_ratio: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub model_temperature: Option<f64>,
}

impl ProviderSettings {
    /// Check value ranges, mapping failures to `ConfigurationError`
    pub fn validate_ranges(&self) -> Result<(), LlmError> {
        self.validate()?;
        Ok(())
    }

    /// Configured ratio clamped into `[0, 1]`; unset or non-finite values use the default
    pub fn perf_ratio(&self) -> f64 {
        match self.makehub_perf_ratio {
            Some(ratio) if ratio.is_finite() => ratio.clamp(0.0, 1.0),
            _ => DEFAULT_PERF_RATIO,
        }
    }

    /// Non-empty API key
    pub fn api_key(&self) -> Option<&str> {
        self.makehub_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
    }

    /// Non-empty configured model id
    pub fn model_id(&self) -> Option<&str> {
        self.makehub_model_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Apply a field edit emitted by the panel
    pub fn apply(&mut self, field: SettingsField) {
        match field {
            SettingsField::MakehubApiKey(key) => self.makehub_api_key = Some(key),
            SettingsField::MakehubPerfRatio(ratio) => self.makehub_perf_ratio = Some(ratio),
            SettingsField::MakehubModelId(id) => self.makehub_model_id = Some(id),
        }
    }
}

/// A single configuration edit
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsField {
    MakehubApiKey(String),
    MakehubPerfRatio(f64),
    MakehubModelId(String),
}

impl SettingsField {
    /// Host field name
    pub fn key(&self) -> &'static str {
        match self {
            Self::MakehubApiKey(_) => "makehubApiKey",
            Self::MakehubPerfRatio(_) => "makehubPerfRatio",
            Self::MakehubModelId(_) => "makehubModelId",
        }
    }
}

/// Messages posted from the panel to the host backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// Drop the cached model list of a router provider
    FlushRouterModels {
        #[serde(rename = "text")]
        provider: String,
    },
}

/// Host side of the settings panel
pub trait SettingsHost {
    fn set_field(&mut self, field: SettingsField);

    fn post_message(&mut self, message: HostMessage);

    /// Ask the host to reload router model lists
    fn refetch_router_models(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_host_record_and_ignores_other_providers() {
        let settings: ProviderSettings = serde_json::from_value(json!({
            "apiProvider": "makehub",
            "makehubApiKey": "mh-key",
            "makehubPerfRatio": 0.25,
            "openRouterApiKey": "ignored"
        }))
        .unwrap();
        assert_eq!(settings.api_key(), Some("mh-key"));
        assert_eq!(settings.perf_ratio(), 0.25);
        assert_eq!(settings.model_id(), None);
    }

    #[test]
    fn perf_ratio_defaults_to_balanced() {
        assert_eq!(ProviderSettings::default().perf_ratio(), 0.5);
    }

    #[test]
    fn perf_ratio_is_clamped_for_display() {
        let ratio = |r: f64| ProviderSettings {
            makehub_perf_ratio: Some(r),
            ..Default::default()
        }
        .perf_ratio();
        assert_eq!(ratio(1.5), 1.0);
        assert_eq!(ratio(-0.2), 0.0);
        assert_eq!(ratio(f64::NAN), 0.5);
        assert_eq!(ratio(0.35), 0.35);
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let settings = ProviderSettings {
            model_temperature: Some(3.0),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate_ranges(),
            Err(LlmError::ConfigurationError(_))
        ));
        assert!(ProviderSettings::default().validate_ranges().is_ok());
    }

    #[test]
    fn flush_message_uses_host_wire_shape() {
        let message = HostMessage::FlushRouterModels {
            provider: "makehub".into(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"type": "flushRouterModels", "text": "makehub"})
        );
    }

    #[test]
    fn apply_updates_matching_field() {
        let mut settings = ProviderSettings::default();
        settings.apply(SettingsField::MakehubModelId("openai/gpt-4o".into()));
        settings.apply(SettingsField::MakehubPerfRatio(0.9));
        assert_eq!(settings.model_id(), Some("openai/gpt-4o"));
        assert_eq!(settings.perf_ratio(), 0.9);
        assert_eq!(SettingsField::MakehubApiKey(String::new()).key(), "makehubApiKey");
    }
}
