//! Headless MakeHub settings panel
//!
//! `render` produces a plain view description from the current settings and
//! catalog; the `on_*` handlers turn user input into host edits.

use super::{HostMessage, ProviderSettings, SettingsField, SettingsHost};
use crate::providers::makehub::models::{DEFAULT_MODEL_ID, PROVIDER_ID};
use crate::types::ModelRecord;

/// Where users obtain an API key
pub const MAKEHUB_API_KEYS_URL: &str = "https://makehub.ai/api-keys";

const SLIDER_MIN: f64 = 0.0;
const SLIDER_MAX: f64 = 100.0;
const SLIDER_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfRatioLabel {
    Price,
    Balanced,
    Performance,
}

impl PerfRatioLabel {
    /// Translation key of the label
    pub fn i18n_key(self) -> &'static str {
        match self {
            Self::Price => "settings:providers.makehubPerfRatioLabels.price",
            Self::Balanced => "settings:providers.makehubPerfRatioLabels.balanced",
            Self::Performance => "settings:providers.makehubPerfRatioLabels.performance",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerfRatioSlider {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub labels: [PerfRatioLabel; 3],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDropdown {
    pub selected: String,
    pub options: Vec<DropdownOption>,
    /// The catalog was empty and only the default model is offered
    pub no_models_found: bool,
}

/// Details of the configured model as listed in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDetails {
    pub context_window: u64,
    pub input_price: Option<f64>,
    pub output_price: Option<f64>,
    pub supports_images: bool,
}

impl ModelDetails {
    /// e.g. `200,000 tokens`
    pub fn context_window_label(&self) -> String {
        format!("{} tokens", group_thousands(self.context_window))
    }

    pub fn input_price_label(&self) -> String {
        price_label(self.input_price)
    }

    pub fn output_price_label(&self) -> String {
        price_label(self.output_price)
    }
}

fn price_label(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("${price}/M tokens"),
        None => "unknown".to_string(),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Everything the panel shows
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    /// Password field contents
    pub api_key: String,
    /// "Get API key" link, only offered while no key is set
    pub get_api_key_url: Option<&'static str>,
    pub perf_ratio: PerfRatioSlider,
    /// Shown after a refresh was requested
    pub show_refresh_hint: bool,
    pub model: ModelDropdown,
    pub model_details: Option<ModelDetails>,
}

/// State of the panel between renders
#[derive(Debug, Clone, Default)]
pub struct MakeHubSettingsPanel {
    did_refetch: bool,
}

impl MakeHubSettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn did_refetch(&self) -> bool {
        self.did_refetch
    }

    pub fn render(&self, settings: &ProviderSettings, models: Option<&ModelRecord>) -> PanelView {
        let api_key = settings.makehub_api_key.clone().unwrap_or_default();
        let get_api_key_url = api_key.is_empty().then_some(MAKEHUB_API_KEYS_URL);

        let perf_ratio = PerfRatioSlider {
            value: settings.perf_ratio() * 100.0,
            min: SLIDER_MIN,
            max: SLIDER_MAX,
            step: SLIDER_STEP,
            labels: [
                PerfRatioLabel::Price,
                PerfRatioLabel::Balanced,
                PerfRatioLabel::Performance,
            ],
        };

        let catalog = models.filter(|m| !m.is_empty());
        let options = match catalog {
            Some(models) => models
                .iter()
                .map(|(id, info)| DropdownOption {
                    value: id.clone(),
                    label: info.display_label(id).to_string(),
                })
                .collect(),
            None => vec![DropdownOption {
                value: DEFAULT_MODEL_ID.to_string(),
                label: DEFAULT_MODEL_ID.to_string(),
            }],
        };
        let model = ModelDropdown {
            selected: settings.model_id().unwrap_or(DEFAULT_MODEL_ID).to_string(),
            options,
            no_models_found: catalog.is_none(),
        };

        let model_details = settings
            .model_id()
            .and_then(|id| catalog.and_then(|models| models.get(id)))
            .map(|info| ModelDetails {
                context_window: info.context_window,
                input_price: info.input_price,
                output_price: info.output_price,
                supports_images: info.supports_images,
            });

        PanelView {
            api_key,
            get_api_key_url,
            perf_ratio,
            show_refresh_hint: self.did_refetch,
            model,
            model_details,
        }
    }

    pub fn on_api_key_input<H: SettingsHost>(&mut self, host: &mut H, value: impl Into<String>) {
        host.set_field(SettingsField::MakehubApiKey(value.into()));
    }

    /// Slider callback; the first value is the 0–100 slider position.
    pub fn on_perf_ratio_change<H: SettingsHost>(&mut self, host: &mut H, values: &[f64]) {
        let Some(&value) = values.first() else {
            return;
        };
        if !value.is_finite() {
            tracing::debug!(value, "ignoring non-finite slider value");
            return;
        }
        let snapped = ((value / SLIDER_STEP).round() * SLIDER_STEP).clamp(SLIDER_MIN, SLIDER_MAX);
        host.set_field(SettingsField::MakehubPerfRatio(snapped / 100.0));
    }

    pub fn on_model_select<H: SettingsHost>(&mut self, host: &mut H, model_id: impl Into<String>) {
        host.set_field(SettingsField::MakehubModelId(model_id.into()));
    }

    /// Flush the cached catalog and ask the host to reload it
    pub fn on_refresh<H: SettingsHost>(&mut self, host: &mut H) {
        host.post_message(HostMessage::FlushRouterModels {
            provider: PROVIDER_ID.to_string(),
        });
        host.refetch_router_models();
        self.did_refetch = true;
    }
}
