//! MakeHub configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use super::models::{DEFAULT_PERF_RATIO, MAKEHUB_BASE_URL};
use crate::error::LlmError;
use crate::retry_api::RetryOptions;
use crate::settings::ProviderSettings;
use crate::types::HttpConfig;

/// Environment variable consulted when no API key is configured
pub const MAKEHUB_API_KEY_ENV: &str = "MAKEHUB_API_KEY";

/// Timeout for the `/models` request
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(15);

/// How long a fetched catalog stays fresh
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// How the calling application identifies itself to MakeHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    /// Extension publisher, used in the `X-Makehub-Metadata` app label
    pub publisher: String,
    /// Extension name, used in the `X-Makehub-Metadata` app label
    pub name: String,
    /// `HTTP-Referer` header value
    pub referer: String,
    /// `X-Title` header value
    pub title: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            publisher: "RooVeterinaryInc".to_string(),
            name: "roo-cline".to_string(),
            referer: "vscode.dev".to_string(),
            title: "RooCode".to_string(),
        }
    }
}

impl AppIdentity {
    /// Label attached to every completion, e.g. `vscode.RooVeterinaryInc.roo-cline`
    pub fn app_label(&self) -> String {
        format!("vscode.{}.{}", self.publisher, self.name)
    }
}

/// Configuration for the MakeHub client
#[derive(Debug, Clone)]
pub struct MakeHubConfig {
    /// API key for bearer authentication
    pub api_key: SecretString,
    /// Base URL, without trailing `/models` or `/chat/completions`
    pub base_url: String,
    /// Selected model; the default model is used when unset
    pub model_id: Option<String>,
    /// Price (0.0) ↔ performance (1.0) preference
    pub perf_ratio: f64,
    /// Sampling temperature; `MAKEHUB_DEFAULT_TEMPERATURE` when unset
    pub temperature: Option<f64>,
    pub http_config: HttpConfig,
    pub app: AppIdentity,
    pub catalog_timeout: Duration,
    /// Retry policy for catalog fetches (none by default)
    pub catalog_retry: Option<RetryOptions>,
    pub cache_ttl: Duration,
}

impl Default for MakeHubConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::from(String::new()),
            base_url: MAKEHUB_BASE_URL.to_string(),
            model_id: None,
            perf_ratio: DEFAULT_PERF_RATIO,
            temperature: None,
            http_config: HttpConfig::default(),
            app: AppIdentity::default(),
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
            catalog_retry: None,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl MakeHubConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            ..Default::default()
        }
    }

    /// Build from the host's persisted provider settings.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, LlmError> {
        settings.validate_ranges()?;

        let mut config = Self::new(settings.makehub_api_key.clone().unwrap_or_default());
        config.model_id = settings
            .makehub_model_id
            .clone()
            .filter(|id| !id.trim().is_empty());
        config.perf_ratio = settings.makehub_perf_ratio.unwrap_or(DEFAULT_PERF_RATIO);
        config.temperature = settings.model_temperature;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_perf_ratio(mut self, perf_ratio: f64) -> Self {
        self.perf_ratio = perf_ratio;
        self
    }

    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Trimmed API key, or `None` when blank
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.expose_secret().trim();
        (!key.is_empty()).then_some(key)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Perf ratio clamped into `[0, 1]`; non-finite values fall back to the default
    pub fn effective_perf_ratio(&self) -> f64 {
        if self.perf_ratio.is_finite() {
            self.perf_ratio.clamp(0.0, 1.0)
        } else {
            DEFAULT_PERF_RATIO
        }
    }

    /// `X-Price-Performance-Ratio` header value (0–100)
    pub fn perf_ratio_header(&self) -> String {
        format!("{}", (self.effective_perf_ratio() * 100.0).round() as u8)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        let base_url = self.base_url();
        if base_url.is_empty() {
            return Err(LlmError::ConfigurationError(
                "Base URL cannot be empty".to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(LlmError::ConfigurationError(
                "Base URL must start with http:// or https://".to_string(),
            ));
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(LlmError::ConfigurationError(format!(
                "Temperature must be within 0.0..=2.0, got {temperature}"
            )));
        }
        Ok(())
    }
}
