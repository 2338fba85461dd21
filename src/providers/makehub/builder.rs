//! `MakeHub` Builder Implementation

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use super::cache::ModelCache;
use super::client::MakeHubClient;
use super::config::{AppIdentity, MAKEHUB_API_KEY_ENV, MakeHubConfig};
use crate::error::LlmError;
use crate::retry_api::RetryOptions;

/// `MakeHub` client builder
///
/// Retry: call `.catalog_retry(RetryOptions::default())` to retry transient
/// failures while fetching the model catalog. Chat requests are never retried.
#[derive(Debug, Clone, Default)]
pub struct MakeHubBuilder {
    pub(crate) config: MakeHubConfig,
    http_client: Option<reqwest::Client>,
    model_cache: Option<Arc<ModelCache>>,
}

impl MakeHubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: MakeHubConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the API key
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.config.api_key = SecretString::from(api_key.into());
        self
    }

    /// Set the base URL
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the model
    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.config.model_id = Some(model.into());
        self
    }

    /// Price (0.0) ↔ performance (1.0) preference
    pub fn perf_ratio(mut self, perf_ratio: f64) -> Self {
        self.config.perf_ratio = perf_ratio;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http_config.timeout = Some(timeout);
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.config.http_config.connect_timeout = Some(connect_timeout);
        self
    }

    /// Add a header sent with every chat request
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config
            .http_config
            .headers
            .insert(key.into(), value.into());
        self
    }

    pub fn app_identity(mut self, app: AppIdentity) -> Self {
        self.config.app = app;
        self
    }

    pub fn catalog_timeout(mut self, timeout: Duration) -> Self {
        self.config.catalog_timeout = timeout;
        self
    }

    pub fn catalog_retry(mut self, options: RetryOptions) -> Self {
        self.config.catalog_retry = Some(options);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    /// Share a model cache between clients
    pub fn model_cache(mut self, cache: Arc<ModelCache>) -> Self {
        self.model_cache = Some(cache);
        self
    }

    /// Set custom HTTP client
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the `MakeHub` client
    pub fn build(mut self) -> Result<MakeHubClient, LlmError> {
        // Priority: parameter > environment variable
        if self.config.api_key.expose_secret().trim().is_empty()
            && let Ok(api_key) = std::env::var(MAKEHUB_API_KEY_ENV)
        {
            self.config.api_key = SecretString::from(api_key);
        }

        if self.config.api_key().is_none() {
            return Err(LlmError::MissingApiKey(format!(
                "MakeHub API key not provided; set it on the builder or via {MAKEHUB_API_KEY_ENV}"
            )));
        }
        if !self.config.perf_ratio.is_finite() {
            return Err(LlmError::ConfigurationError(
                "Perf ratio must be a finite number".to_string(),
            ));
        }

        let client = match self.http_client {
            Some(http_client) => MakeHubClient::with_http_client(self.config, http_client)?,
            None => MakeHubClient::new(self.config)?,
        };
        Ok(match self.model_cache {
            Some(cache) => client.with_model_cache(cache),
            None => client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_config_fields() {
        let builder = MakeHubBuilder::new()
            .api_key("mh-key")
            .model("openai/gpt-4o")
            .perf_ratio(0.9)
            .temperature(0.2)
            .timeout(Duration::from_secs(30))
            .header("X-Trace", "abc");

        assert_eq!(builder.config.api_key.expose_secret(), "mh-key");
        assert_eq!(builder.config.model_id.as_deref(), Some("openai/gpt-4o"));
        assert_eq!(builder.config.perf_ratio_header(), "90");
        assert_eq!(builder.config.temperature, Some(0.2));
        assert_eq!(
            builder.config.http_config.timeout,
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            builder.config.http_config.headers.get("X-Trace").map(String::as_str),
            Some("abc")
        );
    }

    #[test]
    fn explicit_key_builds_client() {
        let client = MakeHubBuilder::new()
            .api_key("mh-key")
            .base_url("http://localhost:9/v1/")
            .build()
            .unwrap();
        assert_eq!(client.config().base_url(), "http://localhost:9/v1");
    }

    #[test]
    fn invalid_base_url_fails_build() {
        let result = MakeHubBuilder::new()
            .api_key("mh-key")
            .base_url("api.makehub.ai")
            .build();
        assert!(matches!(result, Err(LlmError::ConfigurationError(_))));
    }

    #[test]
    fn non_finite_perf_ratio_fails_build() {
        let result = MakeHubBuilder::new()
            .api_key("mh-key")
            .perf_ratio(f64::INFINITY)
            .build();
        assert!(matches!(result, Err(LlmError::ConfigurationError(_))));
    }

    #[test]
    fn shared_cache_is_installed() {
        let cache = Arc::new(ModelCache::new(Duration::from_secs(1)));
        let client = MakeHubBuilder::new()
            .api_key("mh-key")
            .model_cache(cache.clone())
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(client.model_cache(), &cache));
    }
}
