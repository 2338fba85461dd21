//! MakeHub client implementation
//!
//! Streams chat completions through the MakeHub router and resolves models
//! against a cached copy of the MakeHub catalog.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};

use super::cache::ModelCache;
use super::catalog::{CatalogOptions, fetch_makehub_models};
use super::config::MakeHubConfig;
use super::models::{MAKEHUB_DEFAULT_TEMPERATURE, PROVIDER_ID, resolve_model, supports_temperature};
use super::streaming::{GenerationId, MakeHubEventConverter, create_api_stream};
use crate::error::LlmError;
use crate::retry_api::classify_http_error;
use crate::traits::{ApiHandler, ModelListingCapability, ResolvedModel};
use crate::transformers::transformer_for_model;
use crate::types::{ApiStream, MessageParam, ModelRecord, OpenAiMessage};

/// MakeHub router client
#[derive(Debug, Clone)]
pub struct MakeHubClient {
    config: MakeHubConfig,
    http_client: reqwest::Client,
    cache: Arc<ModelCache>,
    last_generation_id: GenerationId,
}

impl MakeHubClient {
    /// Create a client with an HTTP client built from `config.http_config`.
    pub fn new(config: MakeHubConfig) -> Result<Self, LlmError> {
        let http_client = config.http_config.build_client()?;
        Self::with_http_client(config, http_client)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        config: MakeHubConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, LlmError> {
        config.validate()?;
        let cache = Arc::new(ModelCache::new(config.cache_ttl));
        Ok(Self {
            config,
            http_client,
            cache,
            last_generation_id: GenerationId::default(),
        })
    }

    /// Share a model cache with other clients (e.g. the settings panel's refresh).
    pub fn with_model_cache(mut self, cache: Arc<ModelCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &MakeHubConfig {
        &self.config
    }

    pub fn model_cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    /// Id of the first chunk of the most recent completion
    pub fn last_generation_id(&self) -> Option<String> {
        self.last_generation_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn reset_generation_id(&self) {
        *self
            .last_generation_id
            .write()
            .unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn cache_key(&self) -> String {
        format!("{PROVIDER_ID}:{}", self.config.base_url())
    }

    /// Drop the cached catalog so the next lookup refetches it.
    pub fn flush_models(&self) -> bool {
        self.cache.flush(&self.cache_key())
    }

    async fn fetch_catalog(&self) -> Result<ModelRecord, LlmError> {
        let options = CatalogOptions {
            timeout: self.config.catalog_timeout,
            app: self.config.app.clone(),
            retry: self.config.catalog_retry.clone(),
        };
        fetch_makehub_models(
            &self.http_client,
            self.config.base_url(),
            self.config.api_key(),
            &options,
        )
        .await
    }

    /// Chat-completions body for `model_id`
    pub fn build_request_body(&self, model_id: &str, messages: &[OpenAiMessage]) -> Value {
        let mut body = json!({
            "model": model_id,
            "messages": messages,
            "stream": true,
        });
        if supports_temperature(model_id) {
            body["temperature"] = json!(
                self.config
                    .temperature
                    .unwrap_or(MAKEHUB_DEFAULT_TEMPERATURE)
            );
        }
        body
    }

    /// Headers for a chat-completions request
    pub fn build_headers(&self) -> Result<HeaderMap, LlmError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            LlmError::MissingApiKey("MakeHub API key is required for chat completions".to_string())
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| LlmError::InvalidInput(format!("Invalid API key: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let app = &self.config.app;
        let metadata = json!({
            "labels": [{ "key": "app", "value": app.app_label() }]
        });
        let config_value = |name: &str, value: &str| {
            HeaderValue::from_str(value).map_err(|e| {
                LlmError::ConfigurationError(format!("Invalid header value for {name}: {e}"))
            })
        };
        headers.insert(
            HeaderName::from_static("x-makehub-metadata"),
            config_value("X-Makehub-Metadata", &metadata.to_string())?,
        );
        headers.insert(
            HeaderName::from_static("x-price-performance-ratio"),
            config_value("X-Price-Performance-Ratio", &self.config.perf_ratio_header())?,
        );
        headers.insert(
            HeaderName::from_static("http-referer"),
            config_value("HTTP-Referer", &app.referer)?,
        );
        headers.insert(
            HeaderName::from_static("x-title"),
            config_value("X-Title", &app.title)?,
        );

        headers.extend(self.config.http_config.header_map()?);
        Ok(headers)
    }

    /// Catalog, served from the cache while fresh
    pub async fn list_models(&self) -> Result<ModelRecord, LlmError> {
        self.cache
            .get_or_fetch(&self.cache_key(), || self.fetch_catalog())
            .await
    }
}

#[async_trait]
impl ModelListingCapability for MakeHubClient {
    async fn list_models(&self) -> Result<ModelRecord, LlmError> {
        MakeHubClient::list_models(self).await
    }
}

#[async_trait]
impl ApiHandler for MakeHubClient {
    async fn create_message(
        &self,
        system_prompt: &str,
        messages: &[MessageParam],
    ) -> Result<ApiStream, LlmError> {
        self.reset_generation_id();
        let headers = self.build_headers()?;

        let model = match self.fetch_model().await {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!(error = %e, "MakeHub: model catalog unavailable, using cached or default model");
                self.get_model()
            }
        };

        let transformer = transformer_for_model(&model.id);
        let openai_messages = transformer.transform(system_prompt, messages);
        let body = self.build_request_body(&model.id, &openai_messages);

        let url = format!("{}/chat/completions", self.config.base_url());
        tracing::debug!(
            url = %url,
            model = %model.id,
            format = transformer.name(),
            perf_ratio = self.config.effective_perf_ratio(),
            messages = openai_messages.len(),
            "MakeHub: sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "MakeHub: chat completion request failed");
                LlmError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let response_headers = response.headers().clone();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                model = %model.id,
                "MakeHub: chat completion returned an error"
            );
            return Err(classify_http_error(
                PROVIDER_ID,
                status.as_u16(),
                &error_text,
                &response_headers,
                None,
            ));
        }

        let converter = MakeHubEventConverter::new(model.info, self.last_generation_id.clone());
        Ok(create_api_stream(response, converter))
    }

    async fn fetch_model(&self) -> Result<ResolvedModel, LlmError> {
        let models = self.list_models().await?;
        Ok(resolve_model(Some(&models), self.config.model_id.as_deref()))
    }

    fn get_model(&self) -> ResolvedModel {
        let cached = self.cache.peek(&self.cache_key());
        resolve_model(cached.as_ref(), self.config.model_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::makehub::models::{DEFAULT_MODEL_ID, default_model_info};
    use crate::types::{HttpConfig, ModelInfo};

    fn client(config: MakeHubConfig) -> MakeHubClient {
        MakeHubClient::new(config).unwrap()
    }

    #[test]
    fn headers_carry_routing_metadata() {
        let client = client(
            MakeHubConfig::new("mh-key")
                .with_perf_ratio(0.75)
                .with_http_config(HttpConfig::builder().header("X-Extra", "1").build()),
        );
        let headers = client.build_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer mh-key");
        assert_eq!(headers.get("x-price-performance-ratio").unwrap(), "75");
        assert_eq!(headers.get("x-extra").unwrap(), "1");

        let metadata: Value =
            serde_json::from_str(headers.get("x-makehub-metadata").unwrap().to_str().unwrap())
                .unwrap();
        assert_eq!(
            metadata,
            json!({"labels": [{"key": "app", "value": "vscode.RooVeterinaryInc.roo-cline"}]})
        );
    }

    #[test]
    fn missing_key_fails_before_sending() {
        let client = client(MakeHubConfig::new(" "));
        assert!(matches!(
            client.build_headers(),
            Err(LlmError::MissingApiKey(_))
        ));
    }

    #[test]
    fn temperature_defaults_to_zero_and_is_omitted_for_o3_mini() {
        let client = client(MakeHubConfig::new("k"));
        let body = client.build_request_body("openai/gpt-4o", &[]);
        assert_eq!(body["temperature"], json!(0.0));
        assert_eq!(body["stream"], json!(true));

        let body = client.build_request_body("openai/o3-mini", &[]);
        assert!(body.get("temperature").is_none());

        let mut config = MakeHubConfig::new("k");
        config.temperature = Some(0.7);
        let body = self::client(config).build_request_body("openai/gpt-4o", &[]);
        assert_eq!(body["temperature"], json!(0.7));
    }

    #[test]
    fn get_model_uses_cached_catalog_without_network() {
        let client = client(MakeHubConfig::new("k").with_model("openai/gpt-4o"));
        let resolved = client.get_model();
        assert_eq!(resolved.id, DEFAULT_MODEL_ID);
        assert_eq!(resolved.info, default_model_info());

        let mut models = ModelRecord::new();
        let info = ModelInfo {
            context_window: 128_000,
            ..Default::default()
        };
        models.insert("openai/gpt-4o".into(), info.clone());
        client.model_cache().insert(&client.cache_key(), models);

        let resolved = client.get_model();
        assert_eq!(resolved.id, "openai/gpt-4o");
        assert_eq!(resolved.info, info);

        assert!(client.flush_models());
        assert_eq!(client.get_model().id, DEFAULT_MODEL_ID);
    }

    #[tokio::test]
    async fn request_sends_makehub_headers() {
        let mut server = mockito::Server::new_async().await;
        let _models = server
            .mock("GET", "/models")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;
        let chat = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer mh-key")
            .match_header("x-price-performance-ratio", "50")
            .match_header("x-title", "RooCode")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": DEFAULT_MODEL_ID,
                "stream": true,
                "temperature": 0.0
            })))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body("data: [DONE]\n\n")
            .create_async()
            .await;

        let client = client(MakeHubConfig::new("mh-key").with_base_url(server.url()));
        let stream = client.create_message("system", &[MessageParam::user("hi")]).await;
        assert!(stream.is_ok());
        chat.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_classified() {
        let mut server = mockito::Server::new_async().await;
        let _models = server
            .mock("GET", "/models")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;
        let _chat = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "3")
            .with_body(r#"{"error":{"message":"slow down"}}"#)
            .create_async()
            .await;

        let client = client(MakeHubConfig::new("mh-key").with_base_url(server.url()));
        let err = match client.create_message("system", &[]).await {
            Err(e) => e,
            Ok(_) => panic!("expected rate limit error"),
        };
        assert!(matches!(err, LlmError::RateLimitError(ref m) if m.contains("retry_after=3")));
    }
}
