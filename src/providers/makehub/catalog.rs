//! MakeHub model catalog
//!
//! Fetches `GET {base}/models` and normalizes each entry into a [`ModelInfo`]
//! keyed by its full `organisation/model` id. Entries that are not
//! assistant-ready or lack numeric pricing are skipped.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;

use super::config::{AppIdentity, DEFAULT_CATALOG_TIMEOUT};
use crate::error::LlmError;
use crate::retry_api::{RetryOptions, maybe_retry};
use crate::types::{ModelInfo, ModelRecord, PricingTier};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Per-million prices above this are logged as suspicious
const HIGH_PRICE_PER_MILLION: f64 = 1000.0;

const INVALID_API_KEY: &str = "MakeHub: Invalid API key. Please check your API key configuration.";
const ACCESS_FORBIDDEN: &str = "MakeHub: Access forbidden. Please check your API key permissions.";
const SERVER_ERROR: &str = "MakeHub: Server error. Please try again later.";
const REQUEST_TIMEOUT: &str = "MakeHub: Request timeout. Please check your internet connection.";

/// One entry of the `/models` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MakehubModel {
    pub context: Option<u64>,
    pub model_id: Option<String>,
    pub model_name: Option<String>,
    pub display_name: Option<String>,
    pub organisation: Option<String>,
    /// Kept as raw JSON so a non-numeric price skips the entry instead of the whole catalog
    pub price_per_input_token: Option<Value>,
    pub price_per_output_token: Option<Value>,
    pub provider_name: Option<String>,
    pub quantisation: Option<String>,
    pub max_tokens: Option<u64>,
    pub supports_images: Option<bool>,
    pub supports_prompt_cache: Option<bool>,
    pub cache_writes_price: Option<f64>,
    pub cache_reads_price: Option<f64>,
    pub assistant_ready: Option<bool>,
    pub providers_available: Option<Vec<String>>,
    pub thinking_config: Option<MakehubThinkingConfig>,
    pub tiers: Option<Vec<MakehubTier>>,
    pub capabilities: Option<MakehubCapabilities>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MakehubThinkingConfig {
    pub max_budget: Option<u64>,
    pub output_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MakehubTier {
    pub context_window: Option<u64>,
    pub input_price: Option<f64>,
    pub output_price: Option<f64>,
    pub cache_writes_price: Option<f64>,
    pub cache_reads_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MakehubCapabilities {
    pub image_input: Option<bool>,
    pub tool_calling: Option<bool>,
    pub json_mode: Option<bool>,
}

impl MakehubModel {
    /// `organisation/model` id; ids that already contain a `/` are kept as-is.
    pub fn full_model_id(&self) -> Option<String> {
        let model_id = self.model_id.as_deref().filter(|id| !id.is_empty())?;
        if model_id.contains('/') {
            Some(model_id.to_string())
        } else {
            Some(format!(
                "{}/{}",
                self.organisation.as_deref().unwrap_or_default(),
                model_id
            ))
        }
    }
}

/// Options for a catalog request
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub timeout: Duration,
    pub app: AppIdentity,
    pub retry: Option<RetryOptions>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CATALOG_TIMEOUT,
            app: AppIdentity::default(),
            retry: None,
        }
    }
}

fn per_million(price: f64) -> f64 {
    price * TOKENS_PER_MILLION
}

/// Absent and zero prices both mean "not priced"
fn optional_per_million(price: Option<f64>) -> Option<f64> {
    price.filter(|p| *p != 0.0).map(per_million)
}

/// Normalize a single catalog entry. Returns `None` for entries that must be skipped.
pub fn normalize_model(model: &MakehubModel) -> Option<(String, ModelInfo)> {
    if model.assistant_ready != Some(true) {
        return None;
    }
    let full_model_id = model.full_model_id()?;

    let input = model.price_per_input_token.as_ref().and_then(Value::as_f64);
    let output = model.price_per_output_token.as_ref().and_then(Value::as_f64);
    let (Some(input), Some(output)) = (input, output) else {
        tracing::warn!(
            model = %full_model_id,
            input = ?model.price_per_input_token,
            output = ?model.price_per_output_token,
            "MakeHub: Invalid pricing for model"
        );
        return None;
    };

    let input_price = per_million(input);
    let output_price = per_million(output);
    if input_price > HIGH_PRICE_PER_MILLION || output_price > HIGH_PRICE_PER_MILLION {
        tracing::warn!(
            model = %full_model_id,
            input_per_million = input_price,
            output_per_million = output_price,
            "MakeHub: Unusually high pricing for model"
        );
    }

    let capabilities = model.capabilities.as_ref();
    let info = ModelInfo {
        max_tokens: model.max_tokens,
        context_window: model.context.unwrap_or_default(),
        supports_images: capabilities
            .and_then(|c| c.image_input)
            .or(model.supports_images)
            .unwrap_or(false),
        supports_computer_use: capabilities.and_then(|c| c.tool_calling).unwrap_or(false),
        supports_prompt_cache: model.supports_prompt_cache.unwrap_or(false),
        input_price: Some(input_price),
        output_price: Some(output_price),
        cache_writes_price: optional_per_million(model.cache_writes_price),
        cache_reads_price: optional_per_million(model.cache_reads_price),
        max_thinking_tokens: model.thinking_config.as_ref().and_then(|t| t.max_budget),
        description: model.display_name.clone(),
        tiers: model.tiers.as_ref().map(|tiers| {
            tiers
                .iter()
                .map(|tier| PricingTier {
                    context_window: tier.context_window.unwrap_or_default(),
                    input_price: optional_per_million(tier.input_price),
                    output_price: optional_per_million(tier.output_price),
                    cache_writes_price: optional_per_million(tier.cache_writes_price),
                    cache_reads_price: optional_per_million(tier.cache_reads_price),
                })
                .collect()
        }),
    };

    Some((full_model_id, info))
}

/// Normalize a parsed `/models` body into a model record.
pub fn normalize_models(body: &Value) -> Result<ModelRecord, LlmError> {
    let Some(entries) = body.get("data").and_then(Value::as_array) else {
        tracing::error!(response = %body, "MakeHub: Invalid API response format");
        return Err(LlmError::ParseError(
            "Invalid API response format from MakeHub".to_string(),
        ));
    };

    let mut record = ModelRecord::new();
    for entry in entries {
        let model = match serde_json::from_value::<MakehubModel>(entry.clone()) {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!(error = %e, "MakeHub: skipping malformed model entry");
                continue;
            }
        };
        if let Some((id, info)) = normalize_model(&model) {
            record.insert(id, info);
        }
    }

    tracing::debug!(count = record.len(), "MakeHub: normalized model catalog");
    Ok(record)
}

fn catalog_headers(api_key: Option<&str>, app: &AppIdentity) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        "HTTP-Referer",
        HeaderValue::from_str(&app.referer)
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid referer: {e}")))?,
    );
    headers.insert(
        "X-Title",
        HeaderValue::from_str(&app.title)
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid title: {e}")))?,
    );

    if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| LlmError::InvalidInput(format!("Invalid API key: {e}")))?,
        );
    }
    Ok(headers)
}

/// Map a failed catalog response to the user-facing MakeHub error.
fn classify_catalog_status(status: reqwest::StatusCode) -> LlmError {
    match status.as_u16() {
        401 => LlmError::AuthenticationError(INVALID_API_KEY.to_string()),
        403 => LlmError::AuthenticationError(ACCESS_FORBIDDEN.to_string()),
        code if code >= 500 => LlmError::api_error(code, SERVER_ERROR),
        code => LlmError::api_error(
            code,
            format!("MakeHub: Failed to fetch models - Request failed with status code {code}"),
        ),
    }
}

fn classify_transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::TimeoutError(REQUEST_TIMEOUT.to_string())
    } else {
        LlmError::HttpError(format!("MakeHub: Failed to fetch models - {err}"))
    }
}

async fn fetch_once(
    http: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    options: &CatalogOptions,
) -> Result<ModelRecord, LlmError> {
    let headers = catalog_headers(api_key, &options.app)?;
    let has_api_key = api_key.is_some_and(|k| !k.trim().is_empty());

    let response = http
        .get(url)
        .headers(headers)
        .timeout(options.timeout)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, has_api_key, "MakeHub: Error fetching models");
            classify_transport_error(e)
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            status = status.as_u16(),
            status_text = status.canonical_reason().unwrap_or_default(),
            body = %body,
            has_api_key,
            "MakeHub: HTTP error fetching models"
        );
        return Err(classify_catalog_status(status));
    }

    let text = response.text().await.map_err(classify_transport_error)?;
    let body: Value = serde_json::from_str(&text).map_err(|e| {
        tracing::error!(error = %e, "MakeHub: Invalid API response format");
        LlmError::ParseError("Invalid API response format from MakeHub".to_string())
    })?;

    normalize_models(&body)
}

/// Fetch and normalize the MakeHub model catalog.
///
/// The `Authorization` header is only sent when `api_key` is non-blank; the
/// catalog is public.
pub async fn fetch_makehub_models(
    http: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
    options: &CatalogOptions,
) -> Result<ModelRecord, LlmError> {
    let url = format!("{}/models", base_url.trim_end_matches('/'));
    tracing::debug!(url = %url, "MakeHub: fetching models");

    maybe_retry(options.retry.clone(), || {
        fetch_once(http, &url, api_key, options)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    fn entry(overrides: Value) -> Value {
        let mut base = json!({
            "context": 200000,
            "model_id": "claude-4-sonnet",
            "model_name": "Claude 4 Sonnet",
            "display_name": "Claude 4 Sonnet",
            "organisation": "anthropic",
            "price_per_input_token": 0.000003,
            "price_per_output_token": 0.000015,
            "provider_name": "anthropic",
            "quantisation": null,
            "assistant_ready": true
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        base
    }

    #[test]
    fn prefixes_organisation_when_missing() {
        let record = normalize_models(&json!({"data": [entry(json!({}))]})).unwrap();
        let info = record.get("anthropic/claude-4-sonnet").expect("normalized");
        assert_eq!(info.context_window, 200_000);
        assert!(approx(info.input_price, 3.0));
        assert!(approx(info.output_price, 15.0));
        assert_eq!(info.description.as_deref(), Some("Claude 4 Sonnet"));
    }

    #[test]
    fn keeps_ids_that_already_have_an_organisation() {
        let record = normalize_models(&json!({
            "data": [entry(json!({"model_id": "meta-llama/llama-3.3-70b", "organisation": "meta"}))]
        }))
        .unwrap();
        assert!(record.contains_key("meta-llama/llama-3.3-70b"));
    }

    #[test]
    fn skips_entries_not_ready_or_without_id() {
        let record = normalize_models(&json!({
            "data": [
                entry(json!({"assistant_ready": false})),
                entry(json!({"model_id": ""})),
                entry(json!({"model_id": null})),
            ]
        }))
        .unwrap();
        assert!(record.is_empty());
    }

    #[test]
    #[traced_test]
    fn skips_entries_with_non_numeric_pricing() {
        let record = normalize_models(&json!({
            "data": [
                entry(json!({"model_id": "a", "price_per_input_token": "0.000001"})),
                entry(json!({"model_id": "b", "price_per_output_token": null})),
                entry(json!({"model_id": "c"})),
            ]
        }))
        .unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["anthropic/c"]);
        assert!(logs_contain("MakeHub: Invalid pricing for model"));
    }

    #[test]
    #[traced_test]
    fn warns_on_unusually_high_prices_but_keeps_model() {
        let record = normalize_models(&json!({
            "data": [entry(json!({"price_per_output_token": 0.002}))]
        }))
        .unwrap();
        let info = record.get("anthropic/claude-4-sonnet").unwrap();
        assert!(approx(info.output_price, 2000.0));
        assert!(logs_contain("MakeHub: Unusually high pricing for model"));
    }

    #[test]
    fn maps_capabilities_cache_prices_and_tiers() {
        let record = normalize_models(&json!({
            "data": [entry(json!({
                "max_tokens": 8192,
                "supports_prompt_cache": true,
                "cache_writes_price": 0.00000375,
                "cache_reads_price": 0,
                "capabilities": {"image_input": true, "tool_calling": true, "json_mode": false},
                "thinking_config": {"max_budget": 32000},
                "tiers": [
                    {"context_window": 200000, "input_price": 0.000003, "output_price": 0.000015},
                    {"context_window": 1000000, "input_price": 0.000006, "cache_reads_price": 0}
                ]
            }))]
        }))
        .unwrap();

        let info = record.get("anthropic/claude-4-sonnet").unwrap();
        assert_eq!(info.max_tokens, Some(8192));
        assert!(info.supports_images);
        assert!(info.supports_computer_use);
        assert!(info.supports_prompt_cache);
        assert!(approx(info.cache_writes_price, 3.75));
        assert_eq!(info.cache_reads_price, None);
        assert_eq!(info.max_thinking_tokens, Some(32000));

        let tiers = info.tiers.as_ref().expect("tiers");
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].context_window, 200_000);
        assert!(approx(tiers[0].output_price, 15.0));
        assert!(approx(tiers[1].input_price, 6.0));
        assert_eq!(tiers[1].output_price, None);
        assert_eq!(tiers[1].cache_reads_price, None);
    }

    #[test]
    fn capability_flags_default_to_false() {
        let record = normalize_models(&json!({"data": [entry(json!({}))]})).unwrap();
        let info = record.get("anthropic/claude-4-sonnet").unwrap();
        assert!(!info.supports_images);
        assert!(!info.supports_computer_use);
        assert!(!info.supports_prompt_cache);
        assert_eq!(info.tiers, None);
    }

    #[test]
    fn top_level_image_flag_is_used_without_capabilities() {
        let record =
            normalize_models(&json!({"data": [entry(json!({"supports_images": true}))]})).unwrap();
        assert!(record.get("anthropic/claude-4-sonnet").unwrap().supports_images);
    }

    #[test]
    fn rejects_body_without_data_array() {
        assert!(matches!(
            normalize_models(&json!({"models": []})),
            Err(LlmError::ParseError(_))
        ));
        assert!(matches!(
            normalize_models(&json!({"data": {}})),
            Err(LlmError::ParseError(_))
        ));
    }

    #[test]
    fn null_optional_fields_keep_the_model() {
        let record = normalize_models(&json!({
            "data": [entry(json!({
                "providers_available": null,
                "max_tokens": null,
                "capabilities": null,
                "tiers": [{"context_window": null, "input_price": 0.000003}]
            }))]
        }))
        .unwrap();
        let info = record.get("anthropic/claude-4-sonnet").expect("kept");
        let tiers = info.tiers.as_ref().expect("tiers");
        assert_eq!(tiers[0].context_window, 0);
        assert!(approx(tiers[0].input_price, 3.0));
    }

    #[test]
    fn null_assistant_ready_skips_entry() {
        let record =
            normalize_models(&json!({"data": [entry(json!({"assistant_ready": null}))]})).unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn blank_key_is_logged_as_absent() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/models")
            .with_status(500)
            .create_async()
            .await;

        let result = fetch_makehub_models(
            &reqwest::Client::new(),
            &server.url(),
            Some("   "),
            &CatalogOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(LlmError::ApiError { code: 500, .. })));
        assert!(logs_contain("has_api_key=false"));
    }

    #[test]
    fn malformed_entries_do_not_poison_the_catalog() {
        let record = normalize_models(&json!({
            "data": [
                entry(json!({"model_id": "bad", "context": "lots"})),
                entry(json!({"model_id": "good"})),
            ]
        }))
        .unwrap();
        assert_eq!(record.len(), 1);
        assert!(record.contains_key("anthropic/good"));
    }

    #[test]
    fn catalog_status_mapping() {
        use reqwest::StatusCode;
        assert!(matches!(
            classify_catalog_status(StatusCode::UNAUTHORIZED),
            LlmError::AuthenticationError(ref m) if m == INVALID_API_KEY
        ));
        assert!(matches!(
            classify_catalog_status(StatusCode::FORBIDDEN),
            LlmError::AuthenticationError(ref m) if m == ACCESS_FORBIDDEN
        ));
        assert!(matches!(
            classify_catalog_status(StatusCode::BAD_GATEWAY),
            LlmError::ApiError { code: 502, .. }
        ));
        assert!(matches!(
            classify_catalog_status(StatusCode::NOT_FOUND),
            LlmError::ApiError { code: 404, ref message, .. } if message.contains("status code 404")
        ));
    }

    #[test]
    fn blank_key_omits_authorization() {
        let headers = catalog_headers(Some("   "), &AppIdentity::default()).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get("x-title").unwrap(), "RooCode");
        assert_eq!(headers.get("http-referer").unwrap(), "vscode.dev");

        let headers = catalog_headers(Some(" mh-key "), &AppIdentity::default()).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer mh-key");
    }
}
