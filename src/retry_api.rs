//! Retry facade and HTTP error classification
//!
//! - `classify_http_error` turns a non-success response into a typed `LlmError`
//! - `retry_with` / `maybe_retry` re-run an operation with exponential backoff
//!   while the error reports itself as retryable
//!
//! Example
//! ```rust,no_run
//! use siumai_provider_makehub::retry_api::{retry_with, RetryOptions};
//!
//! # async fn do_work() -> Result<String, siumai_provider_makehub::LlmError> { Ok("ok".into()) }
//! # async fn example() -> Result<(), siumai_provider_makehub::LlmError> {
//! let options = RetryOptions::default().with_max_elapsed_time(std::time::Duration::from_secs(30));
//! let result = retry_with(|| do_work(), options).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::LlmError;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Backoff configuration for retried operations
#[derive(Debug, Clone)]
pub struct RetryOptions {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    /// Upper bound on total time spent retrying
    pub max_elapsed_time: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(1000),
            max_interval: Duration::from_secs(60),
            multiplier: 2.0,
            max_elapsed_time: Duration::from_secs(120),
        }
    }
}

impl RetryOptions {
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn with_max_elapsed_time(mut self, elapsed: Duration) -> Self {
        self.max_elapsed_time = elapsed;
        self
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_multiplier(self.multiplier)
            .with_max_elapsed_time(Some(self.max_elapsed_time))
            .build()
    }
}

/// Retry `operation` while it fails with a retryable error.
pub async fn retry_with<F, Fut, T>(operation: F, options: RetryOptions) -> Result<T, LlmError>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<T, LlmError>> + Send,
    T: Send,
{
    backoff::future::retry(options.backoff(), || async {
        operation().await.map_err(|e| {
            if e.is_retryable() {
                tracing::debug!(error = %e, "retrying after transient error");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    })
    .await
}

/// Retry only when options are provided.
pub async fn maybe_retry<F, Fut, T>(
    options: Option<RetryOptions>,
    operation: F,
) -> Result<T, LlmError>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<T, LlmError>> + Send,
    T: Send,
{
    if let Some(opts) = options {
        retry_with(operation, opts).await
    } else {
        operation().await
    }
}

/// Classify an HTTP failure into a more specific error type.
///
/// Inspects the status code, body and headers to pick a typed `LlmError`
/// (authentication, rate limit, quota, ...) rather than a generic `ApiError`.
pub fn classify_http_error(
    provider_id: &str,
    status: u16,
    body_text: &str,
    headers: &HeaderMap,
    fallback_message: Option<&str>,
) -> LlmError {
    let lower = body_text.to_lowercase();

    fn header_val(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }
    let id_keys = [
        "x-request-id",
        "x-response-id",
        "x-trace-id",
        "traceparent",
        "x-correlation-id",
    ];
    let request_ids: Vec<String> = id_keys
        .iter()
        .filter_map(|k| header_val(headers, k).map(|v| format!("{k}={v}")))
        .collect();
    let ids_suffix = if request_ids.is_empty() {
        String::new()
    } else {
        format!(" ids=[{}]", request_ids.join(","))
    };
    let body_sample = body_text.chars().take(200).collect::<String>();

    if status == 429 {
        let retry_after = header_val(headers, "retry-after").unwrap_or_default();
        return LlmError::RateLimitError(format!(
            "provider={provider_id} http=429 retry_after={retry_after}{ids_suffix} body_sample={body_sample}"
        ));
    }

    if status == 401 {
        return LlmError::AuthenticationError(format!(
            "provider={provider_id} unauthorized{ids_suffix} body_sample={body_sample}"
        ));
    }

    if status == 404 {
        return LlmError::NotFound(format!(
            "provider={provider_id} http=404{ids_suffix} body_sample={body_sample}"
        ));
    }

    if status == 403 || status == 400 {
        if lower.contains("quota") || lower.contains("insufficient") || lower.contains("credit") {
            return LlmError::QuotaExceededError(format!(
                "provider={provider_id} quota exceeded{ids_suffix}"
            ));
        }
        if lower.contains("rate limit") || lower.contains("rate_limit") {
            return LlmError::RateLimitError(format!("provider={provider_id} rate limited"));
        }
    }

    if status == 403 {
        return LlmError::AuthenticationError(format!(
            "provider={provider_id} forbidden{ids_suffix} body_sample={body_sample}"
        ));
    }
    if status == 400 {
        return LlmError::InvalidInput(format!(
            "provider={provider_id} bad request{ids_suffix} body_sample={body_sample}"
        ));
    }

    if (500..=599).contains(&status) {
        let summary = fallback_message.unwrap_or("server error");
        let message = if body_sample.trim().is_empty() {
            format!("{summary}{ids_suffix}")
        } else {
            format!("{summary}{ids_suffix} body_sample={body_sample}")
        };
        return LlmError::api_error(status, message);
    }

    let msg = if let Some(fallback) = fallback_message {
        fallback.to_string()
    } else if body_text.trim().is_empty() {
        "api error".to_string()
    } else {
        body_sample
    };
    let details = match serde_json::from_str::<serde_json::Value>(body_text) {
        Ok(json) => serde_json::json!({
            "status": status,
            "provider": provider_id,
            "response": json,
            "request_ids": request_ids,
        }),
        Err(_) => serde_json::json!({
            "status": status,
            "provider": provider_id,
            "raw": body_text,
            "request_ids": request_ids,
        }),
    };
    LlmError::api_error_with_details(status, msg, details)
}
