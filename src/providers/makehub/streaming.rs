//! MakeHub streaming
//!
//! Converts OpenAI-compatible chat-completion SSE chunks into [`ApiStreamChunk`]s.

use std::sync::{Arc, RwLock};

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;

use super::cost::{calculate_cost, clamp_token_count};
use crate::error::LlmError;
use crate::types::{ApiStream, ApiStreamChunk, ModelInfo};

/// One `chat.completion.chunk` payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MakeHubStreamChunk {
    pub id: Option<String>,
    pub model: Option<String>,
    pub choices: Vec<StreamChoice>,
    pub usage: Option<StreamUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamChoice {
    pub index: Option<u32>,
    pub delta: Option<StreamDelta>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamDelta {
    pub role: Option<String>,
    pub content: Option<String>,
}

/// Usage as reported by the routed upstream. Counts stay raw JSON: some
/// upstreams report negative, fractional or out-of-range values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamUsage {
    pub prompt_tokens: Option<Value>,
    pub completion_tokens: Option<Value>,
    pub total_tokens: Option<Value>,
}

/// Integer view of a reported count; fractions truncate, out-of-range values
/// saturate and anything non-numeric counts as 0.
fn raw_token_count(value: Option<&Value>) -> i64 {
    let Some(value) = value else {
        return 0;
    };
    if let Some(n) = value.as_i64() {
        n
    } else if value.as_u64().is_some() {
        i64::MAX
    } else {
        match value.as_f64() {
            Some(n) if n.is_finite() => n.trunc() as i64,
            _ => 0,
        }
    }
}

/// Shared slot holding the id of the first streamed chunk
pub type GenerationId = Arc<RwLock<Option<String>>>;

/// Stateful converter for a single completion stream
#[derive(Debug)]
pub struct MakeHubEventConverter {
    model_info: ModelInfo,
    generation_id: GenerationId,
    did_output_usage: bool,
}

impl MakeHubEventConverter {
    pub fn new(model_info: ModelInfo, generation_id: GenerationId) -> Self {
        Self {
            model_info,
            generation_id,
            did_output_usage: false,
        }
    }

    fn record_generation_id(&self, id: &str) {
        let mut slot = self.generation_id.write().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            tracing::debug!(generation_id = id, "MakeHub: generation started");
            *slot = Some(id.to_string());
        }
    }

    fn usage_chunk(&self, usage: &StreamUsage) -> ApiStreamChunk {
        let raw_input = raw_token_count(usage.prompt_tokens.as_ref());
        let raw_output = raw_token_count(usage.completion_tokens.as_ref());
        let input = clamp_token_count(raw_input);
        let output = clamp_token_count(raw_output);

        if input.clamped || output.clamped {
            tracing::warn!(
                original_input = raw_input,
                original_output = raw_output,
                corrected_input = input.value,
                corrected_output = output.value,
                "MakeHub: unreasonable token counts detected"
            );
        }

        ApiStreamChunk::Usage {
            input_tokens: input.value,
            output_tokens: output.value,
            total_cost: calculate_cost(input.value, output.value, &self.model_info),
        }
    }

    /// Convert one parsed chunk. Text comes before usage within a chunk.
    pub fn convert(&mut self, chunk: &MakeHubStreamChunk) -> Vec<ApiStreamChunk> {
        let mut out = Vec::new();

        if let Some(id) = chunk.id.as_deref().filter(|id| !id.is_empty()) {
            self.record_generation_id(id);
        }

        if let Some(text) = chunk
            .choices
            .first()
            .and_then(|choice| choice.delta.as_ref())
            .and_then(|delta| delta.content.as_deref())
            .filter(|text| !text.is_empty())
        {
            out.push(ApiStreamChunk::text(text));
        }

        if let Some(usage) = &chunk.usage
            && !self.did_output_usage
        {
            out.push(self.usage_chunk(usage));
            self.did_output_usage = true;
        }

        out
    }

    /// Parse and convert the `data` payload of one SSE event.
    pub fn convert_json(&mut self, data: &str) -> Result<Vec<ApiStreamChunk>, LlmError> {
        let chunk: MakeHubStreamChunk = serde_json::from_str(data)
            .map_err(|e| LlmError::ParseError(format!("Failed to parse MakeHub chunk: {e}")))?;
        Ok(self.convert(&chunk))
    }
}

/// Turn a successful streaming response into an [`ApiStream`].
///
/// `[DONE]` and blank events are skipped. A malformed payload yields a
/// `ParseError` and ends the stream.
pub fn create_api_stream(
    response: reqwest::Response,
    mut converter: MakeHubEventConverter,
) -> ApiStream {
    let stream = async_stream::stream! {
        let mut events = Box::pin(response.bytes_stream().eventsource());

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    yield Err(LlmError::StreamError(format!("SSE parsing error: {e}")));
                    return;
                }
            };

            let data = event.data.trim();
            if data.is_empty() || data == "[DONE]" {
                continue;
            }

            match converter.convert_json(data) {
                Ok(chunks) => {
                    for chunk in chunks {
                        yield Ok(chunk);
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, data, "MakeHub: malformed stream chunk");
                    yield Err(e);
                    return;
                }
            }
        }
    };

    Box::pin(stream)
}
