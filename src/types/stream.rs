//! Streaming output of a completion request

use crate::error::LlmError;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A chunk yielded to the host while a completion streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ApiStreamChunk {
    /// Incremental assistant text
    Text { text: String },
    /// Final token accounting, emitted at most once per request
    #[serde(rename_all = "camelCase")]
    Usage {
        input_tokens: u64,
        output_tokens: u64,
        total_cost: f64,
    },
}

impl ApiStreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Usage { .. } => None,
        }
    }
}

/// Boxed stream of completion chunks
pub type ApiStream = Pin<Box<dyn Stream<Item = Result<ApiStreamChunk, LlmError>> + Send>>;
