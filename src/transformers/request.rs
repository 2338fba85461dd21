//! Request message transformation
//!
//! Chooses how a system prompt plus host conversation is laid out in the
//! chat-completions `messages` array for a given model.

use super::{convert_to_openai_messages, convert_to_r1_format};
use crate::types::{MessageParam, OpenAiMessage};

/// Model id fragments that need the merged-role R1 layout
const R1_MODEL_MARKERS: [&str; 3] = ["deepseek", "qwen", "qwq"];

/// Transform a system prompt and conversation into request messages
pub trait MessageTransformer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn transform(&self, system_prompt: &str, messages: &[MessageParam]) -> Vec<OpenAiMessage>;
}

/// System message followed by the OpenAI mapping of the conversation
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiMessageTransformer;

impl MessageTransformer for OpenAiMessageTransformer {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn transform(&self, system_prompt: &str, messages: &[MessageParam]) -> Vec<OpenAiMessage> {
        let mut out = Vec::with_capacity(messages.len() + 1);
        out.push(OpenAiMessage::system(system_prompt));
        out.extend(convert_to_openai_messages(messages));
        out
    }
}

/// System prompt sent as the first user turn, then merged by role
#[derive(Debug, Clone, Copy, Default)]
pub struct R1MessageTransformer;

impl MessageTransformer for R1MessageTransformer {
    fn name(&self) -> &'static str {
        "r1"
    }

    fn transform(&self, system_prompt: &str, messages: &[MessageParam]) -> Vec<OpenAiMessage> {
        let mut turns = Vec::with_capacity(messages.len() + 1);
        turns.push(MessageParam::user(system_prompt));
        turns.extend_from_slice(messages);
        convert_to_r1_format(&turns)
    }
}

/// Whether a model id belongs to a family that needs the R1 layout
pub fn requires_r1_format(model_id: &str) -> bool {
    let lower = model_id.to_lowercase();
    R1_MODEL_MARKERS.iter().any(|marker| lower.contains(marker))
}

pub fn transformer_for_model(model_id: &str) -> Box<dyn MessageTransformer> {
    if requires_r1_format(model_id) {
        Box::new(R1MessageTransformer)
    } else {
        Box::new(OpenAiMessageTransformer)
    }
}
