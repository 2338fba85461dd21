//! Transformers layer
//!
//! Converts host conversation messages into the OpenAI chat-completions wire
//! format. Two formats exist: the regular OpenAI mapping and the merged-role
//! "R1" mapping that reasoning families (DeepSeek, Qwen/QwQ) require.

pub mod openai_format;
pub mod r1_format;
pub mod request;

pub use openai_format::convert_to_openai_messages;
pub use r1_format::convert_to_r1_format;
pub use request::{
    MessageTransformer, OpenAiMessageTransformer, R1MessageTransformer, requires_r1_format,
    transformer_for_model,
};
