//! Core data types shared by the catalog, streaming and settings modules.

pub mod http;
pub mod message;
pub mod model;
pub mod stream;

pub use http::{HttpConfig, HttpConfigBuilder};
pub use message::{
    ContentBlock, ImageSource, MessageContent, MessageParam, OpenAiContent, OpenAiContentPart,
    OpenAiFunctionCall, OpenAiImageUrl, OpenAiMessage, OpenAiRole, OpenAiToolCall, Role,
    ToolResultContent,
};
pub use model::{ModelInfo, ModelRecord, PricingTier};
pub use stream::{ApiStream, ApiStreamChunk};
