//! Streaming completion handler trait

use crate::error::LlmError;
use crate::types::{ApiStream, MessageParam, ModelInfo};
use async_trait::async_trait;

/// Model id together with the metadata used for cost accounting
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub id: String,
    pub info: ModelInfo,
}

#[async_trait]
pub trait ApiHandler: Send + Sync {
    /// Stream a completion for `messages` under `system_prompt`.
    async fn create_message(
        &self,
        system_prompt: &str,
        messages: &[MessageParam],
    ) -> Result<ApiStream, LlmError>;

    /// Refresh the model list if needed and resolve the active model.
    async fn fetch_model(&self) -> Result<ResolvedModel, LlmError>;

    /// Resolve the active model from whatever is cached, without network access.
    fn get_model(&self) -> ResolvedModel;
}
