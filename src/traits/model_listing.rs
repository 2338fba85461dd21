//! Model listing capability trait

use crate::error::LlmError;
use crate::types::{ModelInfo, ModelRecord};
use async_trait::async_trait;

#[async_trait]
pub trait ModelListingCapability: Send + Sync {
    async fn list_models(&self) -> Result<ModelRecord, LlmError>;

    async fn get_model_info(&self, model_id: &str) -> Result<ModelInfo, LlmError> {
        self.list_models()
            .await?
            .remove(model_id)
            .ok_or_else(|| LlmError::NotFound(format!("model '{model_id}'")))
    }

    async fn is_model_available(&self, model_id: &str) -> Result<bool, LlmError> {
        match self.get_model_info(model_id).await {
            Ok(_) => Ok(true),
            Err(LlmError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
