//! # siumai-provider-makehub
//!
//! MakeHub routing provider for the siumai family.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Model Catalog**: fetches `GET /models` and normalizes entries into per-million pricing metadata.
//! - **Streaming Completions**: OpenAI-compatible SSE streaming with a single, sanity-checked usage event.
//! - **Price/Performance Routing**: forwards the user's preference as `X-Price-Performance-Ratio`.
//! - **Settings Panel**: a headless view model for the API key, slider and model picker.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use siumai_provider_makehub::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MakeHubBuilder::new().api_key("your-api-key").build()?;
//!
//!     let mut stream = client
//!         .create_message("You are a helpful assistant.", &[MessageParam::user("Hello!")])
//!         .await?;
//!     while let Some(chunk) = stream.next().await {
//!         match chunk? {
//!             ApiStreamChunk::Text { text } => print!("{text}"),
//!             ApiStreamChunk::Usage { total_cost, .. } => println!("\n${total_cost:.6}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod providers;
pub mod retry_api;
pub mod settings;
pub mod traits;
pub mod transformers;
pub mod types;

pub use error::LlmError;

pub mod prelude {
    pub use crate::error::{ErrorCategory, LlmError};
    pub use crate::providers::makehub::{
        DEFAULT_MODEL_ID, MakeHubBuilder, MakeHubClient, MakeHubConfig, ModelCache,
    };
    pub use crate::retry_api::*;
    pub use crate::settings::{
        HostMessage, MakeHubSettingsPanel, PanelView, ProviderSettings, SettingsField,
        SettingsHost,
    };
    pub use crate::traits::{ApiHandler, ModelListingCapability, ResolvedModel};
    pub use crate::types::{
        ApiStream, ApiStreamChunk, ContentBlock, HttpConfig, ImageSource, MessageParam, ModelInfo,
        ModelRecord, Role,
    };
}
