//! MakeHub Provider
//!
//! MakeHub routes OpenAI-compatible chat completions to the cheapest or
//! fastest upstream serving a model, steered by a price/performance ratio.
//!
//! # Usage
//! ```rust,no_run
//! use futures::StreamExt;
//! use siumai_provider_makehub::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LlmError> {
//!     let client = MakeHubBuilder::new()
//!         .api_key("your-api-key")
//!         .model("anthropic/claude-4-sonnet")
//!         .perf_ratio(0.7)
//!         .build()?;
//!
//!     let mut stream = client
//!         .create_message("You are terse.", &[MessageParam::user("Hello")])
//!         .await?;
//!     while let Some(chunk) = stream.next().await {
//!         if let Some(text) = chunk?.as_text() {
//!             print!("{text}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod cost;
pub mod models;
pub mod streaming;

pub use builder::MakeHubBuilder;
pub use cache::ModelCache;
pub use catalog::{CatalogOptions, fetch_makehub_models, normalize_model, normalize_models};
pub use client::MakeHubClient;
pub use config::{AppIdentity, MakeHubConfig};
pub use cost::{MAX_REASONABLE_TOKENS, calculate_cost, clamp_token_count};
pub use models::{DEFAULT_MODEL_ID, default_model_info, resolve_model};
pub use streaming::{MakeHubEventConverter, create_api_stream};
