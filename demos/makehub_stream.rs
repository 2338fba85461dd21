//! Stream a completion through MakeHub
//!
//! ```bash
//! export MAKEHUB_API_KEY="your-api-key"
//! RUST_LOG=siumai_provider_makehub=debug cargo run --example makehub_stream -- "Explain SSE in one line"
//! ```

use std::io::Write;

use futures::StreamExt;
use siumai_provider_makehub::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Say hello in three languages.".to_string());

    // API key comes from MAKEHUB_API_KEY
    let client = MakeHubBuilder::new()
        .model(DEFAULT_MODEL_ID)
        .perf_ratio(0.7)
        .build()?;

    let models = client.list_models().await?;
    println!("MakeHub lists {} assistant-ready models", models.len());

    let model = client.fetch_model().await?;
    println!("Using {} ({} token context)\n", model.id, model.info.context_window);

    let mut stream = client
        .create_message("You are a concise assistant.", &[MessageParam::user(prompt)])
        .await?;

    while let Some(chunk) = stream.next().await {
        match chunk? {
            ApiStreamChunk::Text { text } => {
                print!("{text}");
                std::io::stdout().flush()?;
            }
            ApiStreamChunk::Usage {
                input_tokens,
                output_tokens,
                total_cost,
            } => {
                println!("\n\n{input_tokens} in / {output_tokens} out, ${total_cost:.6}");
            }
        }
    }

    if let Some(id) = client.last_generation_id() {
        println!("generation: {id}");
    }
    Ok(())
}
