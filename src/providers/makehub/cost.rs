//! Usage accounting
//!
//! Token counts reported by routed upstreams are occasionally wildly off, so
//! counts are clamped before pricing and costs are kept finite and non-negative.

use crate::types::ModelInfo;

/// Largest token count accepted for a single request
pub const MAX_REASONABLE_TOKENS: u64 = 100_000;

/// Costs above this amount (USD) are logged
const HIGH_COST_THRESHOLD: f64 = 10.0;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// A reported token count after clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedTokens {
    pub value: u64,
    pub clamped: bool,
}

/// Clamp a raw reported count into `[0, MAX_REASONABLE_TOKENS]`.
pub fn clamp_token_count(raw: i64) -> ClampedTokens {
    if raw < 0 {
        ClampedTokens {
            value: 0,
            clamped: true,
        }
    } else if raw as u64 > MAX_REASONABLE_TOKENS {
        ClampedTokens {
            value: MAX_REASONABLE_TOKENS,
            clamped: true,
        }
    } else {
        ClampedTokens {
            value: raw as u64,
            clamped: false,
        }
    }
}

/// Cost in USD for a request, using per-million-token prices from `model_info`.
///
/// Returns 0 when either price is unknown.
pub fn calculate_cost(input_tokens: u64, output_tokens: u64, model_info: &ModelInfo) -> f64 {
    let (Some(input_price), Some(output_price)) = (model_info.input_price, model_info.output_price)
    else {
        tracing::warn!(
            input_price = ?model_info.input_price,
            output_price = ?model_info.output_price,
            "MakeHub: invalid model pricing information"
        );
        return 0.0;
    };

    let input_cost = (input_tokens as f64 / TOKENS_PER_MILLION) * input_price;
    let output_cost = (output_tokens as f64 / TOKENS_PER_MILLION) * output_price;
    let total_cost = input_cost + output_cost;

    if !total_cost.is_finite() {
        tracing::warn!(input_price, output_price, "MakeHub: non-finite cost computed");
        return 0.0;
    }

    if total_cost > HIGH_COST_THRESHOLD {
        tracing::info!(
            input_tokens,
            output_tokens,
            input_price,
            output_price,
            input_cost,
            output_cost,
            total_cost,
            "MakeHub high cost calculation"
        );
    }

    total_cost.max(0.0)
}
