//! Per-token pricing for cost-avoided / cost-paid accounting

use serde::{Deserialize, Serialize};

/// Per-token rates for the downstream responder model, expressed in
/// dollars per million tokens.
///
/// The same instance prices both directions: cost paid on a miss and
/// cost avoided on a hit, so the two stay comparable in dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPricing {
    /// Dollars per 1M input tokens
    #[serde(default = "default_input_per_million")]
    pub input_per_million: f64,

    /// Dollars per 1M output tokens
    #[serde(default = "default_output_per_million")]
    pub output_per_million: f64,
}

// Claude Sonnet on Bedrock, Dec 2025 list prices
fn default_input_per_million() -> f64 {
    3.00
}

fn default_output_per_million() -> f64 {
    15.00
}

impl Default for TokenPricing {
    fn default() -> Self {
        Self {
            input_per_million: default_input_per_million(),
            output_per_million: default_output_per_million(),
        }
    }
}

impl TokenPricing {
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Dollar cost of one responder invocation with the given token counts
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        input_tokens as f64 * self.input_per_million / 1e6
            + output_tokens as f64 * self.output_per_million / 1e6
    }
}

/// Rough input-token estimate from request text length (character count
/// divided by 4, rounded down).
///
/// On a cache hit no tokenizer ever sees the current request, so exact
/// input tokens are unknowable; this heuristic keeps cost-avoided
/// accounting directional rather than precise.
pub fn estimate_input_tokens(text: &str) -> u32 {
    (text.chars().count() / 4) as u32
}
