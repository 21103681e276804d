use serde::{Deserialize, Serialize};

use crate::llm::TokenUsage;

/// Per-1K-token rates for one model, in currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub model: String,
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

// (model prefix, input rate, output rate)
const KNOWN_RATES: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.000_15, 0.000_6),
    ("gpt-4o", 0.005, 0.015),
    ("gpt-4-turbo", 0.01, 0.03),
    ("gpt-4.1-mini", 0.000_4, 0.001_6),
    ("gpt-4.1", 0.002, 0.008),
];

impl ModelPricing {
    pub fn new(model: impl Into<String>, input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            model: model.into(),
            input_per_1k,
            output_per_1k,
        }
    }

    /// Rates for a known model. Unknown models are billed at gpt-4o rates so
    /// the ceiling errs on the safe side.
    pub fn for_model(model: &str) -> Self {
        let (input, output) = KNOWN_RATES
            .iter()
            .find(|(prefix, _, _)| model.starts_with(prefix))
            .map(|(_, input, output)| (*input, *output))
            .unwrap_or((0.005, 0.015));
        Self::new(model, input, output)
    }

    pub fn calculate_cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        (prompt_tokens as f64 / 1000.0) * self.input_per_1k
            + (completion_tokens as f64 / 1000.0) * self.output_per_1k
    }

    pub fn cost_of(&self, usage: &TokenUsage) -> f64 {
        self.calculate_cost(usage.prompt_tokens, usage.completion_tokens)
    }
}
