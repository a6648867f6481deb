//! Placeholder A/B comparison types.

use serde::{Deserialize, Serialize};

/// Request body for a two-prompt comparison.
///
/// The prompt fields are free-form identifiers; they are not checked against
/// stored prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AbTestRequest {
    /// First prompt identifier.
    pub prompt_a: String,
    /// Second prompt identifier.
    pub prompt_b: String,
    /// Model used with the first prompt.
    pub model_a: String,
    /// Model used with the second prompt.
    pub model_b: String,
}

impl AbTestRequest {
    /// Creates a comparison request.
    #[must_use]
    pub fn new(
        prompt_a: impl Into<String>,
        prompt_b: impl Into<String>,
        model_a: impl Into<String>,
        model_b: impl Into<String>,
    ) -> Self {
        Self {
            prompt_a: prompt_a.into(),
            prompt_b: prompt_b.into(),
            model_a: model_a.into(),
            model_b: model_b.into(),
        }
    }
}

/// Outcome of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbTestOutcome {
    /// Human-readable winner, e.g. `Prompt A (gpt-4o)`.
    pub winner: String,
    /// Explanation of how the winner was chosen.
    pub rationale: String,
}
