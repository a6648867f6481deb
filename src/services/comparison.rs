//! Placeholder A/B comparison.
//!
//! The winner is a parity check on a checksum of the request fields. It is
//! deterministic and carries no judgement of prompt quality.

use crate::models::{AbTestOutcome, AbTestRequest};

/// Rationale attached to every placeholder outcome.
pub const PLACEHOLDER_RATIONALE: &str =
    "Placeholder deterministic evaluator. Connect OpenAI eval later.";

/// Sum of the Unicode scalar values of `promptA:promptB:modelA:modelB`.
#[must_use]
pub fn seed_checksum(request: &AbTestRequest) -> u64 {
    let seed = format!(
        "{}:{}:{}:{}",
        request.prompt_a, request.prompt_b, request.model_a, request.model_b
    );
    seed.chars().map(|c| u64::from(u32::from(c))).sum()
}

/// Picks a winner between two prompts.
///
/// An even checksum selects prompt A, an odd one prompt B.
#[must_use]
pub fn placeholder_compare(request: &AbTestRequest) -> AbTestOutcome {
    let checksum = seed_checksum(request);
    let winner = if checksum % 2 == 0 {
        format!("Prompt A ({})", request.model_a)
    } else {
        format!("Prompt B ({})", request.model_b)
    };

    metrics::counter!("promptops_ab_tests_total").increment(1);
    tracing::debug!(checksum, winner = %winner, "Compared prompts");

    AbTestOutcome {
        winner,
        rationale: PLACEHOLDER_RATIONALE.to_string(),
    }
}
