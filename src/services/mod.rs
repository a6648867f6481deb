//! Business logic services.
//!
//! [`PromptService`] orchestrates the configured prompt store. Recommendation
//! and comparison are pure functions over request data.

mod comparison;
mod prompt;
mod recommendation;

pub use comparison::{PLACEHOLDER_RATIONALE, placeholder_compare, seed_checksum};
pub use prompt::PromptService;
pub use recommendation::recommend;
