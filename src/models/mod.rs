//! Data models for promptops.
//!
//! This module contains the core data structures used throughout the system.

mod comparison;
mod prompt;
mod recommendation;

pub use comparison::{AbTestOutcome, AbTestRequest};
pub use prompt::{
    CreatePromptRequest, GenerationConfig, Prompt, PromptId, PromptSummary, Version,
    VersionSummary,
};
pub use recommendation::{
    BUILTIN_PROFILES, Dimension, ModelCatalog, ModelProfile, RankedModel, Recommendation,
    WeightVector,
};
