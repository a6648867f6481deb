//! # `PromptOps`
//!
//! Prompt manager service with version history and model recommendation.
//!
//! `PromptOps` stores prompts together with their tags, model choice and
//! generation parameters, keeps a linear version history per prompt, ranks a
//! fixed catalog of model profiles against caller-supplied weights and runs a
//! deterministic placeholder A/B comparison between two prompts.
//!
//! ## Features
//!
//! - Version ledger with an explicit atomicity capability per store backend
//! - Pluggable stores (in-memory fallback, `SQLite`, PostgreSQL)
//! - Weighted-sum model recommendation with a stable catalog tie-break
//! - JSON HTTP API served by axum
//!
//! ## Example
//!
//! ```rust
//! use promptops::models::{ModelCatalog, WeightVector};
//! use promptops::services::recommend;
//!
//! let catalog = ModelCatalog::builtin();
//! let weights = WeightVector::new(5.0, 3.0, 3.0, 4.0, 2.0);
//! let result = recommend(&catalog, &weights).unwrap();
//! assert_eq!(result.recommendation.model, "gpt-4o-mini");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod http;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::PromptOpsConfig;
pub use models::{
    CreatePromptRequest, GenerationConfig, ModelCatalog, ModelProfile, Prompt, PromptId,
    PromptSummary, Version, WeightVector,
};
pub use services::{PromptService, placeholder_compare, recommend};
pub use storage::{Atomicity, PromptStore, StoreMode};

/// Error type for promptops operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When | HTTP status |
/// |---------|-------------|-------------|
/// | `InvalidInput` | Empty title/content, unknown model, out-of-range config, malformed JSON | 400 |
/// | `NotFound` | Prompt id does not exist | 404 |
/// | `OperationFailed` | Store queries fail, I/O errors, server bind errors | 500 |
/// | `FeatureNotEnabled` | Backend requires a compile-time feature | 500 |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - `title` or `content` is empty
    /// - `model` is not in the catalog and unknown models are disallowed
    /// - generation parameters are out of range
    /// - a request body cannot be deserialized
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` or PostgreSQL operations fail
    /// - Filesystem I/O errors occur
    /// - A blocking store task is cancelled
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Feature not enabled (requires feature flag).
    #[error("feature not enabled: {0} (compile with --features {0})")]
    FeatureNotEnabled(String),
}

impl Error {
    /// Shorthand for building an [`Error::OperationFailed`].
    pub fn operation(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for promptops operations.
pub type Result<T> = std::result::Result<T, Error>;
