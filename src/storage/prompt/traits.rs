//! Prompt store trait definition.

use crate::Result;
use crate::models::{Prompt, PromptId, PromptSummary};
use serde::Serialize;
use std::fmt;

/// Whether prompts live in a durable external store or in process memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreMode {
    /// A durable backend (`SQLite`, PostgreSQL).
    ExternalStore,
    /// The transient in-process list.
    LocalFallback,
}

impl StoreMode {
    /// Returns the mode name reported by the health endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExternalStore => "external-store",
            Self::LocalFallback => "local-fallback",
        }
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guarantee a backend gives for [`PromptStore::create_prompt_with_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Atomicity {
    /// The prompt row and its versions are written all-or-nothing.
    Transactional,
    /// The prompt row and its versions are written in sequence.
    ///
    /// A fault after the prompt row is written leaves a prompt with no
    /// versions. The fault is reported but nothing is rolled back.
    BestEffort,
}

/// Trait for prompt store backends.
///
/// Backends are interchangeable; the service picks one at start-up from
/// configuration.
pub trait PromptStore: Send + Sync {
    /// Short backend name used in logs and metrics.
    fn backend_name(&self) -> &'static str;

    /// Reports whether this backend is durable.
    fn mode(&self) -> StoreMode;

    /// Reports the create guarantee of this backend.
    fn atomicity(&self) -> Atomicity;

    /// Records a prompt together with its version history.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt row or any version row cannot be
    /// written. See [`Atomicity`] for what remains stored after a fault.
    fn create_prompt_with_version(&self, prompt: &Prompt) -> Result<PromptId>;

    /// Lists all prompts, newest `created_at` first.
    ///
    /// Prompts created in the same instant are returned most recently
    /// inserted first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self) -> Result<Vec<PromptSummary>>;

    /// Gets a prompt with full version contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, id: &PromptId) -> Result<Option<Prompt>>;
}
