//! In-process prompt store.
//!
//! The local fallback used when no durable backend is configured. Contents
//! are lost when the process exits.

use super::{Atomicity, PromptStore, StoreMode};
use crate::Result;
use crate::models::{Prompt, PromptId, PromptSummary};
use std::sync::{PoisonError, RwLock};

/// Prompt store backed by a vector kept newest first.
#[derive(Debug, Default)]
pub struct MemoryPromptStore {
    prompts: RwLock<Vec<Prompt>>,
}

impl MemoryPromptStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored prompts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prompts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no prompts are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PromptStore for MemoryPromptStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn mode(&self) -> StoreMode {
        StoreMode::LocalFallback
    }

    fn atomicity(&self) -> Atomicity {
        Atomicity::Transactional
    }

    fn create_prompt_with_version(&self, prompt: &Prompt) -> Result<PromptId> {
        let mut prompts = self
            .prompts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        prompts.insert(0, prompt.clone());
        Ok(prompt.id.clone())
    }

    fn list(&self) -> Result<Vec<PromptSummary>> {
        let prompts = self.prompts.read().unwrap_or_else(PoisonError::into_inner);
        let mut summaries: Vec<PromptSummary> = prompts.iter().map(Prompt::summary).collect();
        // Stable: equal timestamps keep newest-inserted-first order.
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    fn get(&self, id: &PromptId) -> Result<Option<Prompt>> {
        let prompts = self.prompts.read().unwrap_or_else(PoisonError::into_inner);
        Ok(prompts.iter().find(|prompt| &prompt.id == id).cloned())
    }
}
