//! Version ledger service.
//!
//! Validates create requests, builds the first [`Version`](crate::models::Version)
//! and persists prompt and version through the configured [`PromptStore`].

use crate::config::ValidationPolicy;
use crate::models::{CreatePromptRequest, GenerationConfig, ModelCatalog, Prompt, PromptId, PromptSummary};
use crate::storage::{Atomicity, PromptStore, StoreMode, record_operation_metrics};
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Service for creating and reading prompts.
#[derive(Clone)]
pub struct PromptService {
    store: Arc<dyn PromptStore>,
    catalog: ModelCatalog,
    policy: ValidationPolicy,
}

impl PromptService {
    /// Creates a service over a store with the built-in catalog and strict validation.
    #[must_use]
    pub fn new(store: Arc<dyn PromptStore>) -> Self {
        Self {
            store,
            catalog: ModelCatalog::builtin(),
            policy: ValidationPolicy::strict(),
        }
    }

    /// Sets the catalog used to validate models.
    #[must_use]
    pub const fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the validation policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the store's operating mode.
    #[must_use]
    pub fn mode(&self) -> StoreMode {
        self.store.mode()
    }

    /// Returns the store's write atomicity.
    #[must_use]
    pub fn atomicity(&self) -> Atomicity {
        self.store.atomicity()
    }

    /// Returns the model catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Creates a prompt with its first version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the request fails validation, or
    /// [`Error::OperationFailed`] if the store rejects either write. With a
    /// best-effort store a failed version write leaves the prompt persisted
    /// without versions.
    pub fn create_prompt(&self, request: CreatePromptRequest) -> Result<Prompt> {
        if let Err(e) = self.validate(&request) {
            metrics::counter!("promptops_validation_rejections_total").increment(1);
            tracing::warn!(error = %e, "Rejected create request");
            return Err(e);
        }

        let config = request.config();
        let prompt = Prompt::new(request.title, request.content, request.model)
            .with_tags(normalize_tags(request.tags))
            .with_examples(normalize_examples(request.examples))
            .with_config(config);

        let start = Instant::now();
        let backend = self.store.backend_name();
        match self.store.create_prompt_with_version(&prompt) {
            Ok(id) => {
                record_operation_metrics(backend, "create", start, "success");
                metrics::counter!("promptops_prompts_created_total").increment(1);
                tracing::info!(
                    prompt_id = %id,
                    model = %prompt.model,
                    backend,
                    "Created prompt"
                );
                Ok(prompt)
            },
            Err(e) => {
                record_operation_metrics(backend, "create", start, "error");
                metrics::counter!("promptops_store_errors_total", "operation" => "create")
                    .increment(1);
                tracing::warn!(
                    prompt_id = %prompt.id,
                    backend,
                    atomicity = ?self.store.atomicity(),
                    error = %e,
                    "Failed to create prompt"
                );
                Err(e)
            },
        }
    }

    /// Lists prompts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn list_prompts(&self) -> Result<Vec<PromptSummary>> {
        let start = Instant::now();
        let backend = self.store.backend_name();
        let result = self.store.list();
        match &result {
            Ok(prompts) => {
                record_operation_metrics(backend, "list", start, "success");
                tracing::debug!(count = prompts.len(), backend, "Listed prompts");
            },
            Err(e) => {
                record_operation_metrics(backend, "list", start, "error");
                metrics::counter!("promptops_store_errors_total", "operation" => "list")
                    .increment(1);
                tracing::warn!(backend, error = %e, "Failed to list prompts");
            },
        }
        result
    }

    /// Fetches a prompt with its full version history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, or an error if the
    /// store query fails.
    pub fn get_prompt(&self, id: &PromptId) -> Result<Prompt> {
        let start = Instant::now();
        let backend = self.store.backend_name();
        match self.store.get(id) {
            Ok(Some(prompt)) => {
                record_operation_metrics(backend, "get", start, "success");
                tracing::debug!(prompt_id = %id, backend, "Fetched prompt");
                Ok(prompt)
            },
            Ok(None) => {
                record_operation_metrics(backend, "get", start, "success");
                Err(Error::NotFound(format!("prompt {id}")))
            },
            Err(e) => {
                record_operation_metrics(backend, "get", start, "error");
                metrics::counter!("promptops_store_errors_total", "operation" => "get")
                    .increment(1);
                tracing::warn!(prompt_id = %id, backend, error = %e, "Failed to fetch prompt");
                Err(e)
            },
        }
    }

    fn validate(&self, request: &CreatePromptRequest) -> Result<()> {
        if request.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".to_string()));
        }
        if request.content.trim().is_empty() {
            return Err(Error::InvalidInput("content is required".to_string()));
        }
        if !self.policy.allow_unknown_models && !self.catalog.contains(&request.model) {
            return Err(Error::InvalidInput(format!(
                "unknown model '{}' (expected one of: {})",
                request.model,
                self.catalog.ids().join(", ")
            )));
        }
        if self.policy.enforce_config_bounds {
            check_bounds(&request.config())?;
        }
        Ok(())
    }
}

fn check_bounds(config: &GenerationConfig) -> Result<()> {
    if let Some(temperature) = config.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        return Err(Error::InvalidInput(format!(
            "temperature must be between 0 and 2, got {temperature}"
        )));
    }
    if let Some(top_p) = config.top_p
        && !(0.0..=1.0).contains(&top_p)
    {
        return Err(Error::InvalidInput(format!(
            "top_p must be between 0 and 1, got {top_p}"
        )));
    }
    if config.max_tokens == Some(0) {
        return Err(Error::InvalidInput("max_tokens must be at least 1".to_string()));
    }
    Ok(())
}

/// Trims tags, drops empty ones and removes duplicates keeping the first.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

fn normalize_examples(examples: Vec<String>) -> Vec<String> {
    examples
        .into_iter()
        .filter(|example| !example.trim().is_empty())
        .collect()
}
