//! Input validation policy for prompt creation.

/// Controls which create requests the version ledger accepts.
///
/// Title and content are always required. The remaining checks can be
/// relaxed for compatibility with clients that send unknown models or
/// unbounded generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Accept model identifiers that are not in the catalog.
    pub allow_unknown_models: bool,
    /// Reject `temperature`, `top_p` and `max_tokens` outside their ranges.
    pub enforce_config_bounds: bool,
}

impl ValidationPolicy {
    /// Strict policy: catalog models only, bounded generation parameters.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            allow_unknown_models: false,
            enforce_config_bounds: true,
        }
    }

    /// Permissive policy: only title and content are checked.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            allow_unknown_models: true,
            enforce_config_bounds: false,
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        assert_eq!(ValidationPolicy::default(), ValidationPolicy::strict());
        assert!(!ValidationPolicy::default().allow_unknown_models);
    }

    #[test]
    fn test_permissive() {
        let policy = ValidationPolicy::permissive();
        assert!(policy.allow_unknown_models);
        assert!(!policy.enforce_config_bounds);
    }
}
