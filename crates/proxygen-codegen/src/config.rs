//! Generation options shared by every emitted class.

use std::collections::{BTreeSet, HashSet};

use proxygen_core::Visibility;

/// What to delegate to, which methods to keep and which hooks to call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Property holding the wrapped object. `None` emits no delegation.
    pub inner_property: Option<String>,
    pub visibilities: BTreeSet<Visibility>,
    pub method_before: Option<String>,
    pub method_after: Option<String>,
    /// Lowercased method names to skip.
    pub ignore_methods: HashSet<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            inner_property: None,
            visibilities: BTreeSet::from([Visibility::Public]),
            method_before: None,
            method_after: None,
            ignore_methods: HashSet::new(),
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inner_property(mut self, property: impl Into<String>) -> Self {
        self.inner_property = Some(property.into());
        self
    }

    pub fn with_visibilities(mut self, visibilities: impl IntoIterator<Item = Visibility>) -> Self {
        self.visibilities = visibilities.into_iter().collect();
        self
    }

    pub fn with_method_before(mut self, hook: impl Into<String>) -> Self {
        self.method_before = Some(hook.into());
        self
    }

    pub fn with_method_after(mut self, hook: impl Into<String>) -> Self {
        self.method_after = Some(hook.into());
        self
    }

    pub fn with_ignored_methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore_methods = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_ascii_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        self
    }

    pub fn is_ignored(&self, method: &str) -> bool {
        self.ignore_methods.contains(&method.to_ascii_lowercase())
    }

    pub fn allows(&self, visibility: Visibility) -> bool {
        self.visibilities.contains(&visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::default();
        assert!(config.allows(Visibility::Public));
        assert!(!config.allows(Visibility::Protected));
        assert!(config.inner_property.is_none());
        assert!(!config.is_ignored("foo"));
    }

    #[test]
    fn test_ignored_methods_are_case_insensitive() {
        let config = GenerationConfig::new().with_ignored_methods(["__Construct", " Save ", ""]);
        assert!(config.is_ignored("__construct"));
        assert!(config.is_ignored("SAVE"));
        assert_eq!(config.ignore_methods.len(), 2);
    }
}
