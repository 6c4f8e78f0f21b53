//! Source loading and class-name resolution.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::model::TargetClass;
use crate::registry::ClassRegistry;
use crate::stubs::StubCatalog;

/// Prefix of a class-name token that stands for a whole extension.
pub const EXTENSION_PREFIX: &str = "ext:";

/// Loads user sources and turns requested names into known classes.
#[derive(Debug, Default)]
pub struct ClassLoader {
    registry: ClassRegistry,
    stubs: Option<StubCatalog>,
    sources: Vec<PathBuf>,
    /// Lowercase extension name → classes it expanded to.
    extensions: HashMap<String, Vec<String>>,
}

impl ClassLoader {
    pub fn new(stubs: Option<StubCatalog>) -> Self {
        Self {
            registry: ClassRegistry::new(),
            stubs,
            sources: Vec::new(),
            extensions: HashMap::new(),
        }
    }

    /// Parse every source file so its classes become resolvable.
    pub fn load_sources(&mut self, files: &[PathBuf]) -> CoreResult<()> {
        for file in files {
            let declared = self.registry.load_file(file)?;
            debug!(file = %file.display(), classes = ?declared, "Loaded source");
            self.sources.push(file.clone());
        }
        info!(files = files.len(), classes = self.registry.len(), "Sources loaded");
        Ok(())
    }

    /// Expand `ext:` tokens in place and check every name is a known class
    /// or interface. Leading backslashes are dropped.
    pub fn resolve_class_names(&mut self, tokens: &[String]) -> CoreResult<Vec<String>> {
        let mut names = Vec::new();
        for token in tokens {
            match strip_extension_prefix(token) {
                Some(extension) => names.extend(self.expand_extension(extension)?),
                None => names.push(token.trim_start_matches('\\').to_string()),
            }
        }

        if let Some(missing) = names.iter().find(|n| !self.registry.contains(n)) {
            return Err(CoreError::class_not_found(missing.as_str(), self.source_list()));
        }
        debug!(classes = ?names, "Resolved class names");
        Ok(names)
    }

    /// Classes of an extension. Repeated tokens for the same extension
    /// expand to the same list.
    fn expand_extension(&mut self, extension: &str) -> CoreResult<Vec<String>> {
        let key = extension.to_ascii_lowercase();
        if let Some(names) = self.extensions.get(&key) {
            return Ok(names.clone());
        }
        let stubs = self
            .stubs
            .as_ref()
            .ok_or_else(|| CoreError::StubsNotConfigured(extension.to_string()))?;
        let names = stubs.load_extension(&mut self.registry, extension)?;
        self.extensions.insert(key, names.clone());
        Ok(names)
    }

    pub fn reflect(&self, name: &str) -> CoreResult<TargetClass> {
        self.registry.reflect(name)
    }

    /// User sources, comma-joined as they appear in diagnostics.
    fn source_list(&self) -> String {
        self.sources
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn strip_extension_prefix(token: &str) -> Option<&str> {
    let head = token.get(..EXTENSION_PREFIX.len())?;
    head.eq_ignore_ascii_case(EXTENSION_PREFIX)
        .then(|| &token[EXTENSION_PREFIX.len()..])
}

/// Split a comma-separated argument, trimming items and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
