//! Extension stub catalog.
//!
//! Built-in extension classes have no PHP source. They are read instead from
//! a stub tree laid out one directory per extension, as in phpstorm-stubs:
//! `<root>/<Extension>/*.php`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::registry::ClassRegistry;

#[derive(Debug, Clone)]
pub struct StubCatalog {
    root: PathBuf,
}

impl StubCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the stubs of an extension, matched
    /// case-insensitively.
    pub fn extension_dir(&self, name: &str) -> CoreResult<PathBuf> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| CoreError::io(&self.root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io(&self.root, e))?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir && entry.file_name().to_string_lossy().eq_ignore_ascii_case(name) {
                return Ok(entry.path());
            }
        }
        Err(CoreError::ExtensionNotFound {
            name: name.to_string(),
            searched: self.root.display().to_string(),
        })
    }

    /// Every `.php` file of an extension, in sorted path order.
    pub fn stub_files(&self, name: &str) -> CoreResult<Vec<PathBuf>> {
        let dir = self.extension_dir(name)?;
        let mut files = Vec::new();
        collect_php_files(&dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    /// Load an extension's stubs into `registry` and return the classes and
    /// interfaces it added, each once. Names already taken by an earlier
    /// declaration are left out.
    pub fn load_extension(&self, registry: &mut ClassRegistry, name: &str) -> CoreResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut declared = Vec::new();
        for file in self.stub_files(name)? {
            for class in registry.load_file(&file)? {
                if seen.insert(class.to_ascii_lowercase()) {
                    declared.push(class);
                }
            }
        }
        debug!(extension = name, classes = declared.len(), "Loaded extension stubs");
        Ok(declared)
    }
}

fn collect_php_files(dir: &Path, out: &mut Vec<PathBuf>) -> CoreResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| CoreError::io(dir, e))?.path();
        if path.is_dir() {
            collect_php_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "php") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn stub_tree() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        let ext = dir.path().join("SPL");
        fs::create_dir_all(ext.join("nested")).expect("mkdir");
        fs::write(
            ext.join("b.php"),
            "<?php class SplStack {} interface SplObserver {}",
        )
        .expect("write");
        fs::write(ext.join("a.php"), "<?php class ArrayIterator {} trait Hidden {}").expect("write");
        fs::write(ext.join("nested").join("c.php"), "<?php class SplHeap {}").expect("write");
        fs::write(ext.join("README.md"), "not php").expect("write");
        dir
    }

    #[test]
    fn test_extension_dir_is_case_insensitive() {
        let dir = stub_tree();
        let catalog = StubCatalog::new(dir.path());
        assert_eq!(catalog.extension_dir("spl").expect("dir"), dir.path().join("SPL"));
    }

    #[test]
    fn test_missing_extension() {
        let dir = stub_tree();
        let catalog = StubCatalog::new(dir.path());
        let err = catalog.extension_dir("mysqli").unwrap_err();
        assert!(matches!(err, CoreError::ExtensionNotFound { ref name, .. } if name == "mysqli"));
    }

    #[test]
    fn test_load_extension_in_sorted_order() {
        let dir = stub_tree();
        let catalog = StubCatalog::new(dir.path());
        let mut registry = ClassRegistry::new();

        let names = catalog.load_extension(&mut registry, "Spl").expect("load");
        assert_eq!(names, vec!["ArrayIterator", "SplStack", "SplObserver", "SplHeap"]);
        assert!(registry.contains("SplHeap"));
        assert_eq!(registry.files().len(), 3);
    }

    #[test]
    fn test_redeclared_stub_classes_listed_once() {
        let dir = TempDir::new().expect("tempdir");
        let ext = dir.path().join("json");
        fs::create_dir(&ext).expect("mkdir");
        fs::write(ext.join("a.php"), "<?php class JsonException {} class Loaded {}").expect("write");
        fs::write(ext.join("b.php"), "<?php class JsonException {} interface JsonSerializable {}")
            .expect("write");

        let mut registry = ClassRegistry::new();
        registry
            .load_source(Path::new("user.php"), "<?php class Loaded { function user() {} }")
            .expect("load user source");

        let catalog = StubCatalog::new(dir.path());
        let names = catalog.load_extension(&mut registry, "json").expect("load");
        assert_eq!(names, vec!["JsonException", "JsonSerializable"]);
    }
}
