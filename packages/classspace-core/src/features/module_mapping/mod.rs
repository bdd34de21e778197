//! Multi-module folder mapping
//!
//! When an artifact is a sibling module of the project rather than a packaged
//! dependency, the classpath points into that module's build output instead of
//! a repository layout. The mapping gives the module's project-relative folder
//! (`/modules/file/`) for an artifact name.

use std::collections::BTreeMap;
use std::fmt;

/// Maps an artifact name to its module folder
pub trait ModuleFolderMapping: Send + Sync {
    /// Project-relative folder (leading and trailing `/`), or `None` if unmapped
    fn folder_for(&self, artifact_name: &str) -> Option<String>;

    /// Human readable description used in resolution errors
    fn describe(&self) -> String;
}

/// Table-backed mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticModuleMapping {
    folders: BTreeMap<String, String>,
}

impl StaticModuleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let folders = pairs
            .into_iter()
            .map(|(name, folder)| (name.into(), normalize_folder(folder.as_ref())))
            .collect();
        Self { folders }
    }

    pub fn with(mut self, artifact_name: impl Into<String>, folder: impl AsRef<str>) -> Self {
        self.folders
            .insert(artifact_name.into(), normalize_folder(folder.as_ref()));
        self
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

impl ModuleFolderMapping for StaticModuleMapping {
    fn folder_for(&self, artifact_name: &str) -> Option<String> {
        self.folders.get(artifact_name).cloned()
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StaticModuleMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .folders
            .iter()
            .map(|(name, folder)| format!("{}={}", name, folder))
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

/// Every artifact maps to the same folder
///
/// Useful for single-module projects whose only sibling is the project itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedModuleMapping {
    folder: String,
}

impl FixedModuleMapping {
    pub fn new(folder: impl AsRef<str>) -> Self {
        Self {
            folder: normalize_folder(folder.as_ref()),
        }
    }
}

impl ModuleFolderMapping for FixedModuleMapping {
    fn folder_for(&self, _artifact_name: &str) -> Option<String> {
        Some(self.folder.clone())
    }

    fn describe(&self) -> String {
        format!("every artifact → {}", self.folder)
    }
}

/// Leading and trailing `/`, forward slashes only
fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.trim().replace('\\', "/");
    let inner = trimmed.trim_matches('/');
    if inner.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_mapping() {
        let mapping = StaticModuleMapping::new()
            .with("acme-core", "/core/")
            .with("acme-file", "extensions/file");

        assert_eq!(mapping.folder_for("acme-core").as_deref(), Some("/core/"));
        assert_eq!(
            mapping.folder_for("acme-file").as_deref(),
            Some("/extensions/file/")
        );
        assert_eq!(mapping.folder_for("missing"), None);
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_describe_lists_table() {
        let mapping = StaticModuleMapping::from_pairs([("b", "/b/"), ("a", "/a/")]);
        assert_eq!(mapping.describe(), "{a=/a/, b=/b/}");
    }

    #[test]
    fn test_fixed_mapping() {
        let mapping = FixedModuleMapping::new("tests/functional");
        assert_eq!(
            mapping.folder_for("anything").as_deref(),
            Some("/tests/functional/")
        );
    }
}
