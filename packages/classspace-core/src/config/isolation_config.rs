//! Isolation configuration
//!
//! Every knob of the classification and chain-building steps as a named,
//! defaulted field. Callers build one per invocation and pass it to the
//! harness; nothing is discovered at runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};
use crate::features::coordinate_matcher::CoordinateMatcher;

/// Default location of the dependency graph, relative to the project directory
pub const DEFAULT_DEPENDENCY_GRAPH_FILE: &str = "target/test-classes/dependency-graph.dot";

/// Default edge delimiter in graph files
pub const DEFAULT_EDGE_DELIMITER: &str = "->";

/// Default suffix appended to a symbol path inside an entry
pub const DEFAULT_SYMBOL_SUFFIX: &str = ".class";

/// Default environment variable holding the classpath
pub const DEFAULT_CLASSPATH_VARIABLE: &str = "CLASSPATH";

/// Test-output folder of the artifact under test, relative to the project directory
pub const TEST_OUTPUT_FOLDER: &str = "target/test-classes/";

/// Prefixes the container always delegates to the host namespace
pub fn default_boot_prefixes() -> Vec<String> {
    ["org.junit", "junit", "org.hamcrest", "org.mockito"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Whether (and how) plugin tiers sit between container and application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginSpace {
    /// Container → application only
    #[default]
    Disabled,
    /// One plugin tier with every compile scope artifact and its compile closure
    AllCompile,
    /// One plugin tier per entry of `extensions`
    Extensions,
}

/// Which tier keeps an entry reached both as a provided dependency and from the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvidedPrecedence {
    /// Provided closure entries are removed from application and plugin tiers
    #[default]
    Container,
    /// Application and plugin tiers keep them; the container only gets the rest
    Application,
}

/// One declared extension (plugin)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionSpec {
    /// Tier name, used in logs and errors
    pub name: String,

    /// Coordinate pattern(s) identifying the plugin's own module
    pub artifact: String,

    /// Generated metadata location registered as part of the plugin tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_location: Option<String>,
}

impl ExtensionSpec {
    pub fn new(name: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifact: artifact.into(),
            metadata_location: None,
        }
    }

    pub fn with_metadata_location(mut self, location: impl Into<String>) -> Self {
        self.metadata_location = Some(location.into());
        self
    }
}

/// Isolation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IsolationConfig {
    /// Comma separated `group:name:type` patterns kept out of the application tier
    pub app_exclusions: String,

    pub plugin_space: PluginSpace,

    /// Extensions, used when `plugin_space` is `extensions`
    pub extensions: Vec<ExtensionSpec>,

    pub provided_precedence: ProvidedPrecedence,

    /// Name prefixes the container delegates to the host (`ParentOnly`)
    pub boot_prefixes: Vec<String>,

    /// Root folder of the project under test
    pub project_dir: PathBuf,

    /// Explicit test-output location (defaults to `<project_dir>/target/test-classes/`)
    pub test_output_dir: Option<String>,

    /// Dependency graph file, relative to `project_dir` unless absolute
    pub dependency_graph_file: PathBuf,

    pub edge_delimiter: String,

    /// Suffix of a symbol's file inside an entry (`a.b.C` → `a/b/C<suffix>`)
    pub symbol_suffix: String,

    /// Environment variable read by the default classpath provider
    pub classpath_variable: String,
}

impl Default for IsolationConfig {
    fn default() -> Self {
        Self {
            app_exclusions: String::new(),
            plugin_space: PluginSpace::Disabled,
            extensions: Vec::new(),
            provided_precedence: ProvidedPrecedence::Container,
            boot_prefixes: default_boot_prefixes(),
            project_dir: PathBuf::from("."),
            test_output_dir: None,
            dependency_graph_file: PathBuf::from(DEFAULT_DEPENDENCY_GRAPH_FILE),
            edge_delimiter: DEFAULT_EDGE_DELIMITER.to_string(),
            symbol_suffix: DEFAULT_SYMBOL_SUFFIX.to_string(),
            classpath_variable: DEFAULT_CLASSPATH_VARIABLE.to_string(),
        }
    }
}

impl IsolationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app_exclusions(mut self, patterns: impl Into<String>) -> Self {
        self.app_exclusions = patterns.into();
        self
    }

    pub fn plugin_space(mut self, plugin_space: PluginSpace) -> Self {
        self.plugin_space = plugin_space;
        self
    }

    /// Declare an extension; switches `plugin_space` to `Extensions`
    pub fn extension(mut self, extension: ExtensionSpec) -> Self {
        self.plugin_space = PluginSpace::Extensions;
        self.extensions.push(extension);
        self
    }

    pub fn provided_precedence(mut self, precedence: ProvidedPrecedence) -> Self {
        self.provided_precedence = precedence;
        self
    }

    pub fn boot_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boot_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    pub fn test_output_dir(mut self, location: impl Into<String>) -> Self {
        self.test_output_dir = Some(location.into());
        self
    }

    pub fn dependency_graph_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dependency_graph_file = path.into();
        self
    }

    pub fn edge_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.edge_delimiter = delimiter.into();
        self
    }

    pub fn symbol_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.symbol_suffix = suffix.into();
        self
    }

    pub fn classpath_variable(mut self, variable: impl Into<String>) -> Self {
        self.classpath_variable = variable.into();
        self
    }

    /// Parsed application exclusion predicate
    pub fn exclusion_matcher(&self) -> ConfigResult<CoordinateMatcher> {
        CoordinateMatcher::parse(&self.app_exclusions)
    }

    /// Location of the test output of the artifact under test
    ///
    /// Always ends with `/` so it compares equal to a directory entry.
    pub fn resolved_test_output_dir(&self) -> String {
        let raw = match &self.test_output_dir {
            Some(dir) => dir.clone(),
            None => self
                .project_dir
                .join(TEST_OUTPUT_FOLDER)
                .to_string_lossy()
                .into_owned(),
        };
        let mut normalized = raw.replace('\\', "/");
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        normalized
    }

    /// Graph file resolved against `project_dir`
    pub fn resolved_dependency_graph_file(&self) -> PathBuf {
        resolve_against(&self.project_dir, &self.dependency_graph_file)
    }

    /// Validate pattern syntax and field combinations
    pub fn validate(&self) -> ConfigResult<()> {
        self.exclusion_matcher()?;

        if self.edge_delimiter.trim().is_empty() {
            return Err(ConfigError::invalid(
                "edge_delimiter",
                "delimiter cannot be empty",
            ));
        }

        match self.plugin_space {
            PluginSpace::Extensions if self.extensions.is_empty() => {
                return Err(ConfigError::invalid(
                    "extensions",
                    "plugin_space is 'extensions' but no extension is declared",
                ));
            }
            PluginSpace::Disabled | PluginSpace::AllCompile if !self.extensions.is_empty() => {
                return Err(ConfigError::invalid(
                    "extensions",
                    format!(
                        "{} extension(s) declared but plugin_space is '{:?}'",
                        self.extensions.len(),
                        self.plugin_space
                    ),
                ));
            }
            _ => {}
        }

        let mut names = HashSet::new();
        for extension in &self.extensions {
            if extension.name.trim().is_empty() {
                return Err(ConfigError::invalid("extensions", "extension name cannot be empty"));
            }
            if !names.insert(extension.name.as_str()) {
                return Err(ConfigError::invalid(
                    "extensions",
                    format!("duplicate extension name '{}'", extension.name),
                ));
            }
            let matcher = CoordinateMatcher::parse(&extension.artifact)?;
            if matcher.is_empty() {
                return Err(ConfigError::invalid(
                    "extensions",
                    format!("extension '{}' has no artifact pattern", extension.name),
                ));
            }
        }

        Ok(())
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
