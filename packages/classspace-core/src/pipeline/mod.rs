//! Isolation pipeline
//!
//! classpath + dependency graph → classification → resolver chain.
//!
//! [`IsolationHarness`] is the per-invocation context: every collaborator is
//! an ordinary trait object with a default, and the resulting
//! [`ResolverChain`] is owned by the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::IsolationConfig;
use crate::errors::Result;
use crate::features::chain_builder::{ResolverChain, ResolverChainBuilder};
use crate::features::classification::{
    ClassPathClassifier, ClassificationRequest, TierClassification, TierClassifier,
};
use crate::features::dependency_graph::{DependencyGraph, DependencyGraphParser};
use crate::features::module_mapping::{ModuleFolderMapping, StaticModuleMapping};
use crate::features::namespace::{
    EmptyHost, EntryOpener, FsEntryOpener, HostNamespace, NamespaceResolver,
};
use crate::shared::models::ClasspathEntry;

// ═══════════════════════════════════════════════════════════════════════════
// Providers
// ═══════════════════════════════════════════════════════════════════════════

/// Supplies the full classpath
pub trait ClasspathProvider: Send + Sync {
    fn classpath(&self, config: &IsolationConfig) -> Result<Vec<ClasspathEntry>>;
}

/// Reads a path-list environment variable (`config.classpath_variable`)
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvClasspathProvider;

impl EnvClasspathProvider {
    /// Split a platform path list into entries; existing directories get a trailing `/`
    pub fn split(value: &std::ffi::OsStr) -> Vec<ClasspathEntry> {
        std::env::split_paths(value)
            .filter(|path| !path.as_os_str().is_empty())
            .map(|path| ClasspathEntry::from_path(&path))
            .collect()
    }
}

impl ClasspathProvider for EnvClasspathProvider {
    fn classpath(&self, config: &IsolationConfig) -> Result<Vec<ClasspathEntry>> {
        let entries = match std::env::var_os(&config.classpath_variable) {
            Some(value) => Self::split(&value),
            None => {
                tracing::warn!(
                    "Classpath variable {} is not set, using an empty classpath",
                    config.classpath_variable
                );
                Vec::new()
            }
        };
        Ok(entries)
    }
}

/// Fixed classpath
#[derive(Debug, Clone, Default)]
pub struct StaticClasspathProvider {
    entries: Vec<ClasspathEntry>,
}

impl StaticClasspathProvider {
    pub fn new(entries: Vec<ClasspathEntry>) -> Self {
        Self { entries }
    }

    pub fn from_locations<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: locations.into_iter().map(ClasspathEntry::new).collect(),
        }
    }
}

impl ClasspathProvider for StaticClasspathProvider {
    fn classpath(&self, _config: &IsolationConfig) -> Result<Vec<ClasspathEntry>> {
        Ok(self.entries.clone())
    }
}

/// Supplies the dependency graph
pub trait DependenciesResolver: Send + Sync {
    fn resolve(&self, config: &IsolationConfig) -> Result<DependencyGraph>;
}

/// Parses `config.resolved_dependency_graph_file()`, or an explicit path
#[derive(Debug, Clone, Default)]
pub struct GraphFileDependenciesResolver {
    path: Option<PathBuf>,
}

impl GraphFileDependenciesResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl DependenciesResolver for GraphFileDependenciesResolver {
    fn resolve(&self, config: &IsolationConfig) -> Result<DependencyGraph> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| config.resolved_dependency_graph_file());
        tracing::debug!("Reading dependency graph from {}", path.display());
        DependencyGraphParser::with_delimiter(config.edge_delimiter.clone()).parse_file(&path)
    }
}

/// Graph supplied in memory
#[derive(Debug, Clone, Default)]
pub struct StaticDependenciesResolver {
    graph: DependencyGraph,
}

impl StaticDependenciesResolver {
    pub fn new(graph: DependencyGraph) -> Self {
        Self { graph }
    }
}

impl DependenciesResolver for StaticDependenciesResolver {
    fn resolve(&self, _config: &IsolationConfig) -> Result<DependencyGraph> {
        Ok(self.graph.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Harness
// ═══════════════════════════════════════════════════════════════════════════

/// Per-invocation context building the resolver chain
pub struct IsolationHarness {
    config: IsolationConfig,
    classpath_provider: Arc<dyn ClasspathProvider>,
    dependencies_resolver: Arc<dyn DependenciesResolver>,
    module_mapping: Arc<dyn ModuleFolderMapping>,
    classifier: Arc<dyn ClassPathClassifier>,
    opener: Arc<dyn EntryOpener>,
    host: Arc<dyn HostNamespace>,
}

impl IsolationHarness {
    /// Create a harness with default collaborators
    pub fn new(config: IsolationConfig) -> Self {
        Self {
            config,
            classpath_provider: Arc::new(EnvClasspathProvider),
            dependencies_resolver: Arc::new(GraphFileDependenciesResolver::new()),
            module_mapping: Arc::new(StaticModuleMapping::new()),
            classifier: Arc::new(TierClassifier::new()),
            opener: Arc::new(FsEntryOpener::new()),
            host: Arc::new(EmptyHost),
        }
    }

    /// Harness for a project directory with its YAML config, if present
    pub fn for_project(project_dir: impl AsRef<Path>, config_file: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => IsolationConfig::from_yaml(path)?,
            None => IsolationConfig::default(),
        };
        Ok(Self::new(config.project_dir(project_dir.as_ref())))
    }

    pub fn config(&self) -> &IsolationConfig {
        &self.config
    }

    pub fn with_classpath_provider(mut self, provider: Arc<dyn ClasspathProvider>) -> Self {
        self.classpath_provider = provider;
        self
    }

    pub fn with_dependencies_resolver(mut self, resolver: Arc<dyn DependenciesResolver>) -> Self {
        self.dependencies_resolver = resolver;
        self
    }

    pub fn with_module_mapping(mut self, mapping: Arc<dyn ModuleFolderMapping>) -> Self {
        self.module_mapping = mapping;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ClassPathClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_opener(mut self, opener: Arc<dyn EntryOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn HostNamespace>) -> Self {
        self.host = host;
        self
    }

    /// Validate the config, then classify the classpath
    pub fn classify(&self) -> Result<TierClassification> {
        self.config.validate()?;

        let classpath = self.classpath_provider.classpath(&self.config)?;
        let graph = self.dependencies_resolver.resolve(&self.config)?;
        let request = ClassificationRequest {
            config: &self.config,
            classpath: &classpath,
            graph: &graph,
            module_mapping: self.module_mapping.as_ref(),
        };
        self.classifier.classify(&request)
    }

    /// Build the resolver chain
    ///
    /// Any construction error aborts before a resolver exists.
    pub fn construct(&self) -> Result<ResolverChain> {
        let classification = self.classify()?;
        Ok(self.chain_builder().build(&classification))
    }

    /// Run `f` in the application namespace, always tearing the chain down
    pub fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Arc<NamespaceResolver>) -> Result<T>,
    {
        let mut chain = self.construct()?;
        let outcome = f(chain.application());
        let failures = chain.release();
        if failures > 0 {
            tracing::debug!("Ignored {} release failures after run", failures);
        }
        outcome
    }

    fn chain_builder(&self) -> ResolverChainBuilder {
        ResolverChainBuilder::new()
            .host(Arc::clone(&self.host))
            .opener(Arc::clone(&self.opener))
            .boot_prefixes(self.config.boot_prefixes.iter().cloned())
            .symbol_suffix(self.config.symbol_suffix.clone())
    }
}
