//! Tier classification
//!
//! Partitions the classpath into container, plugin and application tiers by
//! walking the dependency graph under per-tier predicates:
//!
//! - application: test scope artifacts with their non-excluded closure, the
//!   test scope closure of every non-excluded compile artifact, and the test
//!   output folder of the artifact under test
//! - plugins: per extension, matched artifacts with their compile closure
//! - provided: provided artifacts with their non-test closure
//! - container: everything not claimed above, plus the provided entries
//!
//! Tiers are made disjoint afterwards according to [`ProvidedPrecedence`].

use std::collections::{BTreeSet, HashSet};

use crate::config::{IsolationConfig, PluginSpace, ProvidedPrecedence};
use crate::errors::{IsolationError, Result};
use crate::features::coordinate_matcher::CoordinateMatcher;
use crate::features::dependency_graph::DependencyGraph;
use crate::features::module_mapping::ModuleFolderMapping;
use crate::shared::models::{ArtifactKey, ArtifactRecord, ClasspathEntry};

use super::entry_resolver::EntryResolver;
use super::types::{PluginTier, TierClassification};

/// Name of the single plugin tier built by [`PluginSpace::AllCompile`]
pub const ALL_COMPILE_PLUGIN: &str = "plugin";

/// Inputs of one classification
pub struct ClassificationRequest<'a> {
    pub config: &'a IsolationConfig,
    pub classpath: &'a [ClasspathEntry],
    pub graph: &'a DependencyGraph,
    pub module_mapping: &'a dyn ModuleFolderMapping,
}

/// Strategy that partitions a classpath into tiers
pub trait ClassPathClassifier: Send + Sync {
    fn classify(&self, request: &ClassificationRequest<'_>) -> Result<TierClassification>;
}

/// Default dependency-graph based classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct TierClassifier;

impl TierClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl ClassPathClassifier for TierClassifier {
    fn classify(&self, request: &ClassificationRequest<'_>) -> Result<TierClassification> {
        let graph = request.graph;
        let config = request.config;

        let artifact_under_test = graph.artifact_under_test()?.clone();
        let exclusion = config.exclusion_matcher()?;
        let resolver = EntryResolver::new(request.classpath, request.module_mapping);

        // Application tier
        let app_artifacts = application_artifacts(graph, &exclusion);
        let mut application: BTreeSet<ClasspathEntry> =
            resolver.resolve_all(&app_artifacts)?.into_iter().collect();
        let test_output = config.resolved_test_output_dir();
        application.extend(
            request
                .classpath
                .iter()
                .filter(|entry| entry.location() == test_output)
                .cloned(),
        );

        // Plugin tiers
        let mut plugins = Vec::new();
        match config.plugin_space {
            PluginSpace::Disabled => {}
            PluginSpace::AllCompile => {
                let seeds: Vec<&ArtifactRecord> =
                    graph.artifacts().filter(|a| a.is_compile_scope()).collect();
                let mut tier = PluginTier::new(ALL_COMPILE_PLUGIN);
                tier.entries = resolver
                    .resolve_all(&compile_closure(graph, seeds))?
                    .into_iter()
                    .collect();
                plugins.push(tier);
            }
            PluginSpace::Extensions => {
                for extension in &config.extensions {
                    let matcher = CoordinateMatcher::parse(&extension.artifact)?;
                    let seeds: Vec<&ArtifactRecord> =
                        graph.artifacts().filter(|a| matcher.matches(a)).collect();
                    if seeds.is_empty() {
                        return Err(IsolationError::ArtifactResolution {
                            artifact: extension.artifact.clone(),
                            attempted: format!(
                                "no artifact in the dependency graph matches extension '{}'",
                                extension.name
                            ),
                        });
                    }

                    let mut tier = PluginTier::new(extension.name.clone());
                    tier.entries = resolver
                        .resolve_all(&compile_closure(graph, seeds))?
                        .into_iter()
                        .collect();
                    if let Some(location) = &extension.metadata_location {
                        tier.entries.insert(ClasspathEntry::new(location));
                    }
                    plugins.push(tier);
                }
            }
        }

        // Provided set
        let provided: BTreeSet<ClasspathEntry> = resolver
            .resolve_all(&provided_artifacts(graph))?
            .into_iter()
            .collect();

        // Disjointness
        if config.provided_precedence == ProvidedPrecedence::Container {
            application.retain(|entry| !provided.contains(entry));
            for plugin in &mut plugins {
                plugin.entries.retain(|entry| !provided.contains(entry));
            }
        }
        let mut claimed: BTreeSet<ClasspathEntry> = application.clone();
        for plugin in &mut plugins {
            plugin.entries.retain(|entry| !claimed.contains(entry));
            claimed.extend(plugin.entries.iter().cloned());
        }

        // Container: everything unclaimed plus the provided set
        let mut container: BTreeSet<ClasspathEntry> = request
            .classpath
            .iter()
            .filter(|entry| !claimed.contains(entry))
            .cloned()
            .collect();
        container.extend(
            provided
                .into_iter()
                .filter(|entry| !claimed.contains(entry)),
        );

        let classification = TierClassification {
            artifact_under_test,
            container,
            plugins,
            application,
        };

        tracing::info!(
            "Classified {} classpath entries for {}: container={}, plugins={}, application={}",
            request.classpath.len(),
            classification.artifact_under_test,
            classification.container.len(),
            classification.plugins.len(),
            classification.application.len()
        );
        Ok(classification)
    }
}

/// Artifacts of the application tier, in discovery order
fn application_artifacts(
    graph: &DependencyGraph,
    exclusion: &CoordinateMatcher,
) -> Vec<ArtifactRecord> {
    let mut collector = Collector::default();

    for artifact in graph.artifacts() {
        if artifact.is_test_scope() {
            collector.push(artifact.clone());
            collector.extend(graph.closure(artifact, |dep| !exclusion.matches(dep)));
        } else if artifact.is_compile_scope() && !exclusion.matches(artifact) {
            collector.extend(graph.closure(artifact, |dep| {
                dep.is_test_scope() && !exclusion.matches(dep)
            }));
        }
    }

    collector.into_inner()
}

/// Provided artifacts with their non-test closure
fn provided_artifacts(graph: &DependencyGraph) -> Vec<ArtifactRecord> {
    let mut collector = Collector::default();

    for artifact in graph.artifacts().filter(|a| a.is_provided_scope()) {
        collector.push(artifact.clone());
        collector.extend(graph.closure(artifact, |dep| !dep.is_test_scope()));
    }

    collector.into_inner()
}

/// Seeds with their compile scope closure
fn compile_closure(graph: &DependencyGraph, seeds: Vec<&ArtifactRecord>) -> Vec<ArtifactRecord> {
    let mut collector = Collector::default();

    for seed in seeds {
        collector.push(seed.clone());
        collector.extend(graph.closure(seed, |dep| dep.is_compile_scope()));
    }

    collector.into_inner()
}

/// Insertion-ordered artifact set keyed by identity
#[derive(Default)]
struct Collector {
    seen: HashSet<ArtifactKey>,
    artifacts: Vec<ArtifactRecord>,
}

impl Collector {
    fn push(&mut self, artifact: ArtifactRecord) {
        if self.seen.insert(artifact.key().clone()) {
            self.artifacts.push(artifact);
        }
    }

    fn extend(&mut self, artifacts: impl IntoIterator<Item = ArtifactRecord>) {
        for artifact in artifacts {
            self.push(artifact);
        }
    }

    fn into_inner(self) -> Vec<ArtifactRecord> {
        self.artifacts
    }
}
