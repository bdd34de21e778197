/*
 * classspace - tiered artifact isolation
 *
 * Feature-First Architecture:
 * - shared/      : Common models (ArtifactRecord, ClasspathEntry)
 * - config/      : IsolationConfig + YAML I/O
 * - features/    : Vertical slices (dependency graph → classification → namespace → chain)
 * - pipeline/    : Orchestration (IsolationHarness)
 */

#![allow(clippy::new_without_default)] // Builders expose both new() and Default
#![allow(clippy::module_inception)] // Module naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models
pub mod shared;

/// Feature modules
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ExtensionSpec, IsolationConfig, PluginSpace, ProvidedPrecedence};
pub use errors::{IsolationError, Result};
pub use features::chain_builder::{ResolverChain, ResolverChainBuilder, Tier};
pub use features::classification::{
    ClassPathClassifier, ClassificationRequest, PluginTier, TierClassification, TierClassifier,
};
pub use features::coordinate_matcher::CoordinateMatcher;
pub use features::dependency_graph::{DependencyGraph, DependencyGraphParser};
pub use features::module_mapping::{FixedModuleMapping, ModuleFolderMapping, StaticModuleMapping};
pub use features::namespace::{
    HostFallback, HostNamespace, LookupMode, LookupPolicy, NamespaceResolver, ResolvedSymbol,
};
pub use pipeline::{ClasspathProvider, DependenciesResolver, IsolationHarness};
pub use shared::models::{ArtifactRecord, ClasspathEntry, Scope};
