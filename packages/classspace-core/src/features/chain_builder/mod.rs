//! Resolver chain assembly
//!
//! Turns a [`TierClassification`] into a parent → child chain:
//!
//! ```text
//! host ─▶ container ─▶ plugin(s) ─▶ application
//! ```
//!
//! The container delegates boot prefixes (test framework, assertion libraries)
//! to the host and resolves everything else from its own entries only. Plugin
//! and application resolvers inherit the boot prefixes as parent-only, so those
//! names always come from the host, and are self-first otherwise.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{default_boot_prefixes, DEFAULT_SYMBOL_SUFFIX};
use crate::features::classification::TierClassification;
use crate::features::namespace::{
    EmptyHost, EntryOpener, FsEntryOpener, HostFallback, HostNamespace, LookupMode, LookupPolicy,
    NamespaceResolver,
};
use crate::shared::models::ClasspathEntry;

pub const CONTAINER_TIER: &str = "container";
pub const APPLICATION_TIER: &str = "application";

/// One layer of the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub name: String,
    pub entries: Vec<ClasspathEntry>,
    /// `None` for the outermost tier (its parent is the host)
    pub parent: Option<String>,
}

/// Builds a [`ResolverChain`]
pub struct ResolverChainBuilder {
    host: Arc<dyn HostNamespace>,
    opener: Arc<dyn EntryOpener>,
    boot_prefixes: Vec<String>,
    symbol_suffix: String,
    extra_rules: HashMap<String, Vec<(String, LookupMode)>>,
}

impl Default for ResolverChainBuilder {
    fn default() -> Self {
        Self {
            host: Arc::new(EmptyHost),
            opener: Arc::new(FsEntryOpener::new()),
            boot_prefixes: default_boot_prefixes(),
            symbol_suffix: DEFAULT_SYMBOL_SUFFIX.to_string(),
            extra_rules: HashMap::new(),
        }
    }
}

impl ResolverChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: Arc<dyn HostNamespace>) -> Self {
        self.host = host;
        self
    }

    pub fn opener(mut self, opener: Arc<dyn EntryOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Prefixes the container resolves only through the host
    pub fn boot_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boot_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn symbol_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.symbol_suffix = suffix.into();
        self
    }

    /// Extra prefix rule for the tier named `tier`
    pub fn rule(
        mut self,
        tier: impl Into<String>,
        prefix: impl Into<String>,
        mode: LookupMode,
    ) -> Self {
        self.extra_rules
            .entry(tier.into())
            .or_default()
            .push((prefix.into(), mode));
        self
    }

    /// Assemble the chain, outermost first
    pub fn build(&self, classification: &TierClassification) -> ResolverChain {
        let mut chain = ResolverChain {
            host: Arc::clone(&self.host),
            tiers: Vec::new(),
            resolvers: Vec::new(),
            torn_down: false,
        };

        let container = NamespaceResolver::builder(CONTAINER_TIER)
            .search_path(classification.container.iter().cloned())
            .host(Arc::clone(&self.host))
            .host_fallback(HostFallback::Isolated)
            .policy(self.tier_policy(CONTAINER_TIER))
            .opener(Arc::clone(&self.opener))
            .symbol_suffix(self.symbol_suffix.clone())
            .build();
        chain.push(container);

        for plugin in &classification.plugins {
            let resolver = self.child(&chain, &plugin.name, plugin.entries.iter().cloned());
            chain.push(resolver);
        }

        let application = self.child(
            &chain,
            APPLICATION_TIER,
            classification.application.iter().cloned(),
        );
        chain.push(application);

        chain
    }

    fn child(
        &self,
        chain: &ResolverChain,
        name: &str,
        entries: impl IntoIterator<Item = ClasspathEntry>,
    ) -> NamespaceResolver {
        let mut builder = NamespaceResolver::builder(name)
            .search_path(entries)
            .policy(self.tier_policy(name))
            .opener(Arc::clone(&self.opener))
            .symbol_suffix(self.symbol_suffix.clone());
        if let Some(parent) = chain.resolvers.last() {
            builder = builder.parent(Arc::clone(parent));
        }
        builder.build()
    }

    /// Self-first with the boot prefixes parent-only, then the tier's own rules
    fn tier_policy(&self, tier: &str) -> LookupPolicy {
        let mut policy = LookupPolicy::new(LookupMode::SelfFirst);
        for prefix in &self.boot_prefixes {
            policy.add_rule(prefix.clone(), LookupMode::ParentOnly);
        }
        if let Some(rules) = self.extra_rules.get(tier) {
            for (prefix, mode) in rules {
                policy.add_rule(prefix.clone(), *mode);
            }
        }
        policy
    }
}

/// Tier resolvers ordered outer → inner, released child-to-parent on teardown
pub struct ResolverChain {
    host: Arc<dyn HostNamespace>,
    tiers: Vec<Tier>,
    resolvers: Vec<Arc<NamespaceResolver>>,
    torn_down: bool,
}

impl ResolverChain {
    fn push(&mut self, resolver: NamespaceResolver) {
        let tier = Tier {
            name: resolver.name().to_string(),
            entries: resolver.search_path().to_vec(),
            parent: resolver.parent().map(|p| p.name().to_string()),
        };
        tracing::debug!(
            "Tier '{}' (parent: {}) with {} entries:",
            tier.name,
            tier.parent.as_deref().unwrap_or(self.host.name()),
            tier.entries.len()
        );
        for entry in &tier.entries {
            tracing::debug!("  {}", entry);
        }
        self.tiers.push(tier);
        self.resolvers.push(Arc::new(resolver));
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn resolvers(&self) -> &[Arc<NamespaceResolver>] {
        &self.resolvers
    }

    pub fn resolver(&self, tier: &str) -> Option<&Arc<NamespaceResolver>> {
        self.resolvers.iter().find(|r| r.name() == tier)
    }

    /// Outermost resolver
    pub fn container(&self) -> &Arc<NamespaceResolver> {
        // `build` always pushes the container first and the application last
        &self.resolvers[0]
    }

    /// Innermost resolver, the active namespace of the code under test
    pub fn application(&self) -> &Arc<NamespaceResolver> {
        &self.resolvers[self.resolvers.len() - 1]
    }

    pub fn host(&self) -> &Arc<dyn HostNamespace> {
        &self.host
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Release every tier child-to-parent, then the host
    ///
    /// Returns the number of failed releases; failures are logged, never raised.
    pub fn release(&mut self) -> usize {
        if self.torn_down {
            return 0;
        }
        self.torn_down = true;

        let mut failures = 0;
        for resolver in self.resolvers.iter().rev() {
            failures += resolver.release();
        }
        failures += self.host.release();
        if failures > 0 {
            tracing::warn!("Resolver chain released with {} failures", failures);
        }
        failures
    }
}

impl Drop for ResolverChain {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain")
            .field("host", &self.host.name())
            .field("tiers", &self.tiers)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}
