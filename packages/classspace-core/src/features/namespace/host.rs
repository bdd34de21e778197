//! Host namespaces
//!
//! What a root resolver delegates to in place of a parent: the environment's
//! own libraries, the test framework, an embedder's symbols.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::shared::models::ClasspathEntry;

use super::opener::EntryOpener;
use super::resolver::{HostFallback, NamespaceResolver};
use super::symbol::ResolvedSymbol;

/// Namespace below the root of a resolver chain
pub trait HostNamespace: Send + Sync {
    fn name(&self) -> &str;

    /// Look a symbol up, `None` if the host does not define it
    fn lookup(&self, name: &str) -> Result<Option<Arc<ResolvedSymbol>>>;

    /// Release held resources, returning the number of failures
    fn release(&self) -> usize {
        0
    }
}

/// Resolves nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyHost;

impl HostNamespace for EmptyHost {
    fn name(&self) -> &str {
        "empty-host"
    }

    fn lookup(&self, _name: &str) -> Result<Option<Arc<ResolvedSymbol>>> {
        Ok(None)
    }
}

/// Host backed by its own search path
pub struct EntryHost {
    resolver: NamespaceResolver,
}

impl EntryHost {
    pub fn new(
        name: impl Into<String>,
        entries: Vec<ClasspathEntry>,
        opener: Arc<dyn EntryOpener>,
    ) -> Self {
        let resolver = NamespaceResolver::builder(name)
            .search_path(entries)
            .host_fallback(HostFallback::Isolated)
            .opener(opener)
            .build();
        Self { resolver }
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        self.resolver.search_path()
    }
}

impl HostNamespace for EntryHost {
    fn name(&self) -> &str {
        self.resolver.name()
    }

    fn lookup(&self, name: &str) -> Result<Option<Arc<ResolvedSymbol>>> {
        self.resolver.try_resolve(name)
    }

    fn release(&self) -> usize {
        self.resolver.release()
    }
}

/// In-memory symbol table
#[derive(Debug, Clone)]
pub struct StaticHost {
    name: String,
    origin: ClasspathEntry,
    symbols: HashMap<String, Arc<ResolvedSymbol>>,
}

impl StaticHost {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            origin: ClasspathEntry::directory(format!("host/{}", name)),
            name,
            symbols: HashMap::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let symbol = symbol.into();
        let bytes: Vec<u8> = bytes.into();
        let resolved = ResolvedSymbol::new(symbol.clone(), self.origin.clone(), self.name.clone(), bytes);
        self.symbols.insert(symbol, Arc::new(resolved));
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl HostNamespace for StaticHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, name: &str) -> Result<Option<Arc<ResolvedSymbol>>> {
        Ok(self.symbols.get(name).cloned())
    }
}
