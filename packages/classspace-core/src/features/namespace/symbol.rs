//! Resolved symbols

use std::fmt;
use std::sync::Arc;

use crate::shared::models::ClasspathEntry;

/// Code found for a symbol name
///
/// Shared through `Arc`: every resolver that observes the symbol through
/// delegation caches the same instance as the defining resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub name: String,
    /// Entry the bytes were read from
    pub origin: ClasspathEntry,
    /// Name of the defining resolver (or host)
    pub resolver: String,
    pub bytes: Arc<[u8]>,
}

impl ResolvedSymbol {
    pub fn new(
        name: impl Into<String>,
        origin: ClasspathEntry,
        resolver: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            origin,
            resolver: resolver.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for ResolvedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} via {})", self.name, self.origin, self.resolver)
    }
}

/// Relative path of a symbol inside an entry: `a.b.C` → `a/b/C<suffix>`
pub fn symbol_path(name: &str, suffix: &str) -> String {
    format!("{}{}", name.replace('.', "/"), suffix)
}
