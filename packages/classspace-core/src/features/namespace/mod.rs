//! Hierarchical namespace resolution
//!
//! - `lookup_policy`: prefix → [`LookupMode`] table
//! - `resolver`: [`NamespaceResolver`] node with single-flight per-name cache
//! - `opener`: entry openers (filesystem directories, `.tar` and `.jar` archives, in-memory)
//! - `host`: namespaces below the root resolver

mod host;
mod lookup_policy;
mod opener;
mod resolver;
mod symbol;

pub use host::{EmptyHost, EntryHost, HostNamespace, StaticHost};
pub use lookup_policy::{LookupMode, LookupPolicy};
pub use opener::{EntryOpener, FsEntryOpener, MemoryEntryOpener, OpenedEntry, OpenerStats};
pub use resolver::{HostFallback, NamespaceResolver, NamespaceResolverBuilder};
pub use symbol::{symbol_path, ResolvedSymbol};
