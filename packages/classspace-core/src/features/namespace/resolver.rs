//! Hierarchical namespace resolver
//!
//! Each resolver owns a private search path and either a parent resolver or,
//! at the root, a [`HostNamespace`]. A name is resolved according to the
//! [`LookupMode`] its longest matching prefix selects:
//!
//! - `ParentOnly`: parent (or host at the root), own search path never read
//! - `ParentFirst`: parent, then own search path
//! - `SelfFirst`: own search path, then parent
//!
//! Results are cached per name and never evicted. Resolution of one name is
//! single-flight: concurrent callers wait on the same cell, so the search runs
//! once. Failures are not cached.

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::DEFAULT_SYMBOL_SUFFIX;
use crate::errors::{IsolationError, Result};
use crate::shared::models::ClasspathEntry;

use super::host::{EmptyHost, HostNamespace};
use super::lookup_policy::{LookupMode, LookupPolicy};
use super::opener::{EntryOpener, FsEntryOpener, OpenedEntry};
use super::symbol::{symbol_path, ResolvedSymbol};

type SharedHandle = Arc<Mutex<Box<dyn OpenedEntry>>>;

/// Whether a root resolver reaches the host for names that are not `ParentOnly`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostFallback {
    /// Unresolved names fall through to the host
    #[default]
    Delegate,
    /// Only `ParentOnly` names reach the host
    Isolated,
}

/// One node of a resolver chain
pub struct NamespaceResolver {
    name: String,
    search_path: Vec<ClasspathEntry>,
    parent: Option<Arc<NamespaceResolver>>,
    host: Arc<dyn HostNamespace>,
    host_fallback: HostFallback,
    policy: LookupPolicy,
    opener: Arc<dyn EntryOpener>,
    symbol_suffix: String,

    /// name → resolved symbol, initialised at most once
    cache: DashMap<String, Arc<OnceCell<Arc<ResolvedSymbol>>>>,

    /// search path index → opened entry
    handles: Mutex<HashMap<usize, SharedHandle>>,

    released: AtomicBool,
}

impl NamespaceResolver {
    pub fn builder(name: impl Into<String>) -> NamespaceResolverBuilder {
        NamespaceResolverBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn search_path(&self) -> &[ClasspathEntry] {
        &self.search_path
    }

    pub fn parent(&self) -> Option<&Arc<NamespaceResolver>> {
        self.parent.as_ref()
    }

    pub fn policy(&self) -> &LookupPolicy {
        &self.policy
    }

    pub fn host_fallback(&self) -> HostFallback {
        self.host_fallback
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache
            .get(name)
            .map(|cell| cell.get().is_some())
            .unwrap_or(false)
    }

    /// Number of names resolved so far
    pub fn cached_count(&self) -> usize {
        self.cache
            .iter()
            .filter(|cell| cell.value().get().is_some())
            .count()
    }

    /// Number of entries currently held open
    pub fn open_handle_count(&self) -> usize {
        self.handles.lock().len()
    }

    /// Resolve a symbol name
    pub fn resolve(&self, name: &str) -> Result<Arc<ResolvedSymbol>> {
        self.ensure_live()?;

        let cell = self
            .cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        match cell.get_or_try_init(|| self.search(name)) {
            Ok(symbol) => Ok(Arc::clone(symbol)),
            Err(e) => {
                // Misses leave no empty cell behind
                self.cache.remove_if(name, |_, cached| {
                    Arc::ptr_eq(cached, &cell) && cached.get().is_none()
                });
                Err(e)
            }
        }
    }

    /// Resolve, mapping "not found" to `None`
    pub fn try_resolve(&self, name: &str) -> Result<Option<Arc<ResolvedSymbol>>> {
        match self.resolve(name) {
            Ok(symbol) => Ok(Some(symbol)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Release every held entry handle
    ///
    /// Release failures are logged and counted, never returned. Later
    /// resolutions fail with `Released`. Releasing twice is a no-op.
    pub fn release(&self) -> usize {
        self.released.store(true, Ordering::SeqCst);

        let mut drained: Vec<(usize, SharedHandle)> = self.handles.lock().drain().collect();
        drained.sort_by_key(|(index, _)| *index);

        let mut failures = 0;
        for (index, handle) in drained {
            if let Err(e) = handle.lock().release() {
                failures += 1;
                tracing::warn!(
                    "Failed to release entry {} of resolver {}: {}",
                    self.search_path[index],
                    self.name,
                    e
                );
            }
        }
        failures
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_released() {
            return Err(IsolationError::Released(self.name.clone()));
        }
        Ok(())
    }

    fn search(&self, name: &str) -> Result<Arc<ResolvedSymbol>> {
        let mode = self.policy.mode_for(name);
        let symbol = match mode {
            LookupMode::ParentOnly => self.delegate(name, mode)?,
            LookupMode::ParentFirst => match self.delegate(name, mode)? {
                Some(symbol) => Some(symbol),
                None => self.find_local(name)?,
            },
            LookupMode::SelfFirst => match self.find_local(name)? {
                Some(symbol) => Some(symbol),
                None => self.delegate(name, mode)?,
            },
        };

        match symbol {
            Some(symbol) => {
                tracing::trace!("{} resolved {} ({})", self.name, symbol, mode);
                Ok(symbol)
            }
            None => Err(IsolationError::symbol_not_found(name, self.name.clone())),
        }
    }

    /// Ask the parent, or the host at the root
    fn delegate(&self, name: &str, mode: LookupMode) -> Result<Option<Arc<ResolvedSymbol>>> {
        if let Some(parent) = &self.parent {
            return parent.try_resolve(name);
        }
        if mode == LookupMode::ParentOnly || self.host_fallback == HostFallback::Delegate {
            return self.host.lookup(name);
        }
        Ok(None)
    }

    /// Search the own search path in order
    fn find_local(&self, name: &str) -> Result<Option<Arc<ResolvedSymbol>>> {
        let relative_path = symbol_path(name, &self.symbol_suffix);

        for (index, entry) in self.search_path.iter().enumerate() {
            let handle = self.handle(index)?;
            let read = handle.lock().read(&relative_path);
            let bytes = match read {
                Ok(bytes) => bytes,
                // A concurrent release drained the handle mid-search
                Err(_) if self.is_released() => {
                    return Err(IsolationError::Released(self.name.clone()))
                }
                Err(e) => {
                    return Err(IsolationError::entry(
                        entry.location(),
                        self.name.clone(),
                        e.to_string(),
                    ))
                }
            };
            if let Some(bytes) = bytes {
                return Ok(Some(Arc::new(ResolvedSymbol::new(
                    name,
                    entry.clone(),
                    self.name.clone(),
                    bytes,
                ))));
            }
        }
        Ok(None)
    }

    /// Opened handle for a search path entry, opening it on first use
    ///
    /// The entry is opened outside the handle lock. If two searches open the
    /// same entry concurrently the first inserted handle is kept and the other
    /// is released.
    fn handle(&self, index: usize) -> Result<SharedHandle> {
        {
            let handles = self.handles.lock();
            self.ensure_live()?;
            if let Some(handle) = handles.get(&index) {
                return Ok(Arc::clone(handle));
            }
        }

        let entry = &self.search_path[index];
        let mut opened = self
            .opener
            .open(entry)
            .map_err(|e| IsolationError::entry(entry.location(), self.name.clone(), e.to_string()))?;

        let existing = {
            let mut handles = self.handles.lock();
            // Checked under the lock so nothing is inserted after `release` drained the map
            if self.is_released() {
                None
            } else {
                match handles.get(&index).cloned() {
                    Some(handle) => Some(handle),
                    None => {
                        let handle: SharedHandle = Arc::new(Mutex::new(opened));
                        handles.insert(index, Arc::clone(&handle));
                        return Ok(handle);
                    }
                }
            }
        };

        if let Err(e) = opened.release() {
            tracing::warn!(
                "Failed to release duplicate handle of {} in resolver {}: {}",
                entry,
                self.name,
                e
            );
        }
        existing.ok_or_else(|| IsolationError::Released(self.name.clone()))
    }
}

impl fmt::Debug for NamespaceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceResolver")
            .field("name", &self.name)
            .field("search_path", &self.search_path)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("host", &self.host.name())
            .field("host_fallback", &self.host_fallback)
            .field("policy", &self.policy)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Builder for [`NamespaceResolver`]
pub struct NamespaceResolverBuilder {
    name: String,
    search_path: Vec<ClasspathEntry>,
    parent: Option<Arc<NamespaceResolver>>,
    host: Option<Arc<dyn HostNamespace>>,
    host_fallback: HostFallback,
    policy: LookupPolicy,
    opener: Option<Arc<dyn EntryOpener>>,
    symbol_suffix: String,
}

impl NamespaceResolverBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search_path: Vec::new(),
            parent: None,
            host: None,
            host_fallback: HostFallback::default(),
            policy: LookupPolicy::default(),
            opener: None,
            symbol_suffix: DEFAULT_SYMBOL_SUFFIX.to_string(),
        }
    }

    pub fn search_path<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = ClasspathEntry>,
    {
        self.search_path = entries.into_iter().collect();
        self
    }

    pub fn parent(mut self, parent: Arc<NamespaceResolver>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Host namespace, consulted only when there is no parent
    pub fn host(mut self, host: Arc<dyn HostNamespace>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn host_fallback(mut self, fallback: HostFallback) -> Self {
        self.host_fallback = fallback;
        self
    }

    pub fn policy(mut self, policy: LookupPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn opener(mut self, opener: Arc<dyn EntryOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn symbol_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.symbol_suffix = suffix.into();
        self
    }

    pub fn build(self) -> NamespaceResolver {
        NamespaceResolver {
            name: self.name,
            search_path: self.search_path,
            parent: self.parent,
            host: self.host.unwrap_or_else(|| Arc::new(EmptyHost)),
            host_fallback: self.host_fallback,
            policy: self.policy,
            opener: self.opener.unwrap_or_else(|| Arc::new(FsEntryOpener::new())),
            symbol_suffix: self.symbol_suffix,
            cache: DashMap::new(),
            handles: Mutex::new(HashMap::new()),
            released: AtomicBool::new(false),
        }
    }
}
