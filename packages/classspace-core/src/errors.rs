//! Error types for classspace-core
//!
//! Provides unified error handling across the crate. Construction errors
//! (`Parse`, `NoCompileRoot`, `ArtifactResolution`) are fatal for the whole
//! invocation; `SymbolNotFound` is raised at resolution time by a single
//! resolver node and propagated to the caller.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for classspace operations
#[derive(Debug, Error)]
pub enum IsolationError {
    /// Malformed graph or coordinate line
    #[error("Parse error at line {line_number}: '{line}' ({reason})")]
    Parse {
        line_number: usize,
        line: String,
        reason: String,
    },

    /// Graph declares no compile-scope artifact to test or launch
    #[error("No compile scope artifact found in dependency graph, cannot select the artifact under test")]
    NoCompileRoot,

    /// Artifact cannot be mapped to a classpath entry or module folder
    #[error("Cannot locate artifact '{artifact}' on the classpath: {attempted}")]
    ArtifactResolution { artifact: String, attempted: String },

    /// Symbol not resolvable at a resolver node
    #[error("Symbol '{name}' not found by resolver '{resolver}'")]
    SymbolNotFound { name: String, resolver: String },

    /// Classpath entry could not be opened or read
    #[error("Entry '{entry}' failed in resolver '{resolver}': {message}")]
    Entry {
        entry: String,
        resolver: String,
        message: String,
    },

    /// Resolver used after teardown
    #[error("Resolver '{0}' has been released")]
    Released(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IsolationError {
    /// Create a parse error for a 1-based line number
    pub fn parse(line_number: usize, line: impl Into<String>, reason: impl Into<String>) -> Self {
        IsolationError::Parse {
            line_number,
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// Create a symbol-not-found error raised by `resolver`
    pub fn symbol_not_found(name: impl Into<String>, resolver: impl Into<String>) -> Self {
        IsolationError::SymbolNotFound {
            name: name.into(),
            resolver: resolver.into(),
        }
    }

    pub fn entry(
        entry: impl Into<String>,
        resolver: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        IsolationError::Entry {
            entry: entry.into(),
            resolver: resolver.into(),
            message: message.into(),
        }
    }

    /// True for `SymbolNotFound`, used by resolvers to decide whether to try the next source
    pub fn is_not_found(&self) -> bool {
        matches!(self, IsolationError::SymbolNotFound { .. })
    }
}

/// Result type alias for classspace operations
pub type Result<T> = std::result::Result<T, IsolationError>;
