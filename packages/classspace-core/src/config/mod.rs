//! Configuration system
//!
//! A single explicit [`IsolationConfig`] replaces per-test declarative
//! overrides: every option is a named field with a default, loadable from a
//! versioned YAML file.
//!
//! # Examples
//!
//! ```rust,ignore
//! use classspace_core::config::{ExtensionSpec, IsolationConfig};
//!
//! let config = IsolationConfig::new()
//!     .app_exclusions("org.acme*:*:*")
//!     .extension(ExtensionSpec::new("file", "org.acme:acme-file:*"));
//! config.validate()?;
//!
//! let config = IsolationConfig::from_yaml("isolation.yaml")?;
//! ```

pub mod error;
pub mod io;
pub mod isolation_config;

pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigFileV1, SUPPORTED_VERSIONS};
pub use isolation_config::{
    default_boot_prefixes, ExtensionSpec, IsolationConfig, PluginSpace, ProvidedPrecedence,
    DEFAULT_CLASSPATH_VARIABLE, DEFAULT_DEPENDENCY_GRAPH_FILE, DEFAULT_EDGE_DELIMITER,
    DEFAULT_SYMBOL_SUFFIX, TEST_OUTPUT_FOLDER,
};
