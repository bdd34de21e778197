//! Shared module - Common types
//!
//! Artifact coordinates and classpath entries used by every feature slice.

pub mod models;

pub use models::*;
