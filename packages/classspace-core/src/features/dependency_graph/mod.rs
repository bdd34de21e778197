//! Dependency graph feature
//!
//! - `parser`: graph file / flat list → [`DependencyGraph`]
//! - `graph`: petgraph-backed artifact graph with cycle-safe closures

mod graph;
mod parser;

pub use graph::DependencyGraph;
pub use parser::{parse_coordinates, DependencyGraphParser};
