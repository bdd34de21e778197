//! Feature modules
//!
//! Leaves first:
//! - `coordinate_matcher`, `dependency_graph`, `module_mapping`: inputs of classification
//! - `classification`: classpath → disjoint tier entry sets
//! - `namespace`: hierarchical symbol resolution
//! - `chain_builder`: tier entry sets → resolver chain

pub mod coordinate_matcher;
pub mod dependency_graph;
pub mod module_mapping;

pub mod classification;

pub mod namespace;

pub mod chain_builder;
