//! Artifact dependency graph with petgraph
//!
//! Directed graph where:
//! - Nodes are artifacts, keyed by identity (`group:name:type`)
//! - Edges are direct dependencies, weighted with the dependency record as
//!   declared on that edge (its scope may differ from the node's own)
//!
//! The graph may contain cycles. Closures keep a visited set so every node is
//! expanded at most once per traversal.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use crate::errors::{IsolationError, Result};
use crate::shared::models::{ArtifactKey, ArtifactRecord};

/// Dependency graph of artifacts
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// artifact → artifacts it depends on
    graph: DiGraph<ArtifactRecord, ArtifactRecord>,

    /// Identity → node index (node indices follow declaration order)
    key_to_node: HashMap<ArtifactKey, NodeIndex>,
}

impl DependencyGraph {
    /// Create empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an artifact; the first declaration of an identity wins
    pub fn declare(&mut self, artifact: ArtifactRecord) -> NodeIndex {
        if let Some(&idx) = self.key_to_node.get(artifact.key()) {
            return idx;
        }
        let key = artifact.key().clone();
        let idx = self.graph.add_node(artifact);
        self.key_to_node.insert(key, idx);
        idx
    }

    /// Add `from → to`, lazily declaring both ends
    ///
    /// Repeated edges between the same identities keep the first declared record.
    pub fn add_dependency(&mut self, from: ArtifactRecord, to: ArtifactRecord) {
        let from_idx = self.declare(from);
        let to_idx = self.declare(to.clone());
        if self.graph.find_edge(from_idx, to_idx).is_none() {
            self.graph.add_edge(from_idx, to_idx, to);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, artifact: &ArtifactRecord) -> bool {
        self.key_to_node.contains_key(artifact.key())
    }

    /// Declared record for an identity
    pub fn get(&self, key: &ArtifactKey) -> Option<&ArtifactRecord> {
        self.key_to_node.get(key).map(|&idx| &self.graph[idx])
    }

    /// All artifacts in declaration order
    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Direct dependencies of `artifact`, as declared on the edges, in declaration order
    pub fn dependencies(&self, artifact: &ArtifactRecord) -> Vec<&ArtifactRecord> {
        match self.key_to_node.get(artifact.key()) {
            Some(&idx) => self.outgoing(idx).into_iter().map(|(dep, _)| dep).collect(),
            None => Vec::new(),
        }
    }

    /// Artifacts that directly depend on `artifact`
    pub fn dependents(&self, artifact: &ArtifactRecord) -> Vec<&ArtifactRecord> {
        match self.key_to_node.get(artifact.key()) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .map(|n| &self.graph[n])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Edge map: artifact → direct dependencies (artifacts without edges included)
    pub fn edge_map(&self) -> HashMap<ArtifactRecord, Vec<ArtifactRecord>> {
        self.graph
            .node_indices()
            .map(|idx| {
                let deps = self
                    .outgoing(idx)
                    .into_iter()
                    .map(|(dep, _)| dep.clone())
                    .collect();
                (self.graph[idx].clone(), deps)
            })
            .collect()
    }

    /// The artifact under test: first declared compile scope artifact
    pub fn artifact_under_test(&self) -> Result<&ArtifactRecord> {
        self.artifacts()
            .find(|a| a.is_compile_scope())
            .ok_or(IsolationError::NoCompileRoot)
    }

    /// Transitive dependencies of `start` accepted by `predicate`
    ///
    /// Traversal walks through every reached node (a rejected node still has its
    /// own dependencies inspected); the predicate only filters what is kept. The
    /// predicate sees the dependency record as declared on each edge. Each node is
    /// expanded at most once, so cycles terminate. `start` itself is not included.
    pub fn closure<P>(&self, start: &ArtifactRecord, predicate: P) -> Vec<ArtifactRecord>
    where
        P: Fn(&ArtifactRecord) -> bool,
    {
        let start_idx = match self.key_to_node.get(start.key()) {
            Some(&idx) => idx,
            None => return Vec::new(),
        };

        let mut expanded: HashSet<NodeIndex> = HashSet::new();
        let mut kept: HashSet<ArtifactKey> = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![start_idx];

        while let Some(idx) = stack.pop() {
            if !expanded.insert(idx) {
                continue;
            }
            let outgoing = self.outgoing(idx);
            // Reverse so the first declared dependency is expanded first
            for (_, target) in outgoing.iter().rev() {
                if !expanded.contains(target) {
                    stack.push(*target);
                }
            }
            for (dep, _) in outgoing {
                if predicate(dep) && kept.insert(dep.key().clone()) {
                    result.push(dep.clone());
                }
            }
        }

        result
    }

    /// Strongly connected components with more than one artifact
    pub fn cycles(&self) -> Vec<Vec<ArtifactRecord>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| scc.into_iter().map(|idx| self.graph[idx].clone()).collect())
            .collect()
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles().is_empty()
    }

    /// Outgoing edges of a node in declaration order
    fn outgoing(&self, idx: NodeIndex) -> Vec<(&ArtifactRecord, NodeIndex)> {
        let mut edges: Vec<(&ArtifactRecord, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.weight(), e.target()))
            .collect();
        // petgraph yields the most recently added edge first
        edges.reverse();
        edges
    }
}
