//! Classification result types

use serde::Serialize;
use std::collections::BTreeSet;

use crate::shared::models::{ArtifactRecord, ClasspathEntry};

/// Entries of one plugin tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginTier {
    pub name: String,
    pub entries: BTreeSet<ClasspathEntry>,
}

impl PluginTier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeSet::new(),
        }
    }
}

/// Disjoint entry sets per isolation tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierClassification {
    /// First declared compile scope artifact
    #[serde(serialize_with = "serialize_artifact")]
    pub artifact_under_test: ArtifactRecord,

    pub container: BTreeSet<ClasspathEntry>,

    /// Declaration order, outermost first
    pub plugins: Vec<PluginTier>,

    pub application: BTreeSet<ClasspathEntry>,
}

impl TierClassification {
    pub fn plugin(&self, name: &str) -> Option<&PluginTier> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Every classified entry, across all tiers
    pub fn assigned(&self) -> BTreeSet<&ClasspathEntry> {
        self.container
            .iter()
            .chain(self.plugins.iter().flat_map(|p| p.entries.iter()))
            .chain(self.application.iter())
            .collect()
    }

    /// Classpath entries no tier claimed
    pub fn unassigned<'a>(&self, classpath: &'a [ClasspathEntry]) -> Vec<&'a ClasspathEntry> {
        let assigned = self.assigned();
        classpath
            .iter()
            .filter(|entry| !assigned.contains(entry))
            .collect()
    }

    /// Total number of entries across tiers
    pub fn entry_count(&self) -> usize {
        self.container.len()
            + self.plugins.iter().map(|p| p.entries.len()).sum::<usize>()
            + self.application.len()
    }
}

fn serialize_artifact<S>(artifact: &ArtifactRecord, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(artifact)
}
