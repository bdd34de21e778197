//! Artifact coordinates
//!
//! An artifact is identified by `group:name:type`. Version and scope travel
//! with the record but never take part in equality, hashing or ordering, so
//! the same artifact declared with different scopes on different graph edges
//! collapses to one node.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Coordinate segment delimiter
pub const COORDINATE_DELIMITER: char = ':';

/// Artifact type that never maps to a classpath entry
pub const POM_TYPE: &str = "pom";

/// Artifact type of a test-classifier artifact
pub const TEST_JAR_TYPE: &str = "test-jar";

/// Dependency scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Supplied by the host, not bundled
    Provided,
    /// Bundled with the unit under test
    Compile,
    /// Only needed to run tests
    Test,
    /// Any other declared scope (runtime, system, import, ...)
    Other(String),
}

impl Scope {
    /// Parse a scope token (case-insensitive)
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "provided" => Scope::Provided,
            "compile" => Scope::Compile,
            "test" => Scope::Test,
            other => Scope::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scope::Provided => "provided",
            Scope::Compile => "compile",
            Scope::Test => "test",
            Scope::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact identity: `group:name:type`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub group: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.kind)
    }
}

/// One artifact coordinate with its declared scope
///
/// Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    key: ArtifactKey,
    version: String,
    scope: Scope,
}

impl ArtifactRecord {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        version: impl Into<String>,
        scope: Scope,
    ) -> Self {
        Self {
            key: ArtifactKey {
                group: group.into(),
                name: name.into(),
                kind: kind.into(),
            },
            version: version.into(),
            scope,
        }
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn group(&self) -> &str {
        &self.key.group
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn kind(&self) -> &str {
        &self.key.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_compile_scope(&self) -> bool {
        self.scope == Scope::Compile
    }

    pub fn is_test_scope(&self) -> bool {
        self.scope == Scope::Test
    }

    pub fn is_provided_scope(&self) -> bool {
        self.scope == Scope::Provided
    }

    /// Group with `.` replaced by `/`, as laid out in a local repository
    pub fn group_as_path(&self) -> String {
        self.key.group.replace('.', "/")
    }

    /// Test-scoped `test-jar` artifact (a module's test output)
    pub fn is_test_classifier(&self) -> bool {
        self.is_test_scope() && self.key.kind == TEST_JAR_TYPE
    }

    pub fn is_pom(&self) -> bool {
        self.key.kind == POM_TYPE
    }
}

impl PartialEq for ArtifactRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ArtifactRecord {}

impl Hash for ArtifactRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ArtifactRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArtifactRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for ArtifactRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.key.group, self.key.name, self.key.kind, self.version, self.scope
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_version_and_scope() {
        let a = ArtifactRecord::new("g", "lib", "jar", "1", Scope::Compile);
        let b = ArtifactRecord::new("g", "lib", "jar", "2", Scope::Test);
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_type_is_part_of_identity() {
        let jar = ArtifactRecord::new("g", "lib", "jar", "1", Scope::Compile);
        let tests = ArtifactRecord::new("g", "lib", "test-jar", "1", Scope::Test);
        assert_ne!(jar, tests);
        assert!(tests.is_test_classifier());
        assert!(!jar.is_test_classifier());
    }

    #[test]
    fn test_display_and_group_path() {
        let a = ArtifactRecord::new("org.acme.core", "engine", "jar", "3.1", Scope::Provided);
        assert_eq!(a.to_string(), "org.acme.core:engine:jar:3.1:provided");
        assert_eq!(a.group_as_path(), "org/acme/core");
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(Scope::parse("TEST"), Scope::Test);
        assert_eq!(Scope::parse(" provided "), Scope::Provided);
        assert_eq!(Scope::parse("runtime"), Scope::Other("runtime".to_string()));
    }
}
