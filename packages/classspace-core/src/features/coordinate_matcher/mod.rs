//! Coordinate matching
//!
//! Patterns use the GAT format `group:name:type`. Each segment is either a
//! literal (exact match) or ends with `*` (prefix match, a bare `*` matches
//! anything). A list of patterns is comma separated and matches an artifact
//! when any of its patterns does.
//!
//! ```text
//! org.acme:*:*            every artifact of group org.acme
//! org.acme*:*:*           org.acme, org.acme.core, org.acmeish, ...
//! *:acme-core:*           acme-core from any group
//! ```

use std::fmt;

use crate::config::{ConfigError, ConfigResult};
use crate::shared::models::{ArtifactRecord, COORDINATE_DELIMITER};

const WILDCARD: char = '*';

/// One pattern segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Exact(String),
    Prefix(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_suffix(WILDCARD) {
            Some(prefix) => Segment::Prefix(prefix.to_string()),
            None => Segment::Exact(raw.to_string()),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Segment::Exact(expected) => value == expected,
            Segment::Prefix(prefix) => value.starts_with(prefix.as_str()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Exact(value) => f.write_str(value),
            Segment::Prefix(prefix) => write!(f, "{}{}", prefix, WILDCARD),
        }
    }
}

/// A single `group:name:type` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatePattern {
    group: Segment,
    name: Segment,
    kind: Segment,
}

impl CoordinatePattern {
    pub fn parse(pattern: &str) -> ConfigResult<Self> {
        let segments: Vec<&str> = pattern.trim().split(COORDINATE_DELIMITER).collect();
        if segments.len() != 3 {
            return Err(ConfigError::invalid_pattern(
                pattern,
                format!("expected 3 segments, found {}", segments.len()),
            ));
        }
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::invalid_pattern(pattern, "empty segment"));
        }

        Ok(Self {
            group: Segment::parse(segments[0]),
            name: Segment::parse(segments[1]),
            kind: Segment::parse(segments[2]),
        })
    }

    pub fn matches(&self, artifact: &ArtifactRecord) -> bool {
        self.group.matches(artifact.group())
            && self.name.matches(artifact.name())
            && self.kind.matches(artifact.kind())
    }
}

impl fmt::Display for CoordinatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.kind)
    }
}

/// Disjunction of coordinate patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateMatcher {
    patterns: Vec<CoordinatePattern>,
}

impl CoordinateMatcher {
    /// Parse a comma separated pattern list; the empty list matches nothing
    pub fn parse(patterns: &str) -> ConfigResult<Self> {
        let patterns = patterns
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(CoordinatePattern::parse)
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Matcher that matches nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[CoordinatePattern] {
        &self.patterns
    }

    pub fn matches(&self, artifact: &ArtifactRecord) -> bool {
        self.patterns.iter().any(|p| p.matches(artifact))
    }
}

impl fmt::Display for CoordinateMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.patterns.iter().map(|p| p.to_string()).collect();
        f.write_str(&joined.join(","))
    }
}
