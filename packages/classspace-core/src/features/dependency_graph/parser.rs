//! Dependency graph file parser
//!
//! Accepts the line format produced by dependency-graph tooling:
//!
//! ```text
//! digraph "org.acme:app:jar:1.0:compile" {
//!   "org.acme:app:jar:1.0:compile" -> "junit:junit:jar:4.12:test" ;
//!   "junit:junit:jar:4.12:test" -> "org.hamcrest:hamcrest-core:jar:1.3:test"[style=dotted];
//! }
//! ```
//!
//! plus bare `group:name:type:version:scope` declaration lines. The first
//! malformed line aborts parsing.

use std::path::Path;

use crate::config::DEFAULT_EDGE_DELIMITER;
use crate::errors::{IsolationError, Result};
use crate::shared::models::{ArtifactRecord, Scope, COORDINATE_DELIMITER};

use super::graph::DependencyGraph;

const GRAPH_HEADERS: &[&str] = &["digraph", "strict digraph", "graph"];

/// Parser for dependency graph descriptions
#[derive(Debug, Clone)]
pub struct DependencyGraphParser {
    delimiter: String,
}

impl Default for DependencyGraphParser {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_EDGE_DELIMITER.to_string(),
        }
    }
}

impl DependencyGraphParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// Read and parse a graph file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DependencyGraph> {
        let content = std::fs::read_to_string(path.as_ref())?;
        self.parse_str(&content)
    }

    /// Parse graph content
    pub fn parse_str(&self, content: &str) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();

        for (index, raw_line) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();

            if is_structural(line) {
                continue;
            }

            if let Some(header) = graph_header(line) {
                // `digraph "coords" {` declares the artifact the graph was built for
                if let Some(coordinates) = quoted(header) {
                    graph.declare(parse_coordinates(line_number, raw_line, coordinates)?);
                }
                continue;
            }

            match line.split_once(self.delimiter.as_str()) {
                Some((from, to)) => {
                    let from = parse_coordinates(line_number, raw_line, strip_decorations(from))?;
                    let to = parse_coordinates(line_number, raw_line, strip_decorations(to))?;
                    graph.add_dependency(from, to);
                }
                None => {
                    let artifact =
                        parse_coordinates(line_number, raw_line, strip_decorations(line))?;
                    graph.declare(artifact);
                }
            }
        }

        tracing::debug!(
            "Parsed dependency graph: {} artifacts, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Parse a flat artifact list (one coordinate per line, no edges)
    ///
    /// Lines with fewer than 4 colon-delimited segments are ignored; a 4-segment
    /// coordinate has no scope and defaults to compile.
    pub fn parse_flat_list(&self, content: &str) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();

        for (index, raw_line) in content.lines().enumerate() {
            let token = match raw_line
                .split_whitespace()
                .find(|t| t.contains(COORDINATE_DELIMITER))
            {
                Some(token) => strip_decorations(token),
                None => continue,
            };

            let segments = token.split(COORDINATE_DELIMITER).count();
            if segments < 4 {
                continue;
            }
            let artifact = if segments == 4 {
                let with_scope = format!("{}{}{}", token, COORDINATE_DELIMITER, Scope::Compile);
                parse_coordinates(index + 1, raw_line, &with_scope)?
            } else {
                parse_coordinates(index + 1, raw_line, token)?
            };
            graph.declare(artifact);
        }

        Ok(graph)
    }
}

/// Parse `group:name:type:version:scope`
pub fn parse_coordinates(line_number: usize, line: &str, coordinates: &str) -> Result<ArtifactRecord> {
    let tokens: Vec<&str> = coordinates
        .split(COORDINATE_DELIMITER)
        .map(str::trim)
        .collect();

    if tokens.len() != 5 {
        return Err(IsolationError::parse(
            line_number,
            line.trim(),
            format!(
                "expected 5 tokens group:name:type:version:scope, found {}",
                tokens.len()
            ),
        ));
    }
    if let Some(position) = tokens.iter().position(|t| t.is_empty()) {
        return Err(IsolationError::parse(
            line_number,
            line.trim(),
            format!("empty token at position {}", position + 1),
        ));
    }

    Ok(ArtifactRecord::new(
        tokens[0],
        tokens[1],
        tokens[2],
        tokens[3],
        Scope::parse(tokens[4]),
    ))
}

/// Strip trailing `[attrs]`, `;` and surrounding quotes
fn strip_decorations(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(bracket) = text.find('[') {
        text = &text[..bracket];
    }
    text = text.trim().trim_end_matches(';').trim();
    text.trim_matches('"').trim()
}

fn is_structural(line: &str) -> bool {
    line.is_empty()
        || line == "{"
        || line == "}"
        || line.starts_with("//")
        || line.starts_with('#')
}

fn graph_header(line: &str) -> Option<&str> {
    GRAPH_HEADERS
        .iter()
        .find_map(|header| line.strip_prefix(header))
        .filter(|rest| rest.starts_with(' ') || rest.starts_with('"') || rest.starts_with('{'))
}

/// Text between the first pair of double quotes
fn quoted(text: &str) -> Option<&str> {
    let start = text.find('"')? + 1;
    let end = start + text[start..].find('"')?;
    Some(&text[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GRAPH: &str = r#"digraph "g:app:jar:1:compile" {
  "g:app:jar:1:compile" -> "g:lib:jar:2:compile" ;
  "g:app-tests:test-jar:1:test" -> "junit:junit:jar:4:test"[style=dotted] ;
}
"#;

    #[test]
    fn test_parse_dot_graph() {
        let graph = DependencyGraphParser::new().parse_str(GRAPH).unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.artifact_under_test().unwrap().name(), "app");

        let first: Vec<String> = graph.artifacts().map(|a| a.to_string()).collect();
        assert_eq!(first[0], "g:app:jar:1:compile");
    }

    #[test]
    fn test_declarations_and_lazy_edges() {
        let content = "g:a:jar:1:compile\ng:b:jar:1:test -> g:c:jar:1:test\n";
        let graph = DependencyGraphParser::new().parse_str(content).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_malformed_line_names_line() {
        let content = "g:a:jar:1:compile\n\"g:a:jar:1:compile\" -> \"g:b:jar\"\n";
        let err = DependencyGraphParser::new().parse_str(content).unwrap_err();
        match err {
            IsolationError::Parse {
                line_number, line, ..
            } => {
                assert_eq!(line_number, 2);
                assert!(line.contains("g:b:jar"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_delimiter() {
        let content = "g:a:jar:1:compile => g:b:jar:1:compile\n";
        let graph = DependencyGraphParser::with_delimiter("=>")
            .parse_str(content)
            .unwrap();
        assert_eq!(graph.edge_count(), 1);

        // With the default delimiter the same line is one malformed coordinate
        assert!(DependencyGraphParser::new().parse_str(content).is_err());
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(GRAPH.as_bytes()).unwrap();

        let graph = DependencyGraphParser::new().parse_file(file.path()).unwrap();
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DependencyGraphParser::new()
            .parse_file("/definitely/not/here.dot")
            .unwrap_err();
        assert!(matches!(err, IsolationError::Io(_)));
    }

    #[test]
    fn test_flat_list() {
        let content = "The following files have been resolved:\n   g:a:jar:1:compile\n   g:b:jar:2\n   g:c:jar:1:test -- module c\n";
        let graph = DependencyGraphParser::new().parse_flat_list(content).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 0);

        let b: Vec<_> = graph.artifacts().filter(|a| a.name() == "b").collect();
        assert!(b[0].is_compile_scope());
    }

    #[test]
    fn test_flat_list_rejects_long_coordinates() {
        let content = "g:a:jar:x:1:compile:extra\n";
        assert!(DependencyGraphParser::new().parse_flat_list(content).is_err());
    }

    #[test]
    fn test_strip_decorations() {
        assert_eq!(strip_decorations(" \"g:a:jar:1:test\"[label=x] ;"), "g:a:jar:1:test");
        assert_eq!(strip_decorations("g:a:jar:1:test"), "g:a:jar:1:test");
    }
}
