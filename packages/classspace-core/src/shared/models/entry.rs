//! Classpath entries
//!
//! Locations are stored with `/` separators. Directory locations always end in
//! `/`, which is what the archive-style and module-folder lookups match on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip", "tar", "war"];

/// Physical kind of a classpath entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    Archive,
}

/// A resolvable location (archive or directory)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClasspathEntry {
    location: String,
    kind: EntryKind,
}

impl ClasspathEntry {
    /// Create an entry, inferring its kind from the location suffix
    ///
    /// Locations with an archive extension are archives, everything else is a
    /// directory and gets a trailing `/`.
    pub fn new(location: impl AsRef<str>) -> Self {
        let normalized = location.as_ref().trim().replace('\\', "/");
        if is_archive_location(&normalized) {
            Self::archive(normalized)
        } else {
            Self::directory(normalized)
        }
    }

    pub fn directory(location: impl Into<String>) -> Self {
        let mut location = location.into().replace('\\', "/");
        if !location.ends_with('/') {
            location.push('/');
        }
        Self {
            location,
            kind: EntryKind::Directory,
        }
    }

    pub fn archive(location: impl Into<String>) -> Self {
        Self {
            location: location.into().replace('\\', "/"),
            kind: EntryKind::Archive,
        }
    }

    /// Entry for a filesystem path (directories detected on disk)
    pub fn from_path(path: &Path) -> Self {
        let location = path.to_string_lossy();
        if path.is_dir() {
            Self::directory(location.as_ref())
        } else {
            Self::new(location.as_ref())
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_archive(&self) -> bool {
        self.kind == EntryKind::Archive
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.location)
    }
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

fn is_archive_location(location: &str) -> bool {
    if location.ends_with('/') {
        return false;
    }
    Path::new(location)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
