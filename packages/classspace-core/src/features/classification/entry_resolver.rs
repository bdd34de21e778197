//! Artifact → classpath entry resolution
//!
//! Strategy 1: repository layout. The first entry whose location contains
//! `<group-as-path>/<name>/`.
//!
//! Strategy 2: multi-module fallback. The module folder of the artifact (from
//! [`ModuleFolderMapping`]) followed by `target/`, where the remaining suffix is
//! either an exploded output directory or a packaged archive:
//!
//! | artifact          | exploded        | packaged                         |
//! |-------------------|-----------------|----------------------------------|
//! | test `test-jar`   | `test-classes/` | `*-tests.jar`                    |
//! | anything else     | `classes/`      | `*.jar` not ending in `-tests.jar` |

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{IsolationError, Result};
use crate::features::module_mapping::ModuleFolderMapping;
use crate::shared::models::{ArtifactRecord, ClasspathEntry};

const MODULE_BUILD_FOLDER: &str = "target/";
const EXPLODED_CLASSES: &str = "classes/";
const EXPLODED_TEST_CLASSES: &str = "test-classes/";

static PACKAGED_TESTS_ARCHIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*-tests\.jar$").expect("valid tests archive regex"));
static PACKAGED_ARCHIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*\.jar$").expect("valid archive regex"));

/// Resolves artifacts against one classpath
pub struct EntryResolver<'a> {
    classpath: &'a [ClasspathEntry],
    mapping: &'a dyn ModuleFolderMapping,
}

impl<'a> EntryResolver<'a> {
    pub fn new(classpath: &'a [ClasspathEntry], mapping: &'a dyn ModuleFolderMapping) -> Self {
        Self { classpath, mapping }
    }

    /// Resolve one artifact
    ///
    /// Returns `Ok(None)` for `pom` artifacts, which never carry code.
    pub fn resolve(&self, artifact: &ArtifactRecord) -> Result<Option<ClasspathEntry>> {
        if artifact.is_pom() {
            tracing::debug!("Artifact ignored and not added to any tier: {}", artifact);
            return Ok(None);
        }

        let repository_path = format!("{}/{}/", artifact.group_as_path(), artifact.name());
        if let Some(entry) = self
            .classpath
            .iter()
            .find(|entry| entry.location().contains(&repository_path))
        {
            return Ok(Some(entry.clone()));
        }

        self.resolve_module(artifact, &repository_path).map(Some)
    }

    /// Resolve every artifact, dropping `pom`s
    pub fn resolve_all<'b, I>(&self, artifacts: I) -> Result<Vec<ClasspathEntry>>
    where
        I: IntoIterator<Item = &'b ArtifactRecord>,
    {
        let mut entries = Vec::new();
        for artifact in artifacts {
            if let Some(entry) = self.resolve(artifact)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn resolve_module(
        &self,
        artifact: &ArtifactRecord,
        repository_path: &str,
    ) -> Result<ClasspathEntry> {
        let folder = self.mapping.folder_for(artifact.name()).ok_or_else(|| {
            IsolationError::ArtifactResolution {
                artifact: artifact.to_string(),
                attempted: format!(
                    "no entry containing '{}' and no module folder mapping for '{}' (mapping used: {})",
                    repository_path,
                    artifact.name(),
                    self.mapping.describe()
                ),
            }
        })?;
        let module_folder = format!("{}{}", folder, MODULE_BUILD_FOLDER);

        let test_classifier = artifact.is_test_classifier();
        let exploded = if test_classifier {
            EXPLODED_TEST_CLASSES
        } else {
            EXPLODED_CLASSES
        };

        let found = self.classpath.iter().find(|entry| {
            let location = entry.location();
            match location.rfind(&module_folder) {
                Some(position) => {
                    let suffix = &location[position + module_folder.len()..];
                    suffix == exploded || is_packaged(suffix, test_classifier)
                }
                None => false,
            }
        });

        match found {
            Some(entry) => Ok(entry.clone()),
            None => Err(IsolationError::ArtifactResolution {
                artifact: artifact.to_string(),
                attempted: format!(
                    "no entry containing '{}'; as multi-module dependency on module folder '{}' using exploded suffix '{}' or packaged suffix '{}'",
                    repository_path,
                    module_folder,
                    exploded,
                    if test_classifier {
                        PACKAGED_TESTS_ARCHIVE.as_str()
                    } else {
                        "*.jar excluding *-tests.jar"
                    }
                ),
            }),
        }
    }
}

fn is_packaged(suffix: &str, test_classifier: bool) -> bool {
    if test_classifier {
        PACKAGED_TESTS_ARCHIVE.is_match(suffix)
    } else {
        PACKAGED_ARCHIVE.is_match(suffix) && !PACKAGED_TESTS_ARCHIVE.is_match(suffix)
    }
}
