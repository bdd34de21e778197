//! Shared models

mod artifact;
mod entry;

pub use artifact::{
    ArtifactKey, ArtifactRecord, Scope, COORDINATE_DELIMITER, POM_TYPE, TEST_JAR_TYPE,
};
pub use entry::{ClasspathEntry, EntryKind};
