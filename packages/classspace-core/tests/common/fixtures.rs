//! Test fixture generators

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use classspace_core::features::module_mapping::ModuleFolderMapping;
use classspace_core::{
    ClassPathClassifier, ClassificationRequest, ClasspathEntry, DependencyGraphParser,
    IsolationConfig, Result, StaticModuleMapping, TierClassification, TierClassifier,
};

/// Project of the reference scenario
pub const SCENARIO_PROJECT_DIR: &str = "/work/app";

/// App under test depends on a lib; its tests depend on junit
pub const SCENARIO_GRAPH: &str = r#"digraph "g:app:jar:1:compile" {
  "g:app:jar:1:compile" -> "g:lib:jar:2:compile" ;
  "g:app-tests:test-jar:1:test" -> "junit:junit:jar:4:test" ;
}
"#;

pub const APP_TEST_CLASSES: &str = "/work/app/target/test-classes/";
pub const JUNIT_JAR: &str = "/repo/junit/junit/4/junit-4.jar";
pub const LIB_JAR: &str = "/repo/g/lib/2/lib-2.jar";
pub const JRE_JAR: &str = "/jre/lib/rt.jar";

pub fn scenario_classpath() -> Vec<ClasspathEntry> {
    classpath(&[APP_TEST_CLASSES, JUNIT_JAR, LIB_JAR, JRE_JAR])
}

pub fn scenario_config() -> IsolationConfig {
    IsolationConfig::new()
        .project_dir(SCENARIO_PROJECT_DIR)
        .app_exclusions("g*:*:*")
}

/// `app-tests` is a sibling module living in the project folder
pub fn scenario_mapping() -> StaticModuleMapping {
    StaticModuleMapping::new().with("app-tests", "/app/")
}

pub fn classpath(locations: &[&str]) -> Vec<ClasspathEntry> {
    locations.iter().map(ClasspathEntry::new).collect()
}

pub fn entry_set(locations: &[&str]) -> BTreeSet<ClasspathEntry> {
    classpath(locations).into_iter().collect()
}

/// Parse `graph` and classify `classpath` with the default classifier
pub fn classify(
    config: &IsolationConfig,
    classpath: &[ClasspathEntry],
    graph: &str,
    mapping: &dyn ModuleFolderMapping,
) -> Result<TierClassification> {
    let graph = DependencyGraphParser::with_delimiter(config.edge_delimiter.clone()).parse_str(graph)?;
    let request = ClassificationRequest {
        config,
        classpath,
        graph: &graph,
        module_mapping: mapping,
    };
    TierClassifier::new().classify(&request)
}

/// Write a `.tar` archive holding `files` (member path, content)
pub fn write_tar(path: &Path, files: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut builder = tar::Builder::new(file);
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().flush().unwrap();
}

/// Write a zip-format archive (`.jar`) holding `files` (member path, content)
pub fn write_jar(path: &Path, files: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in files {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().flush().unwrap();
}

/// Write `content` at `root/relative`, creating parent folders
pub fn write_file(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}
