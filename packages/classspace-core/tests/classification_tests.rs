//! Integration tests for tier classification

mod common;

use classspace_core::{
    ClasspathEntry, ExtensionSpec, IsolationConfig, IsolationError, PluginSpace, ProvidedPrecedence,
    StaticModuleMapping,
};
use common::*;
use pretty_assertions::assert_eq;

#[test]
fn test_reference_scenario() {
    let classpath = scenario_classpath();
    let result = classify(
        &scenario_config(),
        &classpath,
        SCENARIO_GRAPH,
        &scenario_mapping(),
    )
    .unwrap();

    assert_eq!(result.artifact_under_test.to_string(), "g:app:jar:1:compile");
    assert_eq!(result.application, entry_set(&[APP_TEST_CLASSES, JUNIT_JAR]));
    assert_eq!(result.container, entry_set(&[LIB_JAR, JRE_JAR]));
    assert!(result.plugins.is_empty());
    assert_tiers_disjoint(&result);
    assert_within_classpath(&result, &classpath, &[]);
}

#[test]
fn test_missing_artifact_fails_with_coordinates() {
    let graph = "g:app:jar:1:compile\nx:missing:jar:1:test\n";
    let err = classify(
        &scenario_config(),
        &scenario_classpath(),
        graph,
        &StaticModuleMapping::new(),
    )
    .unwrap_err();

    match err {
        IsolationError::ArtifactResolution { artifact, .. } => {
            assert_eq!(artifact, "x:missing:jar:1:test");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_test_node_kept_even_if_excluded() {
    // app-tests matches the exclusion but is a test scope node itself
    let result = classify(
        &scenario_config().app_exclusions("g*:*:*,junit:*:*"),
        &scenario_classpath(),
        SCENARIO_GRAPH,
        &scenario_mapping(),
    )
    .unwrap();

    // junit is still a test scope node of its own
    assert_eq!(result.application, entry_set(&[APP_TEST_CLASSES, JUNIT_JAR]));
}

#[test]
fn test_excluded_transitive_dependency_stays_out_of_application() {
    let graph = "g:app:jar:1:compile\n\
                 g:app-tests:test-jar:1:test -> org.acme:helper:jar:1:compile\n";
    let classpath = classpath(&[
        APP_TEST_CLASSES,
        "/repo/org/acme/helper/1/helper-1.jar",
        JRE_JAR,
    ]);

    let included = classify(&scenario_config(), &classpath, graph, &scenario_mapping()).unwrap();
    assert!(included.application.contains(&classpath[1]));

    let excluded = classify(
        &scenario_config().app_exclusions("g*:*:*,org.acme:*:*"),
        &classpath,
        graph,
        &scenario_mapping(),
    )
    .unwrap();
    assert!(!excluded.application.contains(&classpath[1]));
    assert!(excluded.container.contains(&classpath[1]));
}

#[test]
fn test_compile_node_contributes_test_dependencies() {
    let graph = "g:app:jar:1:compile -> org.mockito:mockito-core:jar:5:test\n\
                 g:app:jar:1:compile -> org.acme:runtime:jar:1:compile\n";
    let classpath = classpath(&[
        "/repo/g/app/1/app-1.jar",
        "/repo/org/mockito/mockito-core/5/mockito-core-5.jar",
        "/repo/org/acme/runtime/1/runtime-1.jar",
    ]);
    let config = IsolationConfig::new().project_dir(SCENARIO_PROJECT_DIR);

    let result = classify(&config, &classpath, graph, &StaticModuleMapping::new()).unwrap();
    assert_eq!(
        result.application,
        entry_set(&["/repo/org/mockito/mockito-core/5/mockito-core-5.jar"])
    );
    assert_eq!(
        result.container,
        entry_set(&["/repo/g/app/1/app-1.jar", "/repo/org/acme/runtime/1/runtime-1.jar"])
    );
}

const SHARED_GRAPH: &str = "g:app:jar:1:compile -> org.acme:shared:jar:1:provided\n\
                            g:app-tests:test-jar:1:test -> org.acme:shared:jar:1:test\n";
const SHARED_JAR: &str = "/repo/org/acme/shared/1/shared-1.jar";

#[test]
fn test_provided_wins_by_default() {
    let classpath = classpath(&[APP_TEST_CLASSES, SHARED_JAR, JRE_JAR]);
    let result = classify(&scenario_config(), &classpath, SHARED_GRAPH, &scenario_mapping()).unwrap();

    assert_eq!(result.application, entry_set(&[APP_TEST_CLASSES]));
    assert_eq!(result.container, entry_set(&[SHARED_JAR, JRE_JAR]));
    assert_tiers_disjoint(&result);
}

#[test]
fn test_application_precedence_keeps_shared_entry() {
    let classpath = classpath(&[APP_TEST_CLASSES, SHARED_JAR, JRE_JAR]);
    let config = scenario_config().provided_precedence(ProvidedPrecedence::Application);
    let result = classify(&config, &classpath, SHARED_GRAPH, &scenario_mapping()).unwrap();

    assert_eq!(result.application, entry_set(&[APP_TEST_CLASSES, SHARED_JAR]));
    assert_eq!(result.container, entry_set(&[JRE_JAR]));
    assert_tiers_disjoint(&result);
}

#[test]
fn test_provided_closure_skips_test_dependencies() {
    let graph = "g:app:jar:1:compile\n\
                 org.acme:api:jar:1:provided -> org.acme:impl:jar:1:compile\n\
                 org.acme:api:jar:1:provided -> org.acme:api-testkit:jar:1:test\n";
    let classpath = classpath(&[
        "/repo/org/acme/api/1/api-1.jar",
        "/repo/org/acme/impl/1/impl-1.jar",
        "/repo/org/acme/api-testkit/1/api-testkit-1.jar",
    ]);
    let config = IsolationConfig::new().project_dir(SCENARIO_PROJECT_DIR);

    let result = classify(&config, &classpath, graph, &StaticModuleMapping::new()).unwrap();
    assert_eq!(
        result.container,
        entry_set(&["/repo/org/acme/api/1/api-1.jar", "/repo/org/acme/impl/1/impl-1.jar"])
    );
    // the test kit is a test scope node, so the application tier claims it
    assert_eq!(
        result.application,
        entry_set(&["/repo/org/acme/api-testkit/1/api-testkit-1.jar"])
    );
}

#[test]
fn test_extension_plugin_tier() {
    let graph = "g:app:jar:1:compile -> org.acme:acme-file:jar:1:compile\n\
                 org.acme:acme-file:jar:1:compile -> commons:io:jar:2:compile\n\
                 g:app:jar:1:compile -> junit:junit:jar:4:test\n";
    let metadata = "/work/app/target/plugins/file/";
    let classpath = classpath(&[
        APP_TEST_CLASSES,
        "/repo/g/app/1/app-1.jar",
        "/repo/org/acme/acme-file/1/acme-file-1.jar",
        "/repo/commons/io/2/io-2.jar",
        JUNIT_JAR,
        JRE_JAR,
    ]);
    let config = scenario_config().extension(
        ExtensionSpec::new("file", "org.acme:acme-file:*").with_metadata_location(metadata),
    );

    let result = classify(&config, &classpath, graph, &StaticModuleMapping::new()).unwrap();

    let plugin = result.plugin("file").unwrap();
    assert_eq!(
        plugin.entries,
        entry_set(&[
            "/repo/org/acme/acme-file/1/acme-file-1.jar",
            "/repo/commons/io/2/io-2.jar",
            metadata,
        ])
    );
    assert_eq!(result.application, entry_set(&[APP_TEST_CLASSES, JUNIT_JAR]));
    assert_eq!(
        result.container,
        entry_set(&["/repo/g/app/1/app-1.jar", JRE_JAR])
    );
    assert_tiers_disjoint(&result);
    assert_within_classpath(&result, &classpath, &[ClasspathEntry::new(metadata)]);
}

#[test]
fn test_plugins_are_disjoint_in_declaration_order() {
    let graph = "g:app:jar:1:compile -> org.acme:acme-file:jar:1:compile\n\
                 g:app:jar:1:compile -> org.acme:acme-ftp:jar:1:compile\n\
                 org.acme:acme-file:jar:1:compile -> commons:io:jar:2:compile\n\
                 org.acme:acme-ftp:jar:1:compile -> commons:io:jar:2:compile\n";
    let classpath = classpath(&[
        "/repo/org/acme/acme-file/1/acme-file-1.jar",
        "/repo/org/acme/acme-ftp/1/acme-ftp-1.jar",
        "/repo/commons/io/2/io-2.jar",
    ]);
    let config = scenario_config()
        .extension(ExtensionSpec::new("file", "org.acme:acme-file:*"))
        .extension(ExtensionSpec::new("ftp", "org.acme:acme-ftp:*"));

    let result = classify(&config, &classpath, graph, &StaticModuleMapping::new()).unwrap();

    assert!(result
        .plugin("file")
        .unwrap()
        .entries
        .contains(&classpath[2]));
    assert_eq!(
        result.plugin("ftp").unwrap().entries,
        entry_set(&["/repo/org/acme/acme-ftp/1/acme-ftp-1.jar"])
    );
    assert_tiers_disjoint(&result);
}

#[test]
fn test_all_compile_plugin_space_excludes_application_entries() {
    let graph = "g:app:jar:1:compile -> org.acme:both:jar:1:compile\n\
                 g:app-tests:test-jar:1:test -> org.acme:both:jar:1:test\n";
    let classpath = classpath(&[
        APP_TEST_CLASSES,
        "/repo/g/app/1/app-1.jar",
        "/repo/org/acme/both/1/both-1.jar",
    ]);
    let config = IsolationConfig::new()
        .project_dir(SCENARIO_PROJECT_DIR)
        .plugin_space(PluginSpace::AllCompile);

    let result = classify(&config, &classpath, graph, &scenario_mapping()).unwrap();
    assert!(result.application.contains(&classpath[2]));
    assert_eq!(result.plugins[0].entries, entry_set(&["/repo/g/app/1/app-1.jar"]));
    assert!(result.container.is_empty());
    assert_tiers_disjoint(&result);
}

#[test]
fn test_pom_artifacts_are_skipped() {
    let graph = "g:app:jar:1:compile -> g:parent:pom:1:compile\n\
                 g:app-tests:test-jar:1:test -> junit:bom:pom:4:test\n";
    let result = classify(
        &scenario_config(),
        &scenario_classpath(),
        graph,
        &scenario_mapping(),
    )
    .unwrap();
    assert_eq!(result.application, entry_set(&[APP_TEST_CLASSES]));
}

#[test]
fn test_cyclic_graph_terminates() {
    let graph = "g:app:jar:1:compile\n\
                 g:app-tests:test-jar:1:test -> org.acme:a:jar:1:test\n\
                 org.acme:a:jar:1:test -> org.acme:b:jar:1:test\n\
                 org.acme:b:jar:1:test -> org.acme:a:jar:1:test\n";
    let classpath = classpath(&[
        APP_TEST_CLASSES,
        "/repo/org/acme/a/1/a-1.jar",
        "/repo/org/acme/b/1/b-1.jar",
    ]);

    let result = classify(&scenario_config(), &classpath, graph, &scenario_mapping()).unwrap();
    assert_eq!(result.application.len(), 3);
}

#[test]
fn test_classification_serializes_to_json() {
    let result = classify(
        &scenario_config(),
        &scenario_classpath(),
        SCENARIO_GRAPH,
        &scenario_mapping(),
    )
    .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["artifact_under_test"], "g:app:jar:1:compile");
    assert_eq!(json["application"].as_array().unwrap().len(), 2);
    assert_eq!(json["container"][0]["kind"], "archive");
}
