//! Custom assertions for tier classifications

use std::collections::BTreeSet;

use classspace_core::{ClasspathEntry, TierClassification};

/// Assert that no entry belongs to two tiers
pub fn assert_tiers_disjoint(classification: &TierClassification) {
    let mut seen: BTreeSet<&ClasspathEntry> = BTreeSet::new();
    let tiers = std::iter::once(("container", &classification.container))
        .chain(
            classification
                .plugins
                .iter()
                .map(|p| (p.name.as_str(), &p.entries)),
        )
        .chain(std::iter::once(("application", &classification.application)));

    for (name, entries) in tiers {
        for entry in entries {
            assert!(
                seen.insert(entry),
                "Entry {entry} of tier {name} is already assigned to another tier"
            );
        }
    }
}

/// Assert that every assigned entry comes from the classpath (or `extra`)
pub fn assert_within_classpath(
    classification: &TierClassification,
    classpath: &[ClasspathEntry],
    extra: &[ClasspathEntry],
) {
    for entry in classification.assigned() {
        assert!(
            classpath.contains(entry) || extra.contains(entry),
            "Entry {entry} is not on the classpath"
        );
    }
}
