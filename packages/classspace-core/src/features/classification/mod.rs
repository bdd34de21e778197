//! Classpath classification feature
//!
//! - `entry_resolver`: artifact → classpath entry (repository layout, then module fallback)
//! - `classifier`: [`ClassPathClassifier`] seam and the default [`TierClassifier`]
//! - `types`: [`TierClassification`] result

mod classifier;
mod entry_resolver;
mod types;

pub use classifier::{
    ClassPathClassifier, ClassificationRequest, TierClassifier, ALL_COMPILE_PLUGIN,
};
pub use entry_resolver::EntryResolver;
pub use types::{PluginTier, TierClassification};
