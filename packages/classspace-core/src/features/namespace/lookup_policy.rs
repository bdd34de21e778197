//! Per-prefix delegation policy

use std::collections::BTreeMap;
use std::fmt;

/// How a resolver treats a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LookupMode {
    /// Parent first, then own search path
    ParentFirst,
    /// Parent only, own search path never inspected
    ParentOnly,
    /// Own search path first, then parent
    #[default]
    SelfFirst,
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LookupMode::ParentFirst => "parent-first",
            LookupMode::ParentOnly => "parent-only",
            LookupMode::SelfFirst => "self-first",
        };
        f.write_str(text)
    }
}

/// Prefix → mode table with longest-prefix matching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupPolicy {
    rules: BTreeMap<String, LookupMode>,
    default_mode: LookupMode,
}

impl LookupPolicy {
    /// Create a policy where every name uses `default_mode`
    pub fn new(default_mode: LookupMode) -> Self {
        Self {
            rules: BTreeMap::new(),
            default_mode,
        }
    }

    pub fn with_rule(mut self, prefix: impl Into<String>, mode: LookupMode) -> Self {
        self.add_rule(prefix, mode);
        self
    }

    /// Add a rule, replacing any rule for the same prefix
    pub fn add_rule(&mut self, prefix: impl Into<String>, mode: LookupMode) {
        self.rules.insert(prefix.into(), mode);
    }

    pub fn default_mode(&self) -> LookupMode {
        self.default_mode
    }

    pub fn rules(&self) -> impl Iterator<Item = (&str, LookupMode)> {
        self.rules.iter().map(|(prefix, mode)| (prefix.as_str(), *mode))
    }

    /// Mode of the longest prefix `name` starts with
    pub fn mode_for(&self, name: &str) -> LookupMode {
        self.rules
            .iter()
            .filter(|(prefix, _)| name.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, mode)| *mode)
            .unwrap_or(self.default_mode)
    }
}
