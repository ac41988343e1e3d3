//! Ordered manual rewrite rules for target names.

use serde::{Deserialize, Serialize};

use crate::model::{Corpus, NameRecord};

/// Rewrite every target name containing `pattern` to `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OverrideRule {
    pub pattern: String,
    pub replacement: String,
}

impl OverrideRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        name.contains(&self.pattern)
    }
}

/// Rules are applied in sequence; a later rule sees names already
/// rewritten by earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OverrideTable {
    rules: Vec<OverrideRule>,
}

impl OverrideTable {
    pub fn new(rules: Vec<OverrideRule>) -> Self {
        Self { rules }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(pairs.into_iter().map(|(p, r)| OverrideRule::new(p, r)).collect())
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run one name through every rule in order.
    pub fn rewrite(&self, name: &str) -> NameRecord {
        self.rewrite_from(0, name.to_string())
    }

    fn rewrite_from(&self, start: usize, mut current: NameRecord) -> NameRecord {
        for rule in &self.rules[start..] {
            if rule.matches(&current) {
                current = rule.replacement.clone();
            }
        }
        current
    }

    /// True when a second pass over rewritten names changes nothing.
    ///
    /// A name no rule matches is left alone on both passes. Any other output
    /// is some rule's replacement run through the rules after it, so checking
    /// those outputs covers every input.
    pub fn is_idempotent(&self) -> bool {
        self.rules.iter().enumerate().all(|(i, rule)| {
            let out = self.rewrite_from(i + 1, rule.replacement.clone());
            self.rewrite(&out) == out
        })
    }
}

/// Rewrite the target corpus through `overrides`.
///
/// The result is position-aligned with `target`; distinct names may collapse
/// into the same replacement, so it is no longer a `Corpus`.
pub fn apply_overrides(target: &Corpus, overrides: &OverrideTable) -> Vec<NameRecord> {
    target.iter().map(|name| overrides.rewrite(name)).collect()
}
