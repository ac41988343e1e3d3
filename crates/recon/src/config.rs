use serde::Deserialize;

use crate::error::ReconError;
use crate::overrides::{OverrideRule, OverrideTable};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    pub source: DatasetConfig,
    pub target: DatasetConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Manual rewrite rules, applied in file order.
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

/// One CSV input and the column holding entity names.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub file: String,
    pub column: String,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub max_edit_distance: usize,
    #[serde(default)]
    pub mode: DistanceMode,
    #[serde(default)]
    pub transform: NameTransform,
    #[serde(default = "default_auto_accept")]
    pub auto_accept: bool,
    /// Source names known to have no counterpart in the target dataset.
    #[serde(default)]
    pub expected_unmatched: Vec<String>,
}

fn default_auto_accept() -> bool {
    true
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: 0,
            mode: DistanceMode::default(),
            transform: NameTransform::default(),
            auto_accept: default_auto_accept(),
            expected_unmatched: Vec::new(),
        }
    }
}

impl MatchingConfig {
    pub fn with_max_edit_distance(max_edit_distance: usize) -> Self {
        Self {
            max_edit_distance,
            ..Self::default()
        }
    }
}

/// How the edit distance between two names is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    /// Levenshtein distance between the whole strings.
    #[default]
    Whole,
    /// Fewest edits needed to find the source name anywhere inside the
    /// target name.
    Substring,
}

impl std::fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Whole => write!(f, "whole"),
            Self::Substring => write!(f, "substring"),
        }
    }
}

/// Normalization applied to both names before any comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameTransform {
    #[default]
    None,
    Trim,
    /// Trim, collapse internal whitespace, lowercase.
    Fold,
}

impl NameTransform {
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::None => name.to_string(),
            Self::Trim => name.trim().to_string(),
            Self::Fold => name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// JSON report path.
    #[serde(default)]
    pub json: Option<String>,
    /// Path for the target CSV with its name column rewritten.
    #[serde(default)]
    pub corrected: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (role, dataset) in [("source", &self.source), ("target", &self.target)] {
            if dataset.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{role}: file is empty")));
            }
            if dataset.column.is_empty() {
                return Err(ReconError::ConfigValidation(format!("{role}: column is empty")));
            }
        }

        // An empty pattern is contained in every name and would rewrite the
        // whole target column.
        for (i, rule) in self.overrides.iter().enumerate() {
            if rule.pattern.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "override #{}: pattern is empty",
                    i + 1
                )));
            }
        }

        Ok(())
    }

    pub fn override_table(&self) -> OverrideTable {
        OverrideTable::new(self.overrides.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
