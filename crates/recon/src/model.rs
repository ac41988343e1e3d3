use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A single entity label from one dataset, compared only as text.
pub type NameRecord = String;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free list of names taken from one dataset column.
///
/// The first occurrence of a name fixes its position; later repeats are
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Corpus {
    names: Vec<NameRecord>,
}

impl Corpus {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NameRecord>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for name in names {
            let name = name.into();
            if seen.insert(name.clone()) {
                out.push(name);
            }
        }
        Self { names: out }
    }

    pub fn names(&self) -> &[NameRecord] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NameRecord> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

impl<S: Into<NameRecord>> FromIterator<S> for Corpus {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a NameRecord;
    type IntoIter = std::slice::Iter<'a, NameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Pre-loaded corpora for one reconciliation run.
pub struct ReconInput {
    pub source: Corpus,
    pub target: Corpus,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    ManualOverride,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::ManualOverride => write!(f, "manual_override"),
        }
    }
}

/// One source name and the target name(s) it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub source: NameRecord,
    pub targets: Vec<NameRecord>,
    pub kind: MatchKind,
}

/// Result of a fuzzy lookup for one source name.
///
/// Ambiguity is a value, not an error: callers have to decide what to do
/// with `MultipleMatches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "targets", rename_all = "snake_case")]
pub enum MatchOutcome {
    Unmatched,
    SingleMatch(NameRecord),
    MultipleMatches(Vec<NameRecord>),
}

impl MatchOutcome {
    pub fn from_candidates(mut candidates: Vec<NameRecord>) -> Self {
        match candidates.len() {
            0 => Self::Unmatched,
            1 => Self::SingleMatch(candidates.remove(0)),
            _ => Self::MultipleMatches(candidates),
        }
    }

    pub fn targets(&self) -> &[NameRecord] {
        match self {
            Self::Unmatched => &[],
            Self::SingleMatch(t) => std::slice::from_ref(t),
            Self::MultipleMatches(ts) => ts,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::MultipleMatches(_))
    }
}

/// A fuzzy candidate with the scores it was found with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub target: NameRecord,
    pub distance: usize,
    /// Jaro-Winkler similarity in `[0, 1]`, for human review only.
    pub similarity: f64,
}

/// Fuzzy pass result for a source name that had no exact match.
#[derive(Debug, Clone, Serialize)]
pub struct FuzzySuggestion {
    pub source: NameRecord,
    pub outcome: MatchOutcome,
    pub scores: Vec<ScoredCandidate>,
}

// ---------------------------------------------------------------------------
// Reconciliation table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteEntry {
    pub target: NameRecord,
    pub replacement: NameRecord,
    pub kind: MatchKind,
}

/// Target-name rewrites applied before the join. At most one entry per
/// target name; the first entry inserted for a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReconciliationTable {
    entries: Vec<RewriteEntry>,
}

impl ReconciliationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RewriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, target: &str) -> Option<&RewriteEntry> {
        self.entries.iter().find(|e| e.target == target)
    }

    /// Returns `false` (and keeps the existing entry) if `entry.target`
    /// already has a rewrite.
    pub fn insert(&mut self, entry: RewriteEntry) -> bool {
        if self.get(&entry.target).is_some() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn count(&self, kind: MatchKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Replacement for `name`, or `name` itself when no entry applies.
    pub fn rewrite<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).map(|e| e.replacement.as_str()).unwrap_or(name)
    }

    /// Rewrite every name; the output is position-aligned with `names`.
    pub fn apply(&self, names: &[NameRecord]) -> Vec<NameRecord> {
        names.iter().map(|n| self.rewrite(n).to_string()).collect()
    }

    /// Entries grouped by replacement, one candidate per source name.
    ///
    /// A source name fed by both manual and automatic entries is reported as
    /// `manual_override`.
    pub fn candidates(&self) -> Vec<MatchCandidate> {
        let mut out: Vec<MatchCandidate> = Vec::new();
        for e in &self.entries {
            if let Some(c) = out.iter_mut().find(|c| c.source == e.replacement) {
                c.targets.push(e.target.clone());
                if e.kind == MatchKind::ManualOverride {
                    c.kind = MatchKind::ManualOverride;
                }
            } else {
                out.push(MatchCandidate {
                    source: e.replacement.clone(),
                    targets: vec![e.target.clone()],
                    kind: e.kind,
                });
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// A rewrite that was dropped because it would break an existing exact match.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRewrite {
    #[serde(flatten)]
    pub entry: RewriteEntry,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub source_names: usize,
    pub target_names: usize,
    pub exact: usize,
    pub unmatched_before: usize,
    pub unmatched_after: usize,
    /// Unmatched names listed under `expected_unmatched` in the config.
    pub expected_unmatched: usize,
    pub ambiguous: usize,
    pub manual_rewrites: usize,
    pub fuzzy_rewrites: usize,
    pub rejected_rewrites: usize,
    pub unmatched_targets_before: usize,
    pub unmatched_targets_after: usize,
}

impl ReconSummary {
    /// Unmatched names the config did not expect.
    pub fn unexpected_unmatched(&self) -> usize {
        self.unmatched_after.saturating_sub(self.expected_unmatched)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub max_edit_distance: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub matches: Vec<MatchCandidate>,
    pub suggestions: Vec<FuzzySuggestion>,
    pub table: ReconciliationTable,
    pub rejected: Vec<RejectedRewrite>,
    /// Target names after rewriting, position-aligned with the target corpus.
    pub corrected_target: Vec<NameRecord>,
    pub unmatched: Vec<NameRecord>,
    pub ambiguous: Vec<FuzzySuggestion>,
}
