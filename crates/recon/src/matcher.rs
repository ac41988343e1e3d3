use std::collections::HashSet;

use strsim::{jaro_winkler, levenshtein};

use crate::config::{DistanceMode, MatchingConfig, NameTransform};
use crate::model::{Corpus, MatchOutcome, NameRecord, ScoredCandidate};

/// Source names (in source order) with no exact, case-sensitive match in
/// `target`.
pub fn find_unmatched(source: &Corpus, target: &Corpus) -> Vec<NameRecord> {
    find_unmatched_with(source, target, NameTransform::None)
}

/// Like [`find_unmatched`], comparing names after `transform`.
pub fn find_unmatched_with(
    source: &Corpus,
    target: &Corpus,
    transform: NameTransform,
) -> Vec<NameRecord> {
    let target_keys: HashSet<String> = target.iter().map(|n| transform.apply(n)).collect();
    source
        .iter()
        .filter(|n| !target_keys.contains(&transform.apply(n)))
        .cloned()
        .collect()
}

/// Edit distance between a source name and a target name.
pub fn edit_distance(source: &str, target: &str, mode: DistanceMode) -> usize {
    match mode {
        DistanceMode::Whole => levenshtein(source, target),
        DistanceMode::Substring => substring_distance(source, target),
    }
}

/// Fewest insertions, deletions or substitutions that turn `pattern` into
/// some substring of `text`. The match may start anywhere in `text` at no
/// cost.
fn substring_distance(pattern: &str, text: &str) -> usize {
    let text: Vec<char> = text.chars().collect();
    let mut prev = vec![0usize; text.len() + 1];

    for (i, pc) in pattern.chars().enumerate() {
        let mut cur = vec![0usize; text.len() + 1];
        cur[0] = i + 1;
        for (j, tc) in text.iter().enumerate() {
            let substitution = prev[j] + usize::from(pc != *tc);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }

    prev.into_iter().min().unwrap_or(0)
}

/// Every target name within `max_edit_distance` Levenshtein edits of `name`,
/// in target order. A tolerance of 0 is exact matching.
pub fn fuzzy_candidates(name: &str, target: &Corpus, max_edit_distance: usize) -> Vec<NameRecord> {
    fuzzy_candidates_with(name, target, &MatchingConfig::with_max_edit_distance(max_edit_distance))
}

/// Like [`fuzzy_candidates`], honoring the configured mode and transform.
pub fn fuzzy_candidates_with(name: &str, target: &Corpus, matching: &MatchingConfig) -> Vec<NameRecord> {
    score_candidates(name, target, matching)
        .into_iter()
        .map(|c| c.target)
        .collect()
}

/// Candidates within tolerance together with their distance and
/// Jaro-Winkler similarity, in target order.
pub fn score_candidates(name: &str, target: &Corpus, matching: &MatchingConfig) -> Vec<ScoredCandidate> {
    let needle = matching.transform.apply(name);
    target
        .iter()
        .filter_map(|candidate| {
            let hay = matching.transform.apply(candidate);
            let distance = edit_distance(&needle, &hay, matching.mode);
            (distance <= matching.max_edit_distance).then(|| ScoredCandidate {
                target: candidate.clone(),
                distance,
                similarity: jaro_winkler(&needle, &hay),
            })
        })
        .collect()
}

/// Tag the fuzzy result for `name` as unmatched, single or ambiguous.
pub fn classify(name: &str, target: &Corpus, matching: &MatchingConfig) -> MatchOutcome {
    MatchOutcome::from_candidates(fuzzy_candidates_with(name, target, matching))
}
