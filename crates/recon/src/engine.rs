use std::collections::{HashMap, HashSet};

use crate::config::{MatchingConfig, ReconConfig};
use crate::error::ReconError;
use crate::matcher::{find_unmatched_with, score_candidates};
use crate::model::{
    Corpus, FuzzySuggestion, MatchCandidate, MatchKind, MatchOutcome, NameRecord, ReconInput,
    ReconMeta, ReconResult, ReconSummary, ReconciliationTable, RejectedRewrite, RewriteEntry,
};
use crate::overrides::{apply_overrides, OverrideTable};

/// Run reconciliation per config. Returns the rewrite table, the corrected
/// target names and whatever is still unmatched.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    config.validate()?;

    let matching = &config.matching;
    let transform = matching.transform;
    let source = &input.source;
    let target = &input.target;

    let unmatched_before = find_unmatched_with(source, target, transform);
    log::info!(
        "{}: {} of {} source names have no exact match",
        config.name,
        unmatched_before.len(),
        source.len()
    );

    let suggestions: Vec<FuzzySuggestion> = unmatched_before
        .iter()
        .map(|name| suggest(name, target, matching))
        .collect();

    let (table, rejected) = build_table(source, target, &config.override_table(), matching, &suggestions);

    let corrected_target = table.apply(target.names());
    let corrected = Corpus::from_names(corrected_target.iter().cloned());
    let unmatched = find_unmatched_with(source, &corrected, transform);

    let ambiguous: Vec<FuzzySuggestion> = suggestions
        .iter()
        .filter(|s| s.outcome.is_ambiguous() && unmatched.contains(&s.source))
        .cloned()
        .collect();
    for s in &ambiguous {
        log::warn!(
            "'{}' is ambiguous: {} candidates ({}), needs a manual rule",
            s.source,
            s.outcome.targets().len(),
            s.outcome.targets().join(", ")
        );
    }

    let expected: HashSet<String> = matching
        .expected_unmatched
        .iter()
        .map(|n| transform.apply(n))
        .collect();
    let expected_unmatched = unmatched
        .iter()
        .filter(|n| expected.contains(&transform.apply(n)))
        .count();

    let mut matches = exact_matches(source, target, matching, &unmatched_before);
    let exact = matches.len();
    matches.extend(table.candidates());

    let summary = ReconSummary {
        source_names: source.len(),
        target_names: target.len(),
        exact,
        unmatched_before: unmatched_before.len(),
        unmatched_after: unmatched.len(),
        expected_unmatched,
        ambiguous: ambiguous.len(),
        manual_rewrites: table.count(MatchKind::ManualOverride),
        fuzzy_rewrites: table.count(MatchKind::Fuzzy),
        rejected_rewrites: rejected.len(),
        unmatched_targets_before: find_unmatched_with(target, source, transform).len(),
        unmatched_targets_after: find_unmatched_with(&corrected, source, transform).len(),
    };

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            max_edit_distance: matching.max_edit_distance,
        },
        summary,
        matches,
        suggestions,
        table,
        rejected,
        corrected_target,
        unmatched,
        ambiguous,
    })
}

/// Fuzzy pass for one source name.
pub fn suggest(name: &str, target: &Corpus, matching: &MatchingConfig) -> FuzzySuggestion {
    let scores = score_candidates(name, target, matching);
    let outcome = MatchOutcome::from_candidates(scores.iter().map(|c| c.target.clone()).collect());
    log::debug!("fuzzy '{name}': {} candidate(s)", scores.len());
    FuzzySuggestion {
        source: name.to_string(),
        outcome,
        scores,
    }
}

/// Build the rewrite table from manual rules and accepted fuzzy results.
///
/// Manual entries go in first so they take precedence. A fuzzy single match
/// is only accepted when:
/// - no manual entry already covers the source name or the target name;
/// - the target does not already match some source name exactly;
/// - no other source name has the same target as its single match.
///
/// Any rewrite that would turn an exactly-matching target into a name absent
/// from the source corpus is rejected, so the number of unmatched target
/// names can only go down.
///
/// Blank names are never rewritten and never used as a replacement.
pub fn build_table(
    source: &Corpus,
    target: &Corpus,
    overrides: &OverrideTable,
    matching: &MatchingConfig,
    suggestions: &[FuzzySuggestion],
) -> (ReconciliationTable, Vec<RejectedRewrite>) {
    let transform = matching.transform;
    let source_keys: HashSet<String> = source.iter().map(|n| transform.apply(n)).collect();
    let is_source = |name: &str| source_keys.contains(&transform.apply(name));

    let mut table = ReconciliationTable::new();
    let mut rejected = Vec::new();

    for (name, rewritten) in target.iter().zip(apply_overrides(target, overrides)) {
        if rewritten == *name {
            continue;
        }
        let entry = RewriteEntry {
            target: name.clone(),
            replacement: rewritten,
            kind: MatchKind::ManualOverride,
        };
        if is_blank(&entry.target) || is_blank(&entry.replacement) {
            log::warn!(
                "rejecting manual rewrite '{}' -> '{}': blank name",
                entry.target,
                entry.replacement
            );
            rejected.push(RejectedRewrite {
                entry,
                reason: "blank target or replacement".into(),
            });
            continue;
        }
        if is_source(name) && !is_source(&entry.replacement) {
            log::warn!(
                "rejecting manual rewrite '{}' -> '{}': target already matches the source",
                entry.target,
                entry.replacement
            );
            rejected.push(RejectedRewrite {
                entry,
                reason: "target already matches a source name exactly".into(),
            });
            continue;
        }
        log::debug!("manual: '{}' -> '{}'", entry.target, entry.replacement);
        table.insert(entry);
    }

    if !matching.auto_accept {
        return (table, rejected);
    }

    let manual_sources: HashSet<String> = table
        .entries()
        .iter()
        .map(|e| transform.apply(&e.replacement))
        .collect();

    let mut claims: HashMap<&str, usize> = HashMap::new();
    for s in suggestions {
        if let MatchOutcome::SingleMatch(t) = &s.outcome {
            *claims.entry(t.as_str()).or_insert(0) += 1;
        }
    }

    for s in suggestions {
        let MatchOutcome::SingleMatch(t) = &s.outcome else {
            continue;
        };
        if is_blank(&s.source) || is_blank(t) {
            log::debug!("fuzzy '{}' -> '{t}': blank name", s.source);
            continue;
        }
        if manual_sources.contains(&transform.apply(&s.source)) {
            log::debug!("fuzzy '{}': covered by a manual rule", s.source);
            continue;
        }
        if table.get(t).is_some() {
            log::debug!("fuzzy '{}': target '{t}' already rewritten manually", s.source);
            continue;
        }
        if is_source(t) {
            log::debug!("fuzzy '{}': target '{t}' already matches another source name", s.source);
            continue;
        }
        if claims.get(t.as_str()).copied().unwrap_or(0) > 1 {
            log::warn!("fuzzy '{}': target '{t}' is claimed by several source names", s.source);
            continue;
        }
        log::debug!("fuzzy: '{t}' -> '{}'", s.source);
        table.insert(RewriteEntry {
            target: t.clone(),
            replacement: s.source.clone(),
            kind: MatchKind::Fuzzy,
        });
    }

    (table, rejected)
}

fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

fn exact_matches(
    source: &Corpus,
    target: &Corpus,
    matching: &MatchingConfig,
    unmatched_before: &[NameRecord],
) -> Vec<MatchCandidate> {
    let transform = matching.transform;
    let unmatched: HashSet<&str> = unmatched_before.iter().map(String::as_str).collect();
    let mut by_key: HashMap<String, Vec<NameRecord>> = HashMap::new();
    for t in target {
        by_key.entry(transform.apply(t)).or_default().push(t.clone());
    }

    source
        .iter()
        .filter(|s| !unmatched.contains(s.as_str()))
        .map(|s| MatchCandidate {
            source: s.clone(),
            targets: by_key.get(&transform.apply(s)).cloned().unwrap_or_default(),
            kind: MatchKind::Exact,
        })
        .collect()
}

fn column_index(
    role: &str,
    reader: &mut csv::Reader<&[u8]>,
    column: &str,
) -> Result<(csv::StringRecord, usize), ReconError> {
    let headers = reader
        .headers()
        .map_err(|e| ReconError::Csv {
            role: role.into(),
            message: e.to_string(),
        })?
        .clone();
    let idx = headers.iter().position(|h| h == column).ok_or_else(|| {
        ReconError::MissingColumn {
            role: role.into(),
            column: column.into(),
        }
    })?;
    Ok((headers, idx))
}

/// Read one named column from a headered CSV, in row order (duplicates kept).
/// Blank cells are not names and are skipped.
pub fn load_csv_column(role: &str, csv_data: &str, column: &str) -> Result<Vec<NameRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let (_, idx) = column_index(role, &mut reader, column)?;

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Csv {
            role: role.into(),
            message: e.to_string(),
        })?;
        match record.get(idx) {
            Some(cell) if !is_blank(cell) => names.push(cell.to_string()),
            _ => log::debug!("{role}: skipping blank '{column}' cell"),
        }
    }
    Ok(names)
}

/// Rewrite `column` of a headered CSV through `table`. Every other cell and
/// the header row are written back unchanged.
pub fn rewrite_csv_column(
    role: &str,
    csv_data: &str,
    column: &str,
    table: &ReconciliationTable,
) -> Result<String, ReconError> {
    let csv_err = |message: String| ReconError::Csv {
        role: role.into(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let (headers, idx) = column_index(role, &mut reader, column)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers).map_err(|e| csv_err(e.to_string()))?;

    for record in reader.records() {
        let record = record.map_err(|e| csv_err(e.to_string()))?;
        let rewritten: csv::StringRecord = record
            .iter()
            .enumerate()
            .map(|(i, cell)| if i == idx { table.rewrite(cell) } else { cell })
            .collect();
        writer.write_record(&rewritten).map_err(|e| csv_err(e.to_string()))?;
    }

    let bytes = writer.into_inner().map_err(|e| csv_err(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| csv_err(e.to_string()))
}
