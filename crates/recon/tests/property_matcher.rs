// Property-based tests for the matcher and override laws.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use namejoin_recon::config::{DatasetConfig, MatchingConfig, OutputConfig, ReconConfig};
use namejoin_recon::matcher::*;
use namejoin_recon::model::{Corpus, ReconInput};
use namejoin_recon::{apply_overrides, run, OverrideRule, OverrideTable};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Country-like names from a small alphabet so near-collisions are common.
fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[A-D][a-d]{1,5}",
        1 => r"[A-D][a-d]{1,4} [A-D][a-d]{1,3}",
    ]
}

fn arb_corpus() -> impl Strategy<Value = Corpus> {
    prop::collection::vec(arb_name(), 0..12).prop_map(Corpus::from_names)
}

fn arb_rules() -> impl Strategy<Value = Vec<OverrideRule>> {
    prop::collection::vec(
        (r"[A-D][a-d]{0,2}", arb_name()).prop_map(|(p, r)| OverrideRule::new(p, r)),
        0..5,
    )
}

fn recon_config(max_edit_distance: usize, overrides: Vec<OverrideRule>) -> ReconConfig {
    ReconConfig {
        name: "prop".into(),
        source: DatasetConfig { file: "s.csv".into(), column: "name".into() },
        target: DatasetConfig { file: "t.csv".into(), column: "name".into() },
        matching: MatchingConfig::with_max_edit_distance(max_edit_distance),
        overrides,
        output: OutputConfig::default(),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn shared_names_are_never_unmatched(source in arb_corpus(), target in arb_corpus()) {
        let unmatched: HashSet<String> = find_unmatched(&source, &target).into_iter().collect();
        for name in source.iter().filter(|n| target.contains(n)) {
            prop_assert!(!unmatched.contains(name));
        }
        for name in &unmatched {
            prop_assert!(source.contains(name) && !target.contains(name));
        }
    }

    #[test]
    fn zero_tolerance_is_exact_matching(name in arb_name(), target in arb_corpus()) {
        let hits = fuzzy_candidates(&name, &target, 0);
        let expected: Vec<String> = target.iter().filter(|t| **t == name).cloned().collect();
        prop_assert_eq!(hits, expected);
    }

    #[test]
    fn tolerance_is_monotone(name in arb_name(), target in arb_corpus(), k in 0usize..6) {
        let narrow: HashSet<String> = fuzzy_candidates(&name, &target, k).into_iter().collect();
        let wide: HashSet<String> = fuzzy_candidates(&name, &target, k + 1).into_iter().collect();
        prop_assert!(narrow.is_subset(&wide));
    }

    #[test]
    fn overrides_are_deterministic(target in arb_corpus(), rules in arb_rules()) {
        let table = OverrideTable::new(rules);
        let first = apply_overrides(&target, &table);
        prop_assert_eq!(first.len(), target.len());
        prop_assert_eq!(apply_overrides(&target, &table), first);
    }

    #[test]
    fn unmatched_targets_never_increase(
        source in arb_corpus(),
        target in arb_corpus(),
        rules in arb_rules(),
        k in 0usize..4,
    ) {
        let config = recon_config(k, rules);
        let result = run(&config, &ReconInput { source, target }).unwrap();
        prop_assert!(result.summary.unmatched_targets_after <= result.summary.unmatched_targets_before);
    }
}
