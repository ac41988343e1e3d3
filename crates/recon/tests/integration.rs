use std::path::PathBuf;

use namejoin_recon::config::ReconConfig;
use namejoin_recon::engine::{load_csv_column, rewrite_csv_column, run};
use namejoin_recon::model::{Corpus, MatchKind, MatchOutcome, ReconInput, ReconResult};
use namejoin_recon::{apply_overrides, find_unmatched, fuzzy_candidates, OverrideTable};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_input(config: &ReconConfig) -> ReconInput {
    let source = load_csv_column("source", &read_fixture(&config.source.file), &config.source.column).unwrap();
    let target = load_csv_column("target", &read_fixture(&config.target.file), &config.target.column).unwrap();
    ReconInput {
        source: Corpus::from_names(source),
        target: Corpus::from_names(target),
    }
}

fn load_and_run(config_toml: &str) -> ReconResult {
    let config = ReconConfig::from_toml(config_toml).unwrap();
    run(&config, &load_input(&config)).unwrap()
}

// -------------------------------------------------------------------------
// Fixture run
// -------------------------------------------------------------------------

#[test]
fn emissions_map_reconciles() {
    let result = load_and_run(&read_fixture("emissions.recon.toml"));
    let s = &result.summary;

    assert_eq!(s.source_names, 10);
    assert_eq!(s.target_names, 12);
    assert_eq!(s.exact, 3);
    assert_eq!(s.unmatched_before, 7);
    assert_eq!(s.manual_rewrites, 7);
    assert_eq!(s.fuzzy_rewrites, 1);
    assert_eq!(s.rejected_rewrites, 0);
    assert_eq!(result.unmatched, vec!["European Union"]);
    assert_eq!(s.expected_unmatched, 1);
    assert_eq!(s.unexpected_unmatched(), 0);
    assert_eq!(s.unmatched_targets_before, 9);
    assert_eq!(s.unmatched_targets_after, 1);

    let gambia = result.table.get("Gambia").unwrap();
    assert_eq!(gambia.kind, MatchKind::Fuzzy);
    assert_eq!(gambia.replacement, "Gambia, The");
}

#[test]
fn two_target_strings_collapse_to_one_source_name() {
    let result = load_and_run(&read_fixture("emissions.recon.toml"));
    let antigua = result
        .matches
        .iter()
        .find(|m| m.source == "Antigua & Barbuda")
        .unwrap();
    assert_eq!(antigua.targets, vec!["Antigua", "Barbuda"]);
    assert_eq!(antigua.kind, MatchKind::ManualOverride);

    let tt: Vec<_> = result
        .corrected_target
        .iter()
        .filter(|n| *n == "Trinidad & Tobago")
        .collect();
    assert_eq!(tt.len(), 2);
}

#[test]
fn corrected_dataset_rewrites_only_the_name_column() {
    let config = ReconConfig::from_toml(&read_fixture("emissions.recon.toml")).unwrap();
    let result = run(&config, &load_input(&config)).unwrap();

    let world = read_fixture("world.csv");
    let corrected = rewrite_csv_column("target", &world, "region", &result.table).unwrap();

    assert!(corrected.starts_with("long,lat,group,order,region,subregion\n"));
    assert!(corrected.contains("-155.5828,19.8961,4,5,United States,Hawaii"));
    assert!(corrected.contains("\"Gambia, The\""));
    assert!(!corrected.contains(",USA,"));
    assert_eq!(corrected.lines().count(), world.lines().count());

    let regions = load_csv_column("target", &corrected, "region").unwrap();
    let source = load_input(&config).source;
    let unmatched = find_unmatched(&source, &Corpus::from_names(regions));
    assert_eq!(unmatched, vec!["European Union"]);
}

#[test]
fn exploratory_pass_without_overrides() {
    let toml = r#"
name = "Fuzzy only"

[source]
file = "emissions.csv"
column = "Country"

[target]
file = "world.csv"
column = "region"

[matching]
max_edit_distance = 5
auto_accept = false
"#;
    let result = load_and_run(toml);
    assert!(result.table.is_empty());
    assert_eq!(result.unmatched.len(), 7);

    let gambia = result
        .suggestions
        .iter()
        .find(|s| s.source == "Gambia, The")
        .unwrap();
    assert_eq!(gambia.outcome, MatchOutcome::SingleMatch("Gambia".into()));
    assert_eq!(gambia.scores[0].distance, 5);

    let eu = result
        .suggestions
        .iter()
        .find(|s| s.source == "European Union")
        .unwrap();
    assert_eq!(eu.outcome, MatchOutcome::Unmatched);
}

#[test]
fn report_serializes_tagged_outcomes() {
    let result = load_and_run(&read_fixture("emissions.recon.toml"));
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["meta"]["config_name"], "Emissions x World Map");
    assert_eq!(json["meta"]["max_edit_distance"], 5);
    assert_eq!(json["summary"]["unmatched_after"], 1);
    assert_eq!(json["unmatched"][0], "European Union");

    let suggestions = json["suggestions"].as_array().unwrap();
    let gambia = suggestions
        .iter()
        .find(|s| s["source"] == "Gambia, The")
        .unwrap();
    assert_eq!(gambia["outcome"]["outcome"], "single_match");
    assert_eq!(gambia["outcome"]["targets"], "Gambia");

    let table = json["table"].as_array().unwrap();
    assert!(table
        .iter()
        .any(|e| e["target"] == "USA" && e["kind"] == "manual_override"));
}

// -------------------------------------------------------------------------
// Library-level scenarios
// -------------------------------------------------------------------------

#[test]
fn antigua_override_scenario() {
    let source = Corpus::from_names(["Antigua & Barbuda", "United States"]);
    let target = Corpus::from_names(["Antigua", "Barbuda", "USA"]);
    let rules = OverrideTable::from_pairs([
        ("Antigua", "Antigua & Barbuda"),
        ("Barbuda", "Antigua & Barbuda"),
        ("USA", "United States"),
    ]);

    let corrected = apply_overrides(&target, &rules);
    assert_eq!(corrected, vec!["Antigua & Barbuda", "Antigua & Barbuda", "United States"]);
    assert!(find_unmatched(&source, &Corpus::from_names(corrected)).is_empty());
}

#[test]
fn gambia_tolerance_scenario() {
    let target = Corpus::from_names(["Gambia"]);
    assert_eq!(fuzzy_candidates("Gambia, The", &target, 10), vec!["Gambia"]);
    assert!(fuzzy_candidates("Gambia, The", &target, 0).is_empty());
}

#[test]
fn substring_mode_from_config() {
    let toml = r#"
name = "Substring"

[source]
file = "emissions.csv"
column = "Country"

[target]
file = "world.csv"
column = "region"

[matching]
max_edit_distance = 0
mode = "substring"
auto_accept = false
"#;
    let result = load_and_run(toml);
    // With zero edits, substring mode only finds names contained in a
    // longer target label; none of the unmatched emission names are.
    assert!(result
        .suggestions
        .iter()
        .all(|s| s.outcome == MatchOutcome::Unmatched));
}
