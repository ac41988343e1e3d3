//! `namejoin run|validate|suggest` — config-driven name reconciliation.

use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use namejoin_recon::config::{DistanceMode, MatchingConfig, NameTransform, ReconConfig};
use namejoin_recon::engine::{load_csv_column, rewrite_csv_column, suggest};
use namejoin_recon::matcher::find_unmatched_with;
use namejoin_recon::model::{Corpus, FuzzySuggestion, MatchOutcome, ReconInput, ReconResult};

use crate::exit_codes::{
    EXIT_RECON_AMBIGUOUS, EXIT_RECON_INVALID_CONFIG, EXIT_RECON_RUNTIME, EXIT_RECON_UNMATCHED,
};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  namejoin run emissions.recon.toml
  namejoin run emissions.recon.toml --json
  namejoin run emissions.recon.toml --output report.json --corrected world.fixed.csv
  namejoin run emissions.recon.toml --strict
  NAMEJOIN_STRICT=true namejoin run emissions.recon.toml")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Output JSON report to stdout instead of only the human summary
        #[arg(long)]
        json: bool,

        /// Write JSON report to file (overrides [output].json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the target CSV with its name column rewritten (overrides [output].corrected)
        #[arg(long)]
        corrected: Option<PathBuf>,

        /// Exit non-zero when unexpected or ambiguous names remain unmatched
        #[arg(long, env = "NAMEJOIN_STRICT")]
        strict: bool,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  namejoin validate emissions.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },

    /// List fuzzy candidates for every source name without an exact match
    #[command(after_help = "\
Examples:
  namejoin suggest --source emissions.csv --source-column Country \\
                   --target world.csv --target-column region --max-distance 5
  namejoin suggest --source a.csv --source-column name --target b.csv \\
                   --target-column name --mode substring --json")]
    Suggest {
        /// Source CSV (the dataset whose names are canonical)
        #[arg(long)]
        source: PathBuf,

        /// Name column in the source CSV
        #[arg(long)]
        source_column: String,

        /// Target CSV (the dataset whose names get rewritten)
        #[arg(long)]
        target: PathBuf,

        /// Name column in the target CSV
        #[arg(long)]
        target_column: String,

        /// Maximum edit distance for a fuzzy candidate
        #[arg(long, default_value_t = 3)]
        max_distance: usize,

        /// Distance mode
        #[arg(long, value_enum, default_value_t = ModeArg::Whole)]
        mode: ModeArg,

        /// Name normalization before comparing
        #[arg(long, value_enum, default_value_t = TransformArg::None)]
        transform: TransformArg,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Whole,
    Substring,
}

impl From<ModeArg> for DistanceMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Whole => DistanceMode::Whole,
            ModeArg::Substring => DistanceMode::Substring,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TransformArg {
    None,
    Trim,
    Fold,
}

impl From<TransformArg> for NameTransform {
    fn from(t: TransformArg) -> Self {
        match t {
            TransformArg::None => NameTransform::None,
            TransformArg::Trim => NameTransform::Trim,
            TransformArg::Fold => NameTransform::Fold,
        }
    }
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, json, output, corrected, strict } => {
            cmd_recon_run(config, json, output, corrected, strict)
        }
        ReconCommands::Validate { config } => cmd_recon_validate(config),
        ReconCommands::Suggest {
            source,
            source_column,
            target,
            target_column,
            max_distance,
            mode,
            transform,
            json,
        } => {
            let matching = MatchingConfig {
                mode: mode.into(),
                transform: transform.into(),
                ..MatchingConfig::with_max_edit_distance(max_distance)
            };
            cmd_suggest(source, &source_column, target, &target_column, &matching, json)
        }
    }
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot read {}: {e}", path.display())))
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot write {}: {e}", path.display())))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn load_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = read_file(config_path)?;
    ReconConfig::from_toml(&config_str).map_err(|e| CliError {
        code: EXIT_RECON_INVALID_CONFIG,
        message: e.to_string(),
        hint: Some(format!("in {}", config_path.display())),
    })
}

fn load_corpus(role: &str, path: &Path, column: &str) -> Result<Corpus, CliError> {
    let csv_data = read_file(path)?;
    let names = load_csv_column(role, &csv_data, column)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, e.to_string()))?;
    log::debug!("{role}: {} rows from {}", names.len(), path.display());
    Ok(Corpus::from_names(names))
}

fn cmd_recon_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    corrected_file: Option<PathBuf>,
    strict: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let source_path = base_dir.join(&config.source.file);
    let target_path = base_dir.join(&config.target.file);

    let input = ReconInput {
        source: load_corpus("source", &source_path, &config.source.column)?,
        target: load_corpus("target", &target_path, &config.target.column)?,
    };

    let result = namejoin_recon::run(&config, &input)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("JSON serialization error: {e}")))?;

    let report_path = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = report_path {
        write_file(path, &json_str)?;
    }

    let corrected_path =
        corrected_file.or_else(|| config.output.corrected.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = corrected_path {
        let target_csv = read_file(&target_path)?;
        let rewritten = rewrite_csv_column("target", &target_csv, &config.target.column, &result.table)
            .map_err(|e| recon_err(EXIT_RECON_RUNTIME, e.to_string()))?;
        write_file(path, &rewritten)?;
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&result);

    if strict {
        let s = &result.summary;
        if s.ambiguous > 0 {
            return Err(CliError {
                code: EXIT_RECON_AMBIGUOUS,
                message: format!("{} ambiguous name(s) remain", s.ambiguous),
                hint: Some("add [[overrides]] rules for the ambiguous names".into()),
            });
        }
        if s.unexpected_unmatched() > 0 {
            return Err(CliError {
                code: EXIT_RECON_UNMATCHED,
                message: format!("{} unmatched name(s) remain", s.unexpected_unmatched()),
                hint: Some("add [[overrides]] rules or list them under expected_unmatched".into()),
            });
        }
    }

    Ok(())
}

// Human summary to stderr
fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "name recon: {} source names, {} exact, {} fuzzy rewrites, {} manual rewrites, {} unmatched ({} expected)",
        s.source_names,
        s.exact,
        s.fuzzy_rewrites,
        s.manual_rewrites,
        s.unmatched_after,
        s.expected_unmatched,
    );
    eprintln!(
        "target names without a source match: {} -> {}",
        s.unmatched_targets_before, s.unmatched_targets_after
    );
    for r in &result.rejected {
        eprintln!(
            "  rejected: {} -> {} ({})",
            r.entry.target, r.entry.replacement, r.reason
        );
    }
    for name in &result.unmatched {
        match result.ambiguous.iter().find(|a| &a.source == name) {
            Some(a) => eprintln!("  ambiguous: {name} [{}]", a.outcome.targets().join(" | ")),
            None => eprintln!("  unmatched: {name}"),
        }
    }
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "{}: valid ({} override rule(s), max edit distance {}, mode {})",
        config.name,
        config.overrides.len(),
        config.matching.max_edit_distance,
        config.matching.mode,
    );
    if !config.override_table().is_idempotent() {
        eprintln!("note: a second pass of the override rules changes some names; rule order matters");
    }
    Ok(())
}

fn cmd_suggest(
    source_path: PathBuf,
    source_column: &str,
    target_path: PathBuf,
    target_column: &str,
    matching: &MatchingConfig,
    json_output: bool,
) -> Result<(), CliError> {
    let source = load_corpus("source", &source_path, source_column)?;
    let target = load_corpus("target", &target_path, target_column)?;

    let suggestions: Vec<FuzzySuggestion> = find_unmatched_with(&source, &target, matching.transform)
        .iter()
        .map(|name| suggest(name, &target, matching))
        .collect();

    if json_output {
        let json_str = serde_json::to_string_pretty(&suggestions)
            .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for s in &suggestions {
        let tag = match s.outcome {
            MatchOutcome::Unmatched => "none",
            MatchOutcome::SingleMatch(_) => "single",
            MatchOutcome::MultipleMatches(_) => "ambiguous",
        };
        let candidates: Vec<String> = s
            .scores
            .iter()
            .map(|c| format!("{} (d={}, jw={:.2})", c.target, c.distance, c.similarity))
            .collect();
        println!("{}\t{tag}\t{}", s.source, candidates.join("; "));
    }
    eprintln!(
        "{} of {} source names unmatched, {} with a single candidate",
        suggestions.len(),
        source.len(),
        suggestions
            .iter()
            .filter(|s| matches!(s.outcome, MatchOutcome::SingleMatch(_)))
            .count(),
    );
    Ok(())
}
