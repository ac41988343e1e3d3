//! `namejoin-recon` — name reconciliation for joining two datasets by entity name.
//!
//! Pure engine crate: receives pre-loaded name corpora, returns the rewrite
//! table and what is still unmatched. No CLI dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod overrides;

pub use config::ReconConfig;
pub use engine::run;
pub use error::ReconError;
pub use matcher::{find_unmatched, fuzzy_candidates};
pub use model::{Corpus, MatchOutcome, ReconInput, ReconResult, ReconciliationTable};
pub use overrides::{apply_overrides, OverrideRule, OverrideTable};
