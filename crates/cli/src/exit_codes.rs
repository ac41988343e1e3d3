//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 2       | Universal  | CLI usage error (bad args, missing file) |
//! | 60-69   | recon      | Name reconciliation codes                |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0, 2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Recon (60-69)
// =============================================================================

/// Config file could not be parsed or failed validation.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 60;

/// Runtime failure: unreadable input, missing column, unwritable output.
pub const EXIT_RECON_RUNTIME: u8 = 61;

/// `--strict` only: source names remain unmatched that the config does not
/// list under `expected_unmatched`.
pub const EXIT_RECON_UNMATCHED: u8 = 62;

/// `--strict` only: an unmatched source name has several fuzzy candidates
/// and needs a manual rule.
pub const EXIT_RECON_AMBIGUOUS: u8 = 63;
