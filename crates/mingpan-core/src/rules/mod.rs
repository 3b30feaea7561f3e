//! # Rule Table Store
//!
//! The read-only symbol tables every lookup in the engine consults.
//!
//! - `document`: raw JSON view of `bazi_rule_tables.json`
//! - `tables`: typed, validated tables compiled from a document
//!
//! ## Loading
//!
//! | Source | Missing / malformed | Incomplete |
//! |--------|---------------------|------------|
//! | [`RuleTables::from_json_str`] | `Err` | `Err(RuleTableIncomplete)` |
//! | [`RuleTables::load_or_empty`] | empty tables + warning | valid entries + one warning |
//! | [`RuleTables::builtin`] | n/a (compiled in) | n/a |

mod document;
mod tables;

pub use document::{CycleDocument, RuleDocument, TenGodDocument};
pub use tables::{RuleTables, TableCompilation, TableSummary};

use crate::MingpanError;
use crate::primitives::MAX_RULE_TABLE_BYTES;
use std::path::Path;
use std::sync::OnceLock;

const BUILTIN_RULES: &str = include_str!("../../data/bazi_rule_tables.json");

static BUILTIN: OnceLock<RuleTables> = OnceLock::new();

/// Read and parse a rule document from disk.
///
/// Files larger than [`MAX_RULE_TABLE_BYTES`] are rejected before reading.
pub fn read_rule_document(path: &Path) -> Result<RuleDocument, MingpanError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MingpanError::IoError(format!("{}: {}", path.display(), e)))?;

    if metadata.len() > MAX_RULE_TABLE_BYTES {
        return Err(MingpanError::IoError(format!(
            "{}: rule table too large ({} bytes, max {})",
            path.display(),
            metadata.len(),
            MAX_RULE_TABLE_BYTES
        )));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| MingpanError::IoError(format!("{}: {}", path.display(), e)))?;
    RuleDocument::from_json_str(&text)
}

impl RuleTables {
    /// The shipped rule table, compiled once per process.
    ///
    /// The shipped document is checked by the test suite to compile without
    /// diagnostics.
    pub fn builtin() -> &'static RuleTables {
        BUILTIN.get_or_init(|| {
            let compilation = match RuleDocument::from_json_str(BUILTIN_RULES) {
                Ok(document) => RuleTables::compile(&document),
                Err(e) => {
                    tracing::error!(error = %e, "Built-in rule table failed to parse");
                    return RuleTables::empty();
                }
            };
            if !compilation.is_complete() {
                tracing::error!(
                    problems = compilation.diagnostics.len(),
                    "Built-in rule table is incomplete: {}",
                    compilation.diagnostics.join("; ")
                );
            }
            compilation.tables
        })
    }

    /// Load a rule table file, degrading instead of failing.
    ///
    /// A missing, unreadable or malformed file yields [`RuleTables::empty`],
    /// so every lookup reports "未知". A well-formed but incomplete document
    /// keeps its valid entries; its problems are logged once, aggregated.
    pub fn load_or_empty(path: &Path) -> RuleTables {
        let document = match read_rule_document(path) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Rule table unavailable; all lookups will report unknown"
                );
                return RuleTables::empty();
            }
        };

        let compilation = RuleTables::compile(&document);
        if compilation.is_complete() {
            tracing::debug!(path = %path.display(), "Rule table loaded");
        } else {
            tracing::warn!(
                path = %path.display(),
                problems = compilation.diagnostics.len(),
                "Rule table incomplete: {}",
                compilation.diagnostics.join("; ")
            );
        }
        compilation.tables
    }
}
