//! # mingpan-core
//!
//! The deterministic rule engine for Mingpan - THE LOGIC.
//!
//! This crate annotates pre-computed BaZi charts (four stem-branch pillars
//! plus a Day Master) with Ten-God roles, hidden stems, NaYin, void branches
//! and twelve-stage labels, and answers palace queries over pre-computed
//! Zi Wei Dou Shu astrolabes.
//!
//! ## Pipeline
//!
//! ```text
//! RuleTables ──► ElementCycles::classify ──► ten_god::resolve
//!     │                                          │
//!     └──────────────► Annotator::annotate ◄─────┘
//!                            │
//!                            ▼
//!                  RoleTally / enhance_document
//! ```
//!
//! ## Architectural Constraints
//!
//! - Calendar conversion and star placement happen upstream; the CORE only
//!   consumes resolved stems and branches
//! - Rule tables are compiled once and never mutated
//! - Missing table entries degrade to "未知"; they are never fatal
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod annotator;
pub mod elements;
pub mod hour;
pub mod primitives;
pub mod relation;
pub mod report;
pub mod rules;
pub mod ten_god;
pub mod twelve_stage;
pub mod types;
pub mod ziwei;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Branch, Chart, Element, MingpanError, Outcome, Pillar, PillarPosition, Polarity, Stem,
};

// =============================================================================
// RE-EXPORTS: Rule Engine
// =============================================================================

pub use annotator::{AnnotatedPillar, Annotator, HiddenStemRole};
pub use elements::{BodyStrength, FiveElementCount, basic_record};
pub use hour::{hour_branch, hour_pillar};
pub use relation::{ElementCycles, Relation};
pub use report::{
    EnhancedAnalysis, EnhancedChart, FieldNotes, RoleTally, analyze, enhance, enhance_document,
};
pub use rules::{RuleDocument, RuleTables, TableCompilation, TableSummary, read_rule_document};
pub use ten_god::TenGod;
pub use twelve_stage::TwelveStage;

// =============================================================================
// RE-EXPORTS: Zi Wei Dou Shu
// =============================================================================

pub use ziwei::{Astrolabe, ComprehensiveReport, FourTransformations, Mutagen, PalaceName, ZiweiAnalyzer};
