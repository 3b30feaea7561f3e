//! # Typed Rule Tables
//!
//! Compiles a [`RuleDocument`] into enum-keyed, immutable lookup tables.
//!
//! Compilation walks every key the engine will ever ask for (12 branches,
//! 60 sexagenary pillars, 10 stems, 5 elements) and gathers every problem
//! into one diagnostic list. Entries that validated are kept either way, so
//! a caller can choose between failing on the aggregate and degrading to
//! "未知" per field.

use super::document::{CycleDocument, RuleDocument};
use crate::relation::ElementCycles;
use crate::twelve_stage::TwelveStage;
use crate::{Branch, Element, MingpanError, Pillar, Polarity, Stem};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Most hidden stems a single branch can hold.
const MAX_HIDDEN_STEMS: usize = 3;

/// Number of void branches per ten-day cycle (旬).
const VOID_BRANCH_COUNT: usize = 2;

// =============================================================================
// RULE TABLES
// =============================================================================

/// The read-only rule table store.
///
/// Every lookup is total: an absent entry yields an empty slice, `None`, or
/// [`TwelveStage::Unknown`] rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTables {
    hidden_stems: BTreeMap<Branch, Vec<Stem>>,
    nayin: BTreeMap<Pillar, String>,
    void_branches: BTreeMap<Pillar, Vec<Branch>>,
    twelve_stages: BTreeMap<Stem, Vec<Branch>>,
    elements: BTreeMap<Stem, Element>,
    polarities: BTreeMap<Stem, Polarity>,
    cycles: ElementCycles,
}

/// Result of compiling a document: the valid entries plus every problem.
#[derive(Debug, Clone)]
pub struct TableCompilation {
    pub tables: RuleTables,
    pub diagnostics: Vec<String>,
}

impl TableCompilation {
    /// Whether the document had every expected entry.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The tables, or a single aggregated error listing every problem.
    pub fn into_result(self) -> Result<RuleTables, MingpanError> {
        if self.diagnostics.is_empty() {
            Ok(self.tables)
        } else {
            Err(MingpanError::RuleTableIncomplete(self.diagnostics))
        }
    }
}

/// Entry counts per section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub hidden_stems: usize,
    pub nayin: usize,
    pub void_branches: usize,
    pub twelve_stages: usize,
    pub stem_elements: usize,
    pub stem_polarities: usize,
    pub cycles_complete: bool,
}

impl RuleTables {
    /// A store with no entries; every lookup reports unknown.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and strictly validate a JSON rule document.
    pub fn from_json_str(text: &str) -> Result<Self, MingpanError> {
        let document = RuleDocument::from_json_str(text)?;
        Self::compile(&document).into_result()
    }

    /// Compile a document, keeping valid entries and collecting diagnostics.
    #[must_use]
    pub fn compile(document: &RuleDocument) -> TableCompilation {
        let mut diagnostics = Vec::new();
        let stems = Stem::ALL;
        let branches = Branch::ALL;
        let cycle: Vec<Pillar> = Pillar::sexagenary().collect();

        let hidden_stems = compile_section(
            "藏干",
            &document.hidden_stems,
            &branches,
            &mut diagnostics,
            |list| {
                let stems = parse_all::<Stem>(list)?;
                if stems.len() > MAX_HIDDEN_STEMS {
                    return Err(format!(
                        "expected at most {} stems, found {}",
                        MAX_HIDDEN_STEMS,
                        stems.len()
                    ));
                }
                Ok(stems)
            },
        );

        let nayin = compile_section(
            "纳音",
            &document.nayin,
            &cycle,
            &mut diagnostics,
            |label| {
                if label.trim().is_empty() {
                    Err("empty label".to_string())
                } else {
                    Ok(label.clone())
                }
            },
        );

        let void_branches = compile_section(
            "空亡旬空",
            &document.void_branches,
            &cycle,
            &mut diagnostics,
            |list| {
                let branches = parse_distinct::<Branch>(list)?;
                if branches.len() != VOID_BRANCH_COUNT {
                    return Err(format!(
                        "expected {} branches, found {}",
                        VOID_BRANCH_COUNT,
                        branches.len()
                    ));
                }
                Ok(branches)
            },
        );

        let twelve_stages = compile_section(
            "长生十二神",
            &document.twelve_stages,
            &stems,
            &mut diagnostics,
            |list| {
                let sequence = parse_distinct::<Branch>(list)?;
                if sequence.len() != TwelveStage::ALL.len() {
                    return Err(format!(
                        "expected {} branches, found {}",
                        TwelveStage::ALL.len(),
                        sequence.len()
                    ));
                }
                Ok(sequence)
            },
        );

        let (elements, polarities, cycles) = match &document.ten_god {
            Some(section) => {
                let elements = compile_section(
                    "十神规则.五行",
                    &section.elements,
                    &stems,
                    &mut diagnostics,
                    |label| parse_label(label, Element::from_label, "element"),
                );
                let polarities = compile_section(
                    "十神规则.阴阳",
                    &section.polarities,
                    &stems,
                    &mut diagnostics,
                    |label| parse_label(label, Polarity::from_label, "polarity"),
                );
                let cycles = compile_cycles(&section.cycles, &mut diagnostics);
                (elements, polarities, cycles)
            }
            None => {
                diagnostics.push("十神规则: missing section".to_string());
                (BTreeMap::new(), BTreeMap::new(), ElementCycles::default())
            }
        };

        TableCompilation {
            tables: Self {
                hidden_stems,
                nayin,
                void_branches,
                twelve_stages,
                elements,
                polarities,
                cycles,
            },
            diagnostics,
        }
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Hidden stems of a branch, in table order; empty if absent.
    #[must_use]
    pub fn hidden_stems(&self, branch: Branch) -> &[Stem] {
        self.hidden_stems.get(&branch).map_or(&[], Vec::as_slice)
    }

    /// NaYin label of a stem-branch pair.
    #[must_use]
    pub fn nayin(&self, pillar: Pillar) -> Option<&str> {
        self.nayin.get(&pillar).map(String::as_str)
    }

    /// Void branches for a day pillar; empty if absent.
    #[must_use]
    pub fn void_branches(&self, day_pillar: Pillar) -> &[Branch] {
        self.void_branches.get(&day_pillar).map_or(&[], Vec::as_slice)
    }

    /// Stage of `branch` in the sequence of `day_stem`.
    #[must_use]
    pub fn twelve_stage(&self, day_stem: Stem, branch: Branch) -> TwelveStage {
        self.twelve_stages
            .get(&day_stem)
            .and_then(|sequence| sequence.iter().position(|&b| b == branch))
            .map_or(TwelveStage::Unknown, TwelveStage::from_index)
    }

    /// Element of a stem.
    #[must_use]
    pub fn element_of(&self, stem: Stem) -> Option<Element> {
        self.elements.get(&stem).copied()
    }

    /// Polarity of a stem.
    #[must_use]
    pub fn polarity_of(&self, stem: Stem) -> Option<Polarity> {
        self.polarities.get(&stem).copied()
    }

    /// Generative/destructive adjacency.
    #[must_use]
    pub fn cycles(&self) -> &ElementCycles {
        &self.cycles
    }

    /// Whether the store holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::empty()
    }

    /// Entry counts per section.
    #[must_use]
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            hidden_stems: self.hidden_stems.len(),
            nayin: self.nayin.len(),
            void_branches: self.void_branches.len(),
            twelve_stages: self.twelve_stages.len(),
            stem_elements: self.elements.len(),
            stem_polarities: self.polarities.len(),
            cycles_complete: self.cycles.is_complete(),
        }
    }
}

// =============================================================================
// COMPILATION HELPERS
// =============================================================================

/// Compile one keyed section against the keys the engine expects.
///
/// Missing keys, bad values and unexpected keys each add one diagnostic.
fn compile_section<K, R, V>(
    section: &str,
    raw: &BTreeMap<String, R>,
    expected: &[K],
    diagnostics: &mut Vec<String>,
    parse: impl Fn(&R) -> Result<V, String>,
) -> BTreeMap<K, V>
where
    K: Ord + Copy + fmt::Display,
{
    let mut compiled = BTreeMap::new();

    for &key in expected {
        let label = key.to_string();
        match raw.get(&label) {
            None => diagnostics.push(format!("{}: missing {}", section, label)),
            Some(value) => match parse(value) {
                Ok(parsed) => {
                    compiled.insert(key, parsed);
                }
                Err(msg) => diagnostics.push(format!("{}[{}]: {}", section, label, msg)),
            },
        }
    }

    let known: BTreeSet<String> = expected.iter().map(ToString::to_string).collect();
    for extra in raw.keys().filter(|k| !known.contains(*k)) {
        diagnostics.push(format!("{}: unexpected key {}", section, extra));
    }

    compiled
}

fn compile_cycles(raw: &CycleDocument, diagnostics: &mut Vec<String>) -> ElementCycles {
    let element = |label: &String| parse_label(label, Element::from_label, "element");
    let elements = Element::ALL;

    let generates = compile_section(
        "十神规则.生克逻辑.我生",
        &raw.generates,
        &elements,
        diagnostics,
        element,
    );
    let overcomes = compile_section(
        "十神规则.生克逻辑.我克",
        &raw.overcomes,
        &elements,
        diagnostics,
        element,
    );
    let overcome_by = compile_section(
        "十神规则.生克逻辑.克我",
        &raw.overcome_by,
        &elements,
        diagnostics,
        element,
    );

    for (&attacker, &target) in &overcomes {
        if let Some(&listed) = overcome_by.get(&target) {
            if listed != attacker {
                diagnostics.push(format!(
                    "十神规则.生克逻辑: 我克 says {} overcomes {}, 克我 says {} does",
                    attacker, target, listed
                ));
            }
        }
    }

    ElementCycles::new(generates, overcomes, overcome_by)
}

fn parse_all<T>(list: &[String]) -> Result<Vec<T>, String>
where
    T: std::str::FromStr,
{
    list.iter()
        .map(|s| s.parse::<T>().map_err(|_| format!("invalid symbol '{}'", s)))
        .collect()
}

fn parse_distinct<T>(list: &[String]) -> Result<Vec<T>, String>
where
    T: std::str::FromStr + Ord + Copy,
{
    let parsed = parse_all::<T>(list)?;
    let unique: BTreeSet<T> = parsed.iter().copied().collect();
    if unique.len() != parsed.len() {
        return Err("duplicate entries".to_string());
    }
    Ok(parsed)
}

fn parse_label<T>(label: &str, parse: fn(&str) -> Option<T>, kind: &str) -> Result<T, String> {
    parse(label).ok_or_else(|| format!("invalid {} '{}'", kind, label))
}

// =============================================================================
// TESTS
// =============================================================================
