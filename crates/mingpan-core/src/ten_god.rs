//! # Ten-God Resolver
//!
//! Names the role (十神) a stem plays relative to the Day Master.
//!
//! A role is the element relation between the two stems combined with
//! whether their polarities match. Each relation yields a pair of roles; the
//! pairing below is authoritative and must not be re-derived:
//!
//! | Relation | same polarity | different polarity |
//! |----------|---------------|--------------------|
//! | 同我 | 比肩 | 劫财 |
//! | 生我 | 偏印 | 正印 |
//! | 我生 | 食神 | 伤官 |
//! | 我克 | 偏财 | 正财 |
//! | 克我 | 七杀 | 正官 |

use crate::relation::Relation;
use crate::rules::RuleTables;
use crate::Stem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the ten roles, or `Unknown` when the rule table cannot tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TenGod {
    #[serde(rename = "比肩")]
    Rival,
    #[serde(rename = "劫财")]
    RobWealth,
    #[serde(rename = "偏印")]
    IndirectSeal,
    #[serde(rename = "正印")]
    DirectSeal,
    #[serde(rename = "食神")]
    EatingGod,
    #[serde(rename = "伤官")]
    HurtingOfficer,
    #[serde(rename = "偏财")]
    IndirectWealth,
    #[serde(rename = "正财")]
    DirectWealth,
    #[serde(rename = "七杀")]
    SevenKillings,
    #[serde(rename = "正官")]
    DirectOfficer,
    #[serde(rename = "未知")]
    Unknown,
}

impl TenGod {
    /// The ten named roles (excluding `Unknown`).
    pub const ROLES: [TenGod; 10] = [
        TenGod::Rival,
        TenGod::RobWealth,
        TenGod::IndirectSeal,
        TenGod::DirectSeal,
        TenGod::EatingGod,
        TenGod::HurtingOfficer,
        TenGod::IndirectWealth,
        TenGod::DirectWealth,
        TenGod::SevenKillings,
        TenGod::DirectOfficer,
    ];

    /// Combine a relation with polarity parity.
    #[must_use]
    pub const fn from_relation(relation: Relation, same_polarity: bool) -> Self {
        match (relation, same_polarity) {
            (Relation::Same, true) => TenGod::Rival,
            (Relation::Same, false) => TenGod::RobWealth,
            (Relation::GeneratedBy, true) => TenGod::IndirectSeal,
            (Relation::GeneratedBy, false) => TenGod::DirectSeal,
            (Relation::Generates, true) => TenGod::EatingGod,
            (Relation::Generates, false) => TenGod::HurtingOfficer,
            (Relation::Overcomes, true) => TenGod::IndirectWealth,
            (Relation::Overcomes, false) => TenGod::DirectWealth,
            (Relation::OvercomeBy, true) => TenGod::SevenKillings,
            (Relation::OvercomeBy, false) => TenGod::DirectOfficer,
            (Relation::Unknown, _) => TenGod::Unknown,
        }
    }

    /// The Chinese name of this role.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TenGod::Rival => "比肩",
            TenGod::RobWealth => "劫财",
            TenGod::IndirectSeal => "偏印",
            TenGod::DirectSeal => "正印",
            TenGod::EatingGod => "食神",
            TenGod::HurtingOfficer => "伤官",
            TenGod::IndirectWealth => "偏财",
            TenGod::DirectWealth => "正财",
            TenGod::SevenKillings => "七杀",
            TenGod::DirectOfficer => "正官",
            TenGod::Unknown => "未知",
        }
    }
}

impl fmt::Display for TenGod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolve the role of `target` relative to the Day Master `day`.
///
/// Only the Day Master's attributes are ever compared with the target's.
/// Returns `Unknown` if either stem lacks an element or polarity in the
/// rule table (a data-integrity fault, not a business error).
#[must_use]
pub fn resolve(tables: &RuleTables, day: Stem, target: Stem) -> TenGod {
    let (Some(day_element), Some(day_polarity), Some(target_element), Some(target_polarity)) = (
        tables.element_of(day),
        tables.polarity_of(day),
        tables.element_of(target),
        tables.polarity_of(target),
    ) else {
        return TenGod::Unknown;
    };

    let relation = tables.cycles().classify(day_element, target_element);
    TenGod::from_relation(relation, day_polarity == target_polarity)
}

// =============================================================================
// TESTS
// =============================================================================
