//! # Pillar Annotator
//!
//! Attaches every derived field to one pillar of a chart.
//!
//! All lookups are relative to the Day Master (and, for void branches, to the
//! day pillar). A missing table entry degrades that single field to "未知" or
//! an empty list; annotation itself never fails.

use crate::primitives::UNKNOWN_LABEL;
use crate::rules::RuleTables;
use crate::ten_god::{self, TenGod};
use crate::twelve_stage::TwelveStage;
use crate::{Branch, Pillar, PillarPosition, Stem};
use serde::Serialize;

/// A hidden stem together with its role relative to the Day Master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HiddenStemRole {
    #[serde(rename = "藏干")]
    pub stem: Stem,
    #[serde(rename = "十神")]
    pub role: TenGod,
}

/// One pillar with its derived fields, serialized with the established
/// Chinese field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedPillar {
    #[serde(rename = "柱序")]
    pub position: PillarPosition,
    #[serde(rename = "天干")]
    pub stem: Stem,
    #[serde(rename = "地支")]
    pub branch: Branch,
    #[serde(rename = "干支")]
    pub pillar: Pillar,
    #[serde(rename = "主星")]
    pub ten_god: TenGod,
    #[serde(rename = "藏干")]
    pub hidden_stems: Vec<Stem>,
    #[serde(rename = "纳音")]
    pub nayin: String,
    #[serde(rename = "空亡")]
    pub void_branches: Vec<Branch>,
    #[serde(rename = "星运（十二长生）")]
    pub twelve_stage: TwelveStage,
    #[serde(rename = "藏干十神")]
    pub hidden_roles: Vec<HiddenStemRole>,
}

impl AnnotatedPillar {
    /// Every role in this pillar: the visible stem first, then hidden stems.
    pub fn roles(&self) -> impl Iterator<Item = TenGod> + '_ {
        std::iter::once(self.ten_god).chain(self.hidden_roles.iter().map(|h| h.role))
    }
}

/// Annotates pillars against a rule table store.
#[derive(Debug, Clone, Copy)]
pub struct Annotator<'a> {
    tables: &'a RuleTables,
}

impl<'a> Annotator<'a> {
    /// Create an annotator over a rule table store.
    #[must_use]
    pub const fn new(tables: &'a RuleTables) -> Self {
        Self { tables }
    }

    /// Annotate one pillar.
    ///
    /// `day_pillar` keys the void-branch lookup, so all four pillars of a
    /// chart carry the same void branches.
    #[must_use]
    pub fn annotate(
        &self,
        position: PillarPosition,
        pillar: Pillar,
        day_master: Stem,
        day_pillar: Pillar,
    ) -> AnnotatedPillar {
        let hidden_stems = self.tables.hidden_stems(pillar.branch).to_vec();
        let hidden_roles = hidden_stems
            .iter()
            .map(|&stem| HiddenStemRole {
                stem,
                role: ten_god::resolve(self.tables, day_master, stem),
            })
            .collect();

        AnnotatedPillar {
            position,
            stem: pillar.stem,
            branch: pillar.branch,
            pillar,
            ten_god: ten_god::resolve(self.tables, day_master, pillar.stem),
            hidden_stems,
            nayin: self
                .tables
                .nayin(pillar)
                .unwrap_or(UNKNOWN_LABEL)
                .to_string(),
            void_branches: self.tables.void_branches(day_pillar).to_vec(),
            twelve_stage: self.tables.twelve_stage(day_master, pillar.branch),
            hidden_roles,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pillar(s: &str) -> Pillar {
        s.parse().expect("pillar")
    }

    #[test]
    fn year_pillar_of_reference_chart() {
        let annotator = Annotator::new(RuleTables::builtin());
        let annotated = annotator.annotate(
            PillarPosition::Year,
            pillar("戊寅"),
            Stem::Bing,
            pillar("丙子"),
        );

        assert_eq!(annotated.ten_god, TenGod::EatingGod);
        assert_eq!(annotated.hidden_stems, vec![Stem::Jia, Stem::Bing, Stem::Wu]);
        assert_eq!(
            annotated.roles().collect::<Vec<_>>(),
            vec![
                TenGod::EatingGod,
                TenGod::IndirectSeal,
                TenGod::Rival,
                TenGod::EatingGod
            ]
        );
        assert_eq!(annotated.nayin, "城头土");
        assert_eq!(annotated.void_branches, vec![Branch::Shen, Branch::You]);
        assert_eq!(annotated.twelve_stage, TwelveStage::Birth);
    }

    #[test]
    fn serializes_with_chinese_field_names() {
        let annotator = Annotator::new(RuleTables::builtin());
        let annotated = annotator.annotate(
            PillarPosition::Day,
            pillar("丙子"),
            Stem::Bing,
            pillar("丙子"),
        );
        let json = serde_json::to_value(&annotated).expect("serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "柱序": "日柱",
                "天干": "丙",
                "地支": "子",
                "干支": "丙子",
                "主星": "比肩",
                "藏干": ["癸"],
                "纳音": "涧下水",
                "空亡": ["申", "酉"],
                "星运（十二长生）": "胎",
                "藏干十神": [{"藏干": "癸", "十神": "正官"}]
            })
        );
    }

    #[test]
    fn empty_tables_degrade_every_field() {
        let tables = RuleTables::empty();
        let annotated = Annotator::new(&tables).annotate(
            PillarPosition::Hour,
            pillar("庚寅"),
            Stem::Bing,
            pillar("丙子"),
        );

        assert_eq!(annotated.ten_god, TenGod::Unknown);
        assert!(annotated.hidden_stems.is_empty());
        assert!(annotated.hidden_roles.is_empty());
        assert_eq!(annotated.nayin, UNKNOWN_LABEL);
        assert!(annotated.void_branches.is_empty());
        assert_eq!(annotated.twelve_stage, TwelveStage::Unknown);
    }
}
