//! # Zi Wei Analyzer
//!
//! Read-only queries over an [`Astrolabe`].
//!
//! | Group | Queries |
//! |-------|---------|
//! | Chart | `chart`, `four_pillars`, `year_four_trans`, `star_position`, `is_empty_house` |
//! | Fortune | `major_fortune`, `flow_year`, `flow_trans`, `house_of_flow` |
//! | Tri-relations | `tri_house`, `tri_has_star`, `tri_has_trans`, `star_tri_house` |

use super::astrolabe::{Astrolabe, Palace, Star};
use super::palace::PalaceName;
use super::transforms::{FourTransformations, Mutagen};
use crate::primitives::{
    MAJOR_FORTUNE_SPAN, MAJOR_FORTUNE_START_AGE, SEXAGENARY_EPOCH_YEAR, UNKNOWN_LABEL,
};
use crate::{Branch, Chart, MingpanError, Outcome, Pillar, Stem};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::collections::BTreeMap;

// =============================================================================
// REPORT TYPES
// =============================================================================

/// One palace as shown in the chart view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalaceView {
    pub index: usize,
    pub heavenly_stem: Stem,
    pub earthly_branch: Branch,
    pub is_body_palace: bool,
    pub major_stars: Vec<Star>,
    pub minor_stars: Vec<String>,
    pub adjective_stars: Vec<String>,
}

impl From<&Palace> for PalaceView {
    fn from(palace: &Palace) -> Self {
        let names = |stars: &[Star]| stars.iter().map(|s| s.name.clone()).collect();
        Self {
            index: palace.index,
            heavenly_stem: palace.heavenly_stem,
            earthly_branch: palace.earthly_branch,
            is_body_palace: palace.is_body_palace,
            major_stars: palace.major_stars.clone(),
            minor_stars: names(&palace.minor_stars),
            adjective_stars: names(&palace.adjective_stars),
        }
    }
}

/// Palaces by name (astrolabe order) and the palace of each major star.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZiweiChart {
    #[serde(serialize_with = "serialize_palaces")]
    pub palaces: Vec<(PalaceName, PalaceView)>,
    pub star_positions: BTreeMap<String, PalaceName>,
}

fn serialize_palaces<S: Serializer>(
    palaces: &[(PalaceName, PalaceView)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(palaces.len()))?;
    for (name, view) in palaces {
        map.serialize_entry(name, view)?;
    }
    map.end()
}

/// The four pillars carried in the astrolabe's Chinese date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FourPillars {
    pub year_pillar: Pillar,
    pub month_pillar: Pillar,
    pub day_pillar: Pillar,
    pub hour_pillar: Pillar,
}

impl FourPillars {
    /// The BaZi chart of these pillars; the Day Master is the day stem.
    #[must_use]
    pub const fn to_chart(&self) -> Chart {
        Chart::from_pillars(
            self.year_pillar,
            self.month_pillar,
            self.day_pillar,
            self.hour_pillar,
        )
    }
}

/// The palace on the flow year's branch and its stars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowYear {
    pub palace: PalaceName,
    pub earthly_branch: Branch,
    pub major_stars: Vec<String>,
    pub minor_stars: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub lunar_date: String,
    pub chinese_date: String,
    pub soul: String,
    pub body: String,
    pub five_elements_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MajorFortune {
    pub age: i32,
    pub palace: Option<PalaceName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowAnalysis {
    pub year: i32,
    pub flow_year: Outcome<FlowYear>,
    pub flow_trans: FourTransformations,
    pub house_of_flow: &'static str,
}

/// The comprehensive report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComprehensiveReport {
    pub basic_info: BasicInfo,
    pub chart_analysis: ZiweiChart,
    pub four_pillars: Outcome<FourPillars>,
    pub year_four_trans: Outcome<FourTransformations>,
    pub empty_houses: Vec<PalaceName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_fortune: Option<MajorFortune>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_analysis: Option<FlowAnalysis>,
}

// =============================================================================
// ANALYZER
// =============================================================================

/// Queries over one astrolabe.
#[derive(Debug, Clone, Copy)]
pub struct ZiweiAnalyzer<'a> {
    astrolabe: &'a Astrolabe,
}

impl<'a> ZiweiAnalyzer<'a> {
    #[must_use]
    pub const fn new(astrolabe: &'a Astrolabe) -> Self {
        Self { astrolabe }
    }

    fn palaces_in(&self, names: [PalaceName; 4]) -> impl Iterator<Item = &'a Palace> {
        self.astrolabe
            .palaces
            .iter()
            .filter(move |p| names.contains(&p.name))
    }

    // -------------------------------------------------------------------------
    // Chart
    // -------------------------------------------------------------------------

    /// All palaces and the palace of each major star.
    #[must_use]
    pub fn chart(&self) -> ZiweiChart {
        let mut star_positions = BTreeMap::new();
        let palaces = self
            .astrolabe
            .palaces
            .iter()
            .map(|palace| {
                for star in &palace.major_stars {
                    star_positions.insert(star.name.clone(), palace.name);
                }
                (palace.name, PalaceView::from(palace))
            })
            .collect();

        ZiweiChart {
            palaces,
            star_positions,
        }
    }

    /// Year, month, day and hour pillars from the Chinese date.
    pub fn four_pillars(&self) -> Result<FourPillars, MingpanError> {
        let parts: Vec<&str> = self.astrolabe.chinese_date.split_whitespace().collect();
        let [year, month, day, hour, ..] = parts.as_slice() else {
            return Err(MingpanError::PillarsUnavailable);
        };

        let parse = |s: &str| s.parse::<Pillar>().map_err(|_| MingpanError::PillarsUnavailable);
        Ok(FourPillars {
            year_pillar: parse(*year)?,
            month_pillar: parse(*month)?,
            day_pillar: parse(*day)?,
            hour_pillar: parse(*hour)?,
        })
    }

    /// The BaZi chart of this astrolabe, for annotation by the BaZi engine.
    pub fn bazi_chart(&self) -> Result<Chart, MingpanError> {
        self.four_pillars().map(|pillars| pillars.to_chart())
    }

    /// Four transformations of an explicit stem-branch label, or of the
    /// astrolabe's own year stem when `ganzhi` is `None`.
    pub fn year_four_trans(&self, ganzhi: Option<&str>) -> Result<FourTransformations, MingpanError> {
        match ganzhi {
            Some(label) => FourTransformations::for_label(label),
            None => {
                let pillars = self
                    .four_pillars()
                    .map_err(|_| MingpanError::YearStemUnavailable)?;
                Ok(FourTransformations::for_stem(pillars.year_pillar.stem))
            }
        }
    }

    /// Palace holding a star of any class.
    #[must_use]
    pub fn star_position(&self, star: &str) -> Option<PalaceName> {
        self.astrolabe
            .palaces
            .iter()
            .find(|p| p.all_stars().any(|s| s.name == star))
            .map(|p| p.name)
    }

    /// Whether a palace has no major and no minor stars.
    ///
    /// A palace missing from the astrolabe counts as empty.
    #[must_use]
    pub fn is_empty_house(&self, name: PalaceName) -> bool {
        self.astrolabe.palace(name).is_none_or(Palace::is_empty)
    }

    // -------------------------------------------------------------------------
    // Fortune cycles
    // -------------------------------------------------------------------------

    /// Palace of the major fortune (大限) for an age.
    ///
    /// Decades count from 命宫 in astrolabe order starting at age 5; ages
    /// before that count backwards.
    #[must_use]
    pub fn major_fortune(&self, age: i32) -> Option<PalaceName> {
        let palaces = &self.astrolabe.palaces;
        let count = i32::try_from(palaces.len()).ok().filter(|&n| n > 0)?;
        let life = palaces
            .iter()
            .position(|p| p.name == PalaceName::Life)
            .unwrap_or(0);
        // Widened so extreme ages cannot overflow.
        let decade = (i64::from(age) - i64::from(MAJOR_FORTUNE_START_AGE))
            .div_euclid(i64::from(MAJOR_FORTUNE_SPAN));
        let index = (life as i64 + decade).rem_euclid(i64::from(count));
        palaces.get(usize::try_from(index).ok()?).map(|p| p.name)
    }

    /// Palace on the flow year's branch and its stars.
    pub fn flow_year(&self, year: i32) -> Result<FlowYear, MingpanError> {
        let branch = flow_branch(year);
        let palace = self
            .astrolabe
            .palaces
            .iter()
            .find(|p| p.earthly_branch == branch)
            .ok_or(MingpanError::FlowPalaceNotFound)?;
        let names = |stars: &[Star]| stars.iter().map(|s| s.name.clone()).collect();

        Ok(FlowYear {
            palace: palace.name,
            earthly_branch: palace.earthly_branch,
            major_stars: names(&palace.major_stars),
            minor_stars: names(&palace.minor_stars),
        })
    }

    /// Four transformations of the flow year's stem.
    #[must_use]
    pub fn flow_trans(&self, year: i32) -> FourTransformations {
        FourTransformations::for_stem(flow_stem(year))
    }

    /// Label of the flow year's palace, or "未知".
    #[must_use]
    pub fn house_of_flow(&self, year: i32) -> &'static str {
        self.flow_year(year)
            .map_or(UNKNOWN_LABEL, |flow| flow.palace.label())
    }

    // -------------------------------------------------------------------------
    // Tri-relations
    // -------------------------------------------------------------------------

    /// The palace and its three related palaces.
    #[must_use]
    pub fn tri_house(&self, name: PalaceName) -> [PalaceName; 4] {
        name.tri_relations()
    }

    /// Whether any of `stars` (major or minor) sits in the tri-relation.
    #[must_use]
    pub fn tri_has_star(&self, name: PalaceName, stars: &[&str]) -> bool {
        self.palaces_in(self.tri_house(name))
            .any(|p| stars.iter().any(|star| p.has_principal_star(star)))
    }

    /// Whether a major star in the tri-relation carries `mutagen`.
    ///
    /// False when the astrolabe's year stem is unavailable.
    #[must_use]
    pub fn tri_has_trans(&self, name: PalaceName, mutagen: Mutagen) -> bool {
        if self.year_four_trans(None).is_err() {
            return false;
        }
        self.palaces_in(self.tri_house(name))
            .flat_map(|p| &p.major_stars)
            .any(|s| s.mutagen == Some(mutagen))
    }

    /// Tri-relation of the palace holding a star.
    #[must_use]
    pub fn star_tri_house(&self, star: &str) -> Option<[PalaceName; 4]> {
        self.star_position(star).map(PalaceName::tri_relations)
    }

    // -------------------------------------------------------------------------
    // Comprehensive report
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn comprehensive(&self, age: Option<i32>, target_year: Option<i32>) -> ComprehensiveReport {
        let astrolabe = self.astrolabe;

        ComprehensiveReport {
            basic_info: BasicInfo {
                birth_date: astrolabe.solar_date.clone(),
                gender: astrolabe.gender.clone(),
                lunar_date: astrolabe.lunar_date.clone(),
                chinese_date: astrolabe.chinese_date.clone(),
                soul: astrolabe.soul.clone(),
                body: astrolabe.body.clone(),
                five_elements_class: astrolabe.five_elements_class.clone(),
            },
            chart_analysis: self.chart(),
            four_pillars: self.four_pillars().into(),
            year_four_trans: self.year_four_trans(None).into(),
            empty_houses: PalaceName::ALL
                .into_iter()
                .filter(|&name| self.is_empty_house(name))
                .collect(),
            major_fortune: age.map(|age| MajorFortune {
                age,
                palace: self.major_fortune(age),
            }),
            flow_analysis: target_year.map(|year| FlowAnalysis {
                year,
                flow_year: self.flow_year(year).into(),
                flow_trans: self.flow_trans(year),
                house_of_flow: self.house_of_flow(year),
            }),
        }
    }
}

/// Position of a Gregorian year within a cycle of `len`, counted from the
/// 甲子 epoch.
fn cycle_index(year: i32, len: i64) -> usize {
    let offset = (i64::from(year) - i64::from(SEXAGENARY_EPOCH_YEAR)).rem_euclid(len);
    offset as usize
}

/// Branch of a Gregorian year (甲子 at year 4).
#[must_use]
pub fn flow_branch(year: i32) -> Branch {
    Branch::from_index(cycle_index(year, 12))
}

/// Stem of a Gregorian year (甲子 at year 4).
#[must_use]
pub fn flow_stem(year: i32) -> Stem {
    Stem::from_index(cycle_index(year, 10))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Twelve palaces starting at 命宫 on 寅, counter-clockwise naming.
    fn astrolabe() -> Astrolabe {
        let names = [
            "命宫", "兄弟", "夫妻", "子女", "财帛", "疾厄", "迁移", "仆役", "官禄", "田宅", "福德",
            "父母",
        ];
        let stems = ["丙", "丁", "戊", "己", "庚", "辛", "壬", "癸", "甲", "乙", "丙", "丁"];
        let branches = [
            "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥", "子", "丑",
        ];

        let palaces: Vec<_> = (0..12)
            .map(|i| {
                let (major, minor): (serde_json::Value, serde_json::Value) = match names[i] {
                    "命宫" => (json!([{"name": "紫微", "brightness": "庙", "mutagen": "权"}]), json!(["左辅"])),
                    "财帛" => (json!([{"name": "武曲", "brightness": "旺", "mutagen": ""}]), json!([])),
                    "官禄" => (json!([{"name": "廉贞", "brightness": "平", "mutagen": "禄"}]), json!([])),
                    "夫妻" => (json!([]), json!(["文昌"])),
                    _ => (json!([]), json!([])),
                };
                let adjective = if names[i] == "迁移" {
                    json!(["天刑"])
                } else {
                    json!([])
                };
                json!({
                    "index": i,
                    "name": names[i],
                    "heavenly_stem": stems[i],
                    "earthly_branch": branches[i],
                    "is_body_palace": names[i] == "官禄",
                    "major_stars": major,
                    "minor_stars": minor,
                    "adjective_stars": adjective
                })
            })
            .collect();

        Astrolabe::from_value(json!({
            "solar_date": "1998-05-29",
            "gender": "男",
            "lunar_date": "一九九八年五月初五",
            "chinese_date": "戊寅 丁巳 丙子 庚寅",
            "soul": "贪狼",
            "body": "天相",
            "five_elements_class": "水二局",
            "palaces": palaces
        }))
        .expect("astrolabe")
    }

    #[test]
    fn four_pillars_and_bazi_bridge() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);
        let pillars = analyzer.four_pillars().expect("pillars");
        assert_eq!(pillars.day_pillar.to_string(), "丙子");

        let chart = analyzer.bazi_chart().expect("chart");
        assert_eq!(chart.day_master, Stem::Bing);
        assert_eq!(chart.hour.to_string(), "庚寅");
    }

    #[test]
    fn short_chinese_date_is_unavailable() {
        let mut astrolabe = astrolabe();
        astrolabe.chinese_date = "戊寅 丁巳".to_string();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        assert!(matches!(
            analyzer.four_pillars(),
            Err(MingpanError::PillarsUnavailable)
        ));
        assert!(matches!(
            analyzer.year_four_trans(None),
            Err(MingpanError::YearStemUnavailable)
        ));
        assert!(!analyzer.tri_has_trans(PalaceName::Life, Mutagen::Quan));
    }

    #[test]
    fn year_four_trans_from_year_stem() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);
        let trans = analyzer.year_four_trans(None).expect("trans");
        assert_eq!(trans.lu, "贪狼");
        assert_eq!(
            analyzer.year_four_trans(Some("甲子")).expect("trans").lu,
            "廉贞"
        );
    }

    #[test]
    fn star_lookups() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        assert_eq!(analyzer.star_position("紫微"), Some(PalaceName::Life));
        assert_eq!(analyzer.star_position("天刑"), Some(PalaceName::Travel));
        assert_eq!(analyzer.star_position("破军"), None);
        assert_eq!(
            analyzer.star_tri_house("武曲"),
            Some(PalaceName::Wealth.tri_relations())
        );
        assert_eq!(analyzer.star_tri_house("破军"), None);
    }

    #[test]
    fn empty_houses() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        assert!(!analyzer.is_empty_house(PalaceName::Life));
        assert!(!analyzer.is_empty_house(PalaceName::Spouse));
        // adjective stars do not count
        assert!(analyzer.is_empty_house(PalaceName::Travel));
    }

    #[test]
    fn major_fortune_counts_decades_from_life_palace() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        assert_eq!(analyzer.major_fortune(5), Some(PalaceName::Life));
        assert_eq!(analyzer.major_fortune(14), Some(PalaceName::Life));
        assert_eq!(analyzer.major_fortune(25), Some(PalaceName::Spouse));
        // before the first decade wraps backwards
        assert_eq!(analyzer.major_fortune(4), Some(PalaceName::Parents));
    }

    #[test]
    fn extreme_ages_and_years_do_not_overflow() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        assert_eq!(analyzer.major_fortune(i32::MAX), Some(PalaceName::Life));
        assert_eq!(analyzer.major_fortune(i32::MIN), Some(PalaceName::Fortune));

        assert_eq!(flow_branch(i32::MAX), Branch::Mao);
        assert_eq!(flow_stem(i32::MAX), Stem::Ding);
        assert_eq!(flow_branch(i32::MIN), Branch::Zi);
        assert_eq!(flow_stem(i32::MIN), Stem::Ren);

        let report = analyzer.comprehensive(Some(i32::MIN), Some(i32::MIN));
        assert_eq!(
            report.flow_analysis.map(|flow| flow.house_of_flow),
            Some("福德")
        );
    }

    #[test]
    fn flow_year_follows_branch() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        // 2024 is 甲辰
        assert_eq!(flow_branch(2024), Branch::Chen);
        assert_eq!(flow_stem(2024), Stem::Jia);

        let flow = analyzer.flow_year(2024).expect("flow");
        assert_eq!(flow.palace, PalaceName::Spouse);
        assert_eq!(flow.minor_stars, vec!["文昌".to_string()]);
        assert_eq!(analyzer.house_of_flow(2024), "夫妻");
        assert_eq!(analyzer.flow_trans(2024).lu, "廉贞");
    }

    #[test]
    fn missing_flow_palace() {
        let mut astrolabe = astrolabe();
        astrolabe.palaces.retain(|p| p.earthly_branch != Branch::Chen);
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        assert!(matches!(
            analyzer.flow_year(2024),
            Err(MingpanError::FlowPalaceNotFound)
        ));
        assert_eq!(analyzer.house_of_flow(2024), "未知");
    }

    #[test]
    fn tri_relation_queries() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        assert!(analyzer.tri_has_star(PalaceName::Travel, &["武曲"]));
        assert!(analyzer.tri_has_star(PalaceName::Life, &["破军", "左辅"]));
        assert!(!analyzer.tri_has_star(PalaceName::Siblings, &["紫微"]));

        assert!(analyzer.tri_has_trans(PalaceName::Wealth, Mutagen::Lu));
        assert!(analyzer.tri_has_trans(PalaceName::Life, Mutagen::Quan));
        assert!(!analyzer.tri_has_trans(PalaceName::Life, Mutagen::Ji));
    }

    #[test]
    fn comprehensive_report_shape() {
        let astrolabe = astrolabe();
        let analyzer = ZiweiAnalyzer::new(&astrolabe);

        let bare = serde_json::to_value(analyzer.comprehensive(None, None)).expect("serialize");
        assert!(bare.get("major_fortune").is_none());
        assert!(bare.get("flow_analysis").is_none());
        assert_eq!(bare["basic_info"]["birth_date"], "1998-05-29");
        assert_eq!(bare["four_pillars"]["year_pillar"], "戊寅");
        assert_eq!(bare["year_four_trans"]["忌"], "天机");
        assert_eq!(bare["chart_analysis"]["star_positions"]["紫微"], "命宫");
        assert_eq!(
            bare["chart_analysis"]["palaces"]["命宫"]["minor_stars"],
            json!(["左辅"])
        );

        let empty = bare["empty_houses"].as_array().expect("array");
        assert_eq!(empty.len(), 8);
        assert!(!empty.contains(&json!("命宫")));

        let full = serde_json::to_value(analyzer.comprehensive(Some(25), Some(2024)))
            .expect("serialize");
        assert_eq!(full["major_fortune"], json!({"age": 25, "palace": "夫妻"}));
        assert_eq!(full["flow_analysis"]["house_of_flow"], "夫妻");
        assert_eq!(full["flow_analysis"]["flow_year"]["palace"], "夫妻");
    }
}
