//! # Aggregate Reporter
//!
//! Builds the `enhanced_analysis` section of a chart record and owns the
//! all-or-nothing boundary around it.
//!
//! ## Boundary Rules
//!
//! - A record already carrying `error` passes through untouched
//! - A record lacking any pillar or the Day Master yields exactly
//!   `{"error": "八字信息不完整"}`
//! - Any other failure yields `{"error": "增强分析失败: ..."}`
//! - A partially filled report is never emitted

use crate::annotator::{AnnotatedPillar, Annotator};
use crate::primitives::ENHANCE_FAILURE_PREFIX;
use crate::rules::RuleTables;
use crate::ten_god::TenGod;
use crate::{Chart, MingpanError, Pillar, PillarPosition, Stem};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Key of the section added to an enriched record.
pub const ENHANCED_ANALYSIS_KEY: &str = "enhanced_analysis";

/// Key of the Day Master in a chart record.
pub const DAY_MASTER_KEY: &str = "day_master";

const ERROR_KEY: &str = "error";

// =============================================================================
// ROLE TALLY
// =============================================================================

/// Occurrence count per role over visible and hidden stems.
///
/// Roles that never occur are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleTally(BTreeMap<TenGod, u32>);

impl RoleTally {
    /// Tally the roles of a list of annotated pillars.
    #[must_use]
    pub fn tally(pillars: &[AnnotatedPillar]) -> Self {
        let mut counts = BTreeMap::new();
        for role in pillars.iter().flat_map(AnnotatedPillar::roles) {
            *counts.entry(role).or_insert(0) += 1;
        }
        Self(counts)
    }

    /// Count for one role (zero when absent).
    #[must_use]
    pub fn count(&self, role: TenGod) -> u32 {
        self.0.get(&role).copied().unwrap_or(0)
    }

    /// Sum over all roles.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Number of distinct roles encountered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no role was encountered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(role, count)` in role order.
    pub fn iter(&self) -> impl Iterator<Item = (TenGod, u32)> + '_ {
        self.0.iter().map(|(&role, &count)| (role, count))
    }
}

// =============================================================================
// FIELD NOTES
// =============================================================================

/// Documentation strings explaining the annotated fields (`分析说明`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldNotes;

impl FieldNotes {
    /// `(field, explanation)` pairs in output order.
    pub const ENTRIES: [(&'static str, &'static str); 5] = [
        ("主星", "天干对应的十神"),
        ("藏干", "地支中隐藏的天干"),
        ("纳音", "干支组合的五行属性"),
        ("空亡", "基于日柱的空亡地支"),
        ("星运", "基于日干的十二长生状态"),
    ];
}

impl Serialize for FieldNotes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(Self::ENTRIES.len()))?;
        for (field, note) in Self::ENTRIES {
            map.serialize_entry(field, note)?;
        }
        map.end()
    }
}

// =============================================================================
// ENHANCED ANALYSIS
// =============================================================================

/// The `enhanced_analysis` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedAnalysis {
    #[serde(rename = "四柱详析")]
    pub pillars: Vec<AnnotatedPillar>,
    #[serde(rename = "十神统计")]
    pub tally: RoleTally,
    #[serde(rename = "分析说明")]
    pub notes: FieldNotes,
}

/// Annotate all four pillars of a chart and tally their roles.
#[must_use]
pub fn analyze(tables: &RuleTables, chart: &Chart) -> EnhancedAnalysis {
    let annotator = Annotator::new(tables);
    let pillars: Vec<AnnotatedPillar> = chart
        .pillars()
        .into_iter()
        .map(|(position, pillar)| annotator.annotate(position, pillar, chart.day_master, chart.day))
        .collect();
    let tally = RoleTally::tally(&pillars);

    EnhancedAnalysis {
        pillars,
        tally,
        notes: FieldNotes,
    }
}

/// A chart record with its `enhanced_analysis` section appended.
///
/// The record's own fields keep their original order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedChart {
    #[serde(flatten)]
    pub record: Map<String, Value>,
    pub enhanced_analysis: EnhancedAnalysis,
}

// =============================================================================
// RECORD EXTRACTION
// =============================================================================

impl Chart {
    /// Extract a chart from a record with `year_pillar`, `month_pillar`,
    /// `day_pillar`, `hour_pillar` and `day_master` string fields.
    ///
    /// Presence is checked for all five fields before any is parsed, so a
    /// record missing one field is always `IncompleteChart`.
    pub fn from_record(record: &Map<String, Value>) -> Result<Chart, MingpanError> {
        let field = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        let mut pillars = Vec::with_capacity(PillarPosition::ALL.len());
        for position in PillarPosition::ALL {
            pillars.push(field(position.record_key()).ok_or(MingpanError::IncompleteChart)?);
        }
        let day_master = field(DAY_MASTER_KEY).ok_or(MingpanError::IncompleteChart)?;

        let parsed = pillars
            .into_iter()
            .map(str::parse::<Pillar>)
            .collect::<Result<Vec<_>, _>>()?;
        let day_master: Stem = day_master.parse()?;

        match parsed.as_slice() {
            &[year, month, day, hour] => {
                if day.stem != day_master {
                    tracing::warn!(
                        day_pillar = %day,
                        day_master = %day_master,
                        "Day master differs from the day pillar's stem; using the given day master"
                    );
                }
                Ok(Chart::new(year, month, day, hour, day_master))
            }
            _ => Err(MingpanError::IncompleteChart),
        }
    }

    /// The record form of this chart (four pillars plus Day Master).
    #[must_use]
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        for (position, pillar) in self.pillars() {
            record.insert(position.record_key().to_string(), json!(pillar.label()));
        }
        record.insert(
            DAY_MASTER_KEY.to_string(),
            json!(self.day_master.to_string()),
        );
        record
    }
}

// =============================================================================
// ORCHESTRATION
// =============================================================================

/// Enrich a chart record.
///
/// An existing `enhanced_analysis` field is replaced, so enriching twice
/// yields the same document.
pub fn enhance(
    tables: &RuleTables,
    mut record: Map<String, Value>,
) -> Result<EnhancedChart, MingpanError> {
    let chart = Chart::from_record(&record)?;
    record.shift_remove(ENHANCED_ANALYSIS_KEY);

    Ok(EnhancedChart {
        record,
        enhanced_analysis: analyze(tables, &chart),
    })
}

/// The JSON boundary around [`enhance`].
///
/// Never fails: every fault becomes an `{"error": ...}` document.
#[must_use]
pub fn enhance_document(tables: &RuleTables, document: Value) -> Value {
    let record = match document {
        Value::Object(record) if record.contains_key(ERROR_KEY) => return Value::Object(record),
        Value::Object(record) => record,
        _ => return error_document(&MingpanError::IncompleteChart),
    };

    match enhance(tables, record).and_then(|enhanced| {
        serde_json::to_value(enhanced).map_err(|e| MingpanError::SerializationError(e.to_string()))
    }) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Chart enhancement failed");
            error_document(&e)
        }
    }
}

fn error_document(error: &MingpanError) -> Value {
    let message = match error {
        MingpanError::IncompleteChart => error.report_message(),
        other => format!("{}: {}", ENHANCE_FAILURE_PREFIX, other),
    };
    json!({ ERROR_KEY: message })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_record() -> Map<String, Value> {
        let value = json!({
            "year_pillar": "戊寅",
            "month_pillar": "丁巳",
            "day_pillar": "丙子",
            "hour_pillar": "庚寅",
            "day_master": "丙",
            "body_strength": "强"
        });
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn tally_counts_visible_and_hidden_roles() {
        let chart = Chart::from_record(&reference_record()).expect("chart");
        let analysis = analyze(RuleTables::builtin(), &chart);

        let tally = &analysis.tally;
        assert_eq!(tally.count(TenGod::EatingGod), 4);
        assert_eq!(tally.count(TenGod::IndirectSeal), 2);
        assert_eq!(tally.count(TenGod::Rival), 4);
        assert_eq!(tally.count(TenGod::RobWealth), 1);
        assert_eq!(tally.count(TenGod::IndirectWealth), 2);
        assert_eq!(tally.count(TenGod::DirectOfficer), 1);
        assert_eq!(tally.count(TenGod::SevenKillings), 0);
        assert_eq!(tally.total(), 14);
        assert_eq!(tally.len(), 6);
    }

    #[test]
    fn tally_omits_absent_roles() {
        let chart = Chart::from_record(&reference_record()).expect("chart");
        let json = serde_json::to_value(analyze(RuleTables::builtin(), &chart).tally)
            .expect("serialize");
        let keys: Vec<&String> = json.as_object().expect("object").keys().collect();
        assert!(!keys.iter().any(|k| k.as_str() == "七杀"));
        assert!(keys.iter().any(|k| k.as_str() == "食神"));
    }

    #[test]
    fn field_notes_keep_order_and_wording() {
        let json = serde_json::to_string(&FieldNotes).expect("serialize");
        assert_eq!(
            json,
            r#"{"主星":"天干对应的十神","藏干":"地支中隐藏的天干","纳音":"干支组合的五行属性","空亡":"基于日柱的空亡地支","星运":"基于日干的十二长生状态"}"#
        );
    }

    #[test]
    fn enhance_keeps_record_fields_first() {
        let enhanced = enhance(RuleTables::builtin(), reference_record()).expect("enhance");
        let json = serde_json::to_value(&enhanced).expect("serialize");
        let keys: Vec<&str> = json
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "year_pillar",
                "month_pillar",
                "day_pillar",
                "hour_pillar",
                "day_master",
                "body_strength",
                "enhanced_analysis"
            ]
        );
    }

    #[test]
    fn missing_field_is_incomplete() {
        for key in ["year_pillar", "hour_pillar", "day_master"] {
            let mut record = reference_record();
            record.remove(key);
            assert!(matches!(
                Chart::from_record(&record),
                Err(MingpanError::IncompleteChart)
            ));
        }

        let mut record = reference_record();
        record.insert("month_pillar".into(), json!(""));
        assert!(matches!(
            Chart::from_record(&record),
            Err(MingpanError::IncompleteChart)
        ));
    }

    #[test]
    fn document_boundary_messages() {
        let tables = RuleTables::builtin();

        let passthrough = json!({"error": "八字计算错误: x"});
        assert_eq!(enhance_document(tables, passthrough.clone()), passthrough);

        let mut incomplete = reference_record();
        incomplete.remove("hour_pillar");
        assert_eq!(
            enhance_document(tables, Value::Object(incomplete)),
            json!({"error": "八字信息不完整"})
        );

        let mut garbled = reference_record();
        garbled.insert("day_pillar".into(), json!("XY"));
        let out = enhance_document(tables, Value::Object(garbled));
        let message = out["error"].as_str().expect("error message");
        assert!(message.starts_with("增强分析失败: "));
        assert_eq!(out.as_object().map(Map::len), Some(1));
    }

    #[test]
    fn enhancing_twice_is_stable() {
        let tables = RuleTables::builtin();
        let once = enhance_document(tables, Value::Object(reference_record()));
        let twice = enhance_document(tables, once.clone());
        assert_eq!(
            serde_json::to_string(&once).expect("serialize"),
            serde_json::to_string(&twice).expect("serialize")
        );
    }

    #[test]
    fn chart_record_roundtrip() {
        let chart = Chart::from_record(&reference_record()).expect("chart");
        assert_eq!(Chart::from_record(&chart.to_record()).expect("chart"), chart);
    }
}
