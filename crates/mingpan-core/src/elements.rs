//! # Five-Element Census
//!
//! Counts the element of each of the eight characters of a chart and derives
//! a simple body-strength verdict from the Day Master's share.

use crate::primitives::exceeds_body_strength_ratio;
use crate::rules::RuleTables;
use crate::{Chart, Element};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Element counts over the eight characters, keyed 木 火 土 金 水.
///
/// Every element is present, zero-valued when absent from the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiveElementCount(BTreeMap<Element, u32>);

impl FiveElementCount {
    /// Count a chart. Stem elements come from the rule table store and
    /// branch elements are intrinsic; a stem the store does not know is
    /// skipped.
    #[must_use]
    pub fn of_chart(tables: &RuleTables, chart: &Chart) -> Self {
        let mut counts: BTreeMap<Element, u32> = Element::ALL.iter().map(|&e| (e, 0)).collect();

        for (_, pillar) in chart.pillars() {
            let stem_element = tables.element_of(pillar.stem);
            for element in stem_element.into_iter().chain([pillar.branch.element()]) {
                *counts.entry(element).or_insert(0) += 1;
            }
        }
        Self(counts)
    }

    #[must_use]
    pub fn get(&self, element: Element) -> u32 {
        self.0.get(&element).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }
}

impl Serialize for FiveElementCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (element, count) in &self.0 {
            map.serialize_entry(element.label(), count)?;
        }
        map.end()
    }
}

/// Body strength (身强/身弱) of the Day Master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyStrength {
    #[serde(rename = "强")]
    Strong,
    #[serde(rename = "弱")]
    Weak,
}

impl BodyStrength {
    /// Strong when the Day Master's element holds strictly more than 3/10 of
    /// the counted characters.
    #[must_use]
    pub fn assess(tables: &RuleTables, chart: &Chart, counts: &FiveElementCount) -> Self {
        let same = tables
            .element_of(chart.day_master)
            .map_or(0, |element| counts.get(element));
        let total = counts.total();

        if exceeds_body_strength_ratio(same, total) {
            BodyStrength::Strong
        } else {
            BodyStrength::Weak
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            BodyStrength::Strong => "强",
            BodyStrength::Weak => "弱",
        }
    }
}

/// The basic chart record that [`enhance`](crate::report::enhance) enriches:
/// pillars, Day Master, `five_elements_count` and `body_strength`.
#[must_use]
pub fn basic_record(tables: &RuleTables, chart: &Chart) -> Map<String, Value> {
    let counts = FiveElementCount::of_chart(tables, chart);
    let strength = BodyStrength::assess(tables, chart, &counts);

    let mut record = chart.to_record();
    record.insert("five_elements_count".to_string(), json!(counts));
    record.insert("body_strength".to_string(), json!(strength.label()));
    record
}
