//! # Rule Document
//!
//! The raw, string-keyed view of `bazi_rule_tables.json`.
//!
//! Keys are kept exactly as the document spells them. Nothing here is
//! validated beyond JSON shape: every section defaults to empty so that
//! [`RuleTables::compile`](super::RuleTables::compile) can report all missing
//! entries at once instead of failing on the first.

use crate::MingpanError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level rule table document with its five sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Hidden stems by branch.
    #[serde(rename = "藏干", default)]
    pub hidden_stems: BTreeMap<String, Vec<String>>,

    /// NaYin label by stem-branch pair.
    #[serde(rename = "纳音", default)]
    pub nayin: BTreeMap<String, String>,

    /// Void branches by day pillar.
    #[serde(rename = "空亡旬空", default)]
    pub void_branches: BTreeMap<String, Vec<String>>,

    /// Branch sequence (长生 .. 养) by day stem.
    #[serde(rename = "长生十二神", default)]
    pub twelve_stages: BTreeMap<String, Vec<String>>,

    /// Stem attributes and element cycles.
    #[serde(rename = "十神规则", default)]
    pub ten_god: Option<TenGodDocument>,
}

/// The `十神规则` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenGodDocument {
    /// Element by stem.
    #[serde(rename = "五行", default)]
    pub elements: BTreeMap<String, String>,

    /// Polarity by stem.
    #[serde(rename = "阴阳", default)]
    pub polarities: BTreeMap<String, String>,

    /// Generative and destructive adjacency.
    #[serde(rename = "生克逻辑", default)]
    pub cycles: CycleDocument,
}

/// The `生克逻辑` adjacency tables, element label to element label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDocument {
    #[serde(rename = "我生", default)]
    pub generates: BTreeMap<String, String>,

    #[serde(rename = "我克", default)]
    pub overcomes: BTreeMap<String, String>,

    #[serde(rename = "克我", default)]
    pub overcome_by: BTreeMap<String, String>,
}

impl RuleDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, MingpanError> {
        serde_json::from_str(text).map_err(|e| MingpanError::DeserializationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default_to_empty() {
        let doc = RuleDocument::from_json_str("{}").expect("parse");
        assert!(doc.hidden_stems.is_empty());
        assert!(doc.ten_god.is_none());
    }

    #[test]
    fn wrong_shape_is_a_deserialization_error() {
        let err = RuleDocument::from_json_str(r#"{"纳音": 5}"#);
        assert!(matches!(err, Err(MingpanError::DeserializationError(_))));
    }

    #[test]
    fn reads_chinese_keys() {
        let doc = RuleDocument::from_json_str(
            r#"{"藏干": {"子": ["癸"]}, "十神规则": {"五行": {"甲": "木"}}}"#,
        )
        .expect("parse");
        assert_eq!(doc.hidden_stems.get("子"), Some(&vec!["癸".to_string()]));
        let ten_god = doc.ten_god.expect("section");
        assert_eq!(ten_god.elements.get("甲").map(String::as_str), Some("木"));
        assert!(ten_god.cycles.generates.is_empty());
    }
}
