//! # Core Type Definitions
//!
//! This module contains the symbolic vocabulary of the Mingpan rule engine:
//! - Five elements and yin/yang polarity (`Element`, `Polarity`)
//! - Heavenly stems and earthly branches (`Stem`, `Branch`)
//! - Pillars and charts (`Pillar`, `PillarPosition`, `Chart`)
//! - Output boundary wrapper (`Outcome`)
//! - Error types (`MingpanError`)
//!
//! ## Determinism Guarantees
//!
//! All symbol types in this module:
//! - Are fieldless enums (or pairs of them) with no hidden state
//! - Implement `Ord` in canonical cycle order for `BTreeMap`/`BTreeSet` keys
//! - Serialize as their Chinese label, byte-for-byte

use crate::primitives::{
    FLOW_YEAR_UNAVAILABLE_MESSAGE, INCOMPLETE_CHART_MESSAGE, PILLARS_UNAVAILABLE_MESSAGE,
    YEAR_STEM_UNAVAILABLE_MESSAGE,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// FIVE ELEMENTS & POLARITY
// =============================================================================

/// One of the five elements (五行).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "木")]
    Wood,
    #[serde(rename = "火")]
    Fire,
    #[serde(rename = "土")]
    Earth,
    #[serde(rename = "金")]
    Metal,
    #[serde(rename = "水")]
    Water,
}

impl Element {
    /// All elements in generative-cycle order.
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    /// The Chinese label of this element.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }

    /// Parse an element from its Chinese label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Yin/yang polarity (阴阳).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Polarity {
    #[serde(rename = "阳")]
    Yang,
    #[serde(rename = "阴")]
    Yin,
}

impl Polarity {
    /// The Chinese label of this polarity.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Polarity::Yang => "阳",
            Polarity::Yin => "阴",
        }
    }

    /// Parse a polarity from its Chinese label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "阳" => Some(Polarity::Yang),
            "阴" => Some(Polarity::Yin),
            _ => None,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// HEAVENLY STEMS
// =============================================================================

/// One of the ten heavenly stems (天干).
///
/// A stem carries no intrinsic attributes here: its element and polarity are
/// defined once in the rule table store and looked up from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stem {
    #[serde(rename = "甲")]
    Jia,
    #[serde(rename = "乙")]
    Yi,
    #[serde(rename = "丙")]
    Bing,
    #[serde(rename = "丁")]
    Ding,
    #[serde(rename = "戊")]
    Wu,
    #[serde(rename = "己")]
    Ji,
    #[serde(rename = "庚")]
    Geng,
    #[serde(rename = "辛")]
    Xin,
    #[serde(rename = "壬")]
    Ren,
    #[serde(rename = "癸")]
    Gui,
}

impl Stem {
    /// All stems in cycle order, starting at 甲.
    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    const CHARS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];

    /// Zero-based position in the stem cycle.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stem at a position in the cycle, wrapping modulo 10.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 10]
    }

    /// The Chinese character of this stem.
    #[must_use]
    pub const fn as_char(self) -> char {
        Self::CHARS[self.index()]
    }

    /// Parse a stem from its Chinese character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        Self::CHARS.iter().position(|&x| x == c).map(Self::from_index)
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Stem {
    type Err = MingpanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| MingpanError::InvalidStem(s.into())),
            _ => Err(MingpanError::InvalidStem(s.into())),
        }
    }
}

// =============================================================================
// EARTHLY BRANCHES
// =============================================================================

/// One of the twelve earthly branches (地支).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "子")]
    Zi,
    #[serde(rename = "丑")]
    Chou,
    #[serde(rename = "寅")]
    Yin,
    #[serde(rename = "卯")]
    Mao,
    #[serde(rename = "辰")]
    Chen,
    #[serde(rename = "巳")]
    Si,
    #[serde(rename = "午")]
    Wu,
    #[serde(rename = "未")]
    Wei,
    #[serde(rename = "申")]
    Shen,
    #[serde(rename = "酉")]
    You,
    #[serde(rename = "戌")]
    Xu,
    #[serde(rename = "亥")]
    Hai,
}

impl Branch {
    /// All branches in cycle order, starting at 子.
    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    const CHARS: [char; 12] = [
        '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
    ];

    /// Zero-based position in the branch cycle.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Branch at a position in the cycle, wrapping modulo 12.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// The Chinese character of this branch.
    #[must_use]
    pub const fn as_char(self) -> char {
        Self::CHARS[self.index()]
    }

    /// Parse a branch from its Chinese character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        Self::CHARS.iter().position(|&x| x == c).map(Self::from_index)
    }

    /// The element a branch belongs to.
    #[must_use]
    pub const fn element(self) -> Element {
        match self {
            Branch::Zi | Branch::Hai => Element::Water,
            Branch::Yin | Branch::Mao => Element::Wood,
            Branch::Si | Branch::Wu => Element::Fire,
            Branch::Shen | Branch::You => Element::Metal,
            Branch::Chou | Branch::Chen | Branch::Wei | Branch::Xu => Element::Earth,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Branch {
    type Err = MingpanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Self::from_char(c).ok_or_else(|| MingpanError::InvalidBranch(s.into()))
            }
            _ => Err(MingpanError::InvalidBranch(s.into())),
        }
    }
}

// =============================================================================
// PILLAR
// =============================================================================

/// A stem-branch pair (干支), written as a two-character label such as "丙子".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
}

impl Pillar {
    /// Create a new pillar.
    #[must_use]
    pub const fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// The 60 pillars of the sexagenary cycle, starting at 甲子.
    pub fn sexagenary() -> impl Iterator<Item = Pillar> {
        (0..60).map(|i| Pillar::new(Stem::from_index(i), Branch::from_index(i)))
    }

    /// Whether the pair occurs in the sexagenary cycle.
    ///
    /// Only stems and branches of matching parity ever pair up.
    #[must_use]
    pub const fn is_sexagenary(&self) -> bool {
        self.stem.index() % 2 == self.branch.index() % 2
    }

    /// The two-character label.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

impl FromStr for Pillar {
    type Err = MingpanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(stem), Some(branch), None) => {
                match (Stem::from_char(stem), Branch::from_char(branch)) {
                    (Some(stem), Some(branch)) => Ok(Pillar::new(stem, branch)),
                    _ => Err(MingpanError::InvalidPillar(s.into())),
                }
            }
            _ => Err(MingpanError::InvalidPillar(s.into())),
        }
    }
}

impl TryFrom<String> for Pillar {
    type Error = MingpanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pillar> for String {
    fn from(pillar: Pillar) -> Self {
        pillar.label()
    }
}

/// The four positions of a BaZi chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PillarPosition {
    #[serde(rename = "年柱")]
    Year,
    #[serde(rename = "月柱")]
    Month,
    #[serde(rename = "日柱")]
    Day,
    #[serde(rename = "时柱")]
    Hour,
}

impl PillarPosition {
    /// All positions in chart order.
    pub const ALL: [PillarPosition; 4] = [
        PillarPosition::Year,
        PillarPosition::Month,
        PillarPosition::Day,
        PillarPosition::Hour,
    ];

    /// The Chinese label (柱序).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PillarPosition::Year => "年柱",
            PillarPosition::Month => "月柱",
            PillarPosition::Day => "日柱",
            PillarPosition::Hour => "时柱",
        }
    }

    /// The key this pillar is stored under in a chart record.
    #[must_use]
    pub const fn record_key(self) -> &'static str {
        match self {
            PillarPosition::Year => "year_pillar",
            PillarPosition::Month => "month_pillar",
            PillarPosition::Day => "day_pillar",
            PillarPosition::Hour => "hour_pillar",
        }
    }
}

impl fmt::Display for PillarPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// CHART
// =============================================================================

/// A complete BaZi chart: four pillars plus the Day Master.
///
/// The Day Master is the reference point of every relational lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
    pub day_master: Stem,
}

impl Chart {
    /// Create a chart with an explicit Day Master.
    #[must_use]
    pub const fn new(year: Pillar, month: Pillar, day: Pillar, hour: Pillar, day_master: Stem) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            day_master,
        }
    }

    /// Create a chart whose Day Master is the stem of the day pillar.
    #[must_use]
    pub const fn from_pillars(year: Pillar, month: Pillar, day: Pillar, hour: Pillar) -> Self {
        Self::new(year, month, day, hour, day.stem)
    }

    /// The pillar at a position.
    #[must_use]
    pub const fn pillar(&self, position: PillarPosition) -> Pillar {
        match position {
            PillarPosition::Year => self.year,
            PillarPosition::Month => self.month,
            PillarPosition::Day => self.day,
            PillarPosition::Hour => self.hour,
        }
    }

    /// All four pillars in chart order.
    #[must_use]
    pub fn pillars(&self) -> [(PillarPosition, Pillar); 4] {
        PillarPosition::ALL.map(|position| (position, self.pillar(position)))
    }
}

// =============================================================================
// OUTCOME (output boundary)
// =============================================================================

/// A value or a `{"error": "..."}` object, as emitted at JSON boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Ready(T),
    Failed { error: String },
}

impl<T> From<Result<T, MingpanError>> for Outcome<T> {
    fn from(result: Result<T, MingpanError>) -> Self {
        match result {
            Ok(value) => Outcome::Ready(value),
            Err(e) => Outcome::Failed {
                error: e.report_message(),
            },
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Mingpan system.
///
/// - Missing rule-table entries are NOT errors; lookups degrade to "未知"
/// - Use `Result<T, MingpanError>` for fallible operations
/// - The CORE should never panic; all errors must be recoverable
#[derive(Debug, Error)]
pub enum MingpanError {
    /// A chart is missing one of its pillars or its Day Master.
    #[error("Chart is incomplete: four pillars and a day master are required")]
    IncompleteChart,

    /// The text is not a heavenly stem.
    #[error("Invalid heavenly stem: {0}")]
    InvalidStem(String),

    /// The text is not an earthly branch.
    #[error("Invalid earthly branch: {0}")]
    InvalidBranch(String),

    /// The text is not a stem-branch pair.
    #[error("Invalid pillar: {0}")]
    InvalidPillar(String),

    /// A clock hour outside 0..=23.
    #[error("Invalid clock hour: {0} (expected 0-23)")]
    InvalidHour(u32),

    /// The rule table document lacks expected entries.
    ///
    /// Carries every problem found, not just the first one.
    #[error("Rule table incomplete ({} problems): {}", .0.len(), .0.join("; "))]
    RuleTableIncomplete(Vec<String>),

    /// The stem used for the four transformations is not a heavenly stem.
    #[error("Unknown year stem: {0}")]
    UnknownYearStem(String),

    /// The year stem could not be determined from the astrolabe.
    #[error("Year stem unavailable")]
    YearStemUnavailable,

    /// The astrolabe's Chinese date does not hold four pillars.
    #[error("Four pillars unavailable in astrolabe date")]
    PillarsUnavailable,

    /// No palace sits on the flow year's branch.
    #[error("No palace found for the flow year branch")]
    FlowPalaceNotFound,

    /// A chart record came back as an `{"error": ...}` document.
    #[error("Chart not enhanced: {0}")]
    ChartRejected(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl MingpanError {
    /// The message emitted in `{"error": ...}` documents.
    ///
    /// Variants with an established Chinese wording keep it byte-for-byte;
    /// the rest use their `Display` text.
    #[must_use]
    pub fn report_message(&self) -> String {
        match self {
            MingpanError::IncompleteChart => INCOMPLETE_CHART_MESSAGE.to_string(),
            MingpanError::UnknownYearStem(stem) => format!("未知年干: {}", stem),
            MingpanError::YearStemUnavailable => YEAR_STEM_UNAVAILABLE_MESSAGE.to_string(),
            MingpanError::PillarsUnavailable => PILLARS_UNAVAILABLE_MESSAGE.to_string(),
            MingpanError::FlowPalaceNotFound => FLOW_YEAR_UNAVAILABLE_MESSAGE.to_string(),
            MingpanError::ChartRejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
