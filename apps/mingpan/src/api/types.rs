//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! `POST /bazi` takes and returns free-form records (see
//! [`mingpan_core::enhance_document`]); every other endpoint uses the typed
//! structures below.

use mingpan_core::{
    Astrolabe, Branch, Chart, ComprehensiveReport, EnhancedAnalysis, MingpanError, Outcome,
    PalaceName, Pillar, Stem, TableSummary, ZiweiAnalyzer, hour_branch, hour_pillar,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error body, shaped like the engine's own `{"error": ...}` documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<MingpanError> for ErrorResponse {
    fn from(e: MingpanError) -> Self {
        Self {
            error: e.report_message(),
        }
    }
}

// =============================================================================
// RULES RESPONSE
// =============================================================================

/// Rule table status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesResponse {
    /// False when the tables are empty and every lookup reports "未知".
    pub loaded: bool,
    pub summary: TableSummary,
}

// =============================================================================
// PILLARS REQUEST
// =============================================================================

/// Typed four-pillar chart.
///
/// The hour pillar may be given directly or derived from a clock hour;
/// the Day Master defaults to the day stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillarsRequest {
    pub year_pillar: Pillar,
    pub month_pillar: Pillar,
    pub day_pillar: Pillar,
    #[serde(default)]
    pub hour_pillar: Option<Pillar>,
    /// Clock hour (0-23), used when `hour_pillar` is absent.
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub day_master: Option<Stem>,
}

impl PillarsRequest {
    /// Resolve into a chart.
    pub fn to_chart(&self) -> Result<Chart, MingpanError> {
        let day_master = self.day_master.unwrap_or(self.day_pillar.stem);
        let hour = match (self.hour_pillar, self.hour) {
            (Some(pillar), _) => pillar,
            (None, Some(clock)) => hour_pillar(self.day_pillar.stem, clock)?,
            (None, None) => return Err(MingpanError::IncompleteChart),
        };

        Ok(Chart::new(
            self.year_pillar,
            self.month_pillar,
            self.day_pillar,
            hour,
            day_master,
        ))
    }
}

// =============================================================================
// HOUR REQUEST/RESPONSE
// =============================================================================

/// Hour pillar derivation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourRequest {
    pub day_master: Stem,
    pub hour: u32,
}

/// Derived hour pillar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourResponse {
    pub day_master: Stem,
    pub hour: u32,
    pub hour_branch: Branch,
    pub hour_pillar: Pillar,
}

impl HourRequest {
    pub fn resolve(&self) -> Result<HourResponse, MingpanError> {
        Ok(HourResponse {
            day_master: self.day_master,
            hour: self.hour,
            hour_branch: hour_branch(self.hour)?,
            hour_pillar: hour_pillar(self.day_master, self.hour)?,
        })
    }
}

// =============================================================================
// ZIWEI REQUEST/RESPONSE
// =============================================================================

/// Zi Wei analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZiweiRequest {
    pub astrolabe: Astrolabe,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub target_year: Option<i32>,
    /// Star whose palace and tri-relation should be reported.
    #[serde(default)]
    pub star: Option<String>,
    /// Palace label whose emptiness and tri-relation should be reported.
    #[serde(default)]
    pub house: Option<String>,
}

/// Where a star sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarQuery {
    pub star: String,
    pub palace: Option<PalaceName>,
    pub tri_house: Option<[PalaceName; 4]>,
}

/// A palace's emptiness and tri-relation.
///
/// An unrecognised palace label reads as empty with no relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseQuery {
    pub house: String,
    pub is_empty: bool,
    pub tri_house: Vec<PalaceName>,
}

impl StarQuery {
    pub fn new(analyzer: &ZiweiAnalyzer<'_>, star: &str) -> Self {
        Self {
            star: star.to_string(),
            palace: analyzer.star_position(star),
            tri_house: analyzer.star_tri_house(star),
        }
    }
}

impl HouseQuery {
    pub fn new(analyzer: &ZiweiAnalyzer<'_>, house: &str) -> Self {
        match PalaceName::from_label(house) {
            Some(name) => Self {
                house: house.to_string(),
                is_empty: analyzer.is_empty_house(name),
                tri_house: analyzer.tri_house(name).to_vec(),
            },
            None => Self {
                house: house.to_string(),
                is_empty: true,
                tri_house: Vec::new(),
            },
        }
    }
}

/// Zi Wei analysis response.
#[derive(Debug, Clone, Serialize)]
pub struct ZiweiResponse {
    pub report: ComprehensiveReport,
    /// BaZi annotation of the astrolabe's own four pillars.
    pub bazi: Outcome<EnhancedAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_query: Option<StarQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_query: Option<HouseQuery>,
}
