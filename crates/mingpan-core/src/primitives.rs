//! # Fixed Primitives
//!
//! Hardcoded constants of the Mingpan rule engine.
//!
//! Mingpan starts with fixed logic and a compiled rule table.
//! These primitives are compiled into the binary and are immutable at runtime.

// =============================================================================
// SENTINELS & BOUNDARY MESSAGES
// =============================================================================

/// Label emitted for any lookup that could not be resolved.
///
/// Missing rule-table entries degrade to this label instead of failing.
pub const UNKNOWN_LABEL: &str = "未知";

/// Error message for a chart lacking a pillar or the Day Master.
pub const INCOMPLETE_CHART_MESSAGE: &str = "八字信息不完整";

/// Prefix of the error message for any other annotation failure.
pub const ENHANCE_FAILURE_PREFIX: &str = "增强分析失败";

/// Error message when the year stem cannot be taken from the astrolabe.
pub const YEAR_STEM_UNAVAILABLE_MESSAGE: &str = "无法获取年干信息";

/// Error message when the astrolabe date does not hold four pillars.
pub const PILLARS_UNAVAILABLE_MESSAGE: &str = "四柱信息解析失败";

/// Error message when no palace matches the flow year's branch.
pub const FLOW_YEAR_UNAVAILABLE_MESSAGE: &str = "无法确定流年宫位";

// =============================================================================
// RULE TABLE
// =============================================================================

/// Conventional file name of the rule table document.
pub const RULE_TABLE_FILE_NAME: &str = "bazi_rule_tables.json";

/// Maximum size of a rule table document (1 MB).
///
/// The shipped table is a few kilobytes; anything larger is rejected unread.
pub const MAX_RULE_TABLE_BYTES: u64 = 1024 * 1024;

// =============================================================================
// BODY STRENGTH
// =============================================================================

/// A Day Master is "strong" when its element's share of the eight characters
/// exceeds `BODY_STRENGTH_NUMERATOR / BODY_STRENGTH_DENOMINATOR`.
///
/// Integer ratio (3/10) so the comparison stays in integer arithmetic.
pub const BODY_STRENGTH_NUMERATOR: u32 = 3;

/// See [`BODY_STRENGTH_NUMERATOR`].
pub const BODY_STRENGTH_DENOMINATOR: u32 = 10;

/// Whether `same` out of `total` characters strictly exceeds the body
/// strength ratio.
#[must_use]
pub const fn exceeds_body_strength_ratio(same: u32, total: u32) -> bool {
    same * BODY_STRENGTH_DENOMINATOR > total * BODY_STRENGTH_NUMERATOR
}

// =============================================================================
// ZI WEI DOU SHU CYCLES
// =============================================================================

/// Age at which the first major fortune (大限) begins.
pub const MAJOR_FORTUNE_START_AGE: i32 = 5;

/// Length in years of one major fortune.
pub const MAJOR_FORTUNE_SPAN: i32 = 10;

/// A Gregorian year whose stem-branch is 甲子, used as the flow-year epoch.
pub const SEXAGENARY_EPOCH_YEAR: i32 = 4;
