//! # Twelve Stages (十二长生)
//!
//! The life-stage label a branch carries relative to a Day Master.
//!
//! The rule table holds, for every stem, the ordered list of branches at
//! which that stem passes through each stage. A branch's position in that
//! list selects the stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the twelve stages, or `Unknown` when the lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TwelveStage {
    #[serde(rename = "长生")]
    Birth,
    #[serde(rename = "沐浴")]
    Bath,
    #[serde(rename = "冠带")]
    Cap,
    #[serde(rename = "临官")]
    Office,
    #[serde(rename = "帝旺")]
    Peak,
    #[serde(rename = "衰")]
    Decline,
    #[serde(rename = "病")]
    Sickness,
    #[serde(rename = "死")]
    Death,
    #[serde(rename = "墓")]
    Burial,
    #[serde(rename = "绝")]
    Extinction,
    #[serde(rename = "胎")]
    Gestation,
    #[serde(rename = "养")]
    Nurture,
    #[serde(rename = "未知")]
    Unknown,
}

impl TwelveStage {
    /// The twelve stages in sequence order.
    pub const ALL: [TwelveStage; 12] = [
        TwelveStage::Birth,
        TwelveStage::Bath,
        TwelveStage::Cap,
        TwelveStage::Office,
        TwelveStage::Peak,
        TwelveStage::Decline,
        TwelveStage::Sickness,
        TwelveStage::Death,
        TwelveStage::Burial,
        TwelveStage::Extinction,
        TwelveStage::Gestation,
        TwelveStage::Nurture,
    ];

    /// Stage at a sequence position; `Unknown` past the end.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(TwelveStage::Unknown)
    }

    /// The Chinese label of this stage.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TwelveStage::Birth => "长生",
            TwelveStage::Bath => "沐浴",
            TwelveStage::Cap => "冠带",
            TwelveStage::Office => "临官",
            TwelveStage::Peak => "帝旺",
            TwelveStage::Decline => "衰",
            TwelveStage::Sickness => "病",
            TwelveStage::Death => "死",
            TwelveStage::Burial => "墓",
            TwelveStage::Extinction => "绝",
            TwelveStage::Gestation => "胎",
            TwelveStage::Nurture => "养",
            TwelveStage::Unknown => "未知",
        }
    }
}

impl fmt::Display for TwelveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_index_bounds() {
        assert_eq!(TwelveStage::from_index(0), TwelveStage::Birth);
        assert_eq!(TwelveStage::from_index(11), TwelveStage::Nurture);
        assert_eq!(TwelveStage::from_index(12), TwelveStage::Unknown);
    }
}
