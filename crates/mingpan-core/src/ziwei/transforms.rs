//! The four transformations (四化) keyed by year stem.

use crate::{MingpanError, Stem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mutagen {
    #[serde(rename = "禄")]
    Lu,
    #[serde(rename = "权")]
    Quan,
    #[serde(rename = "科")]
    Ke,
    #[serde(rename = "忌")]
    Ji,
}

impl Mutagen {
    pub const ALL: [Mutagen; 4] = [Mutagen::Lu, Mutagen::Quan, Mutagen::Ke, Mutagen::Ji];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Mutagen::Lu => "禄",
            Mutagen::Quan => "权",
            Mutagen::Ke => "科",
            Mutagen::Ji => "忌",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

impl fmt::Display for Mutagen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The star receiving each transformation in a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FourTransformations {
    #[serde(rename = "禄")]
    pub lu: &'static str,
    #[serde(rename = "权")]
    pub quan: &'static str,
    #[serde(rename = "科")]
    pub ke: &'static str,
    #[serde(rename = "忌")]
    pub ji: &'static str,
}

impl FourTransformations {
    /// Literal year-stem table.
    #[must_use]
    pub const fn for_stem(stem: Stem) -> Self {
        let [lu, quan, ke, ji] = match stem {
            Stem::Jia => ["廉贞", "破军", "武曲", "太阳"],
            Stem::Yi => ["天机", "天梁", "紫微", "太阴"],
            Stem::Bing => ["天同", "天机", "文昌", "廉贞"],
            Stem::Ding => ["太阴", "天同", "天机", "巨门"],
            Stem::Wu => ["贪狼", "太阴", "右弼", "天机"],
            Stem::Ji => ["武曲", "贪狼", "天梁", "文曲"],
            Stem::Geng => ["太阳", "武曲", "太阴", "天同"],
            Stem::Xin => ["巨门", "太阳", "文曲", "文昌"],
            Stem::Ren => ["天梁", "紫微", "左辅", "武曲"],
            Stem::Gui => ["破军", "巨门", "太阴", "贪狼"],
        };
        Self { lu, quan, ke, ji }
    }

    /// Table entry for the first character of a stem or stem-branch label
    /// such as "甲" or "甲子".
    pub fn for_label(label: &str) -> Result<Self, MingpanError> {
        let first: String = label.chars().take(1).collect();
        first
            .parse::<Stem>()
            .map(Self::for_stem)
            .map_err(|_| MingpanError::UnknownYearStem(first))
    }

    /// The star receiving a transformation.
    #[must_use]
    pub const fn star(&self, mutagen: Mutagen) -> &'static str {
        match mutagen {
            Mutagen::Lu => self.lu,
            Mutagen::Quan => self.quan,
            Mutagen::Ke => self.ke,
            Mutagen::Ji => self.ji,
        }
    }
}
