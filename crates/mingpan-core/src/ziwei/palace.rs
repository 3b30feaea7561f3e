//! The twelve palaces and their tri-relation (三方四正) table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the twelve palaces (宫位).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PalaceName {
    #[serde(rename = "命宫")]
    Life,
    #[serde(rename = "父母")]
    Parents,
    #[serde(rename = "福德")]
    Fortune,
    #[serde(rename = "田宅")]
    Property,
    #[serde(rename = "官禄")]
    Career,
    #[serde(rename = "仆役")]
    Friends,
    #[serde(rename = "迁移")]
    Travel,
    #[serde(rename = "疾厄")]
    Health,
    #[serde(rename = "财帛")]
    Wealth,
    #[serde(rename = "子女")]
    Children,
    #[serde(rename = "夫妻")]
    Spouse,
    #[serde(rename = "兄弟")]
    Siblings,
}

impl PalaceName {
    /// All palaces in report order.
    pub const ALL: [PalaceName; 12] = [
        PalaceName::Life,
        PalaceName::Parents,
        PalaceName::Fortune,
        PalaceName::Property,
        PalaceName::Career,
        PalaceName::Friends,
        PalaceName::Travel,
        PalaceName::Health,
        PalaceName::Wealth,
        PalaceName::Children,
        PalaceName::Spouse,
        PalaceName::Siblings,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PalaceName::Life => "命宫",
            PalaceName::Parents => "父母",
            PalaceName::Fortune => "福德",
            PalaceName::Property => "田宅",
            PalaceName::Career => "官禄",
            PalaceName::Friends => "仆役",
            PalaceName::Travel => "迁移",
            PalaceName::Health => "疾厄",
            PalaceName::Wealth => "财帛",
            PalaceName::Children => "子女",
            PalaceName::Spouse => "夫妻",
            PalaceName::Siblings => "兄弟",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }

    /// The palace itself followed by its three related palaces.
    ///
    /// Literal table; the relations are not derived from palace positions.
    #[must_use]
    pub const fn tri_relations(self) -> [PalaceName; 4] {
        use PalaceName::{
            Career, Children, Fortune, Friends, Health, Life, Parents, Property, Siblings, Spouse,
            Travel, Wealth,
        };

        match self {
            Life => [Life, Wealth, Career, Travel],
            Parents => [Parents, Health, Property, Friends],
            Fortune => [Fortune, Travel, Wealth, Life],
            Property => [Property, Children, Parents, Health],
            Career => [Career, Spouse, Life, Wealth],
            Friends => [Friends, Siblings, Parents, Health],
            Travel => [Travel, Life, Fortune, Wealth],
            Health => [Health, Property, Parents, Friends],
            Wealth => [Wealth, Fortune, Career, Life],
            Children => [Children, Property, Spouse, Siblings],
            Spouse => [Spouse, Career, Children, Siblings],
            Siblings => [Siblings, Friends, Children, Spouse],
        }
    }
}

impl fmt::Display for PalaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_roundtrip() {
        for palace in PalaceName::ALL {
            assert_eq!(PalaceName::from_label(palace.label()), Some(palace));
        }
        assert_eq!(PalaceName::from_label("交友"), None);
    }

    #[test]
    fn tri_relations_start_with_self() {
        for palace in PalaceName::ALL {
            assert_eq!(palace.tri_relations()[0], palace);
        }
    }

    #[test]
    fn life_palace_relations() {
        assert_eq!(
            PalaceName::Life.tri_relations().map(PalaceName::label),
            ["命宫", "财帛", "官禄", "迁移"]
        );
    }
}
