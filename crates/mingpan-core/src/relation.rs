//! # Relation Classifier
//!
//! Determines which of the five generative/destructive relations holds
//! between the Day Master's element and a target element.
//!
//! The cycles are adjacency data, not a formula: they are compiled from the
//! rule table (`生克逻辑`) and [`ElementCycles::standard`] spells out the
//! literal table for use without a document.

use crate::Element;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relation of a target element to the Day Master's element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Same element (同我).
    #[serde(rename = "同我")]
    Same,
    /// The target generates the Day Master (生我).
    #[serde(rename = "生我")]
    GeneratedBy,
    /// The Day Master generates the target (我生).
    #[serde(rename = "我生")]
    Generates,
    /// The Day Master overcomes the target (我克).
    #[serde(rename = "我克")]
    Overcomes,
    /// The target overcomes the Day Master (克我).
    #[serde(rename = "克我")]
    OvercomeBy,
    /// No relation could be established.
    #[serde(rename = "未知")]
    Unknown,
}

impl Relation {
    /// The Chinese label of this relation.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Relation::Same => "同我",
            Relation::GeneratedBy => "生我",
            Relation::Generates => "我生",
            Relation::Overcomes => "我克",
            Relation::OvercomeBy => "克我",
            Relation::Unknown => "未知",
        }
    }
}

/// Generative (我生) and destructive (我克) adjacency between elements.
///
/// `overcome_by` (克我) is carried for completeness and cross-checked against
/// `overcomes` when a rule table is compiled; classification never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCycles {
    generates: BTreeMap<Element, Element>,
    overcomes: BTreeMap<Element, Element>,
    overcome_by: BTreeMap<Element, Element>,
}

impl ElementCycles {
    /// Build cycles from explicit adjacency maps.
    #[must_use]
    pub fn new(
        generates: BTreeMap<Element, Element>,
        overcomes: BTreeMap<Element, Element>,
        overcome_by: BTreeMap<Element, Element>,
    ) -> Self {
        Self {
            generates,
            overcomes,
            overcome_by,
        }
    }

    /// The classical five-element cycles, copied literally.
    #[must_use]
    pub fn standard() -> Self {
        use Element::{Earth, Fire, Metal, Water, Wood};

        let generates = BTreeMap::from([
            (Wood, Fire),
            (Fire, Earth),
            (Earth, Metal),
            (Metal, Water),
            (Water, Wood),
        ]);
        let overcomes = BTreeMap::from([
            (Wood, Earth),
            (Earth, Water),
            (Water, Fire),
            (Fire, Metal),
            (Metal, Wood),
        ]);
        let overcome_by = BTreeMap::from([
            (Wood, Metal),
            (Metal, Fire),
            (Fire, Water),
            (Water, Earth),
            (Earth, Wood),
        ]);

        Self::new(generates, overcomes, overcome_by)
    }

    /// The element `element` generates, if known.
    #[must_use]
    pub fn generates(&self, element: Element) -> Option<Element> {
        self.generates.get(&element).copied()
    }

    /// The element `element` overcomes, if known.
    #[must_use]
    pub fn overcomes(&self, element: Element) -> Option<Element> {
        self.overcomes.get(&element).copied()
    }

    /// The element that overcomes `element`, per the `克我` table.
    #[must_use]
    pub fn overcome_by(&self, element: Element) -> Option<Element> {
        self.overcome_by.get(&element).copied()
    }

    /// Whether every element has both a generative and a destructive edge.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        Element::ALL
            .iter()
            .all(|e| self.generates.contains_key(e) && self.overcomes.contains_key(e))
    }

    /// Classify the relation of `target` to `day`.
    ///
    /// Checked in fixed order, first match wins: same, target generates day,
    /// day generates target, day overcomes target, target overcomes day.
    #[must_use]
    pub fn classify(&self, day: Element, target: Element) -> Relation {
        if day == target {
            return Relation::Same;
        }
        if self.generates(target) == Some(day) {
            return Relation::GeneratedBy;
        }
        if self.generates(day) == Some(target) {
            return Relation::Generates;
        }
        if self.overcomes(day) == Some(target) {
            return Relation::Overcomes;
        }
        if self.overcomes(target) == Some(day) {
            return Relation::OvercomeBy;
        }

        if self.is_complete() {
            tracing::error!(
                day = day.label(),
                target = target.label(),
                "Element cycles are complete but no relation matched; cycle table is inconsistent"
            );
        }
        Relation::Unknown
    }
}

// =============================================================================
// TESTS
// =============================================================================
