//! Pre-computed Zi Wei Dou Shu astrolabe, as supplied by a star-placement
//! collaborator.
//!
//! Star lists accept either bare names (`"左辅"`) or objects
//! (`{"name": "紫微", "brightness": "庙", "mutagen": "权"}`); an empty or
//! unknown mutagen reads as none.

use super::palace::PalaceName;
use super::transforms::Mutagen;
use crate::{Branch, MingpanError, Stem};
use serde::{Deserialize, Serialize};

/// A star placed in a palace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StarRepr")]
pub struct Star {
    pub name: String,
    pub brightness: String,
    #[serde(serialize_with = "serialize_mutagen")]
    pub mutagen: Option<Mutagen>,
}

impl Star {
    /// A star with no brightness or transformation.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brightness: String::new(),
            mutagen: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StarRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        brightness: Option<String>,
        #[serde(default)]
        mutagen: Option<String>,
    },
}

impl From<StarRepr> for Star {
    fn from(repr: StarRepr) -> Self {
        match repr {
            StarRepr::Name(name) => Star::named(name),
            StarRepr::Full {
                name,
                brightness,
                mutagen,
            } => Star {
                name,
                brightness: brightness.unwrap_or_default(),
                mutagen: mutagen.as_deref().and_then(Mutagen::from_label),
            },
        }
    }
}

fn serialize_mutagen<S: serde::Serializer>(
    mutagen: &Option<Mutagen>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(mutagen.map_or("", Mutagen::label))
}

/// One palace of the astrolabe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palace {
    pub index: usize,
    pub name: PalaceName,
    pub heavenly_stem: Stem,
    pub earthly_branch: Branch,
    #[serde(default)]
    pub is_body_palace: bool,
    #[serde(default)]
    pub major_stars: Vec<Star>,
    #[serde(default)]
    pub minor_stars: Vec<Star>,
    #[serde(default)]
    pub adjective_stars: Vec<Star>,
}

impl Palace {
    /// Every star in the palace: major, minor, then adjective.
    pub fn all_stars(&self) -> impl Iterator<Item = &Star> {
        self.major_stars
            .iter()
            .chain(&self.minor_stars)
            .chain(&self.adjective_stars)
    }

    /// Whether a major or minor star with this name sits here.
    #[must_use]
    pub fn has_principal_star(&self, name: &str) -> bool {
        self.major_stars
            .iter()
            .chain(&self.minor_stars)
            .any(|s| s.name == name)
    }

    /// A palace is empty when it holds no major and no minor star.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.major_stars.is_empty() && self.minor_stars.is_empty()
    }
}

/// A complete astrolabe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Astrolabe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub lunar_date: String,
    /// Four pillars as space-separated stem-branch labels.
    #[serde(default)]
    pub chinese_date: String,
    #[serde(default)]
    pub soul: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub five_elements_class: String,
    pub palaces: Vec<Palace>,
}

impl Astrolabe {
    pub fn from_json_str(text: &str) -> Result<Self, MingpanError> {
        serde_json::from_str(text).map_err(|e| MingpanError::DeserializationError(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, MingpanError> {
        serde_json::from_value(value).map_err(|e| MingpanError::DeserializationError(e.to_string()))
    }

    #[must_use]
    pub fn palace(&self, name: PalaceName) -> Option<&Palace> {
        self.palaces.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_accept_names_and_objects() {
        let stars: Vec<Star> = serde_json::from_str(
            r#"["左辅", {"name": "紫微", "brightness": "庙", "mutagen": "权"}, {"name": "天府", "mutagen": ""}]"#,
        )
        .expect("parse");

        assert_eq!(stars[0], Star::named("左辅"));
        assert_eq!(stars[1].mutagen, Some(Mutagen::Quan));
        assert_eq!(stars[1].brightness, "庙");
        assert_eq!(stars[2].mutagen, None);
    }

    #[test]
    fn star_serializes_empty_mutagen() {
        let json = serde_json::to_value(Star::named("天府")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"name": "天府", "brightness": "", "mutagen": ""})
        );
    }

    #[test]
    fn unknown_palace_name_is_rejected() {
        let err = Astrolabe::from_json_str(
            r#"{"palaces": [{"index": 0, "name": "交友", "heavenly_stem": "甲", "earthly_branch": "子"}]}"#,
        )
        .expect_err("unknown palace");
        assert!(matches!(err, MingpanError::DeserializationError(_)));
    }
}
