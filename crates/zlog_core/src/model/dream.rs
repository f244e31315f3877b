//! Dream domain model.
//!
//! # Responsibility
//! - Define the dream record owned by a `Sleep`.
//! - Define the closed `DreamType` and `DreamRating` vocabularies.
//!
//! # Invariants
//! - `rating` always resolves to one of the five members, even from malformed
//!   input (fallback is `Neutral`).
//! - Decoding goes through `codec::lenient`, so documents written by older
//!   versions (missing or differently-shaped optional fields) still load.
//! - `tags` holds copies of tag values taken at assignment time.

use crate::codec::lenient::{self, LenientDream};
use crate::model::tag::Tag;
use crate::model::Identified;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

pub type DreamId = Uuid;

/// Kind of dream experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DreamType {
    Lucid,
    Nightmare,
    Normal,
    Fragment,
}

/// Five-step dream rating, persisted as its raw value `1..=5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DreamRating {
    Awful = 1,
    Bad = 2,
    #[default]
    Neutral = 3,
    Good = 4,
    Amazing = 5,
}

impl DreamRating {
    pub const ALL: [DreamRating; 5] = [
        Self::Awful,
        Self::Bad,
        Self::Neutral,
        Self::Good,
        Self::Amazing,
    ];

    /// Persisted integer value.
    pub fn raw_value(self) -> u8 {
        self as u8
    }

    /// Maps a persisted integer back to a rating; `None` outside `1..=5`.
    pub fn from_raw(value: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rating| i64::from(rating.raw_value()) == value)
    }

    /// Case-insensitive lookup by member name (`"AMAZING"` -> `Amazing`).
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|rating| rating.label().to_lowercase() == lowered)
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Awful => "Awful",
            Self::Bad => "Bad",
            Self::Neutral => "Neutral",
            Self::Good => "Good",
            Self::Amazing => "Amazing",
        }
    }
}

impl Serialize for DreamRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.raw_value())
    }
}

impl<'de> Deserialize<'de> for DreamRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(lenient::decode_rating(Some(&value)))
    }
}

/// One remembered dream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LenientDream")]
pub struct Dream {
    pub id: DreamId,
    pub title: String,
    pub description: String,
    pub tags: Vec<Tag>,
    pub dream_type: DreamType,
    pub is_favorite: bool,
    /// Raw image bytes, written as base64.
    #[serde(
        serialize_with = "serialize_images",
        skip_serializing_if = "Option::is_none"
    )]
    pub images: Option<Vec<u8>>,
    pub rating: DreamRating,
    /// Set after a successful share to the remote dream server.
    pub is_uploaded: bool,
}

impl Dream {
    /// Creates a dream with a fresh id and default flags.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        dream_type: DreamType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            tags: Vec::new(),
            dream_type,
            is_favorite: false,
            images: None,
            rating: DreamRating::default(),
            is_uploaded: false,
        }
    }

    /// Blank dream as created by "add dream" before the user types anything.
    pub fn empty() -> Self {
        Self::new("", "", DreamType::Normal)
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_rating(mut self, rating: DreamRating) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }
}

impl Identified for Dream {
    type Id = DreamId;

    fn id(&self) -> DreamId {
        self.id
    }
}

fn serialize_images<S: Serializer>(images: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match images {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Dream, DreamRating, DreamType};
    use serde_json::json;

    #[test]
    fn rating_raw_values_are_one_based() {
        assert_eq!(DreamRating::Awful.raw_value(), 1);
        assert_eq!(DreamRating::Amazing.raw_value(), 5);
        assert_eq!(DreamRating::from_raw(4), Some(DreamRating::Good));
        assert_eq!(DreamRating::from_raw(0), None);
        assert_eq!(DreamRating::from_raw(6), None);
    }

    #[test]
    fn rating_name_lookup_ignores_case() {
        assert_eq!(DreamRating::from_name("AMAZING"), Some(DreamRating::Amazing));
        assert_eq!(DreamRating::from_name("bad"), Some(DreamRating::Bad));
        assert_eq!(DreamRating::from_name("meh"), None);
    }

    #[test]
    fn serializes_camel_case_keys_and_integer_rating() {
        let dream = Dream::new("flying", "over the city", DreamType::Lucid)
            .with_rating(DreamRating::Good);
        let value = serde_json::to_value(&dream).expect("dream serializes");
        assert_eq!(value["dreamType"], "lucid");
        assert_eq!(value["rating"], 4);
        assert_eq!(value["isFavorite"], false);
        assert_eq!(value["isUploaded"], false);
        assert!(value.get("images").is_none());
    }

    #[test]
    fn images_are_written_as_base64() {
        let mut dream = Dream::empty();
        dream.images = Some(vec![0xde, 0xad, 0xbe, 0xef]);
        let value = serde_json::to_value(&dream).expect("dream serializes");
        assert_eq!(value["images"], json!("3q2+7w=="));

        let decoded: Dream = serde_json::from_value(value).expect("dream decodes");
        assert_eq!(decoded.images, Some(vec![0xde, 0xad, 0xbe, 0xef]));
    }
}
