//! Tag domain model.
//!
//! # Responsibility
//! - Define the user-defined label attached to dreams.
//! - Validate user input before it enters the tag collection.
//!
//! # Invariants
//! - Equality and hashing cover every field; `id` dominates uniqueness.
//! - `color` is a 32-bit RGBA (or 24-bit RGB) hex string.
//! - Serialized name key is `tagName` to stay compatible with existing files.

use crate::model::Identified;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TagId = Uuid;

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#?(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("valid hex color regex")
});

/// User-defined dream label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    #[serde(rename = "tagName")]
    pub name: String,
    pub details: String,
    /// Hex encoded `RRGGBBAA` (or `RRGGBB`), optional leading `#`.
    pub color: String,
}

impl Tag {
    /// Creates a tag with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        details: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, details, color)
    }

    /// Creates a tag with a caller-provided id.
    pub fn with_id(
        id: TagId,
        name: impl Into<String>,
        details: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            details: details.into(),
            color: color.into(),
        }
    }

    /// Checks user-editable fields.
    ///
    /// # Errors
    /// - `EmptyName` when the name is blank after trimming.
    /// - `InvalidColor` when `color` is not a 6 or 8 digit hex string.
    pub fn validate(&self) -> Result<(), TagValidationError> {
        if self.name.trim().is_empty() {
            return Err(TagValidationError::EmptyName);
        }
        if !HEX_COLOR_RE.is_match(self.color.trim()) {
            return Err(TagValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

impl Identified for Tag {
    type Id = TagId;

    fn id(&self) -> TagId {
        self.id
    }
}

/// Rejected tag input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    EmptyName,
    InvalidColor(String),
}

impl Display for TagValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "tag name must not be empty"),
            Self::InvalidColor(value) => {
                write!(f, "tag color `{value}` is not a RRGGBB or RRGGBBAA hex value")
            }
        }
    }
}

impl Error for TagValidationError {}

#[cfg(test)]
mod tests {
    use super::{Tag, TagValidationError};

    #[test]
    fn accepts_rgb_and_rgba_hex_colors() {
        Tag::new("fire", "", "ff3b30ff").validate().expect("rgba");
        Tag::new("fire", "", "#FF3B30").validate().expect("rgb with hash");
    }

    #[test]
    fn rejects_blank_name_and_bad_color() {
        assert_eq!(
            Tag::new("  ", "", "ff3b30ff").validate(),
            Err(TagValidationError::EmptyName)
        );
        assert_eq!(
            Tag::new("fire", "", "red").validate(),
            Err(TagValidationError::InvalidColor("red".to_string()))
        );
    }

    #[test]
    fn serializes_name_as_tag_name() {
        let tag = Tag::new("ocean", "waves", "007affff");
        let value = serde_json::to_value(&tag).expect("tag serializes");
        assert_eq!(value["tagName"], "ocean");
        assert!(value.get("name").is_none());
    }
}
