//! Lenient dream decoding.
//!
//! # Responsibility
//! - Rebuild a `Dream` from documents written by any earlier app version.
//! - Backfill defaults for optional fields that are absent or mis-shaped.
//!
//! # Invariants
//! - `id`, `title`, `description`, `tags`, `dreamType` are required; a failure
//!   there fails the record.
//! - Optional fields never fail the record. Each one is resolved by an
//!   ordered list of typed attempts; the first attempt that recognises the
//!   value's shape wins, otherwise the documented default applies.
//! - Attempt order is part of the on-disk compatibility contract:
//!   - `isUploaded`: bool, then string (`"true"` case-insensitive), then
//!     integer (`1`), else `false`.
//!   - `rating`: integer raw value (invalid -> `Neutral`), then
//!     case-insensitive name (unknown -> `Neutral`), else `Neutral`.
//!   - `isFavorite`: bool, else `false`.
//!   - `images`: base64 string, else `None`.

use crate::model::dream::{Dream, DreamId, DreamRating, DreamType};
use crate::model::tag::Tag;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;

/// One typed reading of a JSON value; `None` means "not this shape".
type Attempt<T> = fn(&Value) -> Option<T>;

const IS_FAVORITE_ATTEMPTS: &[Attempt<bool>] = &[bool_value];
const IS_UPLOADED_ATTEMPTS: &[Attempt<bool>] = &[bool_value, bool_from_text, bool_from_integer];
const RATING_ATTEMPTS: &[Attempt<DreamRating>] = &[rating_from_raw, rating_from_name];
const IMAGES_ATTEMPTS: &[Attempt<Vec<u8>>] = &[bytes_from_base64];

/// Wire shape accepted for a dream before defaults are applied.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LenientDream {
    id: DreamId,
    title: String,
    description: String,
    tags: Vec<Tag>,
    dream_type: DreamType,
    #[serde(default)]
    images: Option<Value>,
    #[serde(default)]
    is_favorite: Option<Value>,
    #[serde(default)]
    rating: Option<Value>,
    #[serde(default)]
    is_uploaded: Option<Value>,
}

impl From<LenientDream> for Dream {
    fn from(raw: LenientDream) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            tags: raw.tags,
            dream_type: raw.dream_type,
            is_favorite: decode_field(raw.is_favorite.as_ref(), IS_FAVORITE_ATTEMPTS, false),
            images: decode_optional(raw.images.as_ref(), IMAGES_ATTEMPTS),
            rating: decode_rating(raw.rating.as_ref()),
            is_uploaded: decode_is_uploaded(raw.is_uploaded.as_ref()),
        }
    }
}

/// Resolves a rating value; never fails.
pub fn decode_rating(value: Option<&Value>) -> DreamRating {
    decode_field(value, RATING_ATTEMPTS, DreamRating::Neutral)
}

/// Resolves an upload flag value; never fails.
pub fn decode_is_uploaded(value: Option<&Value>) -> bool {
    decode_field(value, IS_UPLOADED_ATTEMPTS, false)
}

fn decode_field<T>(value: Option<&Value>, attempts: &[Attempt<T>], fallback: T) -> T {
    decode_optional(value, attempts).unwrap_or(fallback)
}

fn decode_optional<T>(value: Option<&Value>, attempts: &[Attempt<T>]) -> Option<T> {
    let value = value?;
    attempts.iter().find_map(|attempt| attempt(value))
}

fn bool_value(value: &Value) -> Option<bool> {
    value.as_bool()
}

// Any string is accepted; only "true" (any case) means true.
fn bool_from_text(value: &Value) -> Option<bool> {
    value.as_str().map(|text| text.to_lowercase() == "true")
}

fn bool_from_integer(value: &Value) -> Option<bool> {
    integer_value(value).map(|number| number == 1)
}

fn rating_from_raw(value: &Value) -> Option<DreamRating> {
    integer_value(value).map(|raw| DreamRating::from_raw(raw).unwrap_or_default())
}

// Integral floats (`4.0`) read as integers too; `4.5` does not.
fn integer_value(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.is_finite() && number.fract() == 0.0)
            .map(|number| number as i64)
    })
}

fn rating_from_name(value: &Value) -> Option<DreamRating> {
    value
        .as_str()
        .map(|name| DreamRating::from_name(name).unwrap_or_default())
}

fn bytes_from_base64(value: &Value) -> Option<Vec<u8>> {
    value.as_str().and_then(|text| STANDARD.decode(text).ok())
}

#[cfg(test)]
mod tests {
    use super::{decode_is_uploaded, decode_rating};
    use crate::model::dream::DreamRating;
    use serde_json::json;

    #[test]
    fn rating_prefers_integer_then_name() {
        assert_eq!(decode_rating(Some(&json!(5))), DreamRating::Amazing);
        assert_eq!(decode_rating(Some(&json!(99))), DreamRating::Neutral);
        assert_eq!(decode_rating(Some(&json!(-1))), DreamRating::Neutral);
        assert_eq!(decode_rating(Some(&json!("AMAZING"))), DreamRating::Amazing);
        assert_eq!(decode_rating(Some(&json!("bogus"))), DreamRating::Neutral);
        assert_eq!(decode_rating(Some(&json!(true))), DreamRating::Neutral);
        assert_eq!(decode_rating(None), DreamRating::Neutral);
    }

    #[test]
    fn is_uploaded_accepts_bool_string_and_integer() {
        assert!(decode_is_uploaded(Some(&json!(true))));
        assert!(!decode_is_uploaded(Some(&json!(false))));
        assert!(decode_is_uploaded(Some(&json!("TRUE"))));
        assert!(!decode_is_uploaded(Some(&json!("yes"))));
        assert!(decode_is_uploaded(Some(&json!(1))));
        assert!(!decode_is_uploaded(Some(&json!(0))));
        assert!(!decode_is_uploaded(Some(&json!(2))));
        assert!(!decode_is_uploaded(Some(&json!([true]))));
        assert!(!decode_is_uploaded(None));
    }
}
