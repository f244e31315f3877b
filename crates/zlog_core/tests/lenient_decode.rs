use serde_json::{json, Value};
use zlog_core::codec::decode_collection;
use zlog_core::{Dream, DreamRating, DreamType, Sleep};

fn dream_json(extra: Value) -> Value {
    let mut base = json!({
        "id": "6f1c2a9e-3b57-4d0a-9a63-0c9f3f1e2b44",
        "title": "Falling",
        "description": "down an endless stairwell",
        "tags": [],
        "dreamType": "nightmare"
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    base
}

fn decode(value: Value) -> Dream {
    serde_json::from_value(value).expect("dream should decode")
}

#[test]
fn missing_optional_fields_take_defaults() {
    let dream = decode(dream_json(json!({})));
    assert_eq!(dream.dream_type, DreamType::Nightmare);
    assert!(!dream.is_favorite);
    assert!(!dream.is_uploaded);
    assert_eq!(dream.rating, DreamRating::Neutral);
    assert_eq!(dream.images, None);
}

#[test]
fn rating_accepts_numbers_and_names_with_neutral_fallback() {
    let cases = [
        (json!(5), DreamRating::Amazing),
        (json!(1), DreamRating::Awful),
        (json!(99), DreamRating::Neutral),
        (json!("AMAZING"), DreamRating::Amazing),
        (json!("bad"), DreamRating::Bad),
        (json!("bogus"), DreamRating::Neutral),
        (json!(null), DreamRating::Neutral),
        (json!([4]), DreamRating::Neutral),
    ];
    for (raw, expected) in cases {
        let dream = decode(dream_json(json!({ "rating": raw.clone() })));
        assert_eq!(dream.rating, expected, "rating {raw}");
    }
}

#[test]
fn is_uploaded_accepts_bool_text_and_integer() {
    let cases = [
        (json!(true), true),
        (json!(false), false),
        (json!("TRUE"), true),
        (json!("yes"), false),
        (json!(1), true),
        (json!(0), false),
        (json!(2), false),
    ];
    for (raw, expected) in cases {
        let dream = decode(dream_json(json!({ "isUploaded": raw.clone() })));
        assert_eq!(dream.is_uploaded, expected, "isUploaded {raw}");
    }
}

#[test]
fn integral_floats_read_as_integers() {
    let dream = decode(dream_json(json!({ "rating": 4.0, "isUploaded": 1.0 })));
    assert_eq!(dream.rating, DreamRating::Good);
    assert!(dream.is_uploaded);

    let fractional = decode(dream_json(json!({ "rating": 4.5, "isUploaded": 1.5 })));
    assert_eq!(fractional.rating, DreamRating::Neutral);
    assert!(!fractional.is_uploaded);
}

#[test]
fn malformed_optional_fields_fall_back_instead_of_failing() {
    let dream = decode(dream_json(json!({
        "isFavorite": "yes",
        "images": 42,
    })));
    assert!(!dream.is_favorite);
    assert_eq!(dream.images, None);

    let with_images = decode(dream_json(json!({ "images": "3q2+7w==" })));
    assert_eq!(with_images.images, Some(vec![0xde, 0xad, 0xbe, 0xef]));
}

#[test]
fn missing_required_field_fails_the_whole_document() {
    let mut broken = dream_json(json!({}));
    broken
        .as_object_mut()
        .expect("object fixture")
        .remove("title");
    let document = json!([{
        "id": "0b5c8f0e-7d8b-4b53-9f0e-3c1a2b4d5e6f",
        "dreams": [broken],
        "date": "2024-03-05T02:30:00Z",
        "notes": "",
        "timeZone": "UTC"
    }]);
    let bytes = serde_json::to_vec(&document).expect("fixture encodes");
    let result = decode_collection::<Sleep>(&bytes);
    assert!(result.is_err());
}

#[test]
fn legacy_sleep_document_decodes() {
    // Reference-date seconds and a bare zone string.
    let document = json!([{
        "id": "0b5c8f0e-7d8b-4b53-9f0e-3c1a2b4d5e6f",
        "dreams": [dream_json(json!({ "rating": "good", "isUploaded": 1 }))],
        "date": 731_298_600.0,
        "notes": "woke up twice",
        "timeZone": "America/New_York"
    }]);
    let bytes = serde_json::to_vec(&document).expect("fixture encodes");
    let sleeps = decode_collection::<Sleep>(&bytes).expect("legacy document decodes");

    assert_eq!(sleeps.len(), 1);
    assert_eq!(sleeps[0].date.to_rfc3339(), "2024-03-05T02:30:00+00:00");
    assert_eq!(sleeps[0].time_zone, chrono_tz::America::New_York);
    assert_eq!(sleeps[0].dreams[0].rating, DreamRating::Good);
    assert!(sleeps[0].dreams[0].is_uploaded);
}
