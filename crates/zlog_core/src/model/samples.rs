//! Built-in sample entities.
//!
//! Sample tags double as the tag store's initial state, so their ids are
//! fixed: a tag collection that still equals this set is recognisably
//! un-customised across restarts.

use crate::model::dream::{Dream, DreamRating, DreamType};
use crate::model::sleep::Sleep;
use crate::model::tag::Tag;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use uuid::Uuid;

const FIRE_ID: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0001);
const CARAVAN_ID: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0002);
const OCEAN_ID: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0003);
const ELEVATOR_ID: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0004);

static SAMPLE_TAGS: Lazy<Vec<Tag>> = Lazy::new(|| vec![fire(), caravan(), ocean()]);

pub fn fire() -> Tag {
    Tag::with_id(FIRE_ID, "fire", "dreaming about fire", "ff3b30ff")
}

pub fn caravan() -> Tag {
    Tag::with_id(CARAVAN_ID, "caravan", "go camping!", "34c759ff")
}

pub fn ocean() -> Tag {
    Tag::with_id(OCEAN_ID, "ocean", "dreaming about oceans", "007affff")
}

/// Not part of the default tag set; only used by sample dreams.
pub fn elevator() -> Tag {
    Tag::with_id(ELEVATOR_ID, "elevator", "something in the lifter", "8e8e93ff")
}

/// Default tag collection (fire, caravan, ocean).
pub fn sample_tags() -> &'static [Tag] {
    SAMPLE_TAGS.as_slice()
}

pub fn is_sample_tag_set(tags: &[Tag]) -> bool {
    tags == sample_tags()
}

/// Three example dreams; ids are fresh on every call.
pub fn sample_dreams() -> Vec<Dream> {
    vec![
        Dream::new("man on fire", "see a person on fire", DreamType::Nightmare)
            .with_tags(vec![fire()])
            .with_rating(DreamRating::Bad),
        Dream::new(
            "goin' out with friends",
            "driving a caravan on the expressway, stopped by the po, tired",
            DreamType::Normal,
        )
        .with_tags(vec![ocean()])
        .with_favorite(true)
        .with_rating(DreamRating::Good),
        Dream::new(
            "ghost encounter",
            "the elevator stopped anomalously, when i tried to rerun it, something went out...",
            DreamType::Nightmare,
        )
        .with_tags(vec![elevator()])
        .with_rating(DreamRating::Awful),
    ]
}

/// Example journal spread over the last three days.
///
/// The same dream value is reused across sleeps, so sample journals also
/// exercise duplicate dream ids.
pub fn sample_sleeps(now: DateTime<Utc>, time_zone: Tz) -> Vec<Sleep> {
    let dreams = sample_dreams();
    let yesterday = now - Duration::days(1);
    let day_before = now - Duration::days(2);
    vec![
        Sleep::recorded_at(now, time_zone)
            .with_dreams(vec![dreams[0].clone(), dreams[1].clone()])
            .with_notes("the firing dream is too scary"),
        Sleep::recorded_at(yesterday, time_zone)
            .with_dreams(vec![dreams[2].clone()])
            .with_notes("omg"),
        Sleep::recorded_at(day_before, time_zone)
            .with_dreams(vec![dreams[1].clone()])
            .with_notes("omg"),
    ]
}
