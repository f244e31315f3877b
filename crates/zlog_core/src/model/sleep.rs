//! Sleep session domain model.
//!
//! # Responsibility
//! - Define the top-level journal entry that owns its dreams.
//! - Derive display labels from the recorded instant and time zone.
//!
//! # Invariants
//! - `dreams` is owned by composition; removing a sleep removes its dreams.
//! - Labels are derived on demand and never persisted.
//! - `long_label` is always rendered in UTC, regardless of `time_zone`.

use crate::codec::time::{sleep_date, time_zone};
use crate::model::dream::{Dream, DreamId};
use crate::model::Identified;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SleepId = Uuid;

/// Coarse time-of-day bucket used in the short label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfDay {
    /// Before 11:00.
    Morning,
    /// 11:00 through 16:59.
    Noon,
    /// 17:00 and later.
    Night,
}

impl PartOfDay {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 11 {
            Self::Morning
        } else if hour >= 17 {
            Self::Night
        } else {
            Self::Noon
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Noon => "Noon",
            Self::Night => "Night",
        }
    }
}

/// One night (or nap) of sleep with the dreams recalled from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sleep {
    pub id: SleepId,
    pub dreams: Vec<Dream>,
    #[serde(with = "sleep_date")]
    pub date: DateTime<Utc>,
    pub notes: String,
    /// Zone the sleep was recorded in.
    #[serde(with = "time_zone")]
    pub time_zone: Tz,
}

impl Sleep {
    /// Creates an empty sleep recorded now in `time_zone`.
    pub fn new(time_zone: Tz) -> Self {
        Self::recorded_at(Utc::now(), time_zone)
    }

    /// Creates an empty sleep for an explicit instant.
    pub fn recorded_at(date: DateTime<Utc>, time_zone: Tz) -> Self {
        Self {
            id: Uuid::new_v4(),
            dreams: Vec::new(),
            date,
            notes: String::new(),
            time_zone,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_dreams(mut self, dreams: Vec<Dream>) -> Self {
        self.dreams = dreams;
        self
    }

    /// Bucket for the hour of `date` as seen in the recorded zone.
    pub fn part_of_day(&self) -> PartOfDay {
        PartOfDay::from_hour(self.date.with_timezone(&self.time_zone).hour())
    }

    /// Short list label, e.g. `"Tue, Mar 4 Night"`.
    ///
    /// The day text uses UTC as a fixed reference; only the bucket follows
    /// the recorded zone.
    pub fn short_label(&self) -> String {
        format!(
            "{} {}",
            self.date.format("%a, %b %-d"),
            self.part_of_day().label()
        )
    }

    /// Long detail label in UTC, e.g. `"Tuesday, March 4, 2025"`.
    pub fn long_label(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }

    pub fn dream(&self, dream_id: DreamId) -> Option<&Dream> {
        self.dreams.iter().find(|dream| dream.id == dream_id)
    }
}

impl Identified for Sleep {
    type Id = SleepId;

    fn id(&self) -> SleepId {
        self.id
    }
}
