use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::role::Role;

/// A recurring weekly window an owner is willing to hold sessions in.
///
/// `day_of_week` counts from Sunday (`0`) to Saturday (`6`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub role: Role,
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_active: bool,
    pub max_occupants: u32,
    pub created_at: DateTime<Utc>,
}

impl AvailabilitySlot {
    pub fn weekday(&self) -> Option<Weekday> {
        weekday_from_index(self.day_of_week)
    }

    /// Whether `time` falls inside `[start_time, end_time)`.
    pub fn contains_time(&self, time: NaiveTime) -> bool {
        self.start_time <= time && time < self.end_time
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidDay(u8),

    #[error("Start time must be before end time")]
    StartNotBeforeEnd,

    #[error("Max occupants must be at least 1")]
    NoCapacity,

    #[error("This slot overlaps an existing slot on {day} from {start} to {end}")]
    Overlaps {
        day: Weekday,
        start: String,
        end: String,
    },
}

/// Body of the availability create/update endpoints.
///
/// When `availability_id` is present the server updates that slot instead of
/// inserting a new one, so resubmitting an unchanged edit never duplicates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_id: Option<Uuid>,
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "default_max_occupants")]
    pub max_occupants: u32,
}

fn default_active() -> bool {
    true
}

fn default_max_occupants() -> u32 {
    1
}

impl AvailabilityInput {
    pub fn validate(&self) -> Result<(), SlotError> {
        if weekday_from_index(self.day_of_week).is_none() {
            return Err(SlotError::InvalidDay(self.day_of_week));
        }
        if self.start_time >= self.end_time {
            return Err(SlotError::StartNotBeforeEnd);
        }
        if self.max_occupants == 0 {
            return Err(SlotError::NoCapacity);
        }
        Ok(())
    }

    /// Validates the input and turns it into a slot owned by `owner_id`.
    ///
    /// The slot keeps `availability_id` when one was supplied.
    pub fn into_slot(
        self,
        owner_id: Uuid,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Result<AvailabilitySlot, SlotError> {
        self.validate()?;
        Ok(AvailabilitySlot {
            id: self.availability_id.unwrap_or_else(Uuid::new_v4),
            owner_id,
            role,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            is_active: self.is_active,
            max_occupants: self.max_occupants,
            created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAvailabilityRequest {
    pub availability_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityListResponse {
    pub availability: Vec<AvailabilitySlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub availability: AvailabilitySlot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAvailabilityResponse {
    pub availability_id: Uuid,
}

/// Concrete dates an availability slot projects to within a horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedSlotDates {
    pub availability_id: Uuid,
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResponse {
    pub today: NaiveDate,
    pub horizon_days: u32,
    pub projections: Vec<ProjectedSlotDates>,
}

/// Maps a Sunday-based day index (`0..=6`) to a chrono weekday.
pub fn weekday_from_index(day: u8) -> Option<Weekday> {
    match day {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// `"HH:MM"` wall-clock times. Seconds are accepted on input and dropped on output.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn parse(value: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(value, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
    }
}
