//! Projection of weekly availability slots onto concrete calendar dates.
//!
//! A slot says "every Tuesday, 09:00 to 11:00". Projection turns that into
//! the Tuesdays inside a bounded window starting today. Dates are plain local
//! calendar days; [`localize`] pins a projected window to a timezone when
//! real instants are needed.

use std::iter::FusedIterator;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use thiserror::Error;

use crate::{
    models::availability::AvailabilitySlot,
    scheduling::interval::{BookedInterval, TimeRange},
};

pub const DEFAULT_HORIZON_DAYS: u32 = 14;
pub const MAX_HORIZON_DAYS: u32 = 30;

/// A projected occurrence in local wall-clock time.
pub type LocalWindow = TimeRange<NaiveDateTime>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("Horizon must be between 1 and {max} days, got {days}")]
    HorizonOutOfRange { days: u32, max: u32 },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("{0} does not exist in the requested timezone")]
    NonexistentLocalTime(NaiveDateTime),

    #[error("This availability slot is not active")]
    SlotInactive,

    #[error("{date} is not a {expected}")]
    WrongWeekday { date: NaiveDate, expected: Weekday },

    #[error("The session does not fit inside the availability window")]
    OutsideSlot,
}

/// Number of days, starting today, that projection looks ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon(u32);

impl Horizon {
    pub fn new(days: u32) -> Result<Self, ProjectionError> {
        if days == 0 || days > MAX_HORIZON_DAYS {
            return Err(ProjectionError::HorizonOutOfRange {
                days,
                max: MAX_HORIZON_DAYS,
            });
        }
        Ok(Self(days))
    }

    pub fn days(self) -> u32 {
        self.0
    }

    /// First day past the window.
    pub fn end_from(self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(i64::from(self.0))
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(DEFAULT_HORIZON_DAYS)
    }
}

/// Dates a slot projects to, in ascending order. Created by [`project_dates`].
#[derive(Debug, Clone)]
pub struct ProjectedDates {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for ProjectedDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|date| *date < self.end)?;
        self.next = current.checked_add_signed(Duration::days(7));
        Some(current)
    }
}

impl FusedIterator for ProjectedDates {}

/// Dates in `[today, today + horizon)` that fall on the slot's weekday.
///
/// Inactive slots project to nothing. A horizon of `H` days yields
/// `floor(H / 7)` or `ceil(H / 7)` dates depending on where today falls.
pub fn project_dates(slot: &AvailabilitySlot, today: NaiveDate, horizon: Horizon) -> ProjectedDates {
    let first = slot
        .weekday()
        .filter(|_| slot.is_active)
        .map(|weekday| next_on_or_after(today, weekday));

    ProjectedDates {
        next: first,
        end: horizon.end_from(today),
    }
}

/// Like [`project_dates`] but yields each occurrence's local time window.
pub fn project_windows(
    slot: &AvailabilitySlot,
    today: NaiveDate,
    horizon: Horizon,
) -> impl Iterator<Item = LocalWindow> {
    let (start, end) = (slot.start_time, slot.end_time);
    project_dates(slot, today, horizon)
        .map(move |date| LocalWindow::new(date.and_time(start), date.and_time(end)))
}

fn next_on_or_after(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let from = i64::from(today.weekday().num_days_from_sunday());
    let to = i64::from(weekday.num_days_from_sunday());
    today + Duration::days((to - from).rem_euclid(7))
}

/// The window of a single session of `length` starting at `start_time` on
/// `date`, checked against the slot it is carved out of.
pub fn session_window(
    slot: &AvailabilitySlot,
    date: NaiveDate,
    start_time: NaiveTime,
    length: Duration,
) -> Result<LocalWindow, ProjectionError> {
    if !slot.is_active {
        return Err(ProjectionError::SlotInactive);
    }
    let expected = slot.weekday().ok_or(ProjectionError::SlotInactive)?;
    if date.weekday() != expected {
        return Err(ProjectionError::WrongWeekday { date, expected });
    }

    let start = date.and_time(start_time);
    let session = LocalWindow::new(start, start + length);
    let available = LocalWindow::new(date.and_time(slot.start_time), date.and_time(slot.end_time));
    if !available.contains(&session) {
        return Err(ProjectionError::OutsideSlot);
    }
    Ok(session)
}

pub fn parse_timezone(name: &str) -> Result<Tz, ProjectionError> {
    name.parse::<Tz>()
        .map_err(|_| ProjectionError::UnknownTimezone(name.to_string()))
}

/// Resolves a local wall-clock time in `tz`.
///
/// Times skipped by a DST change are rejected; repeated times resolve to the
/// earlier instant.
pub fn localize_instant(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, ProjectionError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(ProjectionError::NonexistentLocalTime(local)),
    }
}

pub fn localize(window: &LocalWindow, tz: Tz) -> Result<BookedInterval, ProjectionError> {
    Ok(BookedInterval::new(
        localize_instant(window.start, tz)?,
        localize_instant(window.end, tz)?,
    ))
}
