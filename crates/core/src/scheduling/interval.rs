use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduling::conflict::ConflictError;

/// Session length used when a booking does not say how long it is.
pub const DEFAULT_SESSION_MINUTES: i64 = 60;

pub fn default_session_length() -> Duration {
    Duration::minutes(DEFAULT_SESSION_MINUTES)
}

/// Half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange<T> {
    pub start: T,
    pub end: T,
}

impl<T: Ord + Copy> TimeRange<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Standard half-open overlap. Ranges that only touch do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A concrete occupied interval derived from a session or booking.
pub type BookedInterval = TimeRange<DateTime<Utc>>;

/// A proposed booking time that may still be incomplete.
///
/// Conflict checks need a resolved interval; [`CandidateInterval::resolve`]
/// refuses to produce one when the start is missing, so an incomplete
/// candidate can never be mistaken for a conflict-free one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateInterval {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl CandidateInterval {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn resolve(&self, session_length: Duration) -> Result<BookedInterval, ConflictError> {
        let start = self
            .start
            .ok_or_else(|| ConflictError::Unresolved("no start time was given".to_string()))?;
        let end = self.end.unwrap_or(start + session_length);
        if end <= start {
            return Err(ConflictError::Unresolved(
                "the end time is not after the start time".to_string(),
            ));
        }
        Ok(BookedInterval::new(start, end))
    }
}
