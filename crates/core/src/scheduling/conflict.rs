//! Conflict detection between a candidate session and an owner's existing
//! bookings.
//!
//! All intervals are half-open, so back-to-back sessions never conflict.

use thiserror::Error;

use crate::{
    models::availability::{AvailabilitySlot, SlotError},
    scheduling::interval::{BookedInterval, TimeRange},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("This time overlaps an existing session {}", describe(.with))]
    Overlap { with: BookedInterval },

    #[error("The new time is the same time slot as the current session")]
    SameAsCurrent,

    #[error("This slot is fully booked ({capacity} of {capacity} places taken)")]
    Full { capacity: u32 },

    #[error("Cannot check for conflicts: {0}")]
    Unresolved(String),
}

fn describe(interval: &BookedInterval) -> String {
    format!(
        "from {} to {}",
        interval.start.format("%Y-%m-%d %H:%M UTC"),
        interval.end.format("%Y-%m-%d %H:%M UTC")
    )
}

pub fn overlaps<T: Ord + Copy>(a: &TimeRange<T>, b: &TimeRange<T>) -> bool {
    a.overlaps(b)
}

pub fn find_conflict<'a, I>(candidate: &BookedInterval, booked: I) -> Option<&'a BookedInterval>
where
    I: IntoIterator<Item = &'a BookedInterval>,
{
    booked.into_iter().find(|existing| candidate.overlaps(existing))
}

pub fn has_conflict(candidate: &BookedInterval, booked: &[BookedInterval]) -> bool {
    find_conflict(candidate, booked).is_some()
}

pub fn check_booking(
    candidate: &BookedInterval,
    booked: &[BookedInterval],
) -> Result<(), ConflictError> {
    match find_conflict(candidate, booked) {
        Some(existing) => Err(ConflictError::Overlap { with: *existing }),
        None => Ok(()),
    }
}

/// Checks moving `current` to `candidate`.
///
/// An unchanged time is reported as [`ConflictError::SameAsCurrent`] rather
/// than accepted as a no-op. The current session itself is left out of the
/// overlap check; only its first occurrence in `booked` is skipped.
pub fn check_reschedule(
    current: &BookedInterval,
    candidate: &BookedInterval,
    booked: &[BookedInterval],
) -> Result<(), ConflictError> {
    if candidate == current {
        return Err(ConflictError::SameAsCurrent);
    }

    let own_position = booked.iter().position(|existing| existing == current);
    let others = booked
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != own_position)
        .map(|(_, existing)| existing);

    match find_conflict(candidate, others) {
        Some(existing) => Err(ConflictError::Overlap { with: *existing }),
        None => Ok(()),
    }
}

/// Group slots admit up to `max_occupants` overlapping bookings.
pub fn check_capacity(
    candidate: &BookedInterval,
    booked: &[BookedInterval],
    max_occupants: u32,
) -> Result<(), ConflictError> {
    let taken = booked
        .iter()
        .filter(|existing| candidate.overlaps(existing))
        .count();
    if taken >= max_occupants as usize {
        return Err(ConflictError::Full {
            capacity: max_occupants,
        });
    }
    Ok(())
}

/// Finds an active slot of the same owner that shares a weekday and overlaps
/// `candidate`'s time range. The slot being edited (same id) is ignored.
pub fn find_slot_overlap<'a>(
    existing: &'a [AvailabilitySlot],
    candidate: &AvailabilitySlot,
) -> Option<&'a AvailabilitySlot> {
    if !candidate.is_active {
        return None;
    }
    let range = TimeRange::new(candidate.start_time, candidate.end_time);
    existing.iter().find(|slot| {
        slot.id != candidate.id
            && slot.is_active
            && slot.day_of_week == candidate.day_of_week
            && range.overlaps(&TimeRange::new(slot.start_time, slot.end_time))
    })
}

pub fn ensure_no_slot_overlap(
    existing: &[AvailabilitySlot],
    candidate: &AvailabilitySlot,
) -> Result<(), SlotError> {
    match find_slot_overlap(existing, candidate) {
        Some(slot) => Err(SlotError::Overlaps {
            day: slot.weekday().unwrap_or(chrono::Weekday::Sun),
            start: slot.start_time.format("%H:%M").to_string(),
            end: slot.end_time.format("%H:%M").to_string(),
        }),
        None => Ok(()),
    }
}
