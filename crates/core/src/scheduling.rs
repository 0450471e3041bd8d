//! Client-independent scheduling rules: time ranges, weekly slot projection
//! and conflict detection.

pub mod conflict;
pub mod interval;
pub mod projector;
