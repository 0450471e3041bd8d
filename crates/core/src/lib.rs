//! # MentorHub Core
//!
//! Domain types and scheduling logic shared by the MentorHub API server and
//! client: weekly availability projection, session conflict detection, the
//! booking wizard and the calendar cell lookup.
//!
//! Everything in this crate is synchronous and free of I/O. Callers supply
//! "today" and "now" explicitly so results are deterministic.

pub mod booking_flow;
pub mod calendar;
pub mod errors;
pub mod models;
pub mod scheduling;

pub use errors::{HubError, HubResult};
