pub mod availability;
pub mod booking;
pub mod envelope;
pub mod mentoring;
pub mod role;
