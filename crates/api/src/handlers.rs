pub mod availability;
pub mod mentoring;
pub mod tutoring;
