pub mod availability;
pub mod health;
pub mod mentoring;
pub mod tutoring;
