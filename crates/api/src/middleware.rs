pub mod error_handling;
pub mod owner_lock;
