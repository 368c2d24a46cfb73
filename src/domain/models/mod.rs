pub mod availability;
pub mod blocked_slot;
pub mod booking;
pub mod time_slot;
