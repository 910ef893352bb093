pub mod config;
pub mod logger;
pub mod types;


pub use crate::config::EngineSettings;
pub use types::{Booking, BookingId, BookingStatus, SlotId, UserId};
