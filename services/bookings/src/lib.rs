pub mod error;
pub mod service;
pub mod store;


pub use error::{CancellationError, StoreError};
pub use service::{CancellationReceipt, CancellationService};
pub use store::{BookingStore, InMemoryBookingStore};
