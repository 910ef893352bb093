use fine_service::FineError;
use shared::types::BookingStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Booking already exists: {0}")]
    DuplicateBooking(String),
    #[error("Booking not found: {0}")]
    BookingNotFound(String),
    #[error("Booking {booking_id} changed to {status} before the write")]
    Conflict {
        booking_id: String,
        status: BookingStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CancellationError {
    #[error("Booking not found: {0}")]
    BookingNotFound(String),
    #[error("Booking {booking_id} cannot be cancelled while {status}")]
    NotCancellable {
        booking_id: String,
        status: BookingStatus,
    },
    #[error(transparent)]
    Fine(#[from] FineError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
