use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FineError {
    #[error("Invalid booking {booking_id}: {reason}")]
    InvalidBooking { booking_id: String, reason: String },
    #[error("Unrecognized fine policy type: {0}")]
    UnrecognizedPolicyType(String),
    #[error("Invalid fine policy: {0}")]
    InvalidPolicy(String),
    #[error("Fine for {0} policy exceeds the largest representable amount and no maxFine is set")]
    AmountOverflow(String),
}
