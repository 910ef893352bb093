//! Cancellation history derived from a user's bookings.

use shared::types::Booking;

/// Prior cancellations by the booking's owner, not counting the booking itself.
pub fn prior_cancellations(booking: &Booking, history: &[Booking]) -> usize {
    history
        .iter()
        .filter(|other| {
            other.user_id == booking.user_id && other.is_cancelled() && other.id != booking.id
        })
        .count()
}

pub fn is_repeat_offender(prior_cancellations: usize, threshold: u32) -> bool {
    prior_cancellations >= threshold as usize
}
