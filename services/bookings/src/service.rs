//! Booking cancellation
//!
//! Preview shows the fine a cancellation dialog would charge; cancel applies
//! it to the booking record and moves it to `cancelled`.

use chrono::{DateTime, Utc};
use fine_service::{FineAssessment, FineEvaluator, FinePolicy, PolicyKind};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::logger::log_cancellation;
use shared::types::{Booking, BookingStatus};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CancellationError, StoreError};
use crate::store::BookingStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationReceipt {
    pub id: Uuid,
    pub booking_id: String,
    pub user_id: String,
    pub policy: PolicyKind,
    pub fine: Decimal,
    pub description: String,
    pub time_used_hours: f64,
    pub cancelled_at: DateTime<Utc>,
}

pub struct CancellationService<S: BookingStore> {
    store: S,
    evaluator: FineEvaluator,
}

impl<S: BookingStore> CancellationService<S> {
    pub fn new(store: S, evaluator: FineEvaluator) -> Self {
        Self { store, evaluator }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn evaluator(&self) -> &FineEvaluator {
        &self.evaluator
    }

    /// Compute the fine without touching the booking.
    pub fn preview(
        &self,
        booking_id: &str,
        policy: &FinePolicy,
        now: DateTime<Utc>,
    ) -> Result<FineAssessment, CancellationError> {
        let booking = self.cancellable_booking(booking_id)?;
        let history = self.store.bookings_for_user(&booking.user_id);
        Ok(self.evaluator.evaluate(&booking, policy, &history, now)?)
    }

    /// Charge the fine and mark the booking cancelled. Nothing is written if
    /// evaluation fails or the stored booking stopped being cancellable
    /// after it was read.
    pub fn cancel(
        &self,
        booking_id: &str,
        policy: &FinePolicy,
        now: DateTime<Utc>,
    ) -> Result<CancellationReceipt, CancellationError> {
        let mut booking = self.cancellable_booking(booking_id)?;
        let history = self.store.bookings_for_user(&booking.user_id);
        let assessment = self
            .evaluator
            .evaluate(&booking, policy, &history, now)
            .map_err(|e| {
                warn!(booking_id = %booking_id, error = %e, "Fine evaluation failed");
                e
            })?;

        booking.status = BookingStatus::Cancelled;
        booking.cancel_fine = Some(assessment.fine);
        booking.cancel_policy = Some(policy.kind.to_string());
        booking.cancel_time = Some(now);
        booking.time_used_hours = Some(assessment.time_used_hours);
        self.store
            .update_if(booking.clone(), &|stored| stored.status.is_cancellable())
            .map_err(|e| match e {
                StoreError::Conflict { booking_id, status } => {
                    warn!(
                        booking_id = %booking_id,
                        status = %status,
                        "Booking changed during cancellation"
                    );
                    CancellationError::NotCancellable { booking_id, status }
                }
                other => other.into(),
            })?;

        log_cancellation(&booking.id, &booking.user_id, assessment.fine, policy.kind.as_str());
        info!(
            booking_id = %booking.id,
            prior_cancellations = assessment.breakdown.prior_cancellations,
            capped = assessment.breakdown.capped,
            "Cancellation fine applied"
        );

        Ok(CancellationReceipt {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            user_id: booking.user_id,
            policy: policy.kind,
            fine: assessment.fine,
            description: assessment.description,
            time_used_hours: assessment.time_used_hours,
            cancelled_at: now,
        })
    }

    fn cancellable_booking(&self, booking_id: &str) -> Result<Booking, CancellationError> {
        let booking = self
            .store
            .get(booking_id)
            .ok_or_else(|| CancellationError::BookingNotFound(booking_id.to_string()))?;

        if !booking.status.is_cancellable() {
            warn!(booking_id = %booking_id, status = %booking.status, "Booking is not cancellable");
            return Err(CancellationError::NotCancellable {
                booking_id: booking.id,
                status: booking.status,
            });
        }
        Ok(booking)
    }
}
