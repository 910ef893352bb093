use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type BookingId = String;
pub type UserId = String;
pub type SlotId = String;

/// Lifecycle state of a parking booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Upcoming,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Only bookings that have not finished can be cancelled (and fined).
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Upcoming | BookingStatus::Active
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Upcoming => "upcoming",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "upcoming" => Ok(BookingStatus::Upcoming),
            "active" => Ok(BookingStatus::Active),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// A parking booking as the dashboards hold it. `start_time` is kept as the
/// raw string the client sent; the fine evaluator parses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub slot_id: SlotId,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_fine: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_used_hours: Option<f64>,
}

impl Booking {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        slot_id: impl Into<String>,
        start_time: impl Into<String>,
        status: BookingStatus,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            slot_id: slot_id.into(),
            start_time: start_time.into(),
            end_time: None,
            status,
            cancel_fine: None,
            cancel_policy: None,
            cancel_time: None,
            time_used_hours: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

/// Rounds a currency amount to whole cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders an amount the way fine descriptions show it, e.g. `$8.00`.
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let rounded = round_cents(amount);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}{:.2}", symbol, rounded.abs())
    } else {
        format!("{}{:.2}", symbol, rounded.abs())
    }
}

/// Renders a multiplier without trailing zeros: `1.5`, `2`.
pub fn format_factor(factor: f64) -> String {
    let rounded = (factor * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
