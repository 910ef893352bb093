//! Cancellation fine evaluator
//!
//! Steps run in a fixed order: grace period, calendar and repeat-offender
//! factors, base fine by policy type, multipliers, loyalty discount, cap,
//! floor. The grace period short-circuits everything after it.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone, Utc, Weekday};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::config::EngineSettings;
use shared::types::{format_amount, format_factor, round_cents, Booking};
use tracing::{debug, warn};

use crate::error::FineError;
use crate::history::{is_repeat_offender, prior_cancellations};
use crate::policy::{FinePolicy, PolicyKind, TieredRate};
use crate::presets::{
    default_exponential_rate, default_progressive_rates, default_tiers, DEFAULT_DAILY_RATE,
    DEFAULT_HOURLY_RATE, DEFAULT_IMMEDIATE_RATE,
};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Naive layouts produced by browser date-time inputs; read as UTC.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FineAssessment {
    pub fine: Decimal,
    pub description: String,
    pub time_used_hours: f64,
    pub breakdown: FineBreakdown,
}

/// Which rules fired while computing a fine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FineBreakdown {
    pub policy: PolicyKind,
    pub base: Decimal,
    pub grace_period_applied: bool,
    pub weekend_multiplier: Option<f64>,
    pub holiday_multiplier: Option<f64>,
    pub repeat_offender_multiplier: Option<f64>,
    pub loyalty_discount: Decimal,
    pub capped: bool,
    pub prior_cancellations: usize,
}

impl FineBreakdown {
    fn new(policy: PolicyKind, prior_cancellations: usize) -> Self {
        Self {
            policy,
            base: Decimal::ZERO,
            grace_period_applied: false,
            weekend_multiplier: None,
            holiday_multiplier: None,
            repeat_offender_multiplier: None,
            loyalty_discount: Decimal::ZERO,
            capped: false,
            prior_cancellations,
        }
    }
}

/// Stateless evaluator carrying the engine-wide defaults.
#[derive(Debug, Clone, Default)]
pub struct FineEvaluator {
    settings: EngineSettings,
}

impl FineEvaluator {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn evaluate_now(
        &self,
        booking: &Booking,
        policy: &FinePolicy,
        history: &[Booking],
    ) -> Result<FineAssessment, FineError> {
        self.evaluate(booking, policy, history, Utc::now())
    }

    pub fn evaluate(
        &self,
        booking: &Booking,
        policy: &FinePolicy,
        history: &[Booking],
        now: DateTime<Utc>,
    ) -> Result<FineAssessment, FineError> {
        let start = parse_start_time(booking)?;
        policy.validate()?;

        let elapsed_ms = (now - start.with_timezone(&Utc)).num_milliseconds() as f64;
        let hours = (elapsed_ms / MILLIS_PER_HOUR).max(0.0);
        let minutes = hours * 60.0;
        let symbol = self.settings.currency_symbol.as_str();

        let prior = prior_cancellations(booking, history);
        let mut breakdown = FineBreakdown::new(policy.kind, prior);

        if let Some(grace) = policy.grace_period_minutes {
            if minutes <= grace {
                breakdown.grace_period_applied = true;
                return Ok(self.finish(
                    booking,
                    Decimal::ZERO,
                    format!(
                        "Grace period: cancelled {:.0} min after start (within {} min), no fee",
                        minutes.floor(),
                        format_factor(grace)
                    ),
                    hours,
                    breakdown,
                ));
            }
        }

        if policy.kind == PolicyKind::None {
            return Ok(self.finish(
                booking,
                Decimal::ZERO,
                "No cancellation fee".to_string(),
                hours,
                breakdown,
            ));
        }

        let is_weekend = matches!(start.weekday(), Weekday::Sat | Weekday::Sun);
        breakdown.weekend_multiplier = policy
            .weekend_multiplier
            .filter(|factor| is_weekend && *factor > 0.0);

        let is_holiday = self.settings.is_holiday(start.date_naive());
        breakdown.holiday_multiplier = policy
            .holiday_multiplier
            .filter(|factor| is_holiday && *factor > 0.0);

        let threshold = policy
            .repeat_offender_threshold
            .unwrap_or(self.settings.repeat_offender_threshold);
        breakdown.repeat_offender_multiplier = policy
            .repeat_offender_multiplier
            .filter(|factor| *factor > 0.0 && is_repeat_offender(prior, threshold));

        // `None` from here on means the amount left the Decimal range.
        let (base, base_note) = self.base_fine(policy, hours, symbol);
        breakdown.base = base.unwrap_or(Decimal::MAX);
        let mut notes = vec![base_note];

        let mut fine = base;
        if let Some(factor) = breakdown.weekend_multiplier {
            fine = scale(fine, factor);
            notes.push(format!("Weekend: ×{}", format_factor(factor)));
        }
        if let Some(factor) = breakdown.holiday_multiplier {
            fine = scale(fine, factor);
            notes.push(format!("Holiday: ×{}", format_factor(factor)));
        }
        if let Some(factor) = breakdown.repeat_offender_multiplier {
            fine = scale(fine, factor);
            notes.push(format!(
                "Repeat offender ({} prior cancellations): ×{}",
                prior,
                format_factor(factor)
            ));
        }

        if let Some(percent) = policy.loyalty_discount {
            if prior == 0 && percent > 0.0 {
                let discount = fine.and_then(|amount| {
                    to_decimal(percent / 100.0).and_then(|rate| amount.checked_mul(rate))
                });
                if let (Some(amount), Some(discount)) = (fine, discount) {
                    fine = Some(amount - discount);
                    breakdown.loyalty_discount = discount;
                    notes.push(format!(
                        "Loyalty discount ({}%): -{}",
                        format_factor(percent),
                        format_amount(discount, symbol)
                    ));
                }
            }
        }

        let fine = match (fine, policy.max_fine) {
            (Some(amount), Some(max_fine)) if amount > max_fine => {
                breakdown.capped = true;
                notes.push(format!("Capped at maximum fine {}", format_amount(max_fine, symbol)));
                max_fine
            }
            (Some(amount), _) => amount,
            (None, Some(max_fine)) => {
                breakdown.capped = true;
                notes.push(format!("Capped at maximum fine {}", format_amount(max_fine, symbol)));
                max_fine
            }
            (None, None) => {
                warn!(booking_id = %booking.id, policy = %policy.kind, "Fine overflowed with no maxFine");
                return Err(FineError::AmountOverflow(policy.kind.to_string()));
            }
        };

        let fine = fine.max(Decimal::ZERO);
        Ok(self.finish(booking, fine, notes.join("; "), hours, breakdown))
    }

    fn base_fine(&self, policy: &FinePolicy, hours: f64, symbol: &str) -> (Option<Decimal>, String) {
        match policy.kind {
            PolicyKind::None => (Some(Decimal::ZERO), "No cancellation fee".to_string()),
            PolicyKind::Immediate => {
                let rate = policy.immediate_rate.unwrap_or(DEFAULT_IMMEDIATE_RATE);
                (Some(rate), format!("Immediate: {}", format_amount(rate, symbol)))
            }
            PolicyKind::Hourly => {
                let rate = policy.hourly_rate.unwrap_or(DEFAULT_HOURLY_RATE);
                let units = hours.ceil() as i64;
                let base = Decimal::from(units).checked_mul(rate);
                (
                    base,
                    format!(
                        "Hourly: {}h × {} = {}",
                        units,
                        format_amount(rate, symbol),
                        describe(base, symbol)
                    ),
                )
            }
            PolicyKind::Daily => {
                let rate = policy.daily_rate.unwrap_or(DEFAULT_DAILY_RATE);
                let units = (hours / 24.0).ceil() as i64;
                let base = Decimal::from(units).checked_mul(rate);
                (
                    base,
                    format!(
                        "Daily: {}d × {} = {}",
                        units,
                        format_amount(rate, symbol),
                        describe(base, symbol)
                    ),
                )
            }
            PolicyKind::Progressive => {
                let defaults;
                let intervals = match policy.progressive_rates.as_deref() {
                    Some(intervals) if !intervals.is_empty() => intervals,
                    _ => {
                        defaults = default_progressive_rates();
                        defaults.as_slice()
                    }
                };
                let interval = intervals
                    .iter()
                    .find(|interval| interval.contains(hours))
                    .or_else(|| intervals.last());
                match interval {
                    Some(interval) => {
                        let factor = 1.0 + hours * interval.multiplier / 100.0;
                        let base = scale(Some(interval.base_rate), factor);
                        (
                            base,
                            format!(
                                "Progressive ({}h-{}h): {} × {:.2} = {}",
                                format_factor(interval.start_hour),
                                format_factor(interval.end_hour),
                                format_amount(interval.base_rate, symbol),
                                factor,
                                describe(base, symbol)
                            ),
                        )
                    }
                    None => (Some(Decimal::ZERO), "Progressive: no interval".to_string()),
                }
            }
            PolicyKind::Exponential => {
                let config = policy
                    .exponential_rate
                    .clone()
                    .unwrap_or_else(default_exponential_rate);
                let divisor = policy
                    .exponential_divisor_hours
                    .unwrap_or(self.settings.exponential_divisor_hours);
                let exponent = (hours / divisor).min(config.max_exponent);
                let growth = config.growth_factor.powf(exponent);
                let base = scale(Some(config.base_rate), growth);
                (
                    base,
                    format!(
                        "Exponential: {} × {}^{:.2} = {}",
                        format_amount(config.base_rate, symbol),
                        format_factor(config.growth_factor),
                        exponent,
                        describe(base, symbol)
                    ),
                )
            }
            PolicyKind::Tiered => {
                let mut tiers: Vec<TieredRate> = match &policy.tiered_rates {
                    Some(tiers) if !tiers.is_empty() => tiers.clone(),
                    _ => default_tiers(),
                };
                tiers.sort_by(|a, b| a.hours.total_cmp(&b.hours));
                let tier = tiers
                    .iter()
                    .rev()
                    .find(|tier| tier.hours <= hours)
                    .or_else(|| tiers.first());
                match tier {
                    Some(tier) => {
                        let label = tier
                            .description
                            .clone()
                            .unwrap_or_else(|| format!("{}h+", format_factor(tier.hours)));
                        (
                            Some(tier.rate),
                            format!("Tiered ({}): {}", label, format_amount(tier.rate, symbol)),
                        )
                    }
                    None => (Some(Decimal::ZERO), "Tiered: no tiers".to_string()),
                }
            }
        }
    }

    fn finish(
        &self,
        booking: &Booking,
        fine: Decimal,
        description: String,
        hours: f64,
        breakdown: FineBreakdown,
    ) -> FineAssessment {
        let fine = round_cents(fine);
        debug!(
            booking_id = %booking.id,
            policy = %breakdown.policy,
            fine = %fine,
            time_used_hours = hours,
            capped = breakdown.capped,
            grace = breakdown.grace_period_applied,
            "Fine evaluated"
        );
        FineAssessment {
            fine,
            description,
            time_used_hours: hours,
            breakdown,
        }
    }
}

/// Evaluate with default engine settings.
pub fn evaluate_fine(
    booking: &Booking,
    policy: &FinePolicy,
    history: &[Booking],
    now: DateTime<Utc>,
) -> Result<FineAssessment, FineError> {
    FineEvaluator::default().evaluate(booking, policy, history, now)
}

/// Parse a booking's start time. RFC 3339 keeps its own offset; the naive
/// browser form is taken as UTC.
pub fn parse_start_time(booking: &Booking) -> Result<DateTime<FixedOffset>, FineError> {
    let raw = booking.start_time.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    Err(FineError::InvalidBooking {
        booking_id: booking.id.clone(),
        reason: format!("unparseable start time {:?}", booking.start_time),
    })
}

/// `None` when the value is outside the Decimal range.
fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

fn scale(amount: Option<Decimal>, factor: f64) -> Option<Decimal> {
    amount.and_then(|amount| to_decimal(factor).and_then(|factor| amount.checked_mul(factor)))
}

fn describe(amount: Option<Decimal>, symbol: &str) -> String {
    match amount {
        Some(amount) => format_amount(amount, symbol),
        None => "more than the largest representable amount".to_string(),
    }
}
