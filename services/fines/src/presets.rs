//! Preset fine policies offered by the cancellation dialogs and admin screens.
//!
//! The default schedules here double as the evaluator's fallback when a
//! policy selects a tiered/progressive/exponential type without its table.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::policy::{ExponentialRate, FinePolicy, PolicyKind, ProgressiveRate, TieredRate};

pub const DEFAULT_IMMEDIATE_RATE: Decimal = dec!(5);
pub const DEFAULT_HOURLY_RATE: Decimal = dec!(2);
pub const DEFAULT_DAILY_RATE: Decimal = dec!(20);
pub const DEFAULT_GRACE_PERIOD_MINUTES: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyPreset {
    None,
    Immediate,
    Hourly,
    Daily,
    Tiered,
    Progressive,
    Exponential,
}

impl PolicyPreset {
    pub const ALL: [PolicyPreset; 7] = [
        PolicyPreset::None,
        PolicyPreset::Immediate,
        PolicyPreset::Hourly,
        PolicyPreset::Daily,
        PolicyPreset::Tiered,
        PolicyPreset::Progressive,
        PolicyPreset::Exponential,
    ];

    pub fn kind(self) -> PolicyKind {
        match self {
            PolicyPreset::None => PolicyKind::None,
            PolicyPreset::Immediate => PolicyKind::Immediate,
            PolicyPreset::Hourly => PolicyKind::Hourly,
            PolicyPreset::Daily => PolicyKind::Daily,
            PolicyPreset::Tiered => PolicyKind::Tiered,
            PolicyPreset::Progressive => PolicyKind::Progressive,
            PolicyPreset::Exponential => PolicyKind::Exponential,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PolicyPreset::None => "No Fine",
            PolicyPreset::Immediate => "Flat Cancellation Fee",
            PolicyPreset::Hourly => "Hourly Rate",
            PolicyPreset::Daily => "Daily Rate",
            PolicyPreset::Tiered => "Tiered Schedule",
            PolicyPreset::Progressive => "Progressive Rate",
            PolicyPreset::Exponential => "Exponential Growth",
        }
    }

    pub fn policy(self) -> FinePolicy {
        let grace = Some(DEFAULT_GRACE_PERIOD_MINUTES);
        match self {
            PolicyPreset::None => FinePolicy::new(PolicyKind::None),
            PolicyPreset::Immediate => FinePolicy {
                immediate_rate: Some(DEFAULT_IMMEDIATE_RATE),
                grace_period_minutes: grace,
                ..FinePolicy::new(PolicyKind::Immediate)
            },
            PolicyPreset::Hourly => FinePolicy {
                hourly_rate: Some(DEFAULT_HOURLY_RATE),
                max_fine: Some(dec!(50)),
                grace_period_minutes: grace,
                ..FinePolicy::new(PolicyKind::Hourly)
            },
            PolicyPreset::Daily => FinePolicy {
                daily_rate: Some(DEFAULT_DAILY_RATE),
                max_fine: Some(dec!(100)),
                grace_period_minutes: grace,
                ..FinePolicy::new(PolicyKind::Daily)
            },
            PolicyPreset::Tiered => FinePolicy {
                tiered_rates: Some(default_tiers()),
                grace_period_minutes: grace,
                ..FinePolicy::new(PolicyKind::Tiered)
            },
            PolicyPreset::Progressive => FinePolicy {
                progressive_rates: Some(default_progressive_rates()),
                max_fine: Some(dec!(200)),
                grace_period_minutes: grace,
                weekend_multiplier: Some(1.5),
                repeat_offender_multiplier: Some(2.0),
                loyalty_discount: Some(10.0),
                ..FinePolicy::new(PolicyKind::Progressive)
            },
            PolicyPreset::Exponential => FinePolicy {
                exponential_rate: Some(default_exponential_rate()),
                max_fine: Some(dec!(100)),
                grace_period_minutes: grace,
                ..FinePolicy::new(PolicyKind::Exponential)
            },
        }
    }
}

/// `(preset, label, policy)` rows for policy pickers.
pub fn catalog() -> Vec<(PolicyPreset, &'static str, FinePolicy)> {
    PolicyPreset::ALL
        .iter()
        .map(|preset| (*preset, preset.label(), preset.policy()))
        .collect()
}

pub fn default_tiers() -> Vec<TieredRate> {
    vec![
        tier(0.0, 5, "Within first hour"),
        tier(1.0, 10, "1-3 hours"),
        tier(3.0, 15, "3-24 hours"),
        tier(24.0, 25, "Over 24 hours"),
    ]
}

pub fn default_progressive_rates() -> Vec<ProgressiveRate> {
    vec![
        interval(0.0, 2.0, 5, 10.0),
        interval(2.0, 6.0, 10, 15.0),
        interval(6.0, 24.0, 20, 20.0),
        interval(24.0, 168.0, 40, 5.0),
    ]
}

pub fn default_exponential_rate() -> ExponentialRate {
    ExponentialRate {
        base_rate: dec!(5),
        growth_factor: 1.5,
        max_exponent: 5.0,
    }
}

fn tier(hours: f64, rate: i64, description: &str) -> TieredRate {
    TieredRate {
        hours,
        rate: Decimal::from(rate),
        description: Some(description.to_string()),
    }
}

fn interval(start_hour: f64, end_hour: f64, base_rate: i64, multiplier: f64) -> ProgressiveRate {
    ProgressiveRate {
        start_hour,
        end_hour,
        base_rate: Decimal::from(base_rate),
        multiplier,
    }
}
