//! Fine policy model
//!
//! A `FinePolicy` is built per evaluation; only `kind` is required; every
//! other field falls back to a default in the evaluator. JSON uses the
//! dashboard's camelCase field names with `type` as the discriminator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    None,
    Immediate,
    Hourly,
    Daily,
    Tiered,
    Progressive,
    Exponential,
}

impl PolicyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::None => "none",
            PolicyKind::Immediate => "immediate",
            PolicyKind::Hourly => "hourly",
            PolicyKind::Daily => "daily",
            PolicyKind::Tiered => "tiered",
            PolicyKind::Progressive => "progressive",
            PolicyKind::Exponential => "exponential",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = FineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(PolicyKind::None),
            "immediate" => Ok(PolicyKind::Immediate),
            "hourly" => Ok(PolicyKind::Hourly),
            "daily" => Ok(PolicyKind::Daily),
            "tiered" => Ok(PolicyKind::Tiered),
            "progressive" => Ok(PolicyKind::Progressive),
            "exponential" => Ok(PolicyKind::Exponential),
            other => Err(FineError::UnrecognizedPolicyType(other.to_string())),
        }
    }
}

/// Step in a tiered schedule: `rate` applies once `hours` have elapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredRate {
    pub hours: f64,
    pub rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Half-open interval `[start_hour, end_hour)` of a progressive schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressiveRate {
    pub start_hour: f64,
    pub end_hour: f64,
    pub base_rate: Decimal,
    /// Percent added to the base rate per elapsed hour.
    pub multiplier: f64,
}

impl ProgressiveRate {
    pub fn contains(&self, hours: f64) -> bool {
        hours >= self.start_hour && hours < self.end_hour
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExponentialRate {
    pub base_rate: Decimal,
    pub growth_factor: f64,
    pub max_exponent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinePolicy {
    #[serde(rename = "type")]
    pub kind: PolicyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immediate_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiered_rates: Option<Vec<TieredRate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progressive_rates: Option<Vec<ProgressiveRate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponential_rate: Option<ExponentialRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fine: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_offender_multiplier: Option<f64>,
    /// Percentage taken off for customers with no prior cancellations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty_discount: Option<f64>,
    /// Overrides `EngineSettings::repeat_offender_threshold`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_offender_threshold: Option<u32>,
    /// Overrides `EngineSettings::exponential_divisor_hours`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponential_divisor_hours: Option<f64>,
}

impl FinePolicy {
    pub fn new(kind: PolicyKind) -> Self {
        Self {
            kind,
            immediate_rate: None,
            hourly_rate: None,
            daily_rate: None,
            tiered_rates: None,
            progressive_rates: None,
            exponential_rate: None,
            max_fine: None,
            grace_period_minutes: None,
            weekend_multiplier: None,
            holiday_multiplier: None,
            repeat_offender_multiplier: None,
            loyalty_discount: None,
            repeat_offender_threshold: None,
            exponential_divisor_hours: None,
        }
    }

    /// Parse a policy object as the dashboards send it.
    ///
    /// The `type` discriminator is checked first so an unknown type surfaces
    /// as `UnrecognizedPolicyType` instead of a generic decode failure.
    pub fn from_json(json: &str) -> Result<Self, FineError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| FineError::InvalidPolicy(e.to_string()))?;

        match value.get("type") {
            Some(serde_json::Value::String(kind)) => {
                kind.parse::<PolicyKind>()?;
            }
            Some(other) => return Err(FineError::UnrecognizedPolicyType(other.to_string())),
            None => return Err(FineError::InvalidPolicy("missing policy type".to_string())),
        }

        let policy: FinePolicy =
            serde_json::from_value(value).map_err(|e| FineError::InvalidPolicy(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn to_json(&self) -> Result<String, FineError> {
        serde_json::to_string(self).map_err(|e| FineError::InvalidPolicy(e.to_string()))
    }

    /// Rejects values that would turn fine math into nonsense. Absent fields
    /// are always fine.
    pub fn validate(&self) -> Result<(), FineError> {
        let amounts = [
            ("immediateRate", self.immediate_rate),
            ("hourlyRate", self.hourly_rate),
            ("dailyRate", self.daily_rate),
            ("maxFine", self.max_fine),
        ];
        for (name, amount) in amounts {
            if let Some(amount) = amount {
                non_negative_amount(name, amount)?;
            }
        }

        let factors = [
            ("gracePeriodMinutes", self.grace_period_minutes),
            ("weekendMultiplier", self.weekend_multiplier),
            ("holidayMultiplier", self.holiday_multiplier),
            ("repeatOffenderMultiplier", self.repeat_offender_multiplier),
        ];
        for (name, factor) in factors {
            if let Some(factor) = factor {
                non_negative_factor(name, factor)?;
            }
        }

        if let Some(discount) = self.loyalty_discount {
            if !discount.is_finite() || !(0.0..=100.0).contains(&discount) {
                return Err(FineError::InvalidPolicy(format!(
                    "loyaltyDiscount must be a percentage between 0 and 100, got {}",
                    discount
                )));
            }
        }

        if let Some(divisor) = self.exponential_divisor_hours {
            if !divisor.is_finite() || divisor <= 0.0 {
                return Err(FineError::InvalidPolicy(format!(
                    "exponentialDivisorHours must be positive, got {}",
                    divisor
                )));
            }
        }

        if let Some(tiers) = &self.tiered_rates {
            for tier in tiers {
                non_negative_factor("tieredRates.hours", tier.hours)?;
                non_negative_amount("tieredRates.rate", tier.rate)?;
            }
        }

        if let Some(intervals) = &self.progressive_rates {
            for interval in intervals {
                non_negative_factor("progressiveRates.startHour", interval.start_hour)?;
                if !interval.end_hour.is_finite() || interval.end_hour < interval.start_hour {
                    return Err(FineError::InvalidPolicy(format!(
                        "progressive interval [{}, {}) ends before it starts",
                        interval.start_hour, interval.end_hour
                    )));
                }
                non_negative_amount("progressiveRates.baseRate", interval.base_rate)?;
                non_negative_factor("progressiveRates.multiplier", interval.multiplier)?;
            }
        }

        if let Some(exp) = &self.exponential_rate {
            non_negative_amount("exponentialRate.baseRate", exp.base_rate)?;
            non_negative_factor("exponentialRate.growthFactor", exp.growth_factor)?;
            non_negative_factor("exponentialRate.maxExponent", exp.max_exponent)?;
        }

        Ok(())
    }
}

fn non_negative_amount(name: &str, amount: Decimal) -> Result<(), FineError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(FineError::InvalidPolicy(format!(
            "{} must not be negative, got {}",
            name, amount
        )));
    }
    Ok(())
}

fn non_negative_factor(name: &str, value: f64) -> Result<(), FineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FineError::InvalidPolicy(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}
