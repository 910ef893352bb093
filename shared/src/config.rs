//! Engine settings
//!
//! Loaded from an optional `fines.toml` and `PARKING_FINES__*` environment
//! variables. Values on a `FinePolicy` always win over these defaults.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "fines";
pub const ENV_PREFIX: &str = "PARKING_FINES";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Prior cancellations needed before the repeat-offender multiplier kicks in.
    pub repeat_offender_threshold: u32,
    /// Hours per exponent step for exponential policies.
    pub exponential_divisor_hours: f64,
    pub currency_symbol: String,
    /// Dates on which `holidayMultiplier` applies.
    pub holidays: Vec<NaiveDate>,
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            repeat_offender_threshold: 3,
            exponential_divisor_hours: 24.0,
            currency_symbol: "$".to_string(),
            holidays: Vec::new(),
            log_filter: "info".to_string(),
            log_json: true,
        }
    }
}

impl EngineSettings {
    /// Load from `fines.{toml,json,yaml}` in the working directory plus env.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_SETTINGS_FILE)
    }

    /// Load from the given file stem/path (missing file is fine) plus env.
    pub fn load_from(name: &str) -> Result<Self> {
        let raw = ::config::Config::builder()
            .add_source(::config::File::with_name(name).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read fine engine settings from {name}"))?;

        let settings: EngineSettings = raw
            .try_deserialize()
            .context("invalid fine engine settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.exponential_divisor_hours.is_finite() || self.exponential_divisor_hours <= 0.0 {
            anyhow::bail!(
                "exponential_divisor_hours must be a positive number, got {}",
                self.exponential_divisor_hours
            );
        }
        Ok(())
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}
