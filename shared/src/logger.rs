//! Logging utilities

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::EngineSettings;

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_logger(settings: &EngineSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .map_err(|e| anyhow!("invalid log filter {:?}: {}", settings.log_filter, e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if settings.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}

/// Log an applied cancellation fine. User ids are masked.
pub fn log_cancellation(booking_id: &str, user_id: &str, fine: Decimal, policy: &str) {
    info!(
        booking_id = %booking_id,
        user = %sanitize_for_log(user_id),
        fine = %fine,
        policy = %policy,
        "Booking cancelled"
    );
}

/// Keep the first four characters, mask the rest.
pub fn sanitize_for_log(value: &str) -> String {
    if value.chars().count() <= 4 {
        return "****".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    format!("{}****", prefix)
}
