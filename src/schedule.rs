//! Unattended nightly policy: grid overnight, solar for the rest of the day.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::ScheduleConfig;
use crate::error::ConfigError;
use crate::models::ChargeMode;

/// First hour (local to the policy timezone) that is no longer grid charging.
pub const GRID_UNTIL_HOUR: u32 = 5;

pub fn mode_for_hour(hour: u32) -> ChargeMode {
    if hour < GRID_UNTIL_HOUR {
        ChargeMode::Grid
    } else {
        ChargeMode::Solar
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledPolicy {
    timezone: Tz,
}

impl Default for ScheduledPolicy {
    fn default() -> Self {
        ScheduledPolicy { timezone: Tz::UTC }
    }
}

impl ScheduledPolicy {
    pub fn new(timezone: Tz) -> Self {
        ScheduledPolicy { timezone }
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        let timezone = config.timezone.parse::<Tz>().map_err(|_| {
            ConfigError::invalid(
                "schedule.timezone",
                format!("unknown timezone `{}`", config.timezone),
            )
        })?;
        Ok(ScheduledPolicy::new(timezone))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn mode_at(&self, now: DateTime<Utc>) -> ChargeMode {
        mode_for_hour(now.with_timezone(&self.timezone).hour())
    }
}
