//! Configuration structures
//!
//! The static configuration bundle consumed by the pipeline: account
//! credentials, the look-ahead window, and the poll cadence. Loading from
//! the environment or from files lives in the infra crate.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FUTURE_DAYS, DEFAULT_POLL_INTERVAL_HOURS, MAX_POLL_INTERVAL_HOURS,
    MIN_POLL_INTERVAL_HOURS,
};
use crate::errors::{MatchdayError, Result};
use crate::types::Credentials;

/// Static configuration for one account pipeline
#[derive(Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub email: String,
    pub password: String,
    pub role_id: String,
    /// Future look-ahead window in days
    #[serde(default = "default_future_days")]
    pub future_days: u32,
    /// Poll cadence in hours (1-24)
    #[serde(default = "default_poll_interval_hours")]
    pub poll_interval_hours: u32,
}

fn default_future_days() -> u32 {
    DEFAULT_FUTURE_DAYS
}

fn default_poll_interval_hours() -> u32 {
    DEFAULT_POLL_INTERVAL_HOURS
}

impl ScheduleConfig {
    /// Check the bundle for values the pipeline cannot operate with.
    ///
    /// # Errors
    /// Returns `MatchdayError::Config` if credentials are blank, the
    /// look-ahead window is zero, or the poll interval is outside 1-24 hours.
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(MatchdayError::Config("email must not be empty".into()));
        }
        if self.password.is_empty() {
            return Err(MatchdayError::Config("password must not be empty".into()));
        }
        if self.role_id.trim().is_empty() {
            return Err(MatchdayError::Config("role_id must not be empty".into()));
        }
        if self.future_days == 0 {
            return Err(MatchdayError::Config("future_days must be positive".into()));
        }
        if !(MIN_POLL_INTERVAL_HOURS..=MAX_POLL_INTERVAL_HOURS).contains(&self.poll_interval_hours)
        {
            return Err(MatchdayError::Config(format!(
                "poll_interval_hours must be between {} and {}, got {}",
                MIN_POLL_INTERVAL_HOURS, MAX_POLL_INTERVAL_HOURS, self.poll_interval_hours
            )));
        }
        Ok(())
    }

    /// Account credentials held by this bundle.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
            role_id: self.role_id.clone(),
        }
    }

    /// Poll cadence as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_interval_hours) * 3600)
    }

    /// Look-ahead window as a chrono duration.
    pub fn horizon(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.future_days))
    }
}

// Same redaction rule as Credentials
impl fmt::Debug for ScheduleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role_id", &self.role_id)
            .field("future_days", &self.future_days)
            .field("poll_interval_hours", &self.poll_interval_hours)
            .finish()
    }
}
