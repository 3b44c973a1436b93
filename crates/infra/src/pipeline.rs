//! Pipeline facade
//!
//! The single entry point consumed by the host's setup and presentation
//! layers: configure an account, read the current snapshot and availability,
//! validate credentials at configuration time, and shut down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use matchday_core::display;
use matchday_domain::constants::{IDENTITY_SIGN_IN_URL, PLAYMETRICS_API_BASE};
use matchday_domain::{Credentials, MatchdayError, Result, ScheduleConfig, Snapshot};
use tracing::{info, warn};

use crate::api::{CredentialSession, ScheduleFetcher};
use crate::scheduling::{PollScheduler, PollSchedulerConfig};

/// Handle over one configured, running schedule pipeline.
///
/// Owns the poll scheduler for a single account. Dropping the handle cancels
/// the recurring schedule; prefer [`Pipeline::shutdown`] for a clean stop.
pub struct Pipeline {
    scheduler: PollScheduler,
    future_days: u32,
}

impl Pipeline {
    /// Configure and start a pipeline against the production endpoints.
    ///
    /// Validates the bundle, builds the fetcher, runs the first fetch cycle
    /// (the call blocks until it completes), then starts the recurring
    /// schedule. A failed first cycle still yields a running pipeline in the
    /// degraded state.
    ///
    /// # Errors
    /// Returns `MatchdayError::Config` for an invalid bundle or
    /// `MatchdayError::Internal` if the scheduler cannot be started.
    pub async fn configure(config: ScheduleConfig) -> Result<Self> {
        Self::configure_with_endpoints(
            config,
            IDENTITY_SIGN_IN_URL.to_string(),
            PLAYMETRICS_API_BASE.to_string(),
        )
        .await
    }

    /// Configure and start a pipeline with custom endpoints (used in tests).
    pub async fn configure_with_endpoints(
        config: ScheduleConfig,
        identity_url: String,
        api_base: String,
    ) -> Result<Self> {
        config.validate()?;

        info!(email = %config.email, poll_interval_hours = config.poll_interval_hours,
              future_days = config.future_days, "configuring schedule pipeline");

        let fetcher = ScheduleFetcher::with_endpoints(config.credentials(), identity_url, api_base)?;
        let scheduler_config = PollSchedulerConfig {
            interval: config.poll_interval(),
            horizon: config.horizon(),
            ..Default::default()
        };

        let mut scheduler = PollScheduler::new(Arc::new(fetcher), scheduler_config);
        scheduler.start().await.map_err(MatchdayError::from)?;

        Ok(Self { scheduler, future_days: config.future_days })
    }

    /// The snapshot from the most recent successful cycle, if any.
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.scheduler.current_snapshot()
    }

    /// Whether the most recent cycle succeeded.
    pub fn last_update_succeeded(&self) -> bool {
        self.scheduler.last_update_succeeded()
    }

    /// Timestamp of the most recent successful cycle.
    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.scheduler.last_success_at()
    }

    /// Error text from the most recent failed cycle, if any.
    pub fn last_error(&self) -> Option<String> {
        self.scheduler.last_error()
    }

    /// Short human-readable summary of the current snapshot.
    pub fn status_summary(&self) -> String {
        display::snapshot_summary(self.current_snapshot().as_deref(), self.future_days)
    }

    /// One display line per event in the current snapshot.
    pub fn event_lines(&self) -> Vec<String> {
        self.current_snapshot().map(|snapshot| display::event_lines(&snapshot)).unwrap_or_default()
    }

    /// Validate credentials by performing the two-step exchange only.
    ///
    /// Never touches a live session; intended for configuration-time checks.
    pub async fn test_connection(credentials: &Credentials) -> bool {
        match CredentialSession::new() {
            Ok(session) => session.test_connection(credentials).await,
            Err(err) => {
                warn!(error = %err, "could not build client for connection test");
                false
            }
        }
    }

    /// Stop the recurring schedule and release the pipeline.
    ///
    /// # Errors
    /// Returns `MatchdayError::Internal` if the loop task fails to join.
    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler.stop().await.map_err(MatchdayError::from)
    }
}
