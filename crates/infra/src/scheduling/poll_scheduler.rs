//! Poll scheduler for periodic schedule refresh.
//!
//! Drives fetch-and-normalize cycles on a fixed interval with lifecycle
//! management: the first cycle runs synchronously inside `start()` so a
//! consumer never observes missing data due purely to scheduling, and the
//! recurring loop runs cycles strictly one at a time (a slow cycle delays
//! the next tick rather than overlapping it).
//!
//! A failed cycle marks the scheduler degraded and leaves the previously
//! held snapshot untouched; it never terminates the recurring schedule.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use matchday_infra::api::ScheduleFetcher;
//! use matchday_infra::scheduling::{PollScheduler, PollSchedulerConfig, SchedulerResult};
//! # use matchday_domain::Credentials;
//!
//! # async fn example(credentials: Credentials) -> SchedulerResult<()> {
//! # let fetcher = ScheduleFetcher::new(credentials).unwrap();
//! let mut scheduler = PollScheduler::new(
//!     Arc::new(fetcher),
//!     PollSchedulerConfig {
//!         interval: Duration::from_secs(6 * 3600),
//!         horizon: chrono::Duration::days(7),
//!         ..Default::default()
//!     },
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use matchday_core::{normalize, ScheduleSource};
use matchday_domain::Snapshot;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the poll scheduler
#[derive(Debug, Clone)]
pub struct PollSchedulerConfig {
    /// Fixed poll cadence
    pub interval: Duration,
    /// Future look-ahead window for normalization
    pub horizon: chrono::Duration,
    /// Timeout for awaiting the loop task join handle on stop
    pub join_timeout: Duration,
}

impl Default for PollSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(6 * 3600), // 6 hours
            horizon: chrono::Duration::days(7),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Observable scheduler state.
///
/// Availability, as seen by consumers, is exactly "did the most recent cycle
/// succeed" — independent of whether a snapshot exists from an earlier
/// success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No cycle has run yet
    Uninitialized,
    /// A cycle is in flight
    Fetching,
    /// The most recent cycle succeeded
    Ready,
    /// The most recent cycle failed; any prior snapshot is still visible
    Degraded,
}

#[derive(Debug)]
struct PollStatus {
    state: PollState,
    snapshot: Option<Arc<Snapshot>>,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl PollStatus {
    fn new() -> Self {
        Self { state: PollState::Uninitialized, snapshot: None, last_success: None, last_error: None }
    }
}

/// Poll scheduler with explicit lifecycle management
pub struct PollScheduler {
    source: Arc<dyn ScheduleSource>,
    config: PollSchedulerConfig,
    status: Arc<RwLock<PollStatus>>,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl PollScheduler {
    /// Create a new scheduler over a schedule source.
    pub fn new(source: Arc<dyn ScheduleSource>, config: PollSchedulerConfig) -> Self {
        Self {
            source,
            config,
            status: Arc::new(RwLock::new(PollStatus::new())),
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scheduler.
    ///
    /// Runs the first fetch cycle before spawning the recurring loop; the
    /// caller blocks until that cycle completes. A failed first cycle leaves
    /// the scheduler degraded but running.
    ///
    /// # Errors
    /// Returns [`SchedulerError::AlreadyRunning`] if already started.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting poll scheduler");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        // First cycle runs before the recurring schedule begins
        Self::run_cycle(&self.source, &self.config, &self.status).await;

        let source = Arc::clone(&self.source);
        let status = Arc::clone(&self.status);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::poll_loop(source, config, status, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Poll scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully.
    ///
    /// Cancels the loop task and awaits completion. An in-flight cycle is
    /// abandoned; the held snapshot is left exactly as it was.
    ///
    /// # Errors
    /// Returns [`SchedulerError::NotRunning`] if not started.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping poll scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!("Poll scheduler stopped");
        Ok(())
    }

    /// Check if the scheduler loop is active.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// The snapshot from the most recent successful cycle, if any.
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.read_status().snapshot.clone()
    }

    /// Whether the most recent cycle succeeded.
    pub fn last_update_succeeded(&self) -> bool {
        self.read_status().state == PollState::Ready
    }

    /// Timestamp of the most recent successful cycle.
    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.read_status().last_success
    }

    /// Error text from the most recent failed cycle, cleared on success.
    pub fn last_error(&self) -> Option<String> {
        self.read_status().last_error.clone()
    }

    /// Current observable state.
    pub fn state(&self) -> PollState {
        self.read_status().state
    }

    fn read_status(&self) -> std::sync::RwLockReadGuard<'_, PollStatus> {
        self.status.read().expect("status lock poisoned")
    }

    /// Background loop: one cycle per tick, strictly sequential.
    async fn poll_loop(
        source: Arc<dyn ScheduleSource>,
        config: PollSchedulerConfig,
        status: Arc<RwLock<PollStatus>>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Poll loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.interval) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            // Shutdown mid-cycle: drop the in-flight fetch,
                            // leaving the held snapshot untouched
                            debug!("In-flight cycle abandoned during shutdown");
                            break;
                        }
                        _ = Self::run_cycle(&source, &config, &status) => {}
                    }
                }
            }
        }
    }

    /// Run one fetch-and-normalize cycle, updating the shared status.
    ///
    /// Failures are downgraded here: the snapshot is never touched on error
    /// and the loop keeps its uniform cadence.
    async fn run_cycle(
        source: &Arc<dyn ScheduleSource>,
        config: &PollSchedulerConfig,
        status: &Arc<RwLock<PollStatus>>,
    ) {
        {
            let mut guard = status.write().expect("status lock poisoned");
            guard.state = PollState::Fetching;
        }

        let started = Instant::now();

        match source.fetch_teams().await {
            Ok(teams) => {
                let reference = Utc::now();
                let snapshot = normalize(&teams, reference, config.horizon);
                let event_count = snapshot.event_count;

                let mut guard = status.write().expect("status lock poisoned");
                guard.snapshot = Some(Arc::new(snapshot));
                guard.last_success = Some(reference);
                guard.last_error = None;
                guard.state = PollState::Ready;
                drop(guard);

                info!(event_count, elapsed_ms = started.elapsed().as_millis() as u64, "schedule refresh completed");
            }
            Err(err) => {
                let mut guard = status.write().expect("status lock poisoned");
                guard.last_error = Some(err.to_string());
                guard.state = PollState::Degraded;
                drop(guard);

                warn!(error = %err, "schedule refresh failed; keeping previous snapshot");
            }
        }
    }
}

/// Ensure the loop is cancelled when dropped
impl Drop for PollScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            self.cancellation_token.cancel();
        }
    }
}
