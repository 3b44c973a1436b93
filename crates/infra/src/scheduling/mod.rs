//! Scheduling infrastructure
//!
//! The poll scheduler drives sequential fetch cycles on a fixed interval and
//! owns the current snapshot.

pub mod error;
pub mod poll_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use poll_scheduler::{PollScheduler, PollSchedulerConfig, PollState};
