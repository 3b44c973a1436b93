//! Schedule source port interface
//!
//! Defines the boundary between the poll scheduler and whatever produces the
//! raw upstream dataset. The infra crate provides the HTTP-backed
//! implementation; tests substitute mocks.

use async_trait::async_trait;
use matchday_domain::{RawTeam, Result};

/// Trait for fetching the full raw schedule from the upstream service.
///
/// One call corresponds to one fetch cycle: the implementation is expected
/// to authenticate from scratch and return the complete dataset, or fail
/// with `MatchdayError::Auth` / `MatchdayError::Api`.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch every team with its events.
    async fn fetch_teams(&self) -> Result<Vec<RawTeam>>;
}
