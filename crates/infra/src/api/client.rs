//! Schedule fetcher
//!
//! Orchestrates one all-or-nothing fetch cycle: a fresh credential exchange
//! followed by the calendar read. There is deliberately no session reuse
//! across cycles; every call logs in from scratch, trading efficiency for
//! freedom from stale-token edge cases.

use std::time::Duration;

use async_trait::async_trait;
use matchday_core::ScheduleSource;
use matchday_domain::constants::{
    HEADER_FIREBASE_TOKEN, HEADER_PM_ACCESS_KEY, IDENTITY_SIGN_IN_URL, PLAYMETRICS_API_BASE,
    REQUEST_TIMEOUT_SECS, VENDOR_CALENDAR_PATH, VENDOR_CALENDAR_POPULATE,
};
use matchday_domain::{Credentials, MatchdayError, RawTeam, Result};
use reqwest::Client;
use tracing::{debug, instrument};

use super::auth::CredentialSession;

/// Client for the calendar read, bound to one configured account.
pub struct ScheduleFetcher {
    http: Client,
    session: CredentialSession,
    credentials: Credentials,
    api_base: String,
}

impl ScheduleFetcher {
    /// Create a fetcher against the production endpoints.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_endpoints(
            credentials,
            IDENTITY_SIGN_IN_URL.to_string(),
            PLAYMETRICS_API_BASE.to_string(),
        )
    }

    /// Create a fetcher with custom endpoints (used in tests).
    pub fn with_endpoints(
        credentials: Credentials,
        identity_url: String,
        api_base: String,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MatchdayError::Internal(format!("failed to build HTTP client: {e}")))?;

        let session = CredentialSession::with_endpoints(identity_url, api_base.clone())?;

        Ok(Self { http, session, credentials, api_base })
    }

    /// Run one fetch cycle: acquire a fresh session, then read the calendar.
    ///
    /// # Errors
    /// Returns `MatchdayError::Auth` if either token exchange fails (the
    /// calendar read is not attempted), or `MatchdayError::Api` if the
    /// calendar read fails or returns an unparseable shape.
    #[instrument(skip(self), fields(email = %self.credentials.email))]
    pub async fn fetch(&self) -> Result<Vec<RawTeam>> {
        let session = self.session.acquire(&self.credentials).await?;

        debug!("fetching schedule from calendar endpoint");

        let url = format!("{}{}", self.api_base, VENDOR_CALENDAR_PATH);
        let response = self
            .http
            .get(&url)
            .query(&[("populate", VENDOR_CALENDAR_POPULATE)])
            .header(HEADER_PM_ACCESS_KEY, &session.access_key)
            .header(HEADER_FIREBASE_TOKEN, &session.identity_token)
            .send()
            .await
            .map_err(|e| MatchdayError::Api(format!("calendar request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MatchdayError::Api(format!(
                "calendar request failed ({status}): {detail}"
            )));
        }

        let teams: Vec<RawTeam> = response.json().await.map_err(|e| {
            MatchdayError::Api(format!("failed to parse calendar response: {e}"))
        })?;

        debug!(team_count = teams.len(), "schedule fetched");
        Ok(teams)
    }
}

#[async_trait]
impl ScheduleSource for ScheduleFetcher {
    async fn fetch_teams(&self) -> Result<Vec<RawTeam>> {
        self.fetch().await
    }
}
