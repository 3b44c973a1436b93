//! Credential-session acquisition
//!
//! Two-step token exchange against the PlayMetrics identity provider and
//! vendor login endpoint. Either both tokens come back or the call fails
//! with `MatchdayError::Auth`; a partial session is never returned. Retries
//! are the caller's responsibility.

use std::time::Duration;

use matchday_domain::constants::{
    HEADER_FIREBASE_TOKEN, IDENTITY_CLIENT_TYPE, IDENTITY_SIGN_IN_URL, PLAYMETRICS_API_BASE,
    REQUEST_TIMEOUT_SECS, VENDOR_CLIENT_TYPE, VENDOR_LOGIN_PATH,
};
use matchday_domain::{Credentials, MatchdayError, Result, Session};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Client for the two-step PlayMetrics login exchange.
pub struct CredentialSession {
    http: Client,
    identity_url: String,
    api_base: String,
}

impl CredentialSession {
    /// Create a session client against the production endpoints.
    pub fn new() -> Result<Self> {
        Self::with_endpoints(IDENTITY_SIGN_IN_URL.to_string(), PLAYMETRICS_API_BASE.to_string())
    }

    /// Create a session client with custom endpoints (used in tests).
    pub fn with_endpoints(identity_url: String, api_base: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MatchdayError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, identity_url, api_base })
    }

    /// Perform the full two-step exchange and return a fresh session.
    ///
    /// # Errors
    /// Returns `MatchdayError::Auth` on any transport failure, non-success
    /// status, or missing/empty token field in either step.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn acquire(&self, credentials: &Credentials) -> Result<Session> {
        let identity_token = self.exchange_identity(credentials).await?;
        let access_key = self.exchange_access_key(&credentials.role_id, &identity_token).await?;

        Ok(Session { identity_token, access_key })
    }

    /// Validate credentials by running the exchange and discarding the
    /// session. Used at configuration time; never touches a live session.
    pub async fn test_connection(&self, credentials: &Credentials) -> bool {
        match self.acquire(credentials).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "connection test failed");
                false
            }
        }
    }

    async fn exchange_identity(&self, credentials: &Credentials) -> Result<String> {
        debug!("authenticating with identity provider");

        let body = IdentitySignInRequest {
            return_secure_token: true,
            email: &credentials.email,
            password: &credentials.password,
            client_type: IDENTITY_CLIENT_TYPE,
        };

        let response = self
            .http
            .post(&self.identity_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MatchdayError::Auth(format!("identity exchange failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MatchdayError::Auth(format!(
                "identity exchange failed ({status}): {detail}"
            )));
        }

        let parsed: IdentitySignInResponse = response.json().await.map_err(|e| {
            MatchdayError::Auth(format!("failed to parse identity response: {e}"))
        })?;

        if parsed.id_token.is_empty() {
            return Err(MatchdayError::Auth("identity response missing idToken".into()));
        }

        debug!("identity token acquired");
        Ok(parsed.id_token)
    }

    async fn exchange_access_key(&self, role_id: &str, identity_token: &str) -> Result<String> {
        debug!("requesting vendor access key");

        let url = format!("{}{}", self.api_base, VENDOR_LOGIN_PATH);
        let body = VendorLoginRequest { current_role_id: role_id, client_type: VENDOR_CLIENT_TYPE };

        let response = self
            .http
            .post(&url)
            .header(HEADER_FIREBASE_TOKEN, identity_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MatchdayError::Auth(format!("access-key exchange failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MatchdayError::Auth(format!(
                "access-key exchange failed ({status}): {detail}"
            )));
        }

        let parsed: VendorLoginResponse = response.json().await.map_err(|e| {
            MatchdayError::Auth(format!("failed to parse vendor login response: {e}"))
        })?;

        if parsed.access_key.is_empty() {
            return Err(MatchdayError::Auth("vendor login response missing access_key".into()));
        }

        debug!("access key acquired");
        Ok(parsed.access_key)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentitySignInRequest<'a> {
    return_secure_token: bool,
    email: &'a str,
    password: &'a str,
    client_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct IdentitySignInResponse {
    #[serde(rename = "idToken")]
    id_token: String,
}

#[derive(Debug, Serialize)]
struct VendorLoginRequest<'a> {
    current_role_id: &'a str,
    client_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct VendorLoginResponse {
    access_key: String,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const IDENTITY_PATH: &str = "/v1/accounts:signInWithPassword";

    fn credentials() -> Credentials {
        Credentials {
            email: "coach@example.com".to_string(),
            password: "secret".to_string(),
            role_id: "12345".to_string(),
        }
    }

    fn session_client(server: &MockServer) -> CredentialSession {
        CredentialSession::with_endpoints(
            format!("{}{}", server.uri(), IDENTITY_PATH),
            server.uri(),
        )
        .expect("client builds")
    }

    async fn mount_identity_success(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(IDENTITY_PATH))
            .and(body_json(serde_json::json!({
                "returnSecureToken": true,
                "email": "coach@example.com",
                "password": "secret",
                "clientType": "CLIENT_TYPE_WEB",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"idToken": "firebase-jwt"})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn acquire_returns_both_tokens_on_success() {
        let server = MockServer::start().await;
        mount_identity_success(&server).await;

        Mock::given(method("POST"))
            .and(path("/firebase/user/login"))
            .and(header("Firebase-Token", "firebase-jwt"))
            .and(body_json(serde_json::json!({
                "current_role_id": "12345",
                "client_type": "desktop",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_key": "pm-key"})),
            )
            .mount(&server)
            .await;

        let session = session_client(&server)
            .acquire(&credentials())
            .await
            .expect("exchange succeeds");

        assert_eq!(session.identity_token, "firebase-jwt");
        assert_eq!(session.access_key, "pm-key");
    }

    #[tokio::test]
    async fn identity_rejection_is_auth_error_and_skips_vendor_login() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IDENTITY_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({"error": {"message": "INVALID_PASSWORD"}}),
            ))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/firebase/user/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = session_client(&server).acquire(&credentials()).await;

        let err = result.expect_err("identity rejection fails the exchange");
        assert!(matches!(err, MatchdayError::Auth(_)));
        assert!(err.to_string().contains("INVALID_PASSWORD"));
    }

    #[tokio::test]
    async fn missing_id_token_field_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IDENTITY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let result = session_client(&server).acquire(&credentials()).await;
        assert!(matches!(result, Err(MatchdayError::Auth(_))));
    }

    #[tokio::test]
    async fn empty_id_token_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IDENTITY_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"idToken": ""})),
            )
            .mount(&server)
            .await;

        let result = session_client(&server).acquire(&credentials()).await;
        assert!(matches!(result, Err(MatchdayError::Auth(_))));
    }

    #[tokio::test]
    async fn access_key_rejection_is_auth_error() {
        let server = MockServer::start().await;
        mount_identity_success(&server).await;

        Mock::given(method("POST"))
            .and(path("/firebase/user/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = session_client(&server).acquire(&credentials()).await;

        let err = result.expect_err("rejected access key fails the exchange");
        assert!(matches!(err, MatchdayError::Auth(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_connection_reports_success_and_failure() {
        let server = MockServer::start().await;
        mount_identity_success(&server).await;

        Mock::given(method("POST"))
            .and(path("/firebase/user/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_key": "pm-key"})),
            )
            .mount(&server)
            .await;

        let client = session_client(&server);
        assert!(client.test_connection(&credentials()).await);

        let bad_creds = Credentials { password: "wrong".to_string(), ..credentials() };
        // Body no longer matches the mounted identity mock; wiremock answers 404
        assert!(!client.test_connection(&bad_creds).await);
    }
}
