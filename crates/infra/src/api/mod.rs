//! PlayMetrics API clients
//!
//! Credential-session acquisition and the calendar fetch. Both clients are
//! stateless across calls: a session lives for exactly one fetch cycle.

pub mod auth;
pub mod client;

pub use auth::CredentialSession;
pub use client::ScheduleFetcher;
