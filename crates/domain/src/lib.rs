//! # Matchday Domain
//!
//! Business domain types and models for Matchday.
//!
//! This crate contains:
//! - Domain data types (Credentials, Session, RawTeam, Snapshot, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (upstream endpoints, defaults, fallback literals)
//!
//! ## Architecture
//! - No dependencies on other Matchday crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
