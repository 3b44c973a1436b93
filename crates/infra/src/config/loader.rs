//! Configuration loader
//!
//! Loads the pipeline configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MATCHDAY_EMAIL`: account email (required)
//! - `MATCHDAY_PASSWORD`: account password (required)
//! - `MATCHDAY_ROLE_ID`: role identifier for the vendor login (required)
//! - `MATCHDAY_FUTURE_DAYS`: look-ahead window in days (default 7)
//! - `MATCHDAY_POLL_INTERVAL_HOURS`: poll cadence in hours, 1-24 (default 6)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./matchday.json` or `./matchday.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use matchday_domain::constants::{DEFAULT_FUTURE_DAYS, DEFAULT_POLL_INTERVAL_HOURS};
use matchday_domain::{MatchdayError, Result, ScheduleConfig};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file. The
/// returned bundle is always validated.
///
/// # Errors
/// Returns `MatchdayError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Values fail validation (blank credentials, interval out of bounds)
pub fn load() -> Result<ScheduleConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The three credential variables must be present; the window and interval
/// fall back to their defaults.
///
/// # Errors
/// Returns `MatchdayError::Config` if required variables are missing, a
/// numeric variable fails to parse, or validation fails.
pub fn load_from_env() -> Result<ScheduleConfig> {
    let email = env_var("MATCHDAY_EMAIL")?;
    let password = env_var("MATCHDAY_PASSWORD")?;
    let role_id = env_var("MATCHDAY_ROLE_ID")?;
    let future_days = env_u32("MATCHDAY_FUTURE_DAYS", DEFAULT_FUTURE_DAYS)?;
    let poll_interval_hours =
        env_u32("MATCHDAY_POLL_INTERVAL_HOURS", DEFAULT_POLL_INTERVAL_HOURS)?;

    let config = ScheduleConfig { email, password, role_id, future_days, poll_interval_hours };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `MatchdayError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<ScheduleConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MatchdayError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MatchdayError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MatchdayError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ScheduleConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MatchdayError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MatchdayError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MatchdayError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("matchday.json"),
            cwd.join("matchday.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("matchday.json"),
                exe_dir.join("matchday.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        MatchdayError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse optional numeric environment variable with a default
fn env_u32(key: &str, default: u32) -> Result<u32> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|e| MatchdayError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
