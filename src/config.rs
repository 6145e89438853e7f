//! Tracker configuration
//!
//! Read once at startup from `MACROTRACK_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{TrackerError, TrackerResult};
use crate::expenditure::{RecomputeParams, DEFAULT_MAX_STEP_KCAL, DEFAULT_WINDOW_DAYS};
use crate::nutrition::ServingConfig;

pub const DATABASE_PATH_VAR: &str = "MACROTRACK_DATABASE_PATH";
pub const USER_ID_VAR: &str = "MACROTRACK_USER_ID";
pub const WINDOW_DAYS_VAR: &str = "MACROTRACK_WINDOW_DAYS";
pub const MAX_STEP_VAR: &str = "MACROTRACK_MAX_STEP_KCAL";
pub const NETWORK_TIMEOUT_VAR: &str = "MACROTRACK_NETWORK_TIMEOUT_SECS";

pub const DEFAULT_USER_ID: &str = "local";
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub database_path: PathBuf,
    pub user_id: String,
    pub window_days: u32,
    /// `None` disables the per-recompute cap
    pub max_step_kcal: Option<f64>,
    /// Applied to every store call
    pub network_timeout: Duration,
    pub serving: ServingConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            user_id: DEFAULT_USER_ID.to_string(),
            window_days: DEFAULT_WINDOW_DAYS,
            max_step_kcal: Some(DEFAULT_MAX_STEP_KCAL),
            network_timeout: Duration::from_secs(DEFAULT_NETWORK_TIMEOUT_SECS),
            serving: ServingConfig::STANDARD,
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> TrackerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset or blank values use defaults
    pub fn from_lookup<F>(lookup: F) -> TrackerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(path) = get(DATABASE_PATH_VAR) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(user_id) = get(USER_ID_VAR) {
            config.user_id = user_id;
        }

        if let Some(raw) = get(WINDOW_DAYS_VAR) {
            config.window_days = match raw.parse::<u32>() {
                Ok(days) if days >= 1 => days,
                _ => {
                    return Err(TrackerError::Config(format!(
                        "{} must be a whole number of days >= 1, got '{}'",
                        WINDOW_DAYS_VAR, raw
                    )))
                }
            };
        }

        if let Some(raw) = get(MAX_STEP_VAR) {
            config.max_step_kcal = parse_max_step(&raw)?;
        }

        if let Some(raw) = get(NETWORK_TIMEOUT_VAR) {
            let secs = match raw.parse::<u64>() {
                Ok(secs) if secs >= 1 => secs,
                _ => {
                    return Err(TrackerError::Config(format!(
                        "{} must be a whole number of seconds >= 1, got '{}'",
                        NETWORK_TIMEOUT_VAR, raw
                    )))
                }
            };
            config.network_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn recompute_params(&self) -> RecomputeParams {
        RecomputeParams {
            window_days: self.window_days,
            max_step_kcal: self.max_step_kcal,
        }
    }
}

fn parse_max_step(raw: &str) -> TrackerResult<Option<f64>> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v == 0.0 => Ok(None),
        Ok(v) if v.is_finite() && v > 0.0 => Ok(Some(v)),
        _ => Err(TrackerError::Config(format!(
            "{} must be a positive number, 0 or 'none', got '{}'",
            MAX_STEP_VAR, raw
        ))),
    }
}

/// Database path next to the project when running from target/release or
/// target/debug, otherwise next to the executable
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("macrotrack.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> TrackerResult<TrackerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TrackerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.user_id, "local");
        assert_eq!(config.window_days, 7);
        assert_eq!(config.max_step_kcal, Some(250.0));
        assert_eq!(config.network_timeout, Duration::from_secs(10));
        assert_eq!(config.serving, ServingConfig::STANDARD);
        assert!(config.database_path.ends_with("data/macrotrack.db"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (DATABASE_PATH_VAR, "/tmp/m.db"),
            (USER_ID_VAR, "alice"),
            (WINDOW_DAYS_VAR, "14"),
            (MAX_STEP_VAR, "none"),
            (NETWORK_TIMEOUT_VAR, "3"),
        ])
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/m.db"));
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.recompute_params(), RecomputeParams {
            window_days: 14,
            max_step_kcal: None,
        });
        assert_eq!(config.network_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_zero_max_step_disables_cap() {
        let config = config_from(&[(MAX_STEP_VAR, "0")]).unwrap();
        assert_eq!(config.max_step_kcal, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[(WINDOW_DAYS_VAR, "0")]).is_err());
        assert!(config_from(&[(WINDOW_DAYS_VAR, "week")]).is_err());
        assert!(config_from(&[(MAX_STEP_VAR, "-5")]).is_err());
        let err = config_from(&[(NETWORK_TIMEOUT_VAR, "0")]).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
