//! Configuration for the LOOKOUT dashboard.
//!
//! Loaded from `~/.lookout/config.yaml` (or a path given on the command
//! line), with every field overridable by a CLI flag. The push channel and
//! media feed are optional: leaving their addresses unset disables those
//! features without error.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LookoutError, Result};

/// Default snapshot poll interval in milliseconds (spec range 3000-5000).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 4000;

/// Default bound on the retained alert history.
pub const DEFAULT_HISTORY_CAP: usize = 20;

/// Default snapshot fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Alerts snapshot endpoint, polled at a fixed interval
    #[serde(default)]
    pub alerts_url: String,

    /// Snapshot poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-fetch timeout in seconds; a fetch exceeding this counts as a
    /// failure and the next tick proceeds normally
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Live push channel address; unset disables the push feature
    #[serde(default)]
    pub push_url: Option<String>,

    /// Media proxy stream address; unset disables the live-feed panel
    #[serde(default)]
    pub feed_url: Option<String>,

    /// Maximum number of retained alerts
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_history_cap() -> usize {
    DEFAULT_HISTORY_CAP
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            alerts_url: String::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            push_url: None,
            feed_url: None,
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a YAML file.
    ///
    /// `path` defaults to `~/.lookout/config.yaml`. The loaded config is
    /// validated before being returned.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => default_config_path()?,
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LookoutError::ConfigNotFound {
                    path: path.clone(),
                    source: Some(e),
                }
            } else {
                LookoutError::io("reading config", path.clone(), e)
            }
        })?;

        let config: Self =
            serde_yaml::from_str(&contents).map_err(|e| LookoutError::ConfigInvalid {
                path: path.clone(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check field-level constraints.
    pub fn validate(&self) -> Result<()> {
        if self.alerts_url.is_empty() {
            return Err(LookoutError::ConfigMissingField {
                field: "alerts_url".to_string(),
            });
        }
        if self.history_cap == 0 {
            return Err(LookoutError::config_validation(
                "history_cap must be at least 1",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(LookoutError::config_validation(
                "poll_interval_ms must be non-zero",
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(LookoutError::config_validation(
                "fetch_timeout_secs must be non-zero",
            ));
        }
        Ok(())
    }

    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Whether the live push channel is enabled.
    pub fn push_enabled(&self) -> bool {
        self.push_url.is_some()
    }

    /// Set the alerts endpoint.
    pub fn with_alerts_url(mut self, url: impl Into<String>) -> Self {
        self.alerts_url = url.into();
        self
    }

    /// Set the push channel address.
    pub fn with_push_url(mut self, url: impl Into<String>) -> Self {
        self.push_url = Some(url.into());
        self
    }

    /// Set the media feed address.
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = Some(url.into());
        self
    }

    /// Set the history cap.
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }

    /// Set the poll interval in milliseconds.
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }
}

/// Get the default configuration file path.
///
/// Returns `~/.lookout/config.yaml`
pub fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| LookoutError::Internal {
        message: "HOME environment variable not set".into(),
    })?;

    Ok(PathBuf::from(home).join(".lookout").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.poll_interval_ms, 4000);
        assert_eq!(config.history_cap, 20);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert!(config.push_url.is_none());
        assert!(!config.push_enabled());
    }

    #[test]
    fn test_validate_requires_alerts_url() {
        let err = DashboardConfig::default().validate().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let config = DashboardConfig::default()
            .with_alerts_url("http://localhost:9000/api/alerts")
            .with_history_cap(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_yaml_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alerts_url: http://localhost:9000/api/alerts").unwrap();
        writeln!(file, "push_url: http://localhost:9001/api/push").unwrap();

        let config = DashboardConfig::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.alerts_url, "http://localhost:9000/api/alerts");
        assert!(config.push_enabled());
        // Unspecified fields fall back to defaults
        assert_eq!(config.poll_interval_ms, 4000);
        assert_eq!(config.history_cap, 20);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DashboardConfig::load(Some(PathBuf::from("/nonexistent/config.yaml")))
            .unwrap_err();
        assert!(matches!(err, LookoutError::ConfigNotFound { .. }));
        assert!(err.guidance().is_some());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alerts_url: [unclosed").unwrap();

        let err = DashboardConfig::load(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, LookoutError::ConfigInvalid { .. }));
    }
}
