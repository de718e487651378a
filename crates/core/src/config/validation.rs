//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `cache_name` is empty, and
    /// `ConfigError::Invalid` if:
    /// - `scope_url` is not an absolute http(s) URL ending in `/`
    /// - a `precache` entry is blank
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_name".into(),
                hint: "Set ROUTINE_SW_CACHE_NAME or build with ROUTINE_CACHE_NAME".into(),
            });
        }

        match url::Url::parse(&self.scope_url) {
            Ok(scope) if matches!(scope.scheme(), "http" | "https") => {
                if !scope.path().ends_with('/') {
                    return Err(ConfigError::Invalid {
                        field: "scope_url".into(),
                        reason: "must end with '/'".into(),
                    });
                }
            }
            Ok(scope) => {
                return Err(ConfigError::Invalid {
                    field: "scope_url".into(),
                    reason: format!("unsupported scheme: {}", scope.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "scope_url".into(), reason: e.to_string() });
            }
        }

        if let Some(pos) = self.precache.iter().position(|entry| entry.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "precache".into(),
                reason: format!("entry {pos} must not be empty"),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.precache.is_empty() {
            tracing::warn!(cache_name = %self.cache_name, "precache manifest is empty; install will only open the store");
        }

        Ok(())
    }
}
