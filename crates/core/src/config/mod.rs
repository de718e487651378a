//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (ROUTINE_SW_*)
//! 2. TOML config file (if ROUTINE_SW_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The cache generation name and precache manifest are the only settings the
//! policy itself depends on; the rest configures the storage and network
//! collaborators.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Cache generation shipped with this build.
///
/// Override at build time with `ROUTINE_CACHE_NAME=... cargo build`.
pub const DEFAULT_CACHE_NAME: &str = match option_env!("ROUTINE_CACHE_NAME") {
    Some(name) => name,
    None => "routine-cache-v2",
};

/// Shell assets fetched into every new generation.
pub const DEFAULT_PRECACHE: &[&str] = &["./", "./index.html", "./manifest.json"];

/// Body of the page synthesized when a navigation has neither network nor cache.
pub const DEFAULT_OFFLINE_HTML: &str = "<h1>Offline</h1>";

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (ROUTINE_SW_*)
/// 2. TOML config file (if ROUTINE_SW_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the current cache generation.
    ///
    /// Set via ROUTINE_SW_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Scope-relative URLs precached at install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Absolute URL all relative paths resolve against. Must end with `/`.
    ///
    /// Set via ROUTINE_SW_SCOPE_URL environment variable.
    #[serde(default = "default_scope_url")]
    pub scope_url: String,

    /// Document served when a request has no cached match of its own.
    #[serde(default = "default_root_document")]
    pub root_document: String,

    /// Page opened or focused on notification click.
    #[serde(default = "default_open_url")]
    pub open_url: String,

    /// HTML body of the synthesized offline page.
    #[serde(default = "default_offline_html")]
    pub offline_html: String,

    /// Icon shown with push notifications.
    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,

    /// Badge shown with push notifications.
    #[serde(default = "default_notification_icon")]
    pub notification_badge: String,

    /// Title used when a push payload carries none.
    #[serde(default = "default_push_title")]
    pub push_title: String,

    /// Body used when a push payload carries none.
    #[serde(default = "default_push_body")]
    pub push_body: String,

    /// Path to SQLite cache database.
    ///
    /// Set via ROUTINE_SW_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via ROUTINE_SW_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via ROUTINE_SW_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via ROUTINE_SW_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_cache_name() -> String {
    DEFAULT_CACHE_NAME.into()
}

fn default_precache() -> Vec<String> {
    DEFAULT_PRECACHE.iter().map(|s| s.to_string()).collect()
}

fn default_scope_url() -> String {
    "http://localhost:8080/".into()
}

fn default_root_document() -> String {
    "./index.html".into()
}

fn default_open_url() -> String {
    "./".into()
}

fn default_offline_html() -> String {
    DEFAULT_OFFLINE_HTML.into()
}

fn default_notification_icon() -> String {
    "icons/icon-192.png".into()
}

fn default_push_title() -> String {
    "Update available".into()
}

fn default_push_body() -> String {
    "Open the app to see what's new.".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./routine-cache.sqlite")
}

fn default_user_agent() -> String {
    "routine-sw/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            precache: default_precache(),
            scope_url: default_scope_url(),
            root_document: default_root_document(),
            open_url: default_open_url(),
            offline_html: default_offline_html(),
            notification_icon: default_notification_icon(),
            notification_badge: default_notification_icon(),
            push_title: default_push_title(),
            push_body: default_push_body(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `ROUTINE_SW_`
    /// 2. TOML file from `ROUTINE_SW_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("ROUTINE_SW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("ROUTINE_SW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
