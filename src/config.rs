use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "CarePortal";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the notification API.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Upper bound on notifications returned by a single list call.
pub const MAX_LIST_SIZE: u32 = 200;

/// Poll interval used by every role shell (30 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Number of entries shown in the dropdown preview.
pub const DEFAULT_PREVIEW_LEN: usize = 5;

/// Unread counts above this render as "9+".
pub const DEFAULT_BADGE_CAP: usize = 9;

/// Client-side HTTP timeout for store calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,
}

/// Get the application data directory (~/CarePortal/)
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(APP_NAME))
}

/// Default location of the notification database.
pub fn database_path() -> Result<PathBuf, ConfigError> {
    Ok(app_data_dir()?.join("notifications.db"))
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "careportal=info,careportal_lib=info,tower_http=warn"
}

// ═══════════════════════════════════════════════════════════
// Server configuration
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
}

impl ServerConfig {
    /// Read `CAREPORTAL_BIND` and `CAREPORTAL_DB`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("CAREPORTAL_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = SocketAddr::from_str(&bind_raw).map_err(|_| ConfigError::InvalidValue {
            var: "CAREPORTAL_BIND",
            value: bind_raw.clone(),
        })?;

        let database_path = match lookup("CAREPORTAL_DB") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => database_path()?,
        };

        Ok(Self {
            bind_addr,
            database_path,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Client cache configuration
// ═══════════════════════════════════════════════════════════

/// How "mark all as read" reconciles entries whose server call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkAllPolicy {
    /// Flip every unread entry before the calls settle and keep it read.
    #[default]
    KeepOptimistic,
    /// Flip an entry only once its own call succeeded.
    ConfirmedOnly,
}

impl FromStr for MarkAllPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep_optimistic" => Ok(Self::KeepOptimistic),
            "confirmed_only" => Ok(Self::ConfirmedOnly),
            _ => Err(ConfigError::InvalidValue {
                var: "CAREPORTAL_MARK_ALL_POLICY",
                value: s.into(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub poll_interval: Duration,
    pub mark_all_policy: MarkAllPolicy,
    pub preview_len: usize,
    pub badge_cap: usize,
    pub request_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            mark_all_policy: MarkAllPolicy::default(),
            preview_len: DEFAULT_PREVIEW_LEN,
            badge_cap: DEFAULT_BADGE_CAP,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CacheConfig {
    /// Read `CAREPORTAL_POLL_SECS` and `CAREPORTAL_MARK_ALL_POLICY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("CAREPORTAL_POLL_SECS") {
            let secs: u64 = raw
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: "CAREPORTAL_POLL_SECS",
                    value: raw.clone(),
                })?;
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("CAREPORTAL_MARK_ALL_POLICY") {
            config.mark_all_policy = raw.parse()?;
        }

        Ok(config)
    }
}
