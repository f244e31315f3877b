//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve data/log locations, remote endpoint and timeouts.
//! - Validate values once, at startup, with readable error messages.
//!
//! # Invariants
//! - `data_dir` and `log_dir` are absolute.
//! - `request_timeout` is non-zero.
//! - `remote_base_url` is an `http(s)` URL without a trailing slash.

use crate::logging::{default_log_level, LogLevel};
use chrono_tz::Tz;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DATA_DIR: &str = "ZLOG_DATA_DIR";
pub const ENV_REMOTE_BASE_URL: &str = "ZLOG_REMOTE_BASE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ZLOG_HTTP_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "ZLOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ZLOG_LOG_DIR";
pub const ENV_TIME_ZONE: &str = "ZLOG_TIME_ZONE";

pub const DEFAULT_REMOTE_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const APP_DIR_NAME: &str = "zlog";
const SLEEPS_FILE_NAME: &str = "sleeps.data";
const TAGS_FILE_NAME: &str = "tags.data";
const DREAMS_API_PATH: &str = "/api/dreams";

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No per-user data directory could be derived from the environment.
    NoDataDir,
    RelativePath { key: &'static str, value: String },
    InvalidUrl(String),
    InvalidTimeout(String),
    InvalidLogLevel(String),
    UnknownTimeZone(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDataDir => write!(
                f,
                "no data directory found; set {ENV_DATA_DIR}, XDG_DATA_HOME, HOME or APPDATA"
            ),
            Self::RelativePath { key, value } => {
                write!(f, "{key} must be an absolute path, got `{value}`")
            }
            Self::InvalidUrl(value) => {
                write!(f, "remote base url must start with http:// or https://, got `{value}`")
            }
            Self::InvalidTimeout(value) => {
                write!(f, "request timeout must be a positive number of seconds, got `{value}`")
            }
            Self::InvalidLogLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::UnknownTimeZone(value) => write!(f, "unknown time zone `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: LogLevel,
    pub remote_base_url: String,
    pub request_timeout: Duration,
    /// Zone given to newly created sleeps.
    pub default_time_zone: Tz,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = absolute_dir("data_dir", data_dir.into())?;
        Ok(Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            log_level: default_log_level(),
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_time_zone: Tz::UTC,
        })
    }

    /// Reads `ZLOG_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup (testable `from_env`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = match value(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(&value).ok_or(ConfigError::NoDataDir)?,
        };
        let mut config = Self::new(data_dir)?;

        if let Some(dir) = value(ENV_LOG_DIR) {
            config.log_dir = absolute_dir("log_dir", PathBuf::from(dir))?;
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level
                .parse()
                .map_err(|_| ConfigError::InvalidLogLevel(level.clone()))?;
        }
        if let Some(url) = value(ENV_REMOTE_BASE_URL) {
            config.remote_base_url = normalize_base_url(&url)?;
        }
        if let Some(secs) = value(ENV_HTTP_TIMEOUT_SECS) {
            config.request_timeout = parse_timeout(&secs)?;
        }
        if let Some(zone) = value(ENV_TIME_ZONE) {
            config.default_time_zone = zone
                .parse()
                .map_err(|_| ConfigError::UnknownTimeZone(zone.clone()))?;
        }
        Ok(config)
    }

    pub fn with_remote_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.remote_base_url = normalize_base_url(url)?;
        Ok(self)
    }

    pub fn sleeps_path(&self) -> PathBuf {
        self.data_dir.join(SLEEPS_FILE_NAME)
    }

    pub fn tags_path(&self) -> PathBuf {
        self.data_dir.join(TAGS_FILE_NAME)
    }

    /// `<base>/api/dreams`, used for both GET and POST.
    pub fn dreams_endpoint(&self) -> String {
        format!("{}{DREAMS_API_PATH}", self.remote_base_url)
    }
}

fn default_data_dir(value: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(xdg) = value("XDG_DATA_HOME") {
        return Some(Path::new(&xdg).join(APP_DIR_NAME));
    }
    if let Some(home) = value("HOME") {
        return Some(Path::new(&home).join(".local").join("share").join(APP_DIR_NAME));
    }
    value("APPDATA").map(|appdata| Path::new(&appdata).join(APP_DIR_NAME))
}

fn absolute_dir(key: &'static str, path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(ConfigError::RelativePath {
            key,
            value: path.display().to_string(),
        })
    }
}

fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidUrl(url.to_string()))
    }
}

fn parse_timeout(secs: &str) -> Result<Duration, ConfigError> {
    match secs.parse::<u64>() {
        Ok(value) if value > 0 => Ok(Duration::from_secs(value)),
        _ => Err(ConfigError::InvalidTimeout(secs.to_string())),
    }
}
