use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://rest.ensembl.org";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
pub const DEFAULT_CACHE_TTL_SECS: f64 = 30.0;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_SECS: f64 = 0.2;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub retries: u32,
    pub backoff_base: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
    pub bind_addr: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs_f64(DEFAULT_CACHE_TTL_SECS),
            retries: DEFAULT_RETRIES,
            backoff_base: Duration::from_secs_f64(DEFAULT_BACKOFF_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Text,
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn from_env() -> Settings {
        Self::resolve(|name| std::env::var(name).ok())
    }

    pub fn resolve<F>(lookup: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("ENSEMBL_BASE_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") => LogFormat::Text,
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(value) if value.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(value) => {
                tracing::warn!(variable = "LOG_FORMAT", value, "unknown log format, using text");
                LogFormat::Text
            }
        };

        let bind_addr = match lookup("BIND_ADDR") {
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(variable = "BIND_ADDR", %value, default = DEFAULT_BIND_ADDR, "invalid bind address, using default");
                default_bind_addr()
            }),
            None => default_bind_addr(),
        };

        Settings {
            base_url,
            timeout: seconds_var(&lookup, "ENSEMBL_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECS),
            cache_ttl: seconds_var(&lookup, "ENSEMBL_CACHE_TTL_SECONDS", DEFAULT_CACHE_TTL_SECS),
            retries: int_var(&lookup, "ENSEMBL_RETRIES", DEFAULT_RETRIES),
            backoff_base: seconds_var(&lookup, "ENSEMBL_BACKOFF_SECONDS", DEFAULT_BACKOFF_SECS),
            log_level: lookup("LOG_LEVEL")
                .map(|value| value.trim().to_lowercase())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format,
            bind_addr,
        }
    }
}

fn seconds_var<F>(lookup: &F, name: &str, default: f64) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Duration::from_secs_f64(default);
    };
    let parsed = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .and_then(|value| Duration::try_from_secs_f64(value).ok());
    parsed.unwrap_or_else(|| {
        tracing::warn!(variable = name, value = %raw, default, "invalid duration, using default");
        Duration::from_secs_f64(default)
    })
}

fn int_var<F>(lookup: &F, name: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(variable = name, value = %raw, default, "invalid integer, using default");
        default
    })
}
