//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::stations::{DEFAULT_CONCURRENCY, FeedConfig};

/// Default address the HTTP server binds to.
const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Default snapshot location.
const DEFAULT_CACHE_PATH: &str = "/var/lib/overseer/stations.json";

/// Default time between refresh cycles.
const DEFAULT_REFRESH_SECS: u64 = 60;

/// Error returned for an environment variable that doesn't parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    var: &'static str,
    value: String,
}

/// How the server gets its data.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Scrape the live feed on a schedule.
    Live {
        /// Snapshot file; `None` disables caching.
        cache_path: Option<PathBuf>,
        refresh: Duration,
    },
    /// Serve a snapshot file and never touch the network.
    Fake { snapshot: PathBuf },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to serve HTTP on.
    pub bind: SocketAddr,

    pub mode: Mode,

    /// Upstream feed endpoints.
    pub feed: FeedConfig,

    /// Detail documents fetched at once during a refresh.
    pub concurrency: usize,
}

impl AppConfig {
    /// Read configuration from `OVERSEER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("OVERSEER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = parse("OVERSEER_BIND", &bind_raw)?;

        let mode = match lookup("OVERSEER_FAKE_FILE").filter(|f| !f.is_empty()) {
            Some(snapshot) => Mode::Fake {
                snapshot: snapshot.into(),
            },
            None => {
                let cache_path = lookup("OVERSEER_CACHE_PATH")
                    .unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string());
                let refresh_secs = match lookup("OVERSEER_REFRESH_SECS") {
                    Some(raw) => positive("OVERSEER_REFRESH_SECS", &raw)?,
                    None => DEFAULT_REFRESH_SECS,
                };
                Mode::Live {
                    cache_path: (!cache_path.is_empty()).then(|| cache_path.into()),
                    refresh: Duration::from_secs(refresh_secs),
                }
            }
        };

        let mut feed = FeedConfig::default();
        if let Some(url) = lookup("OVERSEER_ROSTER_URL") {
            feed = feed.with_roster_url(url);
        }
        if let Some(template) = lookup("OVERSEER_DETAIL_URL") {
            feed = feed.with_detail_url(template);
        }
        if let Some(raw) = lookup("OVERSEER_TIMEOUT_SECS") {
            feed = feed.with_timeout(Duration::from_secs(positive("OVERSEER_TIMEOUT_SECS", &raw)?));
        }

        let concurrency = match lookup("OVERSEER_FETCH_CONCURRENCY") {
            Some(raw) => positive("OVERSEER_FETCH_CONCURRENCY", &raw)? as usize,
            None => DEFAULT_CONCURRENCY,
        };

        Ok(Self {
            bind,
            mode,
            feed,
            concurrency,
        })
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError {
        var,
        value: raw.to_string(),
    })
}

fn positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match parse::<u64>(var, raw)? {
        0 => Err(ConfigError {
            var,
            value: raw.to_string(),
        }),
        n => Ok(n),
    }
}
