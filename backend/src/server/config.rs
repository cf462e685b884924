//! Environment-driven server configuration.
//!
//! Configuration is read once at startup. Lookup is injected so tests can
//! exercise parsing without mutating process environment.

use std::env;
use std::time::Duration;

use url::Url;

/// Default upstream blocklist feed.
const DEFAULT_DISPOSABLE_FEED_URL: &str =
    "https://raw.githubusercontent.com/martenson/disposable-email-domains/master/disposable_email_blocklist.conf";
/// Default upstream allowlist feed.
const DEFAULT_ALLOWLIST_FEED_URL: &str =
    "https://raw.githubusercontent.com/martenson/disposable-email-domains/master/allowlist.conf";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_VERDICT_TTL_SECS: u64 = 86_400;

/// Configuration errors raised during startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable {name}")]
    Missing { name: String },
    /// An environment variable is present but unusable.
    #[error("invalid value for {name}: {message}")]
    Invalid { name: String, message: String },
}

impl ConfigError {
    fn missing(name: &str) -> Self {
        Self::Missing {
            name: name.to_owned(),
        }
    }

    fn invalid(name: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.to_owned(),
            message: message.into(),
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Redis connection string.
    pub redis_url: String,
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Upstream blocklist feed endpoint.
    pub disposable_feed_url: Url,
    /// Upstream allowlist feed endpoint.
    pub allowlist_feed_url: Url,
    /// Lifetime of cached verdicts.
    pub verdict_ttl: Duration,
    /// Interval between background syncs. `None` disables the scheduler.
    pub sync_interval: Option<Duration>,
    /// Whether a sync immediately invalidates verdicts for domains no
    /// longer present in either list.
    pub sync_immediate_invalidation: bool,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through an injected variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::missing("DATABASE_URL"))?;
        let redis_url = lookup("REDIS_URL").ok_or_else(|| ConfigError::missing("REDIS_URL"))?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());

        let disposable_feed_url = parse_url(
            "DISPOSABLE_FEED_URL",
            lookup("DISPOSABLE_FEED_URL")
                .unwrap_or_else(|| DEFAULT_DISPOSABLE_FEED_URL.to_owned()),
        )?;
        let allowlist_feed_url = parse_url(
            "ALLOWLIST_FEED_URL",
            lookup("ALLOWLIST_FEED_URL").unwrap_or_else(|| DEFAULT_ALLOWLIST_FEED_URL.to_owned()),
        )?;

        let verdict_ttl = Duration::from_secs(match lookup("VERDICT_TTL_SECS") {
            Some(raw) => parse_secs("VERDICT_TTL_SECS", &raw)?,
            None => DEFAULT_VERDICT_TTL_SECS,
        });

        let sync_interval = match lookup("SYNC_INTERVAL_SECS") {
            Some(raw) => {
                let secs = parse_secs("SYNC_INTERVAL_SECS", &raw)?;
                if secs == 0 {
                    None
                } else {
                    Some(Duration::from_secs(secs))
                }
            }
            None => None,
        };

        let sync_immediate_invalidation = lookup("SYNC_IMMEDIATE_INVALIDATION")
            .map(|raw| matches!(raw.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            redis_url,
            bind_addr,
            disposable_feed_url,
            allowlist_feed_url,
            verdict_ttl,
            sync_interval,
            sync_immediate_invalidation,
        })
    }
}

fn parse_url(name: &str, raw: String) -> Result<Url, ConfigError> {
    Url::parse(&raw).map_err(|error| ConfigError::invalid(name, error.to_string()))
}

fn parse_secs(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .map_err(|_| ConfigError::invalid(name, "expected a non-negative integer"))
}
