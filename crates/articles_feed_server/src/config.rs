//! Process configuration read from the environment.
//!
//! # Responsibility
//! - Read every setting once at startup into a plain value.
//! - Reject malformed values with the offending variable named.
//!
//! # Invariants
//! - No global configuration state; the value is passed down explicitly.
//! - Unset or blank variables fall back to their defaults.

use articles_feed_core::{default_log_level, Namespace, PoolConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "articles_feed.sqlite3";
const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Startup configuration failure, always tied to one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(variable: &'static str, message: impl Into<String>) -> Self {
        Self {
            variable,
            message: message.into(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.variable, self.message)
    }
}

impl Error for ConfigError {}

/// Database location and pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub namespace: Namespace,
    pub pool: PoolConfig,
}

/// Listener and request handling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub addr: SocketAddr,
    pub request_timeout: Duration,
    /// Upper bound applied to `pageSize`; `None` leaves it uncapped.
    pub max_page_size: Option<i64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_page_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its raw value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = PoolConfig::default();

        let namespace = match get("FEED_DB_NAMESPACE") {
            Some(raw) => Namespace::new(&raw)
                .map_err(|err| ConfigError::new("FEED_DB_NAMESPACE", err.to_string()))?,
            None => Namespace::main(),
        };

        let max_size = parse_or("DB_MAX_CONNS", get("DB_MAX_CONNS"), defaults.max_size)?;
        if max_size == 0 {
            return Err(ConfigError::new("DB_MAX_CONNS", "must be at least 1"));
        }
        let min_idle = parse_or("DB_MIN_CONNS", get("DB_MIN_CONNS"), defaults.min_idle)?;
        if min_idle > max_size {
            return Err(ConfigError::new(
                "DB_MIN_CONNS",
                format!("must not exceed DB_MAX_CONNS ({max_size})"),
            ));
        }

        let pool = PoolConfig {
            max_size,
            min_idle,
            max_lifetime: duration_or(
                "DB_MAX_CONN_LIFETIME",
                get("DB_MAX_CONN_LIFETIME"),
                defaults.max_lifetime,
            )?,
            idle_timeout: duration_or(
                "DB_MAX_CONN_IDLE_TIME",
                get("DB_MAX_CONN_IDLE_TIME"),
                defaults.idle_timeout,
            )?,
            connection_timeout: required_duration(
                "DB_CONNECT_TIMEOUT",
                get("DB_CONNECT_TIMEOUT"),
                defaults.connection_timeout,
            )?,
            health_check_period: required_duration(
                "DB_HEALTHCHECK_PERIOD",
                get("DB_HEALTHCHECK_PERIOD"),
                defaults.health_check_period,
            )?,
        };

        let addr_raw = get("HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::new("HTTP_ADDR", format!("`{addr_raw}`: {err}")))?;

        let max_page_size = match get("HTTP_MAX_PAGE_SIZE") {
            Some(raw) => {
                let cap: i64 = parse_value("HTTP_MAX_PAGE_SIZE", &raw)?;
                if cap <= 0 {
                    return Err(ConfigError::new("HTTP_MAX_PAGE_SIZE", "must be positive"));
                }
                Some(cap)
            }
            None => None,
        };

        Ok(Self {
            database: DatabaseConfig {
                path: PathBuf::from(get("FEED_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into())),
                namespace,
                pool,
            },
            http: HttpConfig {
                addr,
                request_timeout: required_duration(
                    "HTTP_REQUEST_TIMEOUT",
                    get("HTTP_REQUEST_TIMEOUT"),
                    DEFAULT_REQUEST_TIMEOUT,
                )?,
                max_page_size,
            },
            log: LogConfig {
                level: get("FEED_LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string()),
                dir: get("FEED_LOG_DIR"),
            },
        })
    }
}

/// Parses `120ms`, `30s`, `5m` or `1h`.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("`{raw}` has no unit; expected ms|s|m|h"))?;
    let (digits, unit) = raw.split_at(split);
    if digits.is_empty() {
        return Err(format!("`{raw}` has no amount"));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("`{raw}` amount is out of range"))?;

    let seconds_per_unit = match unit {
        "ms" => return Ok(Duration::from_millis(amount)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => return Err(format!("unknown unit `{other}`; expected ms|s|m|h")),
    };
    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("`{raw}` is out of range"))
}

fn parse_value<T>(variable: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|err| ConfigError::new(variable, format!("`{raw}`: {err}")))
}

fn parse_or<T>(variable: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    match raw {
        Some(raw) => parse_value(variable, &raw),
        None => Ok(default),
    }
}

fn required_duration(
    variable: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match raw {
        Some(raw) => parse_duration(&raw).map_err(|message| ConfigError::new(variable, message)),
        None => Ok(default),
    }
}

/// Zero disables the limit.
fn duration_or(
    variable: &'static str,
    raw: Option<String>,
    default: Option<Duration>,
) -> Result<Option<Duration>, ConfigError> {
    match raw {
        Some(raw) => {
            let value =
                parse_duration(&raw).map_err(|message| ConfigError::new(variable, message))?;
            Ok((!value.is_zero()).then_some(value))
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_duration, ServerConfig};
    use articles_feed_core::Namespace;
    use std::collections::HashMap;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, super::ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database.path.to_str(), Some("articles_feed.sqlite3"));
        assert_eq!(config.database.namespace, Namespace::main());
        assert_eq!(config.database.pool.max_size, 10);
        assert_eq!(config.database.pool.min_idle, 2);
        assert_eq!(
            config.database.pool.max_lifetime,
            Some(Duration::from_secs(3600))
        );
        assert_eq!(
            config.database.pool.idle_timeout,
            Some(Duration::from_secs(1800))
        );
        assert_eq!(config.database.pool.health_check_period, Duration::from_secs(60));
        assert_eq!(config.http.addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.http.request_timeout, Duration::from_secs(30));
        assert_eq!(config.http.max_page_size, None);
        assert_eq!(config.log.dir, None);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("FEED_DB_PATH", "/tmp/feed.db"),
            ("FEED_DB_NAMESPACE", "feed"),
            ("DB_MAX_CONNS", "4"),
            ("DB_MIN_CONNS", "0"),
            ("DB_MAX_CONN_IDLE_TIME", "0s"),
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("HTTP_REQUEST_TIMEOUT", "1500ms"),
            ("HTTP_MAX_PAGE_SIZE", "100"),
            ("FEED_LOG_LEVEL", "warn"),
            ("FEED_LOG_DIR", "/var/log/feed"),
        ])
        .unwrap();

        assert_eq!(config.database.path.to_str(), Some("/tmp/feed.db"));
        assert_eq!(config.database.namespace.as_str(), "feed");
        assert_eq!(config.database.pool.max_size, 4);
        assert_eq!(config.database.pool.min_idle, 0);
        assert_eq!(config.database.pool.idle_timeout, None);
        assert_eq!(config.http.addr.port(), 9000);
        assert_eq!(config.http.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.http.max_page_size, Some(100));
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.dir.as_deref(), Some("/var/log/feed"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("DB_MAX_CONNS", "  "), ("FEED_DB_NAMESPACE", "")]).unwrap();
        assert_eq!(config.database.pool.max_size, 10);
        assert_eq!(config.database.namespace, Namespace::main());
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let cases = [
            ("DB_MAX_CONNS", "many"),
            ("DB_MAX_CONNS", "0"),
            ("DB_MAX_CONN_LIFETIME", "1d"),
            ("HTTP_ADDR", "localhost"),
            ("HTTP_MAX_PAGE_SIZE", "-1"),
            ("FEED_DB_NAMESPACE", "feed; DROP"),
            ("FEED_DB_NAMESPACE", "temp"),
        ];
        for (variable, value) in cases {
            let err = config_from(&[(variable, value)]).unwrap_err();
            assert_eq!(err.variable, variable, "value `{value}`");
        }
    }

    #[test]
    fn min_conns_cannot_exceed_max_conns() {
        let err = config_from(&[("DB_MAX_CONNS", "2"), ("DB_MIN_CONNS", "3")]).unwrap_err();
        assert_eq!(err.variable, "DB_MIN_CONNS");
    }

    #[test]
    fn durations_accept_supported_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("30m"), Ok(Duration::from_secs(1800)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("1.5h").is_err());
    }
}
