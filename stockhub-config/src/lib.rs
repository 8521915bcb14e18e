use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

/// Pre-compiled regex for hostname validation (compiled once at first use)
static HOSTNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][-a-zA-Z0-9\.]*[a-zA-Z0-9]$").unwrap());

/// Phone numbers are digits with an optional leading `+`.
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{4,15}$").unwrap());

pub const DEFAULT_PORT: u16 = 1245;
pub const DEFAULT_INITIAL_SEATS: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub logging: Option<LoggingSection>,
    #[serde(default)]
    pub redis: Option<RedisSection>,
    #[serde(default)]
    pub queue: Option<QueueSection>,
    #[serde(default)]
    pub seats: Option<SeatsSection>,
    #[serde(default)]
    pub products: Option<Vec<ProductSection>>,
    #[serde(default)]
    pub notifications: Option<NotificationsSection>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub json: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct RedisSection {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueueSection {
    #[serde(default)]
    pub seat_concurrency: Option<usize>,
    #[serde(default)]
    pub product_concurrency: Option<usize>,
    #[serde(default)]
    pub event_capacity: Option<usize>,
    #[serde(default)]
    pub max_job_runs: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SeatsSection {
    #[serde(default)]
    pub initial: Option<i64>,
}

/// One catalog entry. Every field is required.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProductSection {
    pub item_id: u32,
    pub item_name: String,
    pub price: f64,
    pub initial_available_quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct NotificationsSection {
    #[serde(default)]
    pub blacklist: Option<Vec<String>>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a RawConfigFile from a path. The format is inferred from the extension: .toml, .yaml/.yml, .json
pub fn load_raw_from_file<P: AsRef<Path>>(path: P) -> Result<RawConfigFile, ConfigError> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    parse_config_str(&s, ext.as_deref())
}

/// Parse configuration from a string with optional format hint
#[inline]
fn parse_config_str(s: &str, ext: Option<&str>) -> Result<RawConfigFile, ConfigError> {
    match ext {
        #[cfg(feature = "toml")]
        Some("toml") => toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => {
            serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        #[cfg(feature = "json")]
        Some("json") => serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => parse_config_auto(s),
    }
}

/// Try each enabled format in turn
#[inline]
fn parse_config_auto(s: &str) -> Result<RawConfigFile, ConfigError> {
    #[cfg(feature = "json")]
    if let Ok(cfg) = serde_json::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "toml")]
    if let Ok(cfg) = toml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "yaml")]
    if let Ok(cfg) = serde_yaml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(any(feature = "yaml", feature = "toml", feature = "json"))]
    {
        Err(ConfigError::Parse(
            "failed to parse config as any supported format".into(),
        ))
    }

    #[cfg(not(any(feature = "yaml", feature = "toml", feature = "json")))]
    {
        let _ = s;
        Err(ConfigError::Parse("no config format enabled".into()))
    }
}

/// Concrete application configuration with defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub redis_url: Option<String>,
    pub queue: QueueConfig,
    pub seats: SeatsConfig,
    /// Empty means the built-in catalog.
    pub products: Vec<ProductSection>,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueConfig {
    pub seat_concurrency: usize,
    pub product_concurrency: usize,
    pub event_capacity: usize,
    pub max_job_runs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatsConfig {
    pub initial: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationsConfig {
    /// Empty means the built-in blacklist.
    pub blacklist: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            redis_url: None,
            queue: QueueConfig {
                seat_concurrency: 1,
                product_concurrency: 1,
                event_capacity: 1024,
                max_job_runs: 1000,
            },
            seats: SeatsConfig {
                initial: DEFAULT_INITIAL_SEATS,
            },
            products: Vec::new(),
            notifications: NotificationsConfig {
                blacklist: Vec::new(),
            },
        }
    }
}

#[inline]
fn parse_bool(s: &str) -> Result<bool, ()> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        _ => Err(()),
    }
}

#[inline]
fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Helper macro to apply optional value if present
macro_rules! apply_opt {
    ($target:expr, $source:expr) => {
        if let Some(v) = $source {
            $target = v;
        }
    };
    ($target:expr, $source:expr, wrap) => {
        if let Some(v) = $source {
            $target = Some(v);
        }
    };
}

/// Load concrete `Config` from optional file and environment variables.
/// Environment variables take precedence over file values and defaults.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = path {
        apply_raw(&mut cfg, load_raw_from_file(p)?);
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw(cfg: &mut Config, raw: RawConfigFile) {
    if let Some(server) = raw.server {
        apply_opt!(cfg.server.host, server.host);
        apply_opt!(cfg.server.port, server.port);
    }
    if let Some(logging) = raw.logging {
        apply_opt!(cfg.logging.level, logging.level);
        apply_opt!(cfg.logging.json, logging.json);
    }
    if let Some(redis) = raw.redis {
        apply_opt!(cfg.redis_url, redis.url, wrap);
    }
    if let Some(queue) = raw.queue {
        apply_opt!(cfg.queue.seat_concurrency, queue.seat_concurrency);
        apply_opt!(cfg.queue.product_concurrency, queue.product_concurrency);
        apply_opt!(cfg.queue.event_capacity, queue.event_capacity);
        apply_opt!(cfg.queue.max_job_runs, queue.max_job_runs);
    }
    if let Some(seats) = raw.seats {
        apply_opt!(cfg.seats.initial, seats.initial);
    }
    apply_opt!(cfg.products, raw.products);
    if let Some(notifications) = raw.notifications {
        apply_opt!(cfg.notifications.blacklist, notifications.blacklist);
    }
}

/// Helper to parse env var as a specific type
#[inline]
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("invalid {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Helper to parse env var as bool
#[inline]
fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(v) => parse_bool(&v)
            .map(Some)
            .map_err(|_| ConfigError::Parse(format!("invalid {}", key))),
        Err(_) => Ok(None),
    }
}

#[inline]
fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Apply all environment variable overrides to config
fn apply_env_overrides(cfg: &mut Config) -> Result<(), ConfigError> {
    // Server
    if let Some(v) = env_str("STOCKHUB_SERVER_HOST") {
        cfg.server.host = v;
    }
    if let Some(v) = env_parse::<u16>("STOCKHUB_SERVER_PORT")? {
        cfg.server.port = v;
    }

    // Logging
    if let Some(v) = env_str("STOCKHUB_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = env_bool("STOCKHUB_LOG_JSON")? {
        cfg.logging.json = v;
    }

    // Redis
    if let Some(v) = env_str("STOCKHUB_REDIS_URL") {
        cfg.redis_url = Some(v);
    }

    // Queue
    if let Some(v) = env_parse::<usize>("STOCKHUB_SEAT_CONCURRENCY")? {
        cfg.queue.seat_concurrency = v;
    }
    if let Some(v) = env_parse::<usize>("STOCKHUB_PRODUCT_CONCURRENCY")? {
        cfg.queue.product_concurrency = v;
    }
    if let Some(v) = env_parse::<usize>("STOCKHUB_EVENT_CAPACITY")? {
        cfg.queue.event_capacity = v;
    }
    if let Some(v) = env_parse::<usize>("STOCKHUB_MAX_JOB_RUNS")? {
        cfg.queue.max_job_runs = v;
    }

    // Seats
    if let Some(v) = env_parse::<i64>("STOCKHUB_SEATS_INITIAL")? {
        cfg.seats.initial = v;
    }

    // Notifications
    if let Some(v) = env_str("STOCKHUB_NOTIFICATION_BLACKLIST") {
        cfg.notifications.blacklist = split_csv(&v);
    }

    Ok(())
}

/// Validate higher-level constraints on the resolved configuration.
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.port == 0 {
        return Err(ConfigError::Validation("server.port must be > 0".into()));
    }
    let host_ok = cfg.server.host.parse::<std::net::IpAddr>().is_ok()
        || HOSTNAME_REGEX.is_match(&cfg.server.host);
    if !host_ok {
        return Err(ConfigError::Validation(format!(
            "invalid server.host: {}",
            cfg.server.host
        )));
    }

    if let Some(redis_url) = &cfg.redis_url {
        match url::Url::parse(redis_url) {
            Ok(u) if matches!(u.scheme(), "redis" | "rediss" | "redis+unix" | "unix") => {}
            Ok(u) => {
                return Err(ConfigError::Validation(format!(
                    "unsupported redis url scheme: {}",
                    u.scheme()
                )))
            }
            Err(_) => {
                return Err(ConfigError::Validation(format!(
                    "invalid redis url: {}",
                    redis_url
                )))
            }
        }
    }

    if cfg.queue.seat_concurrency == 0 || cfg.queue.product_concurrency == 0 {
        return Err(ConfigError::Validation(
            "queue concurrency must be at least 1".into(),
        ));
    }
    if cfg.queue.event_capacity == 0 {
        return Err(ConfigError::Validation(
            "queue.event_capacity must be > 0".into(),
        ));
    }

    if cfg.seats.initial < 0 {
        return Err(ConfigError::Validation(
            "seats.initial must not be negative".into(),
        ));
    }

    let mut ids = HashSet::with_capacity(cfg.products.len());
    for product in &cfg.products {
        if product.item_id == 0 {
            return Err(ConfigError::Validation(format!(
                "product {} must have a positive item_id",
                product.item_name
            )));
        }
        if !ids.insert(product.item_id) {
            return Err(ConfigError::Validation(format!(
                "duplicate product item_id: {}",
                product.item_id
            )));
        }
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(ConfigError::Validation(format!(
                "invalid price for product {}",
                product.item_id
            )));
        }
    }

    if let Some(bad) = cfg
        .notifications
        .blacklist
        .iter()
        .find(|n| !PHONE_REGEX.is_match(n))
    {
        return Err(ConfigError::Validation(format!(
            "invalid blacklisted phone number: {}",
            bad
        )));
    }

    Ok(())
}
