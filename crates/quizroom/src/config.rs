//! Server configuration, read from the environment.
//!
//! `config.env` and `.env` are loaded first if present, so a local
//! deployment can keep its provider credentials next to the binary.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use quizroom_room::RoomConfig;

/// Configuration problems found at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Where quizzes come from.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Request URL with `<area>` and `<level>` placeholders.
    pub url_template: String,
    /// Sent as `x-rapidapi-host` when set.
    pub host: Option<String>,
    /// Sent as `x-rapidapi-key` when set.
    pub key: Option<String>,
    /// Upper bound on one provider request.
    pub timeout: Duration,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url_template", &self.url_template)
            .field("host", &self.host)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Everything the server binary needs to start.
#[derive(Clone)]
pub struct ServerConfig {
    /// WebSocket listener for room traffic.
    pub ws_addr: SocketAddr,
    /// HTTP API listener.
    pub http_addr: SocketAddr,
    pub provider: ProviderConfig,
    /// Secret that authorizes clearing every room. `None` disables it.
    pub admin_secret: Option<String>,
    /// Pre-round countdown added to each time limit.
    pub countdown: Duration,
    /// Silent WebSocket connections are closed after this long.
    pub idle_timeout: Duration,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("ws_addr", &self.ws_addr)
            .field("http_addr", &self.http_addr)
            .field("provider", &self.provider)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "<redacted>"))
            .field("countdown", &self.countdown)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl ServerConfig {
    /// Loads dotenv files, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::from_filename("config.env").ok();
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let ws_addr = parse_or(&get, "QUIZROOM_WS_ADDR", || {
            SocketAddr::from(([0, 0, 0, 0], 3031))
        })?;
        let port: u16 = parse_or(&get, "PORT", || 3030)?;

        let url_template = get("API_URL").ok_or(ConfigError::Missing("API_URL"))?;

        Ok(Self {
            ws_addr,
            http_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            provider: ProviderConfig {
                url_template,
                host: get("X_RAPIDAPI_HOST"),
                key: get("X_RAPIDAPI_KEY"),
                timeout: Duration::from_secs(parse_or(&get, "QUIZROOM_FETCH_TIMEOUT_SECS", || 10)?),
            },
            admin_secret: get("QUIZROOM_ADMIN_SECRET"),
            countdown: Duration::from_secs(parse_or(&get, "QUIZROOM_COUNTDOWN_SECS", || 4)?),
            idle_timeout: Duration::from_secs(parse_or(&get, "QUIZROOM_IDLE_TIMEOUT_SECS", || 300)?),
        })
    }

    /// Room settings derived from this configuration.
    pub fn room_config(&self) -> RoomConfig {
        RoomConfig {
            countdown: self.countdown,
            ..RoomConfig::default()
        }
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match get(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default()),
    }
}
