use std::env;
use std::time::Duration;

use url::Url;

/// Default HipChat v2 API root
pub const DEFAULT_HIPCHAT_API_ROOT: &str = "https://api.hipchat.com/v2/";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub hipchat: HipChatConfig,
    pub twilio: TwilioConfig,
    /// Room targeted by the deprecated `/bttn` endpoint
    pub legacy_room: String,
}

/// HipChat API configuration
#[derive(Debug, Clone)]
pub struct HipChatConfig {
    /// Bearer token used when a caller does not pass one explicitly
    pub api_token: Option<String>,
    /// API root, always hierarchical (e.g. `https://api.hipchat.com/v2/`)
    pub api_root: Url,
    /// Upper bound for a single outbound request
    pub timeout: Duration,
}

/// Twilio credentials for the SMS channel
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            hipchat: HipChatConfig::from_env()?,
            twilio: TwilioConfig::from_env(),
            legacy_room: non_empty_var("BTTN_LEGACY_ROOM").unwrap_or_else(|| "bttn".to_string()),
        })
    }
}

impl HipChatConfig {
    /// Load HipChat configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_root = non_empty_var("HIPCHAT_API_ROOT")
            .unwrap_or_else(|| DEFAULT_HIPCHAT_API_ROOT.to_string());

        Ok(Self {
            api_token: non_empty_var("HIPCHAT_API_TOKEN"),
            api_root: parse_api_root(&api_root)?,
            timeout: Duration::from_secs(
                env::var("HIPCHAT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            ),
        })
    }
}

impl Default for HipChatConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_root: Url::parse(DEFAULT_HIPCHAT_API_ROOT).expect("default API root is valid"),
            timeout: Duration::from_secs(10),
        }
    }
}

impl TwilioConfig {
    /// Load Twilio credentials from environment variables
    pub fn from_env() -> Self {
        Self {
            account_sid: non_empty_var("TWILIO_ACCOUNT_SID"),
            auth_token: non_empty_var("TWILIO_AUTH_TOKEN"),
        }
    }
}

/// Parses an API root, rejecting URLs that cannot carry path segments
pub fn parse_api_root(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidApiRoot(raw.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiRoot(raw.to_string()));
    }

    Ok(url)
}

/// Empty values are treated the same as unset ones
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidApiRoot(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::InvalidApiRoot(raw) => {
                write!(f, "HIPCHAT_API_ROOT must be an http(s) URL, got '{}'", raw)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
