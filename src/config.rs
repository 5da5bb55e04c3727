//! Environment-sourced configuration
//!
//! `.env` is loaded by the binaries before `AppConfig::from_env` runs.
//! Missing credentials are a hard error so the server never starts half-configured.

use crate::error::BotError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_RESULTS: u32 = 5;
/// Upper bound the YouTube Data API accepts for `maxResults`
pub const MAX_RESULTS_LIMIT: u32 = 50;
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_LINE_BASE_URL: &str = "https://api.line.me";

#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_results: u32,
}

impl YouTubeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(required("YOUTUBE_API_KEY")?);

        if let Some(base_url) = optional("YOUTUBE_API_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parsed::<u64>("SEARCH_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(max_results) = parsed::<u32>("SEARCH_MAX_RESULTS")? {
            config.max_results = validate_max_results(max_results)?;
        }

        Ok(config)
    }
}

fn validate_max_results(value: u32) -> Result<u32> {
    if (1..=MAX_RESULTS_LIMIT).contains(&value) {
        Ok(value)
    } else {
        Err(BotError::Configuration(format!(
            "SEARCH_MAX_RESULTS must be between 1 and {}, got {}",
            MAX_RESULTS_LIMIT, value
        )))
    }
}

#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_access_token: String,
    pub channel_secret: String,
    pub base_url: String,
}

impl LineConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            channel_access_token: required("LINE_CHANNEL_ACCESS_TOKEN")?,
            channel_secret: required("LINE_CHANNEL_SECRET")?,
            base_url: optional("LINE_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_LINE_BASE_URL.to_string()),
        })
    }
}

/// Azure OpenAI settings. Loaded and reported at startup; no reply path calls the service.
#[derive(Debug, Clone)]
pub struct ChatCompletionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub model: Option<String>,
}

impl ChatCompletionConfig {
    /// `None` unless endpoint, key and version are all set
    pub fn from_env() -> Option<Self> {
        Some(Self {
            endpoint: optional("AZURE_OPENAI_ENDPOINT")?,
            api_key: optional("AZURE_OPENAI_API_KEY")?,
            api_version: optional("AZURE_OPENAI_API_VERSION")?,
            model: optional("AZURE_OPENAI_MODEL"),
        })
    }
}

/// Bounds on the in-memory session store
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = parsed::<u64>("SESSION_IDLE_TTL_SECS")? {
            if secs == 0 {
                return Err(BotError::Configuration(
                    "SESSION_IDLE_TTL_SECS must be at least 1".to_string(),
                ));
            }
            config.idle_ttl = Duration::from_secs(secs);
        }
        if let Some(max_sessions) = parsed::<usize>("MAX_SESSIONS")? {
            if max_sessions == 0 {
                return Err(BotError::Configuration(
                    "MAX_SESSIONS must be at least 1".to_string(),
                ));
            }
            config.max_sessions = max_sessions;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub youtube: YouTubeConfig,
    pub line: LineConfig,
    pub sessions: SessionConfig,
    pub chat_completion: Option<ChatCompletionConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let port = match parsed::<u16>("PORT")? {
            Some(port) => port,
            None => parsed::<u16>("API_PORT")?.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            port,
            youtube: YouTubeConfig::from_env()?,
            line: LineConfig::from_env()?,
            sessions: SessionConfig::from_env()?,
            chat_completion: ChatCompletionConfig::from_env(),
        })
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| BotError::Configuration(format!("{} is not set", name)))
}

fn parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    optional(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                BotError::Configuration(format!("{} has an invalid value: {}", name, raw))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; the process environment is shared.

    #[test]
    fn test_required_missing() {
        let err = required("SONG_BOT_TEST_SURELY_UNSET").unwrap_err();
        assert!(matches!(err, BotError::Configuration(_)));
        assert!(err.to_string().contains("SONG_BOT_TEST_SURELY_UNSET"));
    }

    #[test]
    fn test_blank_counts_as_missing() {
        env::set_var("SONG_BOT_TEST_BLANK", "   ");
        assert!(optional("SONG_BOT_TEST_BLANK").is_none());
        assert!(required("SONG_BOT_TEST_BLANK").is_err());
    }

    #[test]
    fn test_parsed_values() {
        env::set_var("SONG_BOT_TEST_PORT_OK", "9000");
        env::set_var("SONG_BOT_TEST_PORT_BAD", "nine");

        assert_eq!(parsed::<u16>("SONG_BOT_TEST_PORT_OK").unwrap(), Some(9000));
        assert!(parsed::<u16>("SONG_BOT_TEST_PORT_BAD").is_err());
        assert_eq!(parsed::<u16>("SONG_BOT_TEST_PORT_UNSET").unwrap(), None);
    }

    #[test]
    fn test_youtube_defaults() {
        let config = YouTubeConfig::new("key");
        assert_eq!(config.max_results, 5);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.base_url, DEFAULT_YOUTUBE_BASE_URL);
    }

    #[test]
    fn test_max_results_range() {
        assert_eq!(validate_max_results(1).unwrap(), 1);
        assert_eq!(validate_max_results(50).unwrap(), 50);
        assert!(matches!(
            validate_max_results(0),
            Err(BotError::Configuration(_))
        ));
        assert!(matches!(
            validate_max_results(51),
            Err(BotError::Configuration(_))
        ));
    }

    #[test]
    fn test_out_of_range_max_results_fails_startup() {
        env::set_var("YOUTUBE_API_KEY", "key");
        env::set_var("SEARCH_MAX_RESULTS", "500");

        let err = YouTubeConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("SEARCH_MAX_RESULTS"));

        env::remove_var("SEARCH_MAX_RESULTS");
    }
}
