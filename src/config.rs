//! Client configuration loaded from environment variables (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::DraftTone;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub home: PathBuf,
    pub draft_tone: DraftTone,
    pub timeout: Duration,
    pub log_format: LogFormat,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid API base URL '{0}': must start with http:// or https://")]
    InvalidApiBase(String),
    #[error("Invalid draft tone '{0}': must be friendly, professional or short")]
    InvalidTone(String),
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = normalize_api_base(
            &lookup("TICKETDESK_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        )?;

        let home = lookup("TICKETDESK_HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                lookup("HOME")
                    .filter(|h| !h.is_empty())
                    .map(|h| PathBuf::from(h).join(".ticketdesk"))
            })
            .unwrap_or_else(|| PathBuf::from(".ticketdesk"));

        let draft_tone = match lookup("TICKETDESK_DRAFT_TONE") {
            Some(tone) => tone
                .parse()
                .map_err(|_| ConfigError::InvalidTone(tone.clone()))?,
            None => DraftTone::default(),
        };

        let timeout = Duration::from_secs(
            lookup("TICKETDESK_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let log_format = match lookup("TICKETDESK_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Config {
            api_base,
            home,
            draft_tone,
            timeout,
            log_format,
        })
    }

    /// Apply a `--api-base` flag on top of the environment.
    pub fn with_api_base(mut self, api_base: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(base) = api_base {
            self.api_base = normalize_api_base(base)?;
        }
        Ok(self)
    }

    pub fn db_path(&self) -> PathBuf {
        self.home.join("ticketdesk.db")
    }
}

pub fn normalize_api_base(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiBase(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("HOME", "/home/agent")])).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.home, PathBuf::from("/home/agent/.ticketdesk"));
        assert_eq!(config.draft_tone, DraftTone::Friendly);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_no_home_falls_back_to_cwd() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path(), PathBuf::from(".ticketdesk/ticketdesk.db"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("TICKETDESK_API_BASE", "https://support.example.com/api/"),
            ("TICKETDESK_HOME", "/tmp/td"),
            ("TICKETDESK_DRAFT_TONE", "short"),
            ("TICKETDESK_TIMEOUT_SECS", "5"),
            ("TICKETDESK_LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "https://support.example.com/api");
        assert_eq!(config.home, PathBuf::from("/tmp/td"));
        assert_eq!(config.draft_tone, DraftTone::Short);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_bad_timeout_uses_default() {
        let config =
            Config::from_lookup(lookup_from(&[("TICKETDESK_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_api_base() {
        let result = Config::from_lookup(lookup_from(&[("TICKETDESK_API_BASE", "localhost:8000")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidApiBase("localhost:8000".to_string())
        );
    }

    #[test]
    fn test_invalid_tone() {
        let result = Config::from_lookup(lookup_from(&[("TICKETDESK_DRAFT_TONE", "angry")]));
        assert!(matches!(result, Err(ConfigError::InvalidTone(_))));
    }

    #[test]
    fn test_flag_overrides_env() {
        let config = Config::from_lookup(lookup_from(&[]))
            .unwrap()
            .with_api_base(Some("http://127.0.0.1:9000/"))
            .unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:9000");
    }
}
