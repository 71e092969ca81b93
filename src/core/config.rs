//! Layered configuration: defaults, optional TOML file, then environment.
//!
//! Credentials normally arrive through the environment (or a `.env` file that
//! the binary loads before calling [`Config::load`]). They are checked once by
//! [`Config::validate`]; a missing credential is fatal and the poll loop never
//! starts.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{HsbError, Result};

pub const ENV_SOURCE_TOKEN: &str = "PRACTICUM_TOKEN";
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_CONFIG_PATH: &str = "HSB_CONFIG";
pub const ENV_POLL_INTERVAL: &str = "HSB_POLL_INTERVAL_SECS";
pub const ENV_JOURNAL_PATH: &str = "HSB_JOURNAL";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

const MASK: &str = "***";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub telegram: TelegramConfig,
    pub poll: PollConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_TELEGRAM_API.to_string(),
            token: None,
            chat_id: None,
        }
    }
}

/// What an empty `homeworks` list means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBatchPolicy {
    /// Treat an empty list as a malformed response.
    #[default]
    Reject,
    /// Treat an empty list as "nothing changed since the cursor".
    Accept,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
    pub empty_batch: EmptyBatchPolicy,
    pub unwrap_singleton: bool,
    pub notify_new_entries: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_cursor: Option<i64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            empty_batch: EmptyBatchPolicy::Reject,
            unwrap_singleton: true,
            notify_new_entries: true,
            initial_cursor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            journal_path: None,
        }
    }
}

/// The three values without which the bot cannot run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub source_token: String,
    pub telegram_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("source_token", &MASK)
            .field("telegram_token", &MASK)
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// The TOML file is `explicit_path` if given, else `$HSB_CONFIG` if set.
    /// A file named either way must exist.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with an injectable environment lookup.
    pub fn load_with<F>(explicit_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| env(ENV_CONFIG_PATH).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(env)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| HsbError::ConfigParse {
            context: "config file",
            details: format!("{}: {err}", path.display()),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Environment values win over anything read from the file.
    pub fn apply_env_overrides<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = non_empty(env(ENV_SOURCE_TOKEN)) {
            self.source.token = Some(token);
        }
        if let Some(token) = non_empty(env(ENV_TELEGRAM_TOKEN)) {
            self.telegram.token = Some(token);
        }
        if let Some(chat_id) = non_empty(env(ENV_CHAT_ID)) {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(raw) = non_empty(env(ENV_POLL_INTERVAL)) {
            self.poll.interval_secs = raw.parse().map_err(|_| HsbError::Configuration {
                details: format!("{ENV_POLL_INTERVAL} must be a whole number of seconds, got `{raw}`"),
            })?;
        }
        if let Some(path) = non_empty(env(ENV_JOURNAL_PATH)) {
            self.logging.journal_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Check startup preconditions and extract the credentials.
    ///
    /// Every missing variable is logged and named in the error, not just the
    /// first one.
    pub fn validate(&self) -> Result<Credentials> {
        let required = [
            (ENV_SOURCE_TOKEN, &self.source.token),
            (ENV_TELEGRAM_TOKEN, &self.telegram.token),
            (ENV_CHAT_ID, &self.telegram.chat_id),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();
        for name in &missing {
            tracing::error!(variable = %name, "required variable is not defined");
        }
        if !missing.is_empty() {
            return Err(HsbError::Configuration {
                details: format!("missing required variables: {}", missing.join(", ")),
            });
        }

        if self.poll.interval_secs == 0 {
            return Err(HsbError::Configuration {
                details: "poll.interval_secs must be greater than zero".to_string(),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(HsbError::Configuration {
                details: "http.timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.source.endpoint.trim().is_empty() {
            return Err(HsbError::Configuration {
                details: "source.endpoint must not be empty".to_string(),
            });
        }

        Ok(Credentials {
            source_token: self.source.token.clone().unwrap_or_default(),
            telegram_token: self.telegram.token.clone().unwrap_or_default(),
            chat_id: self.telegram.chat_id.clone().unwrap_or_default(),
        })
    }

    /// Effective configuration as TOML, tokens replaced by a mask.
    pub fn to_masked_toml(&self) -> Result<String> {
        let mut masked = self.clone();
        if masked.source.token.is_some() {
            masked.source.token = Some(MASK.to_string());
        }
        if masked.telegram.token.is_some() {
            masked.telegram.token = Some(MASK.to_string());
        }
        Ok(toml::to_string_pretty(&masked)?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
