//! Configuration types for FactLens.
//!
//! Settings are read from `factlens.json` in the working directory (or an
//! explicit path). Every field has a default, so a missing file is valid.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FactlensError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "factlens.json";

/// Environment variable that overrides `apiBaseUrl`.
pub const API_URL_ENV: &str = "FACTLENS_API_URL";

/// Default base URL of the analysis service.
fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

/// Default port for the session server.
const fn default_port() -> u16 {
    3000
}

/// Default per-subscriber buffer for the notification channel.
const fn default_notification_capacity() -> usize {
    100
}

/// Main configuration for FactLens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the analysis service, without a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Optional timeout for a single analysis request, in seconds.
    ///
    /// When unset, a hung request stays pending until it settles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Optional path to a JSON question bank replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_file: Option<String>,

    /// Default output format for rendered results.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Session server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: None,
            questions_file: None,
            output_format: OutputFormat::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `factlens.json` in the current directory. If not found,
    /// returns the default configuration. The `FACTLENS_API_URL`
    /// environment variable, when set, overrides `apiBaseUrl`.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            FactlensError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        let mut config = Self::load_from_dir(&current_dir)?;
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a specific directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `FactlensError::ConfigParseError` if the file exists but
    /// contains invalid JSON or invalid enum values, and
    /// `FactlensError::ConfigValidationError` if the values are invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(FactlensError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| FactlensError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces `api_base_url` with the given value when it is non-empty.
    pub fn apply_env_override(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(api_url = %url, "Using analysis service URL from environment");
            self.api_base_url = url;
        }
    }

    /// Returns the request timeout, if one is configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Validates the configuration values.
    ///
    /// - `apiBaseUrl` must be an `http://` or `https://` URL
    /// - `requestTimeoutSecs`, when set, must be greater than 0
    /// - `questionsFile`, when set, must not be empty
    /// - `server.port` must be greater than 0
    /// - `server.notificationCapacity` must be greater than 0
    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FactlensError::config_validation(
                format!("apiBaseUrl must be an http(s) URL, got '{url}'"),
                "Set apiBaseUrl to something like http://localhost:5000/api in your factlens.json",
            ));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(FactlensError::config_validation(
                "requestTimeoutSecs must be greater than 0",
                "Remove requestTimeoutSecs to wait indefinitely, or set it to at least 1 second",
            ));
        }

        if self
            .questions_file
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(FactlensError::config_validation(
                "questionsFile must not be empty",
                "Remove questionsFile to use the built-in questions, or point it at a JSON file",
            ));
        }

        if self.server.port == 0 {
            return Err(FactlensError::config_validation(
                "server.port must be greater than 0",
                "Set server.port to a free TCP port in your factlens.json",
            ));
        }

        if self.server.notification_capacity == 0 {
            return Err(FactlensError::config_validation(
                "server.notificationCapacity must be greater than 0",
                "Set server.notificationCapacity to at least 1 (100 is a good default)",
            ));
        }

        Ok(())
    }
}

/// Session server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// TCP port the session server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Buffer size of the notification broadcast channel.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            notification_capacity: default_notification_capacity(),
        }
    }
}

/// Output format for rendered analysis results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain terminal text (default).
    #[default]
    Text,
    /// Markdown document.
    Markdown,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a string into an `OutputFormat`, case-insensitively.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "markdown" | "md" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_str_case_insensitive(s).ok_or_else(|| {
            format!("invalid output format '{s}': expected one of 'text', 'markdown', 'json'")
        })
    }
}

impl<'de> Deserialize<'de> for OutputFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for OutputFormat {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
