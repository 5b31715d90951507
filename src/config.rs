use serde::{Deserialize, Serialize};

use crate::error::{PostflowError, Result};

/// UI language, used to pick localized copy (canned demo fallback,
/// demo topic templates, plan display names).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    /// Wire value sent to the backend (`language` field on generate requests).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
        }
    }

    /// Parse from a lowercase language tag; anything unknown falls back to English.
    #[must_use]
    pub fn parse_or_default(tag: &str) -> Self {
        match tag {
            "ru" => Self::Ru,
            _ => Self::En,
        }
    }
}

/// Configuration for the Postflow API client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the backend API (e.g. `https://api.postflow.app`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// UI language for localized copy selection.
    #[serde(default)]
    pub language: Language,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            language: Language::default(),
        }
    }
}

impl ClientConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `POSTFLOW_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// Recognized variables: `POSTFLOW_API_URL`, `POSTFLOW_TIMEOUT_SECONDS`,
    /// `POSTFLOW_LANGUAGE`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("POSTFLOW_API_URL") {
            config.base_url = url;
        }
        if let Ok(timeout) = std::env::var("POSTFLOW_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse() {
                config.timeout_seconds = seconds;
            }
        }
        if let Ok(lang) = std::env::var("POSTFLOW_LANGUAGE") {
            config.language = Language::parse_or_default(&lang.to_lowercase());
        }

        config
    }

    /// Set the backend base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the UI language.
    #[must_use]
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Validate the configuration.
    ///
    /// The base URL must parse and use http(s).
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(PostflowError::bad_request(format!(
                "Base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(PostflowError::bad_request(
                "Timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.postflow.app".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}
