#![forbid(unsafe_code)]

//! Store configuration.
//!
//! [`StoreConfig`] carries the two tunables of the history: how many undo
//! steps are kept and how long text input must be quiet before a burst of
//! keystrokes becomes one step.
//!
//! # Sources
//!
//! | Source | API |
//! |--------|-----|
//! | Defaults | [`StoreConfig::default`] |
//! | Environment | [`StoreConfig::from_env`] |
//! | TOML / JSON (feature `config-files`) | [`StoreConfig::from_toml_str`], [`StoreConfig::from_json_str`], ... |
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use storyboard_runtime::config::StoreConfig;
//!
//! let config = StoreConfig::default()
//!     .with_history_limit(20)
//!     .with_text_debounce(Duration::from_millis(300));
//! assert!(config.is_valid());
//! ```

#[cfg(feature = "config-files")]
use std::path::Path;
use std::time::Duration;

use crate::undo::{DEFAULT_MAX_DEPTH, DEFAULT_TEXT_DEBOUNCE};

/// Environment variable overriding [`StoreConfig::history_limit`].
pub const ENV_HISTORY_LIMIT: &str = "STORYBOARD_HISTORY_LIMIT";
/// Environment variable overriding [`StoreConfig::text_debounce`] (milliseconds).
pub const ENV_TEXT_DEBOUNCE_MS: &str = "STORYBOARD_TEXT_DEBOUNCE_MS";

/// Minimum history limit.
pub const MIN_HISTORY_LIMIT: usize = 1;
/// Maximum history limit.
pub const MAX_HISTORY_LIMIT: usize = 1000;
/// Minimum text debounce in milliseconds.
pub const MIN_TEXT_DEBOUNCE_MS: u64 = 50;
/// Maximum text debounce in milliseconds.
pub const MAX_TEXT_DEBOUNCE_MS: u64 = 5000;

/// Configuration for a [`DocumentStore`](crate::DocumentStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of undo steps (and redo steps) retained.
    pub history_limit: usize,
    /// Quiet period after the last keystroke before a text burst settles.
    pub text_debounce: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_MAX_DEPTH,
            text_debounce: DEFAULT_TEXT_DEBOUNCE,
        }
    }
}

impl StoreConfig {
    /// Set the history limit.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the text debounce window.
    #[must_use]
    pub fn with_text_debounce(mut self, window: Duration) -> Self {
        self.text_debounce = window;
        self
    }

    /// Load config from environment variables.
    ///
    /// Reads:
    /// - `STORYBOARD_HISTORY_LIMIT`: number of undo steps
    /// - `STORYBOARD_TEXT_DEBOUNCE_MS`: text debounce in milliseconds
    ///
    /// Unparseable values are ignored. Values are clamped to valid ranges.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var(ENV_HISTORY_LIMIT)
            && let Ok(limit) = val.trim().parse::<usize>()
        {
            config.history_limit = limit;
        }

        if let Ok(val) = std::env::var(ENV_TEXT_DEBOUNCE_MS)
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            config.text_debounce = Duration::from_millis(ms);
        }

        config.validated()
    }

    /// Clamp values to safe ranges.
    ///
    /// - `history_limit` clamped to 1-1000
    /// - `text_debounce` clamped to 50-5000ms
    ///
    /// # Example
    ///
    /// ```
    /// use storyboard_runtime::config::StoreConfig;
    ///
    /// let config = StoreConfig::default().with_history_limit(0).validated();
    /// assert_eq!(config.history_limit, 1);
    /// ```
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.history_limit = self
            .history_limit
            .clamp(MIN_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
        let ms = u64::try_from(self.text_debounce.as_millis()).unwrap_or(u64::MAX);
        self.text_debounce =
            Duration::from_millis(ms.clamp(MIN_TEXT_DEBOUNCE_MS, MAX_TEXT_DEBOUNCE_MS));
        self
    }

    /// Describe every out-of-range value. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(MIN_HISTORY_LIMIT..=MAX_HISTORY_LIMIT).contains(&self.history_limit) {
            errors.push(format!(
                "history_limit must be in {MIN_HISTORY_LIMIT}..={MAX_HISTORY_LIMIT}, got {}",
                self.history_limit
            ));
        }
        let ms = self.text_debounce.as_millis();
        if !(u128::from(MIN_TEXT_DEBOUNCE_MS)..=u128::from(MAX_TEXT_DEBOUNCE_MS)).contains(&ms) {
            errors.push(format!(
                "text_debounce_ms must be in {MIN_TEXT_DEBOUNCE_MS}..={MAX_TEXT_DEBOUNCE_MS}, got {ms}"
            ));
        }
        errors
    }

    /// Check if values are within valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

/// On-disk shape. Missing keys fall back to defaults.
#[cfg(feature = "config-files")]
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawStoreConfig {
    history_limit: Option<usize>,
    text_debounce_ms: Option<u64>,
}

#[cfg(feature = "config-files")]
impl RawStoreConfig {
    fn resolve(self) -> Result<StoreConfig, ConfigError> {
        let mut config = StoreConfig::default();
        if let Some(limit) = self.history_limit {
            config.history_limit = limit;
        }
        if let Some(ms) = self.text_debounce_ms {
            config.text_debounce = Duration::from_millis(ms);
        }
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(feature = "config-files")]
impl StoreConfig {
    /// Load from a TOML string.
    ///
    /// ```toml
    /// history_limit = 50
    /// text_debounce_ms = 500
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<RawStoreConfig>(s)
            .map_err(ConfigError::Toml)?
            .resolve()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<RawStoreConfig>(s)
            .map_err(ConfigError::Json)?
            .resolve()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }
}

/// Errors from loading a [`StoreConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-files")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-files")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-files")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-files")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-files")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-files")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_history_contract() {
        let config = StoreConfig::default();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.text_debounce, Duration::from_millis(500));
        assert!(config.is_valid());
    }

    #[test]
    fn validated_clamps_both_fields() {
        let config = StoreConfig::default()
            .with_history_limit(10_000)
            .with_text_debounce(Duration::from_millis(1))
            .validated();
        assert_eq!(config.history_limit, MAX_HISTORY_LIMIT);
        assert_eq!(config.text_debounce, Duration::from_millis(MIN_TEXT_DEBOUNCE_MS));
        assert!(config.is_valid());
    }

    #[test]
    fn validate_reports_each_field() {
        let config = StoreConfig::default()
            .with_history_limit(0)
            .with_text_debounce(Duration::from_secs(60));
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("history_limit")));
        assert!(errors.iter().any(|e| e.contains("text_debounce_ms")));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn toml_partial_uses_defaults() {
        let config = StoreConfig::from_toml_str("history_limit = 20\n").unwrap();
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.text_debounce, Duration::from_millis(500));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn json_full() {
        let config =
            StoreConfig::from_json_str(r#"{"history_limit": 5, "text_debounce_ms": 250}"#)
                .unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.text_debounce, Duration::from_millis(250));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn out_of_range_file_values_are_rejected() {
        let err = StoreConfig::from_toml_str("history_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("history_limit"));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = StoreConfig::from_toml_str("undo_depth = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        let err = StoreConfig::from_json_str("{\"bogus\": 1}").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn missing_file_is_io_error() {
        let err = StoreConfig::from_toml_file("/nonexistent/storyboard.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
