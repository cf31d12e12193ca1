// Application settings
// Loaded from ~/.config/innbot/config.toml (or --config), secrets overridable
// from the environment

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::secrets::{self, KeyLookup};

/// Environment variables checked for the bot token, in order
pub const TOKEN_ENV: &[&str] = &["TOKEN", "INNBOT_TELEGRAM_TOKEN"];

/// Environment variables checked for the lookup API key, in order
pub const LOOKUP_KEY_ENV: &[&str] = &["DADATA_KEY", "INNBOT_DADATA_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },
    #[error("missing {what} (set {env} or add it to the config file)")]
    MissingSecret { what: &'static str, env: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub telegram: TelegramSettings,
    pub lookup: LookupSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub token: Option<String>,
    pub api_base: String,
    /// Long-poll timeout for getUpdates
    pub poll_timeout_secs: u64,
    /// Quiet period after the last part of a media group before it is handled
    pub media_group_settle_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    pub api_key: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Scratch directory for downloads and generated files
    pub work_dir: PathBuf,
    /// Send the merged table before enrichment starts
    pub send_merged: bool,
    pub base_row_height: f64,
    pub line_height: f64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            token: None,
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
            media_group_settle_ms: 1000,
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://suggestions.dadata.ru".to_string(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("temp"),
            send_merged: true,
            base_row_height: 15.0,
            line_height: 15.0,
        }
    }
}

impl Settings {
    /// Default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("innbot")
            .join("config.toml")
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Bot token from the environment or the config file.
    pub fn telegram_token(&self, env: &dyn Fn(&str) -> Option<String>) -> KeyLookup {
        secrets::resolve(self.telegram.token.as_deref(), TOKEN_ENV, env)
    }

    /// Lookup API key from the environment or the config file.
    pub fn lookup_key(&self, env: &dyn Fn(&str) -> Option<String>) -> KeyLookup {
        secrets::resolve(self.lookup.api_key.as_deref(), LOOKUP_KEY_ENV, env)
    }

    pub fn require_telegram_token(&self, env: &dyn Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
        self.telegram_token(env).key.ok_or(ConfigError::MissingSecret {
            what: "bot token",
            env: "TOKEN",
        })
    }

    pub fn require_lookup_key(&self, env: &dyn Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
        self.lookup_key(env).key.ok_or(ConfigError::MissingSecret {
            what: "lookup API key",
            env: "DADATA_KEY",
        })
    }
}

/// Reads the real process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::KeySource;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.telegram.poll_timeout_secs, 30);
        assert_eq!(s.lookup.api_base, "https://suggestions.dadata.ru");
        assert!(s.output.send_merged);
        assert_eq!(s.output.work_dir, PathBuf::from("temp"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let s = Settings::from_toml_str(
            r#"
            [lookup]
            api_key = "abc"

            [output]
            send_merged = false
            line_height = 12.5
            "#,
        )
        .unwrap();

        assert_eq!(s.lookup.api_key.as_deref(), Some("abc"));
        assert_eq!(s.lookup.api_base, "https://suggestions.dadata.ru");
        assert!(!s.output.send_merged);
        assert_eq!(s.output.line_height, 12.5);
        assert_eq!(s.output.base_row_height, 15.0);
        assert_eq!(s.telegram, TelegramSettings::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Settings::from_toml_str("[output]\nsend_merged = \"yes\"").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[telegram]\ntoken = \"123:abc\"\nmedia_group_settle_ms = 250\n").unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.telegram.media_group_settle_ms, 250);

        let token = s.telegram_token(&no_env);
        assert_eq!(token.key.as_deref(), Some("123:abc"));
        assert_eq!(token.source, KeySource::File);
    }

    #[test]
    fn test_load_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[telegram\n").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_require_lookup_key() {
        let s = Settings::default();
        let err = s.require_lookup_key(&no_env).unwrap_err();
        assert!(err.to_string().contains("DADATA_KEY"));

        let env = |name: &str| (name == "DADATA_KEY").then(|| "k".to_string());
        assert_eq!(s.require_lookup_key(&env).unwrap(), "k");
    }

    #[test]
    fn test_config_path() {
        let path = Settings::config_path();
        assert!(path.ends_with("innbot/config.toml"));
    }
}
