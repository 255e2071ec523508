//! Server configuration.
//!
//! Settings come from an optional `studyai.json` file, then environment
//! variables (`HOST`, `PORT`, `DATABASE_URL`), then command-line flags.
//! Every field has a default so the server starts with no configuration.

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use studyai_core::{Result, StudyError};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "studyai.json";

/// Default bind host.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default HTTP port.
const fn default_port() -> u16 {
    5000
}

/// Default SQLite database location.
fn default_database_url() -> String {
    "sqlite://studyai.db?mode=rwc".to_string()
}

/// Default number of cards per generated flashcard set.
const fn default_flashcard_count() -> u32 {
    studyai_core::generator::DEFAULT_FLASHCARD_COUNT
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite connection string for the artifact store.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Cards per generated flashcard set.
    #[serde(default = "default_flashcard_count")]
    pub flashcard_count: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            flashcard_count: default_flashcard_count(),
        }
    }
}

impl Config {
    /// Loads `studyai.json` from the current working directory.
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            StudyError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_file(&current_dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(StudyError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| StudyError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `HOST`, `PORT`, and `DATABASE_URL` from `lookup`.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse().map_err(|_| {
                StudyError::config_validation(
                    format!("PORT '{port}' is not a valid port number"),
                    "Set PORT to a number between 1 and 65535",
                )
            })?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        self.validate()
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(StudyError::config_validation(
                "host must not be empty",
                "Set host to an interface address such as 0.0.0.0 or 127.0.0.1",
            ));
        }

        if self.database_url.trim().is_empty() {
            return Err(StudyError::config_validation(
                "databaseUrl must not be empty",
                "Set databaseUrl (or DATABASE_URL) to a sqlite:// connection string",
            ));
        }

        if self.flashcard_count == 0 {
            return Err(StudyError::config_validation(
                "flashcardCount must be greater than 0",
                "Set flashcardCount to at least 1 in your studyai.json",
            ));
        }

        Ok(())
    }

    /// The address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|e| {
            StudyError::config_validation(
                format!("cannot bind to {}:{}: {e}", self.host, self.port),
                "Use an IP address for host, not a hostname",
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_url, "sqlite://studyai.db?mode=rwc");
        assert_eq!(config.flashcard_count, 10);
    }

    #[test]
    fn test_config_deserialization_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let config: Config = serde_json::from_str(r#"{"theme": "dark", "port": 7}"#).unwrap();
        assert_eq!(config.port, 7);
    }

    #[test]
    fn test_load_from_file_valid_json() {
        use std::io::Write;

        let config_path = std::env::temp_dir().join("test_studyai_valid.json");
        let mut file = std::fs::File::create(&config_path).unwrap();
        file.write_all(br#"{"databaseUrl": "sqlite::memory:", "flashcardCount": 4}"#)
            .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.flashcard_count, 4);
        assert_eq!(config.port, 5000);

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        use std::io::Write;

        let config_path = std::env::temp_dir().join("test_studyai_invalid.json");
        let mut file = std::fs::File::create(&config_path).unwrap();
        file.write_all(b"{ not valid json }").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(
            matches!(&err, StudyError::ConfigParse { path, message } if *path == config_path && !message.is_empty()),
            "Expected ConfigParse with correct path, got: {err:?}"
        );

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_load_from_file_nonexistent_returns_default() {
        let config = Config::load_from_file(&PathBuf::from("/nonexistent/studyai.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validation_zero_flashcards() {
        let config = Config {
            flashcard_count: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("flashcardCount"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("PORT", "6001"),
                ("DATABASE_URL", "sqlite::memory:"),
            ]))
            .unwrap();
        assert_eq!(config.port, 6001);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_env_override_invalid_port() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(env(&[("PORT", "five thousand")]))
            .unwrap_err();
        assert!(matches!(err, StudyError::ConfigValidation { .. }));
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 5050,
            ..Config::default()
        };
        assert_eq!(config.socket_addr().unwrap().port(), 5050);

        let bad = Config {
            host: "localhost".to_string(),
            ..Config::default()
        };
        assert!(bad.socket_addr().is_err());
    }
}
