//! Settings for the command-line tool, read from
//! `~/.config/jsonfeed/config.toml` unless `--config` names another file.
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::document::DEFAULT_MAX_DOCUMENT_BYTES;
use crate::feed::FetchConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Every key is optional; omitted keys keep their [`Default`] value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Indent encoded output.
    pub pretty: bool,

    /// Largest document accepted from a file or the network, in bytes.
    pub max_document_bytes: u64,

    pub fetch_timeout_secs: u64,

    /// Retries for 429, 5xx and truncated responses.
    pub max_retries: u32,

    /// Permit fetching from localhost and private address ranges.
    pub allow_private_hosts: bool,

    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pretty: true,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            fetch_timeout_secs: 30,
            max_retries: 3,
            allow_private_hosts: false,
            user_agent: concat!("jsonfeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "pretty",
        "max_document_bytes",
        "fetch_timeout_secs",
        "max_retries",
        "allow_private_hosts",
        "user_agent",
    ];

    /// Reads `path` as TOML.
    ///
    /// A missing or blank file yields the defaults. Keys this version does
    /// not know are logged and skipped.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TooLarge`] past 1 MB, [`ConfigError::Parse`] for bad
    /// TOML or a mistyped value, [`ConfigError::Io`] otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match Self::read_bounded(path)? {
            Some(content) => Self::parse(&content, path),
            None => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// File contents, or `None` when there is no file.
    fn read_bounded(path: &Path) -> Result<Option<String>, ConfigError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let size = file.metadata()?.len();
        if size > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{} is {} bytes (max {})",
                path.display(),
                size,
                Self::MAX_FILE_SIZE
            )));
        }

        // The file may grow after the size check.
        let mut content = String::new();
        file.take(Self::MAX_FILE_SIZE).read_to_string(&mut content)?;
        Ok(Some(content))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Blank config file, using defaults");
            return Ok(Self::default());
        }

        let table: toml::Table = content.parse()?;
        for key in table.keys() {
            if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!(path = %path.display(), key = %key, "Ignoring unknown config key");
            }
        }

        let config: Config = toml::Value::Table(table).try_into()?;
        tracing::debug!(path = %path.display(), ?config, "Loaded configuration");
        Ok(config)
    }

    /// Network retrieval settings derived from this configuration.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_retries: self.max_retries,
            max_document_bytes: self.max_document_bytes,
            allow_private_hosts: self.allow_private_hosts,
            ..FetchConfig::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(test_name: &str, content: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("jsonfeed_config_test_{}", test_name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.pretty);
        assert_eq!(config.max_document_bytes, 10 * 1024 * 1024);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert!(!config.allow_private_hosts);
        assert!(config.user_agent.starts_with("jsonfeed/"));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/jsonfeed_test_nonexistent_config.toml");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "pretty = false\n");
        let config = Config::load(&path).unwrap();
        assert!(!config.pretty);
        assert_eq!(config.max_retries, 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
pretty = false
max_document_bytes = 2048
fetch_timeout_secs = 5
max_retries = 0
allow_private_hosts = true
user_agent = "feedbot/2"
"#;
        let (dir, path) = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(
            config,
            Config {
                pretty: false,
                max_document_bytes: 2048,
                fetch_timeout_secs: 5,
                max_retries: 0,
                allow_private_hosts: true,
                user_agent: "feedbot/2".to_string(),
            }
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "max_retries = \"many\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "pretty = false\nprety = true\n");
        let config = Config::load(&path).unwrap();
        assert!(!config.pretty);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"#".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_fetch_config_mapping() {
        let config = Config {
            fetch_timeout_secs: 7,
            max_retries: 1,
            max_document_bytes: 100,
            allow_private_hosts: true,
            ..Config::default()
        };
        let fetch = config.fetch_config();
        assert_eq!(fetch.timeout, Duration::from_secs(7));
        assert_eq!(fetch.max_retries, 1);
        assert_eq!(fetch.max_document_bytes, 100);
        assert!(fetch.allow_private_hosts);
    }
}
