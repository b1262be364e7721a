use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;
use crate::variant::Variant;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
    /// Directory for the per-variant database files; profile data dir if unset
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub default_app: Variant,
    /// `tracing` filter directive; "debug" under --dev, "warn" otherwise
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: Some(CURRENT_CONFIG_VERSION),
            data_dir: None,
            default_app: Variant::default(),
            log_filter: None,
        }
    }
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config file, or create default if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit file, writing defaults there if it is missing
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to_path(path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Directory holding the database files, with `~` expanded
    pub fn get_data_dir(&self, profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(utils::expand_path(dir)),
            None => utils::get_data_dir(profile).ok_or_else(|| {
                ConfigError::ConfigDirError("Could not determine data directory".to_string())
            }),
        }
    }

    /// Database file for one variant: `<data_dir>/<stem>.db`
    pub fn get_database_path(
        &self,
        profile: utils::Profile,
        variant: Variant,
    ) -> Result<PathBuf, ConfigError> {
        Ok(self
            .get_data_dir(profile)?
            .join(format!("{}.db", variant.db_stem())))
    }

    /// Filter used before any config file has been read
    pub fn default_log_filter(profile: utils::Profile) -> &'static str {
        match profile {
            utils::Profile::Dev => "debug",
            utils::Profile::Prod => "warn",
        }
    }

    pub fn log_filter(&self, profile: utils::Profile) -> String {
        self.log_filter
            .clone()
            .unwrap_or_else(|| Self::default_log_filter(profile).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Profile;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_from_path(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_app = \"shopping\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.default_app, Variant::Shopping);
        assert_eq!(config.data_dir, None);
        assert_eq!(config.config_version, Some(CURRENT_CONFIG_VERSION));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_app = [").unwrap();
        assert!(matches!(Config::load_from_path(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_database_path_per_variant() {
        let config = Config {
            data_dir: Some("/tmp/crudbook-data".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.get_database_path(Profile::Prod, Variant::Shopping).unwrap(),
            PathBuf::from("/tmp/crudbook-data/shopping.db")
        );
        assert_eq!(
            config.get_database_path(Profile::Dev, Variant::Todo).unwrap(),
            PathBuf::from("/tmp/crudbook-data/todo.db")
        );
    }

    #[test]
    fn test_log_filter_defaults_by_profile() {
        let config = Config::default();
        assert_eq!(config.log_filter(Profile::Dev), "debug");
        assert_eq!(config.log_filter(Profile::Prod), "warn");

        let explicit = Config {
            log_filter: Some("crudbook=trace".to_string()),
            ..Config::default()
        };
        assert_eq!(explicit.log_filter(Profile::Prod), "crudbook=trace");
        assert_eq!(Config::default_log_filter(Profile::Dev), "debug");
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writing_defaults_is_logged_under_the_profile_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(Config::default_log_filter(Profile::Dev)))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || Config::load_from_path(&path)).unwrap();

        let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("wrote default config"), "{logged}");
    }
}
