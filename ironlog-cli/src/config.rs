use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding workouts.json and current-workout-id.json
    pub data_dir: ConfigValue<PathBuf>,
    /// Name given to workouts started without one
    pub workout_name: ConfigValue<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    workout_name: Option<String>,
}

pub const DATA_DIR_ENV: &str = "IRONLOG_DATA_DIR";
pub const WORKOUT_NAME_ENV: &str = "IRONLOG_WORKOUT_NAME";

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut workout_name = ConfigValue::new("Workout".to_string(), ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Relative paths are relative to the config file
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(name) = file_config.workout_name.filter(|n| !n.trim().is_empty()) {
                workout_name = ConfigValue::new(name, ConfigSource::File);
            }
        }

        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(name) = std::env::var(WORKOUT_NAME_ENV) {
            if !name.trim().is_empty() {
                workout_name = ConfigValue::new(name, ConfigSource::Environment);
            }
        }

        Ok(Self {
            data_dir,
            workout_name,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/ironlog/
    /// - macOS: ~/Library/Application Support/ironlog/
    /// - Windows: %APPDATA%/ironlog/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ironlog")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/ironlog/
    /// - macOS: ~/Library/Application Support/ironlog/
    /// - Windows: %APPDATA%/ironlog/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ironlog")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
