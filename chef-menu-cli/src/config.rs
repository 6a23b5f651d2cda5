use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Source of a configuration value
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

/// A configuration value with its source
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

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the menu service
    pub server_url: ConfigValue<String>,
    /// Bearer key for the chef's account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ConfigValue<String>>,
    /// Chef whose menu is edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef_id: Option<ConfigValue<i64>>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    server_url: Option<String>,
    api_key: Option<String>,
    chef_id: Option<i64>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut server_url =
            ConfigValue::new(DEFAULT_SERVER_URL.to_string(), ConfigSource::Default);
        let mut api_key = None;
        let mut chef_id = None;
        let mut request_timeout_secs =
            ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.server_url {
                server_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(key) = file_config.api_key {
                api_key = Some(ConfigValue::new(key, ConfigSource::File));
            }
            if let Some(id) = file_config.chef_id {
                chef_id = Some(ConfigValue::new(id, ConfigSource::File));
            }
            if let Some(secs) = file_config.request_timeout_secs {
                request_timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
        }

        if let Ok(url) = std::env::var("CHEF_SERVER_URL") {
            server_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("CHEF_API_KEY") {
            api_key = Some(ConfigValue::new(key, ConfigSource::Environment));
        }
        if let Ok(raw) = std::env::var("CHEF_ID") {
            let id = parse_env("CHEF_ID", &raw)?;
            chef_id = Some(ConfigValue::new(id, ConfigSource::Environment));
        }
        if let Ok(raw) = std::env::var("CHEF_REQUEST_TIMEOUT") {
            let secs = parse_env("CHEF_REQUEST_TIMEOUT", &raw)?;
            request_timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        Ok(Self {
            server_url,
            api_key,
            chef_id,
            request_timeout_secs,
            config_file,
        })
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_ref()
            .map(|v| v.value.as_str())
            .ok_or(ConfigError::Missing("api_key", "CHEF_API_KEY"))
    }

    pub fn chef_id(&self) -> Result<i64, ConfigError> {
        self.chef_id
            .as_ref()
            .map(|v| v.value)
            .ok_or(ConfigError::Missing("chef_id", "CHEF_ID"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/chef/
    /// - macOS: ~/Library/Application Support/chef/
    /// - Windows: %APPDATA%/chef/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chef")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name, raw.to_string()))
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
    /// A required key is not set; carries the key and its environment variable.
    Missing(&'static str, &'static str),
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
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
            ConfigError::Missing(key, env) => write!(
                f,
                "'{}' is not configured. Set it in the config file or via {}.",
                key, env
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.server_url.value, DEFAULT_SERVER_URL);
        assert_eq!(config.server_url.source, ConfigSource::Default);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "server_url: https://menu.example.com").unwrap();
        writeln!(file, "api_key: secret").unwrap();
        writeln!(file, "chef_id: 12").unwrap();
        writeln!(file, "request_timeout_secs: 5").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.server_url.value, "https://menu.example.com");
        assert_eq!(config.server_url.source, ConfigSource::File);
        assert_eq!(config.api_key().unwrap(), "secret");
        assert_eq!(config.chef_id().unwrap(), 12);
        assert_eq!(config.request_timeout_secs.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "chef_id: 1").unwrap();

        std::env::set_var("CHEF_ID", "42");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.chef_id().unwrap(), 42);
        assert_eq!(
            config.chef_id.as_ref().unwrap().source,
            ConfigSource::Environment
        );

        std::env::remove_var("CHEF_ID");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_credentials() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "server_url: http://127.0.0.1:3000").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let err = config.chef_id().unwrap_err();
        assert!(err.to_string().contains("CHEF_ID"));
        assert!(config.api_key().is_err());
        assert_eq!(config.request_timeout_secs.source, ConfigSource::Default);
    }
}
