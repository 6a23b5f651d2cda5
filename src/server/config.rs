//! Server configuration: environment variables plus a YAML accounts file.

use std::path::{Path, PathBuf};

use chef_menu_core::models::ChefId;
use serde::Deserialize;

use super::store::ChefProfile;

/// API key entry in config
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyEntry {
    pub key: String,
    pub chef_id: ChefId,
}

/// Config file structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_keys: Vec<ApiKeyEntry>,
    #[serde(default)]
    pub chefs: Vec<ChefProfile>,
}

impl ConfigFile {
    /// Reads the accounts file. A missing or broken file yields an empty config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str::<ConfigFile>(&contents) {
                Ok(config) => {
                    tracing::info!(
                        "Loaded {} API key(s) and {} chef profile(s)",
                        config.api_keys.len(),
                        config.chefs.len()
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}", e);
                    ConfigFile::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path.display(), e);
                tracing::warn!("No API keys loaded - all authenticated requests will fail");
                ConfigFile::default()
            }
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Path to config file
    pub config_path: PathBuf,
    /// Base URL put in front of photo links
    pub public_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = std::env::var("CHEFMENU_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let config_path = std::env::var("CHEFMENU_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("chefmenu-server")
                    .join("config.yaml")
            });

        let public_url = std::env::var("CHEFMENU_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        Self {
            port,
            config_path,
            public_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "api_keys:").unwrap();
        writeln!(file, "  - key: ana-key").unwrap();
        writeln!(file, "    chef_id: 1").unwrap();
        writeln!(file, "chefs:").unwrap();
        writeln!(file, "  - chef_id: 1").unwrap();
        writeln!(file, "    name: Ana").unwrap();
        writeln!(file, "    cuisines: [Mexican]").unwrap();

        let config = ConfigFile::load(&path);
        assert_eq!(config.api_keys.len(), 1);
        assert_eq!(config.api_keys[0].chef_id, ChefId(1));
        assert_eq!(config.chefs[0].cuisines, vec!["Mexican"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let config = ConfigFile::load(&dir.path().join("missing.yaml"));
        assert!(config.api_keys.is_empty());
        assert!(config.chefs.is_empty());
    }

    #[test]
    fn test_broken_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api_keys: [").unwrap();
        assert!(ConfigFile::load(&path).api_keys.is_empty());
    }
}
