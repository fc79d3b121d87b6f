//! Bootstrap Configuration
//!
//! Handles parsing and management of mllm_ffi.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for by [`BootstrapConfig::find_and_load`].
pub const CONFIG_FILE_NAME: &str = "mllm_ffi.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching mllm_ffi.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BootstrapConfig {
    /// Artifact lookup overrides
    #[serde(default)]
    pub bootstrap: BootstrapSection,
}

/// The `[bootstrap]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BootstrapSection {
    /// Directory holding the native artifact (default: next to this crate's object file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib_dir: Option<PathBuf>,

    /// Platform identifier used to pick the artifact name (default: host)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl BootstrapConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: BootstrapConfig = toml::from_str(&content)?;

        // Relative lib_dir values are relative to the config file
        if let (Some(dir), Some(parent)) = (&config.bootstrap.lib_dir, path.parent()) {
            if dir.is_relative() {
                config.bootstrap.lib_dir = Some(parent.join(dir));
            }
        }

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                // Reached root without finding config
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BootstrapConfig::default();
        assert!(config.bootstrap.lib_dir.is_none());
        assert!(config.bootstrap.platform.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[bootstrap]
lib_dir = "/opt/pkg"
platform = "win32"
"#;
        let config: BootstrapConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bootstrap.lib_dir, Some(PathBuf::from("/opt/pkg")));
        assert_eq!(config.bootstrap.platform.as_deref(), Some("win32"));
    }

    #[test]
    fn test_empty_config() {
        let config: BootstrapConfig = toml::from_str("").unwrap();
        assert_eq!(config, BootstrapConfig::default());
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = BootstrapConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[bootstrap\nplatform = ").unwrap();
        assert!(matches!(
            BootstrapConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_relative_lib_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[bootstrap]\nlib_dir = \"native\"\n").unwrap();

        let config = BootstrapConfig::load(&path).unwrap();
        assert_eq!(config.bootstrap.lib_dir, Some(dir.path().join("native")));
    }

    #[test]
    fn test_find_and_load_searches_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = BootstrapConfig {
            bootstrap: BootstrapSection {
                lib_dir: Some(PathBuf::from("/opt/pkg")),
                platform: Some("darwin".to_string()),
            },
        };
        config.save(&dir.path().join(CONFIG_FILE_NAME)).unwrap();

        assert_eq!(BootstrapConfig::find_and_load(&nested).unwrap(), config);
    }
}
