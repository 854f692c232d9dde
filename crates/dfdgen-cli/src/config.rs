//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory)
//! and applying environment and command-line overrides on top.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use dfdgen::{DfdError, config::AppConfig};

/// Environment variable overriding `share.base_url`.
pub const BASE_URL_ENV: &str = "DFDGEN_BASE_URL";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for DfdError {
    fn from(err: ConfigError) -> Self {
        DfdError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (dfdgen/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// The `DFDGEN_BASE_URL` environment variable, when set and non-empty,
/// replaces the share link base address of whichever config was found.
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, DfdError> {
    let config = find_config(explicit_path)?;
    Ok(apply_env_overrides(config, env::var(BASE_URL_ENV).ok()))
}

fn find_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, DfdError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("dfdgen/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "dfdgen", "dfdgen") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Applies the base URL taken from the environment, ignoring empty values.
pub fn apply_env_overrides(config: AppConfig, base_url: Option<String>) -> AppConfig {
    match base_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            debug!(base_url = url.as_str(); "Base URL overridden from environment");
            config.with_base_url(url)
        }
        None => config,
    }
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, DfdError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [renderer]
            program = "/opt/bin/data-flow-diagram"
            args = ["--verbose"]
            timeout_secs = 5

            [share]
            base_url = "https://dfd.example.org/"

            [session]
            idle_timeout_secs = 60
            "#,
        )
        .unwrap();

        let config = find_config(Some(&path)).unwrap();

        assert_eq!(
            config.renderer().program(),
            &PathBuf::from("/opt/bin/data-flow-diagram")
        );
        assert_eq!(config.renderer().args(), ["--verbose"]);
        assert_eq!(config.renderer().timeout_secs(), 5);
        assert_eq!(config.share().base_url(), "https://dfd.example.org/");
        assert_eq!(config.session().idle_timeout().as_secs(), 60);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = find_config(Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, DfdError::Config(msg) if msg.contains("Missing configuration file")));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[renderer\nprogram = 1").unwrap();

        let err = find_config(Some(&path)).unwrap_err();
        assert!(matches!(err, DfdError::Config(msg) if msg.contains("Failed to parse")));
    }

    #[test]
    fn test_env_override() {
        let config = apply_env_overrides(
            AppConfig::default(),
            Some("https://share.example.org/".to_string()),
        );
        assert_eq!(config.share().base_url(), "https://share.example.org/");

        let config = apply_env_overrides(AppConfig::default(), Some("  ".to_string()));
        assert_eq!(config.share().base_url(), dfdgen::config::DEFAULT_BASE_URL);

        let config = apply_env_overrides(AppConfig::default(), None);
        assert_eq!(config.share().base_url(), dfdgen::config::DEFAULT_BASE_URL);
    }
}
