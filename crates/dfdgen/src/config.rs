//! Configuration types for dfdgen.
//!
//! This module provides configuration structures that control how the
//! external renderer is invoked, how share links are built, and how long
//! idle sessions are kept. All types implement [`serde::Deserialize`] for
//! flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`RendererConfig`] - Program, leading arguments and timeout of the renderer.
//! - [`ShareConfig`] - Base address for share links.
//! - [`SessionConfig`] - Session lifetime.
//!
//! # Example
//!
//! ```
//! # use dfdgen::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [renderer]
//!     program = "/usr/local/bin/data-flow-diagram"
//!     timeout_secs = 30
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.renderer().timeout_secs(), 30);
//! assert_eq!(config.share().base_url(), "http://localhost:8501/");
//! ```

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Name of the renderer executable looked up on `PATH` by default.
pub const DEFAULT_PROGRAM: &str = "data-flow-diagram";

/// Placeholder base address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8501/";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Renderer configuration section.
    #[serde(default)]
    renderer: RendererConfig,

    /// Share link configuration section.
    #[serde(default)]
    share: ShareConfig,

    /// Session configuration section.
    #[serde(default)]
    session: SessionConfig,
}

impl AppConfig {
    /// Returns the renderer configuration.
    pub fn renderer(&self) -> &RendererConfig {
        &self.renderer
    }

    /// Returns the share link configuration.
    pub fn share(&self) -> &ShareConfig {
        &self.share
    }

    /// Returns the session configuration.
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Replaces the renderer program.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.renderer.program = program.into();
        self
    }

    /// Replaces the share link base address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.share.base_url = base_url.into();
        self
    }
}

/// How the external renderer is invoked.
///
/// The command line is `<program> <args...> -o <output> -f <format>
/// --no-graph-title <input>`.
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    /// Renderer executable, either a path or a name looked up on `PATH`.
    #[serde(default = "default_program")]
    program: PathBuf,

    /// Arguments placed before the standard flags.
    #[serde(default)]
    args: Vec<String>,

    /// Seconds before a running renderer is killed. `0` disables the limit.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl RendererConfig {
    /// Creates a renderer configuration.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_secs,
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Returns the timeout as a [`Duration`], or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new(default_program(), Vec::new(), default_timeout_secs())
    }
}

/// Share link settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    /// Base address share links are appended to.
    #[serde(default = "default_base_url")]
    base_url: String,
}

impl ShareConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self::new(default_base_url())
    }
}

/// Session lifetime settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Seconds of inactivity after which a session and its artifacts are dropped.
    #[serde(default = "default_idle_timeout_secs")]
    idle_timeout_secs: u64,
}

impl SessionConfig {
    pub fn new(idle_timeout_secs: u64) -> Self {
        Self { idle_timeout_secs }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(default_idle_timeout_secs())
    }
}

fn default_program() -> PathBuf {
    PathBuf::from(DEFAULT_PROGRAM)
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_idle_timeout_secs() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.renderer().program(), &PathBuf::from(DEFAULT_PROGRAM));
        assert!(config.renderer().args().is_empty());
        assert_eq!(config.renderer().timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.share().base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.session().idle_timeout(), Duration::from_secs(3600));
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let renderer = RendererConfig::new("tool", Vec::new(), 0);
        assert_eq!(renderer.timeout(), None);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::default()
            .with_program("/opt/dfd/bin/data-flow-diagram")
            .with_base_url("https://dfd.example.org/");
        assert_eq!(
            config.renderer().program(),
            &PathBuf::from("/opt/dfd/bin/data-flow-diagram")
        );
        assert_eq!(config.share().base_url(), "https://dfd.example.org/");
    }
}
