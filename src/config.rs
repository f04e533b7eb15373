//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. the `--config` command-line flag
//! 2. `$AUTOBLOG_CONFIG` (environment variable)
//! 3. `~/.config/autoblog/config.toml` (Linux/macOS)
//!    `%APPDATA%\autoblog\config.toml` (Windows)
//! 4. Built-in defaults
//!
//! Credentials are never read from the config file; they are passed to
//! [`crate::mailbox::Connector::connect`] explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AutoblogError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mail server connection settings.
    pub server: ServerConfig,
    /// Where posts and attachments are written.
    pub output: OutputConfig,
    /// General behavior settings.
    pub general: GeneralConfig,
}

/// Mail server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Hostname of the IMAP server.
    pub host: String,
    /// TLS port (993 for IMAPS).
    pub port: u16,
    /// Mailbox polled for unread messages.
    pub mailbox: String,
}

/// Output directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the generated markdown posts.
    pub posts_dir: PathBuf,
    /// Directory receiving saved attachments. Should live under `posts_dir`
    /// so that the relative links in posts resolve.
    pub attachments_dir: PathBuf,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Also append log lines to this file.
    pub log_file: Option<PathBuf>,
}

// ── Default implementations ─────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "imap.zoho.com".to_string(),
            port: 993,
            mailbox: "INBOX".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("public/posts"),
            attachments_dir: PathBuf::from("public/posts/attachments"),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Check the values a run cannot do without.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(AutoblogError::Config("server host is empty".into()));
        }
        if self.server.port == 0 {
            return Err(AutoblogError::Config("server port must be non-zero".into()));
        }
        if self.server.mailbox.trim().is_empty() {
            return Err(AutoblogError::Config("mailbox name is empty".into()));
        }
        if self.output.posts_dir.as_os_str().is_empty() {
            return Err(AutoblogError::Config("posts directory is empty".into()));
        }
        if self.output.attachments_dir.as_os_str().is_empty() {
            return Err(AutoblogError::Config("attachments directory is empty".into()));
        }
        Ok(())
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration from `explicit` or the standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config(explicit: Option<&Path>) -> Config {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config_file_path(),
    };

    if let Some(path) = path {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::debug!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        } else if explicit.is_some() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("AUTOBLOG_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("autoblog").join("config.toml"))
}
