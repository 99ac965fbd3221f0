//! Harness configuration management for `auo.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `[serve]`   | Content server (root, interface, port, workers) |
//! | `[browser]` | Chrome sessions (binary, window, readiness)     |
//! | `[wait]`    | Poll interval of the wait primitive             |
//! | `[display]` | Optional Xvfb virtual display                   |
//!
//! A missing config file is not an error: every field has a default.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{BrowserConfig, DisplayConfig, ServeConfig, WaitConfig};

use crate::debug;
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

/// Default config file name.
pub const CONFIG_FILE: &str = "auo.toml";

/// Root configuration structure representing auo.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub serve: ServeConfig,
    pub browser: BrowserConfig,
    pub wait: WaitConfig,
    pub display: DisplayConfig,
}

impl HarnessConfig {
    /// Load `path`, falling back to defaults when the file does not exist.
    ///
    /// A relative `serve.root` is resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("config"; "{} not found, using defaults", path.display());
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;

        if config.serve.root.is_relative()
            && let Some(dir) = path.parent()
        {
            config.serve.root = dir.join(&config.serve.root);
        }
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::Validation(msg.to_string()));

        if self.serve.workers == 0 {
            return fail("[serve] workers must be >= 1");
        }
        if self.serve.library.trim().is_empty() {
            return fail("[serve] library must not be empty");
        }
        if self.wait.poll_interval_ms == 0 {
            return fail("[wait] poll_interval_ms must be >= 1");
        }
        if self.browser.ready_selector.trim().is_empty() {
            return fail("[browser] ready_selector must not be empty");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.wait.poll_interval_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.browser.ready_timeout_secs)
    }
}
