//! `[browser]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [browser]
//! chrome_path = "/usr/bin/google-chrome"   # omit to auto-detect
//! headless = true                          # ignored when [display] is enabled
//! window = [1600, 1200]
//! ready_selector = ".AuO"
//! ready_timeout_secs = 60
//! extra_args = ["--no-sandbox"]
//! ```

use std::path::PathBuf;

use serde::Deserialize;

/// Browser session settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Chrome binary. `None` lets the backend search the usual locations.
    pub chrome_path: Option<PathBuf>,

    /// Run without a window when no display is configured.
    pub headless: bool,

    /// Window size in pixels.
    pub window: (u32, u32),

    /// CSS selector that marks the UI under test as rendered.
    pub ready_selector: String,

    /// How long to wait for `ready_selector` after navigation.
    pub ready_timeout_secs: u64,

    /// Additional command-line switches passed to Chrome.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            window: (1600, 1200),
            ready_selector: ".AuO".to_string(),
            ready_timeout_secs: 60,
            extra_args: Vec::new(),
        }
    }
}
