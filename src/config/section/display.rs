//! `[display]` section configuration.
//!
//! When enabled, an Xvfb server is started on `:<number>` and Chrome runs
//! headful against it.

use serde::Deserialize;

/// Virtual display settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
    pub number: u32,
    /// Xvfb screen geometry, `WIDTHxHEIGHTxDEPTH`.
    pub screen: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            number: 42,
            screen: "1600x1200x24".to_string(),
        }
    }
}
