//! Browser backends and the per-session launch profile.

use super::{BrowserError, Session};
use crate::config::BrowserConfig;
use std::path::PathBuf;

/// Auto-approve microphone/camera prompts so recording starts unattended.
pub const FAKE_MEDIA_UI_FLAG: &str = "--use-fake-ui-for-media-stream";

pub const MAXIMIZED_FLAG: &str = "--start-maximized";

/// Launch profile shared by every session of a pool.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub window: (u32, u32),
    /// X display to render on, e.g. `:42`. Forces a headful browser.
    pub display: Option<String>,
    pub extra_args: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

impl From<&BrowserConfig> for SessionConfig {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            chrome_path: config
                .chrome_path
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
            headless: config.headless,
            window: config.window,
            display: None,
            extra_args: config.extra_args.clone(),
        }
    }
}

impl SessionConfig {
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Headless only when no display target is set.
    pub fn is_headless(&self) -> bool {
        self.headless && self.display.is_none()
    }

    /// Command-line switches for the browser process.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![FAKE_MEDIA_UI_FLAG.to_string(), MAXIMIZED_FLAG.to_string()];
        if let Some(display) = &self.display {
            args.push(format!("--display={display}"));
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Something that can launch sessions. One implementation per browser.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn create_session(&self, config: &SessionConfig) -> Result<Box<dyn Session>, BrowserError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let config = SessionConfig::default();
        assert_eq!(config.args(), vec![FAKE_MEDIA_UI_FLAG, MAXIMIZED_FLAG]);
        assert!(config.is_headless());
    }

    #[test]
    fn test_display_forces_headful() {
        let config = SessionConfig::default().with_display(":42");
        assert!(!config.is_headless());
        assert_eq!(
            config.args(),
            vec![FAKE_MEDIA_UI_FLAG, MAXIMIZED_FLAG, "--display=:42"]
        );
    }

    #[test]
    fn test_empty_chrome_path_means_auto_detect() {
        let browser = BrowserConfig {
            chrome_path: Some(PathBuf::new()),
            ..BrowserConfig::default()
        };
        assert!(SessionConfig::from(&browser).chrome_path.is_none());
    }

    #[test]
    fn test_extra_args_come_last() {
        let browser = BrowserConfig {
            extra_args: vec!["--no-sandbox".to_string()],
            ..BrowserConfig::default()
        };
        let args = SessionConfig::from(&browser).args();
        assert_eq!(args.last().map(String::as_str), Some("--no-sandbox"));
    }
}
