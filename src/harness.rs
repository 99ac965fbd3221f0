//! Per-run fixture: virtual display, content server, and driver pool.
//!
//! ```ignore
//! let mut harness = Harness::start(HarnessConfig::load(Path::new("auo.toml"))?)?;
//! let session = harness.open_test_page()?;
//! session.click(".AuO .auo-record-button")?;
//! harness.end_sessions()?;
//! ```

use crate::browser::{
    Backend, BrowserError, Chrome, CleanupError, DriverPool, Session, SessionConfig, Waiter,
};
use crate::config::{ConfigError, HarnessConfig};
use crate::display::{DisplayError, VirtualDisplay};
use crate::log;
use crate::server::{ContentServer, ServeOptions, ServerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Cleanup(#[from] CleanupError),
}

/// Owns everything a UI test run needs.
///
/// Teardown order on drop: sessions, then the server, then the display.
pub struct Harness {
    pool: DriverPool,
    server: ContentServer,
    display: Option<VirtualDisplay>,
    config: HarnessConfig,
}

impl Harness {
    /// Start with the Chrome backend.
    pub fn start(config: HarnessConfig) -> Result<Self, HarnessError> {
        Self::with_backend(config, Chrome)
    }

    pub fn with_backend(
        config: HarnessConfig,
        backend: impl Backend + 'static,
    ) -> Result<Self, HarnessError> {
        config.validate()?;

        let display = if config.display.enabled {
            Some(VirtualDisplay::start(
                config.display.number,
                &config.display.screen,
            )?)
        } else {
            None
        };

        let server = ContentServer::with_options(ServeOptions::from(&config.serve))?;

        let mut sessions = SessionConfig::from(&config.browser);
        if let Some(display) = &display {
            sessions = sessions.with_display(display.name());
        }
        let pool = DriverPool::new(backend, sessions).with_poll_interval(config.poll_interval());

        Ok(Self {
            pool,
            server,
            display,
            config,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn server(&self) -> &ContentServer {
        &self.server
    }

    pub fn pool(&mut self) -> &mut DriverPool {
        &mut self.pool
    }

    pub fn display(&self) -> Option<&VirtualDisplay> {
        self.display.as_ref()
    }

    pub fn waiter(&self) -> Waiter {
        self.pool.waiter()
    }

    /// Open a session on the generated launcher page and wait for the UI.
    pub fn open_test_page(&mut self) -> Result<&dyn Session, BrowserError> {
        let url = self.server.test_url();
        self.open(&url)
    }

    /// Open a session on the content root (its index page).
    pub fn open_root(&mut self) -> Result<&dyn Session, BrowserError> {
        let url = self.server.url().to_string();
        self.open(&url)
    }

    fn open(&mut self, url: &str) -> Result<&dyn Session, BrowserError> {
        self.pool.open(
            url,
            &self.config.browser.ready_selector,
            self.config.ready_timeout(),
        )
    }

    /// Close every session opened so far. Run after each test.
    pub fn end_sessions(&mut self) -> Result<(), CleanupError> {
        self.pool.close_all()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if let Err(e) = self.pool.close_all() {
            log!("error"; "{e}");
        }
        if let Err(e) = self.server.terminate() {
            log!("error"; "{e}");
        }
        // `display` drops last, after the browsers that render on it.
    }
}
