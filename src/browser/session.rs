//! The capability set tests use to drive one browser window.

use super::BrowserError;
use std::fmt;

/// Pool-assigned identifier of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Element box in CSS pixels, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// One browser window under automation.
///
/// Elements are addressed by CSS selector; methods without an index act on
/// the first match. A selector with no match yields
/// [`BrowserError::NoSuchElement`].
pub trait Session: Send {
    /// Load `url` and wait for the navigation to finish.
    fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    fn current_url(&self) -> Result<String, BrowserError>;

    /// Number of elements matching `selector` (never `NoSuchElement`).
    fn count(&self, selector: &str) -> Result<usize, BrowserError>;

    /// Rendered with a non-empty box and not hidden by style.
    fn is_displayed(&self, selector: &str) -> Result<bool, BrowserError>;

    fn is_enabled(&self, selector: &str) -> Result<bool, BrowserError>;

    /// Rendered text of the first match.
    fn text(&self, selector: &str) -> Result<String, BrowserError>;

    fn bounds(&self, selector: &str) -> Result<Rect, BrowserError>;

    fn click_nth(&self, selector: &str, index: usize) -> Result<(), BrowserError>;

    fn click(&self, selector: &str) -> Result<(), BrowserError> {
        self.click_nth(selector, 0)
    }

    /// Press on the first match, move by `(dx, dy)`, release.
    fn drag_by(&self, selector: &str, dx: f64, dy: f64) -> Result<(), BrowserError>;

    /// Close the window. Fails with `SessionClosed` if already closed.
    fn close(&mut self) -> Result<(), BrowserError>;

    /// End the browser process. Fails with `SessionClosed` if already gone.
    fn quit(&mut self) -> Result<(), BrowserError>;
}
