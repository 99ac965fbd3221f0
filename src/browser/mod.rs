//! Browser automation: sessions, the wait primitive, and the driver pool.
//!
//! [`Session`] is the capability set UI tests drive; [`Backend`] launches
//! sessions (only [`Chrome`] ships). [`DriverPool`] tracks every session it
//! hands out so a test run can always clean up.

mod backend;
mod chrome;
mod error;
mod pool;
mod session;
mod wait;

#[cfg(test)]
pub(crate) mod fake;

pub use backend::{Backend, FAKE_MEDIA_UI_FLAG, MAXIMIZED_FLAG, SessionConfig};
pub use chrome::Chrome;
pub use error::{BrowserError, CleanupError};
pub use pool::{DriverPool, navigate_and_wait_visible};
pub use session::{Rect, Session, SessionId};
pub use wait::{DEFAULT_POLL_INTERVAL, Check, Waiter, wait_for, wait_for_action, wait_until};
