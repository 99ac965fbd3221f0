//! Browser-driven UI test harness for the AuO audio editor.
//!
//! - [`server`]: embedded HTTP server for the UI, its library asset, and a
//!   save-echo endpoint
//! - [`browser`]: browser sessions, a polling wait primitive, and a pool
//!   that guarantees cleanup
//! - [`harness`]: one fixture wiring both together

pub mod logger;

pub mod browser;
pub mod config;
pub mod display;
pub mod harness;
pub mod server;

mod embed;
mod utils;

pub use harness::{Harness, HarnessError};
