//! Configuration sections of `auo.toml`.

mod browser;
mod display;
mod serve;
mod wait;

pub use browser::BrowserConfig;
pub use display::DisplayConfig;
pub use serve::ServeConfig;
pub use wait::WaitConfig;
