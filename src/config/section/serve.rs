//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! root = "lib"                # Content root served at `/`
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 0                    # 0 = any free port
//! workers = 4                 # Request worker threads
//! library = "AuO.js"          # Library asset, cached in memory
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::Deserialize;

use crate::server::{DEFAULT_LIBRARY, DEFAULT_WORKERS};

/// Content server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Content root; relative paths are resolved against the config file.
    pub root: PathBuf,

    /// Network interface to bind.
    pub interface: IpAddr,

    /// HTTP port number. `0` requests an ephemeral port.
    pub port: u16,

    /// Number of request worker threads.
    pub workers: usize,

    /// File name of the library asset under `root`.
    pub library: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("lib"),
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 0,
            workers: DEFAULT_WORKERS,
            library: DEFAULT_LIBRARY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    use crate::config::HarnessConfig;

    #[test]
    fn test_serve_config() {
        let config = HarnessConfig::from_str(
            "[serve]\nroot = \"www\"\ninterface = \"0.0.0.0\"\nport = 4444\nworkers = 2",
        )
        .unwrap();

        assert_eq!(config.serve.root, PathBuf::from("www"));
        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 4444);
        assert_eq!(config.serve.workers, 2);
        assert_eq!(config.serve.library, "AuO.js");
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = HarnessConfig::from_str("").unwrap();

        assert_eq!(config.serve.root, PathBuf::from("lib"));
        assert_eq!(config.serve.port, 0);
        assert_eq!(config.serve.workers, 4);
    }
}
