//! Content server error types.

use std::{io, net::SocketAddr, path::PathBuf};
use thiserror::Error;

/// Failures surfaced by the content server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind content server on {addr}")]
    Startup {
        addr: SocketAddr,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The listener or a worker thread did not shut down cleanly.
    #[error("failed to terminate content server: {0}")]
    Shutdown(String),

    /// The cached library asset could not be refreshed from disk.
    #[error("failed to read asset `{}`", path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A response could not be written back to the client.
    #[error("failed to send response")]
    Respond(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_asset_read_display() {
        let err = ServerError::AssetRead {
            path: PathBuf::from("lib/AuO.js"),
            source: io::Error::new(ErrorKind::NotFound, "gone"),
        };
        let display = format!("{err}");
        assert!(display.contains("lib/AuO.js"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
