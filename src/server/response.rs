//! HTTP responses for each route outcome.

use super::ServerError;
use super::asset::CachedAsset;
use crate::embed::serve::TestPage;
use crate::utils::mime::{self, types};
use std::{fs, path::Path};
use tiny_http::{Header, Request, Response, StatusCode};

/// Body of every save-echo response. Tests compare against it verbatim.
pub const SAVE_OK_RESPONSE: &str = "AuO save request received.";

/// What a worker sends back for one request.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// The stop route was hit: acknowledge and wind the listener down.
    Stop,
    Content {
        status: u16,
        content_type: &'static str,
        body: Vec<u8>,
    },
}

impl Reply {
    fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self::Content {
            status: 200,
            content_type,
            body,
        }
    }

    pub fn not_found() -> Self {
        Self::Content {
            status: 404,
            content_type: types::HTML,
            body: Vec::new(),
        }
    }

    /// Generated launcher page pointing the UI at this server's save route.
    pub fn test_page(library: &str, save_url: &str) -> Self {
        let library_path = format!("/{library}");
        let body = TestPage {
            library_path: &library_path,
            save_url,
        }
        .render();
        Self::ok(types::HTML, body.into_bytes())
    }

    pub fn save_echo() -> Self {
        Self::ok(types::PLAIN, SAVE_OK_RESPONSE.as_bytes().to_vec())
    }

    pub fn library(asset: &CachedAsset) -> Self {
        Self::ok(types::JAVASCRIPT, asset.content.as_bytes().to_vec())
    }

    /// Static file, re-emitted line by line.
    pub fn static_file(path: &Path) -> Result<Self, ServerError> {
        let bytes = fs::read(path)?;
        Ok(Self::ok(mime::from_path(path), reframe_lines(&bytes)))
    }

    /// 500 for a failed asset refresh; the failure stays with this request.
    pub fn server_error(error: &ServerError) -> Self {
        Self::Content {
            status: 500,
            content_type: types::PLAIN,
            body: format!("500 Internal Server Error: {error}").into_bytes(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Stop => 200,
            Self::Content { status, .. } => *status,
        }
    }

    /// Write the reply to the client. `Stop` is answered with an empty 200.
    pub fn send(self, request: Request) -> Result<(), ServerError> {
        let (status, content_type, body) = match self {
            Self::Stop => (200, types::PLAIN, Vec::new()),
            Self::Content {
                status,
                content_type,
                body,
            } => (status, content_type, body),
        };

        let mut response = Response::from_data(body).with_status_code(StatusCode(status));
        if let Ok(header) = Header::from_bytes("Content-Type", content_type) {
            response.add_header(header);
        }
        request.respond(response)?;
        Ok(())
    }
}

/// Split on `\n`, drop a trailing `\r` from each line, and terminate every
/// line with exactly one `\n`.
///
/// Downstream assets parse these files line by line, so the framing is part
/// of the contract: a missing final newline is added, CRLF becomes LF, and
/// an empty file stays empty.
pub fn reframe_lines(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    if bytes.is_empty() {
        return out;
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    for line in body.split(|&b| b == b'\n') {
        out.extend_from_slice(line.strip_suffix(b"\r").unwrap_or(line));
        out.push(b'\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn test_reframe_adds_final_newline() {
        assert_eq!(reframe_lines(b"a\nb"), b"a\nb\n");
        assert_eq!(reframe_lines(b"a\nb\n"), b"a\nb\n");
    }

    #[test]
    fn test_reframe_crlf() {
        assert_eq!(reframe_lines(b"a\r\nb\r\n"), b"a\nb\n");
    }

    #[test]
    fn test_reframe_keeps_blank_lines() {
        assert_eq!(reframe_lines(b"a\n\n\nb"), b"a\n\n\nb\n");
        assert_eq!(reframe_lines(b"\n"), b"\n");
    }

    #[test]
    fn test_reframe_empty() {
        assert!(reframe_lines(b"").is_empty());
    }

    #[test]
    fn test_save_echo_body() {
        let Reply::Content { status, body, .. } = Reply::save_echo() else {
            panic!("expected content");
        };
        assert_eq!(status, 200);
        assert_eq!(body, SAVE_OK_RESPONSE.as_bytes());
    }

    #[test]
    fn test_library_reply() {
        let asset = CachedAsset {
            content: "function AuO() {}".to_string(),
            modified: SystemTime::now(),
        };
        assert_eq!(
            Reply::library(&asset),
            Reply::Content {
                status: 200,
                content_type: types::JAVASCRIPT,
                body: b"function AuO() {}".to_vec(),
            }
        );
    }

    #[test]
    fn test_not_found_is_html() {
        let reply = Reply::not_found();
        assert_eq!(reply.status(), 404);
        assert!(matches!(
            reply,
            Reply::Content { content_type: types::HTML, .. }
        ));
    }
}
