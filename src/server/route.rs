//! URL to route resolution.
//!
//! Named routes are checked first, in this order: stop command, generated
//! test page, save echo, library asset. Everything else is looked up under
//! the content root through the index fallback chain.

use std::path::{Path, PathBuf};

/// Admin route that terminates the server (case-insensitive).
pub const STOP_ROUTE: &str = "stop";

/// Generated launcher page (exact match).
pub const TEST_ROUTE: &str = "TEST";

/// Save acknowledgement endpoint (exact match).
pub const SAVE_ROUTE: &str = "TEST-SAVE";

/// Default library asset name, matched case-insensitively.
pub const DEFAULT_LIBRARY: &str = "AuO.js";

/// Static lookup order: the path itself, then the PHP index, then the HTML
/// index. Existing deployments depend on this exact order.
const INDEX_SUFFIXES: [&str; 3] = ["", "index.php", "index.html"];

/// What a request path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Stop,
    GeneratedTestPage,
    SaveEcho,
    LibraryAsset,
    StaticFile(PathBuf),
    NotFound,
}

/// Maps request paths onto named routes and files under a content root.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    library: String,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>, library: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            library: library.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the library asset route, also its file name under the root.
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Resolve a raw request URL.
    pub fn resolve(&self, url: &str) -> RouteOutcome {
        let normalized = normalize_url(url);
        let name = normalized.strip_prefix('/').unwrap_or(&normalized);

        if name.eq_ignore_ascii_case(STOP_ROUTE) {
            return RouteOutcome::Stop;
        }
        if name == TEST_ROUTE {
            return RouteOutcome::GeneratedTestPage;
        }
        if name == SAVE_ROUTE {
            return RouteOutcome::SaveEcho;
        }
        if name.eq_ignore_ascii_case(&self.library) {
            return RouteOutcome::LibraryAsset;
        }

        match find_file(&self.root, name) {
            Some(path) => RouteOutcome::StaticFile(path),
            None => RouteOutcome::NotFound,
        }
    }
}

/// Find the first regular file for `relative` under `root`.
///
/// Paths with `..` segments are rejected outright, and every candidate must
/// canonicalize to a location inside the canonical root, so symlinks cannot
/// escape it either.
fn find_file(root: &Path, relative: &str) -> Option<PathBuf> {
    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }

    let root = root.canonicalize().ok()?;
    let base = root.join(relative);

    INDEX_SUFFIXES.iter().find_map(|suffix| {
        let candidate = if suffix.is_empty() {
            base.clone()
        } else {
            base.join(suffix)
        };
        let canonical = candidate.canonicalize().ok()?;
        (canonical.starts_with(&root) && canonical.is_file()).then_some(canonical)
    })
}

/// Normalize URL: decode, strip query string and fragment, collapse
/// repeated slashes.
pub fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let mut out = String::with_capacity(decoded.len());
    for ch in decoded.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out
}
