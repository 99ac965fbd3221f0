//! Embedded content server for the UI under test.
//!
//! One acceptor thread pulls requests off the listener and hands them to a
//! fixed set of worker threads over a channel. Every request reads the shared
//! [`ServerState`]; only the library asset cache is mutated across workers.
//!
//! The stop route only flips the state: the listener keeps accepting and
//! every later request is answered with 404. Threads wind down and the
//! socket closes in [`ContentServer::terminate`].

mod asset;
mod error;
mod response;
mod route;
mod state;


pub use asset::{AssetCache, CachedAsset};
pub use error::ServerError;
pub use response::{Reply, SAVE_OK_RESPONSE, reframe_lines};
pub use route::{
    DEFAULT_LIBRARY, Resolver, RouteOutcome, SAVE_ROUTE, STOP_ROUTE, TEST_ROUTE, normalize_url,
};
pub use state::{ServerState, StateCell};

use crate::config::ServeConfig;
use crate::{debug, log};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Request, Server};

/// Default number of request worker threads.
pub const DEFAULT_WORKERS: usize = 4;

/// Everything needed to start a server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub root: PathBuf,
    pub interface: IpAddr,
    /// `0` asks the OS for a free port.
    pub port: u16,
    pub workers: usize,
    pub library: String,
}

impl ServeOptions {
    pub fn new(root: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            root: root.into(),
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
            workers: DEFAULT_WORKERS,
            library: DEFAULT_LIBRARY.to_string(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = library.into();
        self
    }
}

impl From<&ServeConfig> for ServeOptions {
    fn from(config: &ServeConfig) -> Self {
        Self {
            root: config.root.clone(),
            interface: config.interface,
            port: config.port,
            workers: config.workers.max(1),
            library: config.library.clone(),
        }
    }
}

/// How often [`ContentServer::wait`] re-checks the state.
const WAIT_POLL: Duration = Duration::from_millis(100);

/// Request handling shared by all worker threads.
pub(crate) struct Handler {
    resolver: Resolver,
    assets: AssetCache,
    state: StateCell,
    /// Set by `terminate` only. The acceptor exits once it sees it.
    closing: AtomicBool,
    stopped_tx: Sender<()>,
    base_url: String,
}

impl Handler {
    pub(crate) fn new(resolver: Resolver, base_url: String, stopped_tx: Sender<()>) -> Self {
        let assets = AssetCache::new(resolver.root().join(resolver.library()));
        Self {
            resolver,
            assets,
            state: StateCell::new(),
            closing: AtomicBool::new(false),
            stopped_tx,
            base_url,
        }
    }

    /// Leave `RUNNING` and wake anyone in `wait`. True for the first caller.
    fn halt(&self) -> bool {
        let first = self.state.stop();
        if first {
            let _ = self.stopped_tx.try_send(());
        }
        first
    }

    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Decide the reply for one request URL.
    ///
    /// Once stopped, every URL gets a 404 without touching the resolver, the
    /// filesystem, or the asset cache.
    pub(crate) fn dispatch(&self, url: &str) -> Reply {
        if !self.state.is_running() {
            return Reply::not_found();
        }

        match self.resolver.resolve(url) {
            RouteOutcome::Stop => {
                if self.halt() {
                    log!("serve"; "stop requested");
                }
                Reply::Stop
            }
            RouteOutcome::GeneratedTestPage => {
                Reply::test_page(self.resolver.library(), &self.save_url())
            }
            RouteOutcome::SaveEcho => Reply::save_echo(),
            RouteOutcome::LibraryAsset => match self.assets.get() {
                Ok(asset) => Reply::library(&asset),
                Err(e) => {
                    log!("error"; "{e}");
                    Reply::server_error(&e)
                }
            },
            RouteOutcome::StaticFile(path) => match Reply::static_file(&path) {
                Ok(reply) => reply,
                Err(e) => {
                    debug!("serve"; "{}: {e}", path.display());
                    Reply::not_found()
                }
            },
            RouteOutcome::NotFound => Reply::not_found(),
        }
    }

    fn save_url(&self) -> String {
        format!("{}{SAVE_ROUTE}", self.base_url)
    }
}

/// A running (or terminated) content server.
///
/// Dropping the server terminates it.
pub struct ContentServer {
    handler: Arc<Handler>,
    listener: Mutex<Option<Arc<Server>>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    stopped_rx: Receiver<()>,
    addr: SocketAddr,
}

impl ContentServer {
    /// Serve `root` on `port` (`0` for an ephemeral port) with default options.
    pub fn start(root: impl Into<PathBuf>, port: u16) -> Result<Self, ServerError> {
        Self::with_options(ServeOptions::new(root, port))
    }

    /// Bind the listener, spawn workers, and enter `RUNNING`.
    pub fn with_options(options: ServeOptions) -> Result<Self, ServerError> {
        let requested = SocketAddr::new(options.interface, options.port);
        let startup = |source: Box<dyn std::error::Error + Send + Sync>| ServerError::Startup {
            addr: requested,
            source,
        };

        let server = Server::http(requested).map_err(startup)?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| startup("listener is not bound to an IP address".into()))?;
        let listener = Arc::new(server);

        let base_url = format!("http://localhost:{}/", addr.port());
        let resolver = Resolver::new(options.root, options.library);
        let (stopped_tx, stopped_rx) = channel::bounded::<()>(1);
        let handler = Arc::new(Handler::new(resolver, base_url, stopped_tx));

        let (queue_tx, queue_rx) = channel::unbounded::<Request>();

        let mut threads = Vec::with_capacity(options.workers + 1);
        for index in 0..options.workers.max(1) {
            let handler = Arc::clone(&handler);
            let queue = queue_rx.clone();
            let handle = thread::Builder::new()
                .name(format!("auo-serve-{index}"))
                .spawn(move || worker_loop(&handler, &queue))
                .map_err(|e| startup(e.into()))?;
            threads.push(handle);
        }

        handler.state.start();

        let acceptor = {
            let listener = Arc::clone(&listener);
            let handler = Arc::clone(&handler);
            thread::Builder::new()
                .name("auo-accept".to_string())
                .spawn(move || accept_loop(&listener, &handler, queue_tx))
        };
        let acceptor = match acceptor {
            Ok(handle) => handle,
            Err(e) => {
                // Dropping the queue sender on the failed spawn releases the workers.
                handler.closing.store(true, Ordering::SeqCst);
                handler.halt();
                return Err(startup(e.into()));
            }
        };
        threads.push(acceptor);

        log!("serve"; "{} (root: {})", handler.base_url, handler.resolver.root().display());

        Ok(Self {
            handler,
            listener: Mutex::new(Some(listener)),
            threads: Mutex::new(threads),
            stopped_rx,
            addr,
        })
    }

    pub fn state(&self) -> ServerState {
        self.handler.state.get()
    }

    /// Port actually bound, even when `0` was requested.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Root URL, `http://localhost:<port>/`.
    pub fn url(&self) -> &str {
        &self.handler.base_url
    }

    /// URL of the generated launcher page.
    pub fn test_url(&self) -> String {
        format!("{}{TEST_ROUTE}", self.handler.base_url)
    }

    /// URL of the save-echo route.
    pub fn save_url(&self) -> String {
        self.handler.save_url()
    }

    /// Block until the server leaves `RUNNING` (e.g. via the stop route).
    pub fn wait(&self) {
        while self.handler.state.is_running() {
            let _ = self.stopped_rx.recv_timeout(WAIT_POLL);
        }
    }

    /// Stop serving, close the listener, and join every server thread.
    ///
    /// Safe to call repeatedly: later calls find nothing left to join. The
    /// state is `STOPPED` afterwards even when joining fails.
    pub fn terminate(&self) -> Result<(), ServerError> {
        if self.handler.halt() {
            log!("serve"; "stopping server...");
        }
        self.handler.closing.store(true, Ordering::SeqCst);

        if let Some(listener) = self.listener.lock().as_ref() {
            listener.unblock();
        }

        let threads = std::mem::take(&mut *self.threads.lock());
        let current = thread::current().id();
        let joined = !threads.is_empty();
        let mut failed = Vec::new();
        for handle in threads {
            if handle.thread().id() == current {
                continue;
            }
            let name = handle.thread().name().unwrap_or("server").to_string();
            if handle.join().is_err() {
                failed.push(name);
            }
        }

        // Last reference: closes the socket.
        self.listener.lock().take();

        if !failed.is_empty() {
            log!("error"; "failed to terminate server on localhost:{}", self.port());
            return Err(ServerError::Shutdown(format!(
                "threads panicked: {}",
                failed.join(", ")
            )));
        }
        if joined {
            log!("serve"; "terminated server on localhost:{}", self.port());
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl Drop for ContentServer {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            log!("error"; "{e}");
        }
    }
}

/// Forward requests to the workers until `terminate` unblocks the listener.
///
/// Runs past the stop route so requests arriving while `STOPPED` still get
/// their 404.
fn accept_loop(listener: &Server, handler: &Handler, queue: Sender<Request>) {
    loop {
        match listener.recv() {
            Ok(request) => {
                if queue.send(request).is_err() {
                    break;
                }
            }
            Err(_) if handler.is_closing() => break,
            Err(e) => log!("error"; "accept failed: {e}"),
        }
    }
}

/// Answer queued requests until the acceptor drops the sending side.
fn worker_loop(handler: &Handler, queue: &Receiver<Request>) {
    for request in queue.iter() {
        let url = request.url().to_string();
        let method = request.method().clone();

        let reply = handler.dispatch(&url);
        debug!("serve"; "{method} {url} -> {}", reply.status());

        if let Err(e) = reply.send(request) {
            log!("error"; "{method} {url}: {e}");
        }
    }
}
