use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::error::{RaopError, Result};
use crate::protocol::{HandlerRegistry, Method, RequestHandler, TrafficDump};
use crate::transport::tcp::{self, Shared};

/// Server-level configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Sleep between non-blocking accept attempts; bounds how long
    /// [`Server::stop`] takes to be noticed.
    pub accept_poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            accept_poll_interval: Duration::from_millis(50),
        }
    }
}

/// Control-connection server.
///
/// Register handlers with [`add_handler`](Self::add_handler), then call
/// [`start`](Self::start). Each accepted connection runs on its own thread,
/// reading one request at a time and dispatching it by method.
///
/// [`stop`](Self::stop) only stops accepting; connections that are already
/// open keep being served until their peers disconnect.
pub struct Server {
    handlers: HandlerRegistry,
    dump: Option<Arc<dyn TrafficDump>>,
    running: Arc<AtomicBool>,
    local_addr: Option<SocketAddr>,
    config: ServerConfig,
}

impl Server {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            handlers: HandlerRegistry::new(),
            dump: None,
            running: Arc::new(AtomicBool::new(false)),
            local_addr: None,
            config,
        }
    }

    /// Attach a diagnostics sink. Must be called before [`start`](Self::start).
    pub fn with_dump(mut self, dump: Arc<dyn TrafficDump>) -> Self {
        self.dump = Some(dump);
        self
    }

    /// Register the handler for `method`.
    ///
    /// The registry is frozen once the server starts; later calls return
    /// [`RaopError::AlreadyRunning`].
    pub fn add_handler<H>(&mut self, method: Method, handler: H) -> Result<()>
    where
        H: RequestHandler + 'static,
    {
        if self.local_addr.is_some() {
            return Err(RaopError::AlreadyRunning);
        }
        tracing::debug!(%method, "handler registered");
        self.handlers.insert(method, Arc::new(handler));
        Ok(())
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Returns the bound address (useful with port 0). Bind failures are
    /// returned as-is; nothing is retried.
    pub fn start(&mut self, bind_addr: impl ToSocketAddrs, verbose: bool) -> Result<SocketAddr> {
        if self.local_addr.is_some() {
            return Err(RaopError::AlreadyRunning);
        }

        let listener = TcpListener::bind(bind_addr)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let shared = Arc::new(Shared {
            handlers: self.handlers.clone(),
            dump: self.dump.clone(),
            verbose,
        });

        self.running.store(true, Ordering::SeqCst);
        self.local_addr = Some(local_addr);

        let running = self.running.clone();
        let poll_interval = self.config.accept_poll_interval;

        tracing::info!(addr = %local_addr, handlers = ?self.handlers, "RTSP server listening");

        thread::spawn(move || {
            tcp::accept_loop(listener, shared, running, poll_interval);
        });

        Ok(local_addr)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("server stopping");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.local_addr.ok_or(RaopError::NotStarted)
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}
