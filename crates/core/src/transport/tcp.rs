use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::protocol::{HandlerRegistry, Request, Response, TrafficDump};

/// State shared by every connection of one server.
pub(crate) struct Shared {
    pub handlers: HandlerRegistry,
    pub dump: Option<Arc<dyn TrafficDump>>,
    pub verbose: bool,
}

/// Non-blocking TCP accept loop.
///
/// Checks the `running` flag between accepts with `poll_interval` sleeps
/// so that [`crate::server::Server::stop`] can terminate it promptly.
/// Connections already accepted keep running after the loop exits.
pub(crate) fn accept_loop(
    listener: TcpListener,
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, _)) => {
                if stream.set_nonblocking(false).is_err() {
                    continue;
                }
                let shared = shared.clone();
                thread::spawn(move || {
                    Connection::handle(stream, shared);
                });
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(poll_interval);
            }
            Err(e) => {
                if running.load(Ordering::SeqCst) {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            }
        }
    }
    tracing::debug!("accept loop exited");
}

/// A single control connection with its own lifecycle.
struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    shared: Arc<Shared>,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
}

impl Connection {
    /// Entry point: set up a connection and run its request loop.
    fn handle(stream: TcpStream, shared: Arc<Shared>) {
        let (peer_addr, local_addr) = match (stream.peer_addr(), stream.local_addr()) {
            (Ok(peer), Ok(local)) => (peer, local),
            _ => return,
        };

        tracing::info!(%peer_addr, "client connected");

        let reader_stream = match stream.try_clone() {
            Ok(s) => s,
            Err(_) => return,
        };

        let mut conn = Connection {
            reader: BufReader::new(reader_stream),
            writer: stream,
            shared,
            local_addr,
            peer_addr,
        };

        let reason = conn.run();

        tracing::info!(%peer_addr, reason, "client disconnected");
    }

    /// Request/response loop. Returns the reason for exiting.
    ///
    /// One request is in flight at a time: the next read starts only after
    /// the previous response has been written.
    fn run(&mut self) -> &'static str {
        loop {
            let request = match Request::read_from(&mut self.reader) {
                Ok(Some(request)) => request,
                Ok(None) => return "connection closed by client",
                Err(e) => {
                    tracing::warn!(peer = %self.peer_addr, error = %e, "read error");
                    return "read error";
                }
            };

            self.log_request(&request);
            if let Some(dump) = &self.shared.dump {
                dump.request(&request);
            }

            let Some(handler) = self.shared.handlers.get(&request.method) else {
                tracing::warn!(
                    peer = %self.peer_addr,
                    method = %request.method,
                    cseq = request.cseq().unwrap_or("-"),
                    "no handler registered, skipping"
                );
                continue;
            };

            let mut response = Response::for_request(&request);
            handler.handle(
                &request,
                &mut response,
                self.local_addr.ip(),
                self.peer_addr.ip(),
            );

            self.log_response(&response);
            if let Some(dump) = &self.shared.dump {
                dump.exchange(&request, &response);
            }

            if let Err(e) = self
                .writer
                .write_all(&response.to_bytes())
                .and_then(|_| self.writer.flush())
            {
                tracing::warn!(peer = %self.peer_addr, error = %e, "write error");
                return "write error";
            }
        }
    }

    fn log_request(&self, request: &Request) {
        if self.shared.verbose {
            tracing::info!(peer = %self.peer_addr, "received request\n{request}");
        } else {
            tracing::debug!(
                peer = %self.peer_addr,
                method = %request.method,
                uri = %request.uri,
                cseq = request.cseq().unwrap_or("-"),
                "request"
            );
        }
    }

    fn log_response(&self, response: &Response) {
        if self.shared.verbose {
            tracing::info!(peer = %self.peer_addr, "outbound response\n{response}");
        } else {
            tracing::debug!(
                peer = %self.peer_addr,
                status = response.status_code,
                "response"
            );
        }
    }
}
