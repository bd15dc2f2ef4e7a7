use super::{Request, Response};

/// Optional sink for control traffic diagnostics.
///
/// The server calls [`request`](Self::request) for every request it reads
/// and [`exchange`](Self::exchange) once a response has been produced.
/// Requests without a registered handler only reach `request`. Where the
/// data goes (files, a ring buffer, nowhere) is up to the implementation.
pub trait TrafficDump: Send + Sync {
    fn request(&self, request: &Request);

    fn exchange(&self, request: &Request, response: &Response);
}
