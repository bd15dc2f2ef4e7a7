use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use super::{Method, Request, Response};

/// Caller-supplied logic for one control method.
///
/// The handler receives a response already carrying the request's protocol
/// and `CSeq` and mutates it in place. This is where streaming sessions get
/// created and configured. Handlers run on the connection's thread and may
/// be called concurrently from several connections.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &Request, response: &mut Response, local: IpAddr, remote: IpAddr);
}

impl<F> RequestHandler for F
where
    F: Fn(&Request, &mut Response, IpAddr, IpAddr) + Send + Sync,
{
    fn handle(&self, request: &Request, response: &mut Response, local: IpAddr, remote: IpAddr) {
        self(request, response, local, remote)
    }
}

/// Method-keyed handler table.
///
/// Filled before the server starts, then shared read-only between
/// connection threads.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<Method, Arc<dyn RequestHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method`, replacing any previous one.
    pub fn insert(&mut self, method: Method, handler: Arc<dyn RequestHandler>) {
        self.handlers.insert(method, handler);
    }

    pub fn get(&self, method: &Method) -> Option<&Arc<dyn RequestHandler>> {
        self.handlers.get(method)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered methods, for the `Public` header of an OPTIONS reply.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.handlers.keys()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
