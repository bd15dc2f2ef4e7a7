use std::fmt;
use std::io::BufRead;

use super::{DEFAULT_PROTOCOL, Headers, Method};
use crate::error::{ParseErrorKind, RaopError, Result};

/// A parsed control request.
///
/// ```text
/// Method SP Request-URI SP Protocol/Version CRLF
/// *(Header: Value CRLF)
/// CRLF
/// [body of Content-Length bytes]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Request-URI (e.g. `rtsp://10.0.0.2/3413821438` or `*`).
    pub uri: String,
    /// Protocol version as received, e.g. `RTSP/1.0`.
    pub protocol: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, uri: &str) -> Self {
        Request {
            method,
            uri: uri.to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Read the next request from a stream.
    ///
    /// Returns `Ok(None)` when the peer closed the stream between requests.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Option<Self>> {
        let Some(head) = super::read_head(reader)? else {
            return Ok(None);
        };
        let mut request = Self::parse_head(&head)?;
        request.body = super::read_body(reader, &request.headers)?;
        Ok(Some(request))
    }

    /// Parse a complete request (head and body) from bytes.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut reader = raw;
        Self::read_from(&mut reader)?.ok_or(RaopError::parse(ParseErrorKind::EmptyRequest))
    }

    fn parse_head(head: &str) -> Result<Self> {
        let mut lines = head.lines();

        let request_line = lines
            .next()
            .ok_or(RaopError::parse(ParseErrorKind::EmptyRequest))?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(RaopError::parse(ParseErrorKind::InvalidRequestLine));
        }

        let method = Method::from(parts[0]);
        let uri = parts[1].to_string();
        let protocol = parts[2].to_string();

        if !protocol.starts_with("RTSP/") && !protocol.starts_with("HTTP/") {
            tracing::warn!(%protocol, "request with unexpected protocol");
        }

        let headers = super::parse_headers(lines)?;

        Ok(Request {
            method,
            uri,
            protocol,
            headers,
            body: Vec::new(),
        })
    }

    /// The `CSeq` header, which pairs a response with its request.
    pub fn cseq(&self) -> Option<&str> {
        self.headers.get("CSeq")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// Serialize to the wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} {}\r\n", self.method, self.uri, self.protocol).into_bytes();
        super::write_tail(&mut out, &self.headers, &self.body);
        out
    }
}

/// Human-readable dump used for verbose logging and traffic dumps.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request URI: {}", self.uri)?;
        writeln!(f, "Request Method: {}", self.method)?;
        writeln!(f, "Protocol: {}", self.protocol)?;
        for (name, value) in self.headers.iter() {
            writeln!(f, "Header: {name}: {value}")?;
        }
        write!(f, "Body: {}", String::from_utf8_lossy(&self.body))
    }
}
