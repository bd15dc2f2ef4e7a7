use std::fmt;
use std::io::BufRead;

use super::{DEFAULT_PROTOCOL, Headers, Request};
use crate::error::{ParseErrorKind, RaopError, Result};

/// A control response.
///
/// Serializes to:
///
/// ```text
/// RTSP/1.0 200 OK\r\n
/// CSeq: 1\r\n
/// Audio-Jack-Status: connected; type=analog\r\n
/// \r\n
/// ```
///
/// Handlers receive a response already carrying the request's protocol and
/// `CSeq` and mutate it in place. `Content-Length` is computed at
/// serialization time when a body is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub status_text: String,
    pub protocol: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Response {
            status_code: 200,
            status_text: "OK".to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }
}

impl Response {
    /// 200 OK with the default protocol.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh 200 OK answering `request`: same protocol, verbatim `CSeq`.
    pub fn for_request(request: &Request) -> Self {
        let mut response = Response {
            protocol: request.protocol.clone(),
            ..Self::default()
        };
        if let Some(cseq) = request.cseq() {
            response.headers.insert("CSeq", cseq);
        }
        response
    }

    pub fn set_status(&mut self, code: u16, text: &str) {
        self.status_code = code;
        self.status_text = text.to_string();
    }

    pub fn bad_request(&mut self) {
        self.set_status(400, "Bad Request");
    }

    pub fn not_found(&mut self) {
        self.set_status(404, "Not Found");
    }

    pub fn internal_error(&mut self) {
        self.set_status(500, "Internal Server Error");
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn cseq(&self) -> Option<&str> {
        self.headers.get("CSeq")
    }

    /// Read a response from a stream (client side of the protocol).
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Option<Self>> {
        let Some(head) = super::read_head(reader)? else {
            return Ok(None);
        };

        let mut lines = head.lines();
        let status_line = lines
            .next()
            .ok_or(RaopError::parse(ParseErrorKind::InvalidStatusLine))?;

        let mut parts = status_line.splitn(3, ' ');
        let protocol = parts.next().unwrap_or_default().to_string();
        let status_code = parts
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or(RaopError::parse(ParseErrorKind::InvalidStatusLine))?;
        let status_text = parts.next().unwrap_or_default().trim().to_string();

        let headers = super::parse_headers(lines)?;
        let body = super::read_body(reader, &headers)?;

        Ok(Some(Response {
            status_code,
            status_text,
            protocol,
            headers,
            body,
        }))
    }

    /// Serialize to the wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!(
            "{} {} {}\r\n",
            self.protocol, self.status_code, self.status_text
        )
        .into_bytes();
        super::write_tail(&mut out, &self.headers, &self.body);
        out
    }
}

/// Human-readable dump used for verbose logging and traffic dumps.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {} {}", self.status_code, self.status_text)?;
        writeln!(f, "Protocol: {}", self.protocol)?;
        for (name, value) in self.headers.iter() {
            writeln!(f, "Header: {name}: {value}")?;
        }
        write!(f, "Body: {}", String::from_utf8_lossy(&self.body))
    }
}
