//! RTSP-style control protocol used by AirPlay senders.
//!
//! This module handles the text-based signaling — parsing and serializing
//! requests and responses, and the handler seam used to dispatch them.
//!
//! ## Message format
//!
//! Messages follow HTTP/1.1 syntax:
//!
//! ```text
//! ANNOUNCE rtsp://10.0.0.2/3413821438 RTSP/1.0\r\n
//! CSeq: 3\r\n
//! Content-Type: application/sdp\r\n
//! Content-Length: 348\r\n
//! \r\n
//! v=0\r\n...
//! ```
//!
//! Responses echo the protocol/version and `CSeq` of the request they
//! answer. Header names and values are opaque strings to this layer.

pub mod dump;
pub mod handler;
pub mod headers;
pub mod method;
pub mod request;
pub mod response;

use std::io::{BufRead, Read};

pub use dump::TrafficDump;
pub use handler::{HandlerRegistry, RequestHandler};
pub use headers::Headers;
pub use method::Method;
pub use request::Request;
pub use response::Response;

use crate::error::{ParseErrorKind, RaopError, Result};

/// Protocol/version used when none is echoed from a request.
pub const DEFAULT_PROTOCOL: &str = "RTSP/1.0";

/// Upper bound on the start line plus headers of one message.
pub const MAX_HEAD_LEN: usize = 64 * 1024;

/// Upper bound on a message body.
pub const MAX_BODY_LEN: usize = 16 * 1024 * 1024;

/// Read one message head (start line through the blank line).
///
/// Blank lines before the start line are skipped. Returns `Ok(None)` on a
/// clean EOF between messages.
pub(crate) fn read_head<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut head = String::new();
    loop {
        let mut line = String::new();
        let budget = (MAX_HEAD_LEN + 1).saturating_sub(head.len()) as u64;
        let n = reader.by_ref().take(budget).read_line(&mut line)?;

        if n == 0 {
            if head.is_empty() {
                return Ok(None);
            }
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }

        let blank = line == "\r\n" || line == "\n";
        if blank && head.is_empty() {
            continue;
        }

        head.push_str(&line);
        if blank {
            return Ok(Some(head));
        }
        if head.len() > MAX_HEAD_LEN {
            return Err(RaopError::parse(ParseErrorKind::HeadTooLarge));
        }
    }
}

/// Parse `Name: value` lines following the start line.
pub(crate) fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Headers> {
    let mut headers = Headers::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let colon_pos = line
            .find(':')
            .ok_or(RaopError::parse(ParseErrorKind::InvalidHeader))?;

        let name = line[..colon_pos].trim();
        let value = line[colon_pos + 1..].trim();
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Read the body announced by `Content-Length`.
pub(crate) fn read_body<R: BufRead>(reader: &mut R, headers: &Headers) -> Result<Vec<u8>> {
    let len = headers.content_length()?;
    if len > MAX_BODY_LEN {
        return Err(RaopError::parse(ParseErrorKind::BodyTooLarge));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(body)
}

/// Append header lines, `Content-Length` (when there is a body), the blank
/// line and the body.
///
/// Any `Content-Length` already in `headers` is ignored in favor of the
/// actual body length.
pub(crate) fn write_tail(out: &mut Vec<u8>, headers: &Headers, body: &[u8]) {
    for (name, value) in headers.iter() {
        if name.eq_ignore_ascii_case("Content-Length") {
            continue;
        }
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    if !body.is_empty() {
        out.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
}
