//! Error types for the RAOP receiver library.

use std::fmt;

/// Errors that can occur in the RAOP receiver library.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Metadata**: [`OutOfBounds`](Self::OutOfBounds),
///   [`Format`](Self::Format) — malformed DAAP/DMAP buffers.
/// - **Protocol**: [`Parse`](Self::Parse) — malformed control messages.
/// - **Transport**: [`Io`](Self::Io) — socket/network failures.
/// - **Server**: [`NotStarted`](Self::NotStarted),
///   [`AlreadyRunning`](Self::AlreadyRunning).
/// - **Session**: [`SessionClosed`](Self::SessionClosed),
///   [`InvalidState`](Self::InvalidState), [`Decrypt`](Self::Decrypt).
#[derive(Debug, thiserror::Error)]
pub enum RaopError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A chunk declared more content than the buffer has left.
    #[error("chunk '{tag}' declares {declared} bytes but only {remaining} remain")]
    OutOfBounds {
        tag: String,
        declared: usize,
        remaining: usize,
    },

    /// The buffer is structurally invalid.
    #[error("DAAP format error: {0}")]
    Format(FormatErrorKind),

    /// Failed to parse a control-protocol message.
    #[error("RTSP parse error: {kind}")]
    Parse { kind: ParseErrorKind },

    /// [`Server::start`](crate::Server::start) has not been called yet.
    #[error("server not started")]
    NotStarted,

    /// The server is already serving; its handler registry is frozen.
    #[error("server already running")]
    AlreadyRunning,

    /// The session was closed and cannot be reused.
    #[error("session closed")]
    SessionClosed,

    /// The operation is not valid in the session's current state.
    #[error("cannot {operation} in session state {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// A [`Decrypter`](crate::session::Decrypter) rejected a datagram.
    #[error("decrypt error: {0}")]
    Decrypt(String),
}

/// Specific kind of DAAP/DMAP format failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// A fixed-width scalar had the wrong number of content bytes.
    WrongWidth {
        tag: String,
        expected: usize,
        actual: usize,
    },
    /// Trailing bytes too short to hold another chunk header.
    TruncatedHeader { remaining: usize },
    /// Containers nested beyond the supported depth.
    TooDeep,
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongWidth {
                tag,
                expected,
                actual,
            } => write!(f, "tag '{tag}' expects {expected} bytes, got {actual}"),
            Self::TruncatedHeader { remaining } => {
                write!(f, "{remaining} trailing bytes cannot form a chunk header")
            }
            Self::TooDeep => write!(f, "containers nested too deeply"),
        }
    }
}

/// Specific kind of control-protocol parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input was empty (no request line).
    EmptyRequest,
    /// Request line did not have the expected `Method URI Version` format.
    InvalidRequestLine,
    /// Status line did not have the expected `Version Code Reason` format.
    InvalidStatusLine,
    /// A header line did not contain a colon separator.
    InvalidHeader,
    /// `Content-Length` was present but not a non-negative integer.
    InvalidContentLength,
    /// The message head exceeded the size limit before its blank line.
    HeadTooLarge,
    /// `Content-Length` exceeded the body size limit.
    BodyTooLarge,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRequest => write!(f, "empty request"),
            Self::InvalidRequestLine => write!(f, "invalid request line"),
            Self::InvalidStatusLine => write!(f, "invalid status line"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::InvalidContentLength => write!(f, "invalid content length"),
            Self::HeadTooLarge => write!(f, "message head too large"),
            Self::BodyTooLarge => write!(f, "message body too large"),
        }
    }
}

impl RaopError {
    pub(crate) fn parse(kind: ParseErrorKind) -> Self {
        RaopError::Parse { kind }
    }
}

/// Convenience alias for `Result<T, RaopError>`.
pub type Result<T> = std::result::Result<T, RaopError>;
