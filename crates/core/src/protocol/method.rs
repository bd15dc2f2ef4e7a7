use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Control-protocol verb.
///
/// AirPlay senders use the RTSP method set plus a few HTTP verbs on the
/// same connection (`POST /pair-setup`, `GET /info`). Anything else parses
/// to [`Method::Other`] so new verbs never fail the request line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Options,
    Announce,
    Describe,
    Setup,
    Record,
    Play,
    Pause,
    Flush,
    Teardown,
    GetParameter,
    SetParameter,
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Options => "OPTIONS",
            Method::Announce => "ANNOUNCE",
            Method::Describe => "DESCRIBE",
            Method::Setup => "SETUP",
            Method::Record => "RECORD",
            Method::Play => "PLAY",
            Method::Pause => "PAUSE",
            Method::Flush => "FLUSH",
            Method::Teardown => "TEARDOWN",
            Method::GetParameter => "GET_PARAMETER",
            Method::SetParameter => "SET_PARAMETER",
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(name) => name,
        }
    }
}

impl FromStr for Method {
    type Err = Infallible;

    /// Method names are case-sensitive, as on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "OPTIONS" => Method::Options,
            "ANNOUNCE" => Method::Announce,
            "DESCRIBE" => Method::Describe,
            "SETUP" => Method::Setup,
            "RECORD" => Method::Record,
            "PLAY" => Method::Play,
            "PAUSE" => Method::Pause,
            "FLUSH" => Method::Flush,
            "TEARDOWN" => Method::Teardown,
            "GET_PARAMETER" => Method::GetParameter,
            "SET_PARAMETER" => Method::SetParameter,
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        })
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(method) => method,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
