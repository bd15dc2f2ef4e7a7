/// Address plus the three UDP ports identifying one end of a stream.
///
/// ## Wire format example
///
/// ```text
/// Sender → Receiver:
///   Transport: RTP/AVP/UDP;unicast;interleaved=0-1;mode=record;control_port=6001;timing_port=6002
///
/// Receiver → Sender:
///   Transport: RTP/AVP/UDP;unicast;mode=record;server_port=53561;control_port=63379;timing_port=50607
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    pub address: String,
    pub control: u16,
    pub timing: u16,
    pub data: u16,
}

impl PortSet {
    pub fn new(address: impl Into<String>) -> Self {
        PortSet {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Fill ports from a sender's `Transport` header.
    ///
    /// Recognizes `control_port=`, `timing_port=` and `server_port=` (data)
    /// among semicolon-separated parameters. Unknown parameters are
    /// ignored; a present but unparsable port yields `None`.
    ///
    /// ```
    /// use raop::session::PortSet;
    ///
    /// let ports = PortSet::from_transport(
    ///     "10.0.0.3",
    ///     "RTP/AVP/UDP;unicast;mode=record;control_port=6001;timing_port=6002",
    /// )
    /// .unwrap();
    /// assert_eq!(ports.control, 6001);
    /// assert_eq!(ports.timing, 6002);
    /// assert_eq!(ports.data, 0);
    /// ```
    pub fn from_transport(address: impl Into<String>, header: &str) -> Option<Self> {
        let mut ports = PortSet::new(address);
        for part in header.split(';') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            let slot = match key {
                "control_port" => &mut ports.control,
                "timing_port" => &mut ports.timing,
                "server_port" => &mut ports.data,
                _ => continue,
            };
            *slot = value.trim().parse().ok()?;
        }
        Some(ports)
    }

    /// `Transport` value a receiver answers SETUP with for these local ports.
    pub fn transport_response(&self) -> String {
        format!(
            "RTP/AVP/UDP;unicast;mode=record;server_port={};control_port={};timing_port={}",
            self.data, self.control, self.timing
        )
    }
}
