use std::net::{IpAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use raop::daap;
use raop::{Method, PortSet, Request, Response, Server, Session};

/// Methods answered in `Public`.
const PUBLIC: &str =
    "ANNOUNCE, SETUP, RECORD, PAUSE, FLUSH, TEARDOWN, OPTIONS, GET_PARAMETER, SET_PARAMETER";

/// Sender-side latency advertised on RECORD, in samples at 44.1 kHz.
const AUDIO_LATENCY: &str = "11025";

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// The one stream this receiver plays at a time.
struct Stream {
    session: Session<String>,
    // Bound so the ports advertised on SETUP exist; sync and timing
    // packets are not interpreted.
    _control: UdpSocket,
    _timing: UdpSocket,
}

/// Shared receiver state behind the control handlers.
#[derive(Default)]
pub struct Receiver {
    announced: Mutex<Option<Session<String>>>,
    stream: Mutex<Option<Stream>>,
}

impl Receiver {
    /// Register every handler on `server`.
    pub fn install(self: Arc<Self>, server: &mut Server) -> raop::Result<()> {
        server.add_handler(Method::Options, options)?;
        server.add_handler(Method::GetParameter, get_parameter)?;
        server.add_handler(Method::SetParameter, set_parameter)?;
        server.add_handler(Method::Flush, flush)?;
        server.add_handler(Method::Pause, flush)?;

        let this = self.clone();
        server.add_handler(
            Method::Announce,
            move |req: &Request, resp: &mut Response, _: IpAddr, _: IpAddr| {
                this.announce(req, resp)
            },
        )?;
        let this = self.clone();
        server.add_handler(
            Method::Setup,
            move |req: &Request, resp: &mut Response, _: IpAddr, remote: IpAddr| {
                this.setup(req, resp, remote)
            },
        )?;
        let this = self.clone();
        server.add_handler(
            Method::Record,
            move |req: &Request, resp: &mut Response, _: IpAddr, _: IpAddr| {
                this.record(req, resp)
            },
        )?;
        let this = self;
        server.add_handler(
            Method::Teardown,
            move |req: &Request, resp: &mut Response, _: IpAddr, _: IpAddr| {
                this.teardown(req, resp)
            },
        )?;
        Ok(())
    }

    fn announce(&self, req: &Request, _resp: &mut Response) {
        let sdp = String::from_utf8_lossy(&req.body).into_owned();
        if sdp.contains("a=rsaaeskey") {
            tracing::warn!("stream is encrypted; packets are delivered undecrypted");
        }
        tracing::info!(uri = %req.uri, "stream announced");
        tracing::debug!("SDP:\n{sdp}");

        *self.announced.lock() = Some(Session::new(sdp, None));
    }

    fn setup(&self, req: &Request, resp: &mut Response, remote: IpAddr) {
        let Some(mut session) = self.announced.lock().take() else {
            tracing::warn!("SETUP before ANNOUNCE");
            resp.set_status(455, "Method Not Valid in This State");
            return;
        };

        let remote_ports = req
            .headers
            .get("Transport")
            .and_then(|t| PortSet::from_transport(remote.to_string(), t));
        let Some(remote_ports) = remote_ports else {
            tracing::warn!("SETUP with missing or invalid Transport header");
            resp.bad_request();
            return;
        };
        session.remote_ports = remote_ports;

        let bound = session.init_receive().and_then(|()| {
            let control = UdpSocket::bind("0.0.0.0:0")?;
            let timing = UdpSocket::bind("0.0.0.0:0")?;
            Ok((control, timing))
        });
        let (control, timing) = match bound {
            Ok(sockets) => sockets,
            Err(e) => {
                tracing::error!(error = %e, "failed to bind stream sockets");
                resp.internal_error();
                return;
            }
        };

        session.local_ports.control = control.local_addr().map(|a| a.port()).unwrap_or(0);
        session.local_ports.timing = timing.local_addr().map(|a| a.port()).unwrap_or(0);

        resp.headers
            .insert("Transport", session.local_ports.transport_response());
        resp.headers.insert("Session", "1");
        resp.headers
            .insert("Audio-Jack-Status", "connected; type=analog");

        tracing::info!(
            remote = %remote,
            data_port = session.local_ports.data,
            control_port = session.local_ports.control,
            timing_port = session.local_ports.timing,
            "stream set up"
        );

        let previous = self.stream.lock().replace(Stream {
            session,
            _control: control,
            _timing: timing,
        });
        if let Some(previous) = previous {
            close_stream(previous);
        }
    }

    fn record(&self, _req: &Request, resp: &mut Response) {
        let mut guard = self.stream.lock();
        let Some(stream) = guard.as_mut() else {
            resp.set_status(455, "Method Not Valid in This State");
            return;
        };

        if let Err(e) = stream.session.start_receiving() {
            tracing::warn!(error = %e, "RECORD could not start receiving");
            resp.set_status(455, "Method Not Valid in This State");
            return;
        }

        let packets = stream.session.data_channel();
        thread::spawn(move || {
            let mut count: u64 = 0;
            let mut bytes: u64 = 0;
            for packet in packets.iter() {
                count += 1;
                bytes += packet.len() as u64;
                if count % 1000 == 0 {
                    tracing::debug!(count, bytes, "audio packets received");
                }
            }
            tracing::info!(count, bytes, "audio stream ended");
        });

        resp.headers.insert("Audio-Latency", AUDIO_LATENCY);
    }

    fn teardown(&self, _req: &Request, _resp: &mut Response) {
        let stream = self.stream.lock().take();
        match stream {
            Some(stream) => close_stream(stream),
            None => tracing::debug!("TEARDOWN without a stream"),
        }
        self.announced.lock().take();
    }
}

fn close_stream(mut stream: Stream) {
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    stream.session.close(done_tx);
    if done_rx.recv_timeout(CLOSE_TIMEOUT).is_err() {
        tracing::warn!("session did not confirm close in time");
    }
}

fn options(_: &Request, resp: &mut Response, _: IpAddr, _: IpAddr) {
    resp.headers.insert("Public", PUBLIC);
}

fn get_parameter(req: &Request, resp: &mut Response, _: IpAddr, _: IpAddr) {
    if String::from_utf8_lossy(&req.body).contains("volume") {
        resp.headers.insert("Content-Type", "text/parameters");
        resp.body = b"volume: 0.000000\r\n".to_vec();
    }
}

fn set_parameter(req: &Request, resp: &mut Response, _: IpAddr, _: IpAddr) {
    match req.content_type() {
        Some("application/x-dmap-tagged") => match daap::decode(&req.body) {
            Ok(track) => {
                let field = |name: &str| {
                    track
                        .get(name)
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string()
                };
                tracing::info!(
                    title = %field("dmap.itemname"),
                    artist = %field("daap.songartist"),
                    album = %field("daap.songalbum"),
                    "now playing"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "invalid track metadata");
                resp.bad_request();
            }
        },
        Some("text/parameters") => {
            for line in String::from_utf8_lossy(&req.body).lines() {
                if let Some(volume) = line.strip_prefix("volume:") {
                    tracing::info!(volume = volume.trim(), "volume changed");
                }
            }
        }
        Some(other) => tracing::debug!(content_type = other, "ignoring parameter"),
        None => {}
    }
}

fn flush(req: &Request, _: &mut Response, _: IpAddr, _: IpAddr) {
    tracing::debug!(method = %req.method, "playback interrupted");
}
