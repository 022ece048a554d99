use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, instrument, trace, warn};

use crate::config::ClientConfig;
use crate::connector::{Connector, TcpConnector};
use crate::error::{Error, Result};
use crate::id::{Id, Ids};
use crate::wire::{self, FRAME_LEN};

/// What a non-blocking look at an idle connection found.
#[derive(Debug)]
enum Liveness {
    /// Nothing pending, the connection can carry the next request.
    Idle,
    /// The server closed its side.
    Closed,
    /// Bytes past the end of the previous response.
    Unread(Vec<u8>),
}

/// Blocking client for a noeqd server.
///
/// Holds at most one TCP connection, opened on first use and replaced
/// whenever it is found broken. Requests are strictly sequential: each
/// [`generate`](IdClient::generate) sends one request frame and reads all
/// of its response frames before returning.
///
/// `generate` takes `&mut self`; share a client across threads behind a lock.
pub struct IdClient<C = TcpConnector> {
    config: ClientConfig,
    connector: C,
    /// `None` while no connection is established.
    stream: Option<TcpStream>,
}

impl IdClient {
    /// Create a client for `host:port` with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_config(ClientConfig::new(host, port))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl Default for IdClient {
    fn default() -> Self {
        Self::with_config(ClientConfig::default())
    }
}

impl<C: Connector> IdClient<C> {
    /// Create a client that opens its connections through `connector`.
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            stream: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a connection is currently held. The server may still have
    /// closed it; that is only detected on the next request.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Requests `count` identifiers (1 to 255).
    ///
    /// Returns [`Ids::One`] when a single identifier was requested and
    /// [`Ids::Many`] otherwise, in the order the server sent them.
    ///
    /// Connection failures while connecting or sending are retried on a
    /// fresh connection up to [`ClientConfig::max_attempts`] times in total.
    /// Failures while reading the response are returned immediately and the
    /// connection is dropped, so the next call starts from a new one.
    pub fn generate(&mut self, count: usize) -> Result<Ids> {
        self.exchange(count).map(Ids::from_vec)
    }

    /// Requests a single identifier.
    pub fn generate_one(&mut self) -> Result<Id> {
        let ids = self.exchange(1)?;
        Ok(ids[0])
    }

    /// Closes the connection, if any.
    ///
    /// Safe to call repeatedly, and when the server already went away.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Fails with ENOTCONN once the peer has reset the connection.
            let _ = stream.shutdown(Shutdown::Both);
            debug!("disconnected");
        }
    }

    #[instrument(
        level = "debug",
        skip(self),
        fields(host = %self.config.host, port = self.config.port)
    )]
    fn exchange(&mut self, count: usize) -> Result<Vec<Id>> {
        let request = wire::encode_request(count)?;
        self.config.validate()?;

        self.discard_stale()?;
        self.send_request(&request)?;

        match self.read_ids(count) {
            Ok(ids) => Ok(ids),
            Err(err) => {
                debug!(error = %err, "dropping connection after failed read");
                self.disconnect();
                Err(err)
            }
        }
    }

    /// Checks a kept connection before reusing it.
    ///
    /// A connection the server closed is dropped so the request goes out on a
    /// new one. Leftover bytes mean the previous response overran its frames.
    fn discard_stale(&mut self) -> Result<()> {
        let Some(stream) = &self.stream else {
            return Ok(());
        };

        match probe(stream) {
            Ok(Liveness::Idle) => Ok(()),
            Ok(Liveness::Closed) => {
                debug!("server closed the connection, reconnecting");
                self.disconnect();
                Ok(())
            }
            Ok(Liveness::Unread(received)) => {
                warn!(bytes = received.len(), "unexpected bytes after last response");
                self.disconnect();
                Err(Error::MalformedResponse { received })
            }
            Err(err) => {
                debug!(error = %err, "connection unusable, reconnecting");
                self.disconnect();
                Ok(())
            }
        }
    }

    fn send_request(&mut self, request: &[u8]) -> Result<()> {
        let mut addrs = Vec::new();
        let mut failures = 0;

        loop {
            if self.stream.is_none() && addrs.is_empty() {
                addrs = self.resolve()?;
            }

            match self.try_send(&addrs, request) {
                Ok(()) => return Ok(()),
                Err(source) => {
                    self.disconnect();
                    failures += 1;

                    if failures >= self.config.max_attempts || !is_transient(&source) {
                        return Err(Error::Connection {
                            attempts: failures,
                            source,
                        });
                    }
                    warn!(attempt = failures, error = %source, "connection failed, retrying");
                }
            }
        }
    }

    fn try_send(&mut self, addrs: &[SocketAddr], request: &[u8]) -> io::Result<()> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.open(addrs)?,
        };
        self.stream.insert(stream).write_all(request)
    }

    /// Connects to the first address that accepts.
    fn open(&self, addrs: &[SocketAddr]) -> io::Result<TcpStream> {
        let mut last_err = None;

        for addr in addrs {
            debug!(%addr, "connecting");
            match self.connector.connect(addr, self.config.connect_timeout) {
                Ok(stream) => {
                    stream.set_write_timeout(Some(self.config.connect_timeout))?;
                    stream.set_read_timeout(Some(self.config.read_timeout))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no address to connect to")
        }))
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>> {
        let ClientConfig { host, port, .. } = &self.config;
        let resolve_error = |source: io::Error| Error::Resolve {
            host: host.clone(),
            port: *port,
            source,
        };

        let addrs: Vec<SocketAddr> = (host.as_str(), *port)
            .to_socket_addrs()
            .map_err(resolve_error)?
            .collect();

        if addrs.is_empty() {
            return Err(resolve_error(io::Error::new(
                io::ErrorKind::NotFound,
                "host resolved to no addresses",
            )));
        }
        Ok(addrs)
    }

    fn read_ids(&mut self, count: usize) -> Result<Vec<Id>> {
        let read_timeout = self.config.read_timeout;
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::Disconnected);
        };

        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let frame = read_frame(stream, read_timeout)?;
            let id = wire::decode_id(&frame)?;
            trace!(%id, "received id");
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Reads one frame. Every read is bounded by the socket's read timeout, so a
/// server that goes quiet mid-frame fails the read instead of hanging.
fn read_frame(stream: &mut TcpStream, read_timeout: Duration) -> Result<[u8; FRAME_LEN]> {
    let mut frame = [0u8; FRAME_LEN];
    let mut filled = 0;

    while filled < FRAME_LEN {
        match stream.read(&mut frame[filled..]) {
            Ok(0) if filled == 0 => return Err(Error::Disconnected),
            Ok(0) => {
                return Err(Error::MalformedResponse {
                    received: frame[..filled].to_vec(),
                });
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) if is_timeout(&err) && filled == 0 => {
                return Err(Error::ReadTimeout(read_timeout));
            }
            Err(err) if is_timeout(&err) => {
                return Err(Error::MalformedResponse {
                    received: frame[..filled].to_vec(),
                });
            }
            Err(err) if is_reset(&err) && filled == 0 => return Err(Error::Disconnected),
            Err(err) => return Err(Error::Io(err)),
        }
    }
    Ok(frame)
}

fn probe(stream: &TcpStream) -> io::Result<Liveness> {
    let mut buf = [0u8; 64];
    let mut reader = stream;

    stream.set_nonblocking(true)?;
    let result = reader.read(&mut buf);
    stream.set_nonblocking(false)?;

    match result {
        Ok(0) => Ok(Liveness::Closed),
        Ok(n) => Ok(Liveness::Unread(buf[..n].to_vec())),
        Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(Liveness::Idle),
        Err(err) => Err(err),
    }
}

/// Read timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn is_reset(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
    )
}

/// Connection failures worth another attempt on a fresh socket.
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock
    )
}
