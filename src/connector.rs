use std::io;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

/// Opens the TCP stream a client talks over.
///
/// [`TcpConnector`] is the only implementation the crate ships. The trait
/// exists so callers can wrap connection setup, e.g. to count or fail
/// attempts.
pub trait Connector {
    fn connect(&self, addr: &SocketAddr, timeout: Duration) -> io::Result<TcpStream>;
}

/// Plain `connect(2)` bounded by a timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(&self, addr: &SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
        TcpStream::connect_timeout(addr, timeout)
    }
}

impl<C: Connector + ?Sized> Connector for &C {
    fn connect(&self, addr: &SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
        (**self).connect(addr, timeout)
    }
}
