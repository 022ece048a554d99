//! Error types for the noeqd client.
//!
//! Errors fall into three groups, and only the first is ever retried:
//! - connection failures while connecting or sending the request
//!   ([`Error::Connection`]), retried up to the attempt cap of a call;
//! - read failures while waiting for response frames ([`Error::ReadTimeout`],
//!   [`Error::Disconnected`], [`Error::MalformedResponse`], [`Error::Io`]);
//! - caller or configuration mistakes rejected before any I/O
//!   ([`Error::InvalidCount`], [`Error::InvalidConfig`],
//!   [`Error::InvalidAddress`], [`Error::Url`], [`Error::Resolve`]).

use std::io;
use std::time::Duration;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The requested count does not fit the one-byte request frame.
    #[error("invalid id count {0}: must be between 1 and 255")]
    InvalidCount(usize),

    /// A service URL with an unsupported scheme or no host.
    #[error("invalid service address: {reason}")]
    InvalidAddress { reason: String },

    /// A client setting that cannot be applied to a socket, such as a zero
    /// timeout.
    #[error("invalid client configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid service url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Connecting or sending the request failed. `source` is the error of the
    /// last attempt.
    #[error("connection failed after {attempts} attempt(s): {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: io::Error,
    },

    /// No data arrived within the idle read window.
    #[error("read timed out after {}ms", .0.as_millis())]
    ReadTimeout(Duration),

    /// The server closed the connection before a frame arrived.
    #[error("connection closed by server while waiting for a response")]
    Disconnected,

    /// A response frame was short, or bytes were left over past the last frame.
    #[error("malformed response: {received:02x?}")]
    MalformedResponse { received: Vec<u8> },

    #[error("I/O error while reading response: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True when no response data arrived within the idle read window.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ReadTimeout(_))
    }

    /// True when the failure happened while establishing the connection or
    /// sending the request.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// The [`io::ErrorKind`] behind a connection failure.
    pub fn connection_error_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Connection { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
