//! # noeq
//!
//! Blocking client for [noeqd](https://github.com/bmizerany/noeqd), a network
//! service handing out unique 64-bit identifiers.
//!
//! The protocol is a single request byte carrying the number of identifiers
//! wanted (1 to 255), answered by that many 8-byte big-endian integers. See
//! [`wire`] for the exact framing.
//!
//! ## Usage
//!
//! ```no_run
//! use noeq::{IdClient, Ids};
//!
//! let mut client = IdClient::new("127.0.0.1", 4444);
//!
//! let id = client.generate_one()?;
//! println!("{id}");
//!
//! match client.generate(3)? {
//!     Ids::One(id) => println!("{id}"),
//!     Ids::Many(ids) => println!("{ids:?}"),
//! }
//!
//! client.disconnect();
//! # Ok::<(), noeq::Error>(())
//! ```
//!
//! For a one-off script, [`generate`] connects, fetches and disconnects in a
//! single call against the default address.
//!
//! ## Failure handling
//!
//! Connection failures (refused, timed out, broken pipe) are retried on a fresh
//! socket, at most [`MAX_ATTEMPTS`] times per request. A server that accepts
//! but does not answer within [`READ_TIMEOUT`] fails the request with
//! [`Error::ReadTimeout`] without any retry.

mod client;
mod config;
mod connector;
mod error;
mod id;
pub mod wire;

pub use client::IdClient;
pub use config::{
    CONNECT_TIMEOUT, ClientConfig, DEFAULT_HOST, DEFAULT_PORT, MAX_ATTEMPTS, READ_TIMEOUT,
};
pub use connector::{Connector, TcpConnector};
pub use error::{Error, Result};
pub use id::{Id, Ids};

/// Fetches `count` identifiers from the server at the default address and
/// closes the connection.
pub fn generate(count: usize) -> Result<Ids> {
    let mut client = IdClient::default();
    let ids = client.generate(count);
    client.disconnect();
    ids
}

/// Fetches a single identifier from the server at the default address.
pub fn generate_one() -> Result<Id> {
    let mut client = IdClient::default();
    let id = client.generate_one();
    client.disconnect();
    id
}
