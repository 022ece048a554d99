use std::time::Duration;

use url::{Host, Url};

use crate::error::{Error, Result};

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port noeqd listens on by default.
pub const DEFAULT_PORT: u16 = 4444;

/// Bound on establishing the TCP connection. Also used as the write timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Bound on waiting for the next bytes of a response frame.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Connection attempts allowed within one `generate` call.
pub const MAX_ATTEMPTS: u32 = 3;

const URL_SCHEMES: [&str; 2] = ["noeq", "tcp"];

/// Client configuration
///
/// The target address is taken as given. Picking a host per platform or from
/// the environment is left to the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host name or IP address of the noeqd server.
    pub host: String,
    pub port: u16,
    /// Bound on `connect`, also applied to writes. Must be non-zero.
    pub connect_timeout: Duration,
    /// Bound on each read while waiting for response frames. Must be non-zero.
    pub read_timeout: Duration,
    /// Connection attempts allowed within one request. Must be at least one.
    pub max_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Parses a service URL such as `noeq://10.0.0.7:4444`.
    ///
    /// Accepts the `noeq` and `tcp` schemes. The port defaults to
    /// [`DEFAULT_PORT`] when omitted.
    pub fn from_url(input: &str) -> Result<Self> {
        let url = Url::parse(input)?;

        if !URL_SCHEMES.contains(&url.scheme()) {
            return Err(Error::InvalidAddress {
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }

        // IPv6 hosts are stored without brackets so they resolve as-is.
        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => {
                return Err(Error::InvalidAddress {
                    reason: format!("missing host in `{input}`"),
                });
            }
        };

        Ok(Self::new(host, url.port().unwrap_or(DEFAULT_PORT)))
    }

    /// Checks the settings a socket cannot be configured with.
    ///
    /// Called by the client before any I/O, so a bad value surfaces as
    /// [`Error::InvalidConfig`] rather than as a connection failure.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.connect_timeout.is_zero() {
            "connect timeout must be non-zero"
        } else if self.read_timeout.is_zero() {
            "read timeout must be non-zero"
        } else if self.max_attempts == 0 {
            "at least one connection attempt is required"
        } else {
            return Ok(());
        };

        Err(Error::InvalidConfig {
            reason: reason.to_string(),
        })
    }

    /// Sets the server host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the server port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect (and write) timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the idle read timeout for response frames.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the attempt cap. Values below one are raised to one.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4444);
        assert_eq!(config.connect_timeout, Duration::from_millis(500));
        assert_eq!(config.read_timeout, Duration::from_millis(100));
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn builder() {
        let config = ClientConfig::new("ids.internal", 4545)
            .with_read_timeout(Duration::from_millis(250))
            .with_max_attempts(0);
        assert_eq!(config.host, "ids.internal");
        assert_eq!(config.port, 4545);
        assert_eq!(config.read_timeout, Duration::from_millis(250));
        assert_eq!(config.max_attempts, 1);

        let config = ClientConfig::default()
            .with_host("::1")
            .with_port(4546)
            .with_connect_timeout(Duration::from_secs(2));
        assert_eq!((config.host.as_str(), config.port), ("::1", 4546));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn zero_timeouts_are_invalid() {
        assert!(ClientConfig::default().validate().is_ok());

        for config in [
            ClientConfig::default().with_connect_timeout(Duration::ZERO),
            ClientConfig::default().with_read_timeout(Duration::ZERO),
            ClientConfig {
                max_attempts: 0,
                ..ClientConfig::default()
            },
        ] {
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn from_url() {
        let config = ClientConfig::from_url("noeq://localhost:5555").unwrap();
        assert_eq!((config.host.as_str(), config.port), ("localhost", 5555));

        let config = ClientConfig::from_url("tcp://10.0.0.1").unwrap();
        assert_eq!((config.host.as_str(), config.port), ("10.0.0.1", DEFAULT_PORT));

        let config = ClientConfig::from_url("noeq://[::1]:4546").unwrap();
        assert_eq!((config.host.as_str(), config.port), ("::1", 4546));
    }

    #[test]
    fn from_url_rejects_other_schemes() {
        assert!(matches!(
            ClientConfig::from_url("http://localhost:4444"),
            Err(Error::InvalidAddress { .. })
        ));
    }

    #[test]
    fn from_url_requires_host() {
        assert!(matches!(
            ClientConfig::from_url("noeq:/ids"),
            Err(Error::InvalidAddress { .. })
        ));
        assert!(matches!(
            ClientConfig::from_url("localhost"),
            Err(Error::Url(_))
        ));
    }
}
