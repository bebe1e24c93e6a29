//! Transport layer: carries a checker's challenge to an endpoint and captures
//! the reply.
//!
//! One transport exists per [`ProtocolTag`]. All I/O is async (tokio) and
//! bounded by the configured timeout; the captured reply is handed back as an
//! owned [`Captured`] value that checkers borrow through
//! [`Captured::as_response`].

pub mod http;
pub mod tcp;
pub mod udp;

use crate::checks::{Challenge, HttpReply, ProtocolTag, Response, Scheme};
use crate::error::{TransportError, TransportResult};
use crate::types::Endpoint;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

pub use http::HttpTransport;
pub use tcp::{TcpMode, TcpTransport};
pub use udp::UdpTransport;

/// Owned reply captured from a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    /// Nothing arrived before the read timeout.
    Nothing,
    /// Connection established, nothing read.
    Connected,
    Bytes(Vec<u8>),
    Text(String),
    Http(HttpReply),
}

impl Captured {
    /// Borrow the reply in the form checkers consume.
    pub fn as_response(&self) -> Response<'_> {
        match self {
            Self::Nothing => Response::Nothing,
            Self::Connected => Response::Connected,
            Self::Bytes(b) => Response::Bytes(b),
            Self::Text(s) => Response::Text(s),
            Self::Http(reply) => Response::Http(reply),
        }
    }

    /// Number of payload bytes captured.
    pub fn len(&self) -> usize {
        match self {
            Self::Nothing | Self::Connected => 0,
            Self::Bytes(b) => b.len(),
            Self::Text(s) => s.len(),
            Self::Http(reply) => reply.body.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Limits applied to every exchange.
#[derive(Debug, Clone, Copy)]
pub struct TransportOptions {
    /// Bound on connecting and on each read.
    pub timeout: Duration,
    /// Largest reply kept, in bytes.
    pub max_response_bytes: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1000),
            max_response_bytes: 1024,
        }
    }
}

/// Moves a challenge to an endpoint and captures the reply.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The tag this transport serves.
    fn protocol(&self) -> ProtocolTag;

    /// Perform one exchange.
    async fn exchange(
        &self,
        endpoint: &Endpoint,
        challenge: Option<&Challenge>,
    ) -> TransportResult<Captured>;
}

/// Transport serving `protocol`.
pub fn for_protocol(protocol: ProtocolTag, options: TransportOptions) -> Box<dyn Transport> {
    match protocol {
        ProtocolTag::ConnectTcp => Box::new(TcpTransport::new(TcpMode::Connect, options)),
        ProtocolTag::RawTcp => Box::new(TcpTransport::new(TcpMode::Raw, options)),
        ProtocolTag::TextTcp => Box::new(TcpTransport::new(TcpMode::Text, options)),
        ProtocolTag::TextUdp => Box::new(UdpTransport::new(options)),
        ProtocolTag::HttpTcp => Box::new(HttpTransport::new(Scheme::Http, options)),
        ProtocolTag::HttpsTcp => Box::new(HttpTransport::new(Scheme::Https, options)),
    }
}

/// Resolve an endpoint to its first socket address within `limit`.
pub async fn resolve(endpoint: &Endpoint, limit: Duration) -> TransportResult<SocketAddr> {
    let authority = endpoint.authority();
    let mut addrs = timeout(limit, lookup_host(&authority))
        .await
        .map_err(|_| TransportError::Timeout)?
        .map_err(|e| TransportError::Resolve(format!("{}: {}", endpoint.host, e)))?;
    addrs
        .next()
        .ok_or_else(|| TransportError::Resolve(endpoint.host.clone()))
}

/// Open a TCP connection within `limit`.
pub(crate) async fn connect(addr: SocketAddr, limit: Duration) -> TransportResult<TcpStream> {
    match timeout(limit, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(TransportError::ConnectionFailed {
            target: addr.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(TransportError::Timeout),
    }
}
