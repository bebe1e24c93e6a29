//! UDP text transport.
//!
//! Sends the challenge as a single datagram from an ephemeral socket and
//! waits for one reply. Silence is reported as [`Captured::Nothing`].

use crate::checks::{Challenge, ProtocolTag};
use crate::error::{TransportError, TransportResult};
use crate::transport::{resolve, Captured, Transport, TransportOptions};
use crate::types::Endpoint;
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct UdpTransport {
    options: TransportOptions,
}

impl UdpTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn protocol(&self) -> ProtocolTag {
        ProtocolTag::TextUdp
    }

    async fn exchange(
        &self,
        endpoint: &Endpoint,
        challenge: Option<&Challenge>,
    ) -> TransportResult<Captured> {
        let addr = resolve(endpoint, self.options.timeout).await?;

        // Bind to an ephemeral local port of the same family.
        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let failed = |e: std::io::Error| TransportError::ConnectionFailed {
            target: addr.to_string(),
            reason: e.to_string(),
        };

        let socket = UdpSocket::bind(local).await.map_err(failed)?;
        socket.connect(addr).await.map_err(failed)?;

        let payload = challenge.map(Challenge::as_bytes).unwrap_or_default();
        socket.send(payload).await.map_err(failed)?;
        debug!(%endpoint, len = payload.len(), "Sent datagram");

        let mut buffer = vec![0u8; self.options.max_response_bytes];
        match timeout(self.options.timeout, socket.recv(&mut buffer)).await {
            Ok(Ok(n)) => {
                debug!(%endpoint, len = n, "Received datagram");
                Ok(Captured::Text(String::from_utf8_lossy(&buffer[..n]).into_owned()))
            }
            Ok(Err(e)) => Err(failed(e)),
            Err(_) => {
                debug!(%endpoint, "No datagram before timeout");
                Ok(Captured::Nothing)
            }
        }
    }
}
