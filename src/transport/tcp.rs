//! TCP transports: bare connect, raw bytes and text.

use crate::checks::{Challenge, ProtocolTag};
use crate::error::TransportResult;
use crate::transport::{connect, resolve, Captured, Transport, TransportOptions};
use crate::types::Endpoint;
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// What a TCP exchange captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpMode {
    /// Connect and hang up.
    Connect,
    /// Keep the reply as bytes.
    Raw,
    /// Decode the reply as (lossy) UTF-8.
    Text,
}

/// TCP transport for `connect/tcp`, `raw/tcp` and `text/tcp`.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    mode: TcpMode,
    options: TransportOptions,
}

impl TcpTransport {
    pub fn new(mode: TcpMode, options: TransportOptions) -> Self {
        Self { mode, options }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn protocol(&self) -> ProtocolTag {
        match self.mode {
            TcpMode::Connect => ProtocolTag::ConnectTcp,
            TcpMode::Raw => ProtocolTag::RawTcp,
            TcpMode::Text => ProtocolTag::TextTcp,
        }
    }

    async fn exchange(
        &self,
        endpoint: &Endpoint,
        challenge: Option<&Challenge>,
    ) -> TransportResult<Captured> {
        let addr = resolve(endpoint, self.options.timeout).await?;
        let stream = connect(addr, self.options.timeout).await?;
        debug!(%endpoint, "Connected");

        if self.mode == TcpMode::Connect {
            return Ok(Captured::Connected);
        }

        let Some(bytes) = send_recv(stream, challenge, &self.options).await? else {
            debug!(%endpoint, "No response before timeout");
            return Ok(Captured::Nothing);
        };
        debug!(%endpoint, len = bytes.len(), "Received response");

        Ok(match self.mode {
            TcpMode::Text => Captured::Text(String::from_utf8_lossy(&bytes).into_owned()),
            _ => Captured::Bytes(bytes),
        })
    }
}

/// Send the optional challenge, then perform a single bounded read.
///
/// Returns `None` when the read timed out.
async fn send_recv(
    mut stream: TcpStream,
    challenge: Option<&Challenge>,
    options: &TransportOptions,
) -> TransportResult<Option<Vec<u8>>> {
    if let Some(challenge) = challenge {
        let bytes = challenge.as_bytes();
        if !bytes.is_empty() {
            stream.write_all(bytes).await?;
            debug!(challenge = %challenge, "Sent challenge");
        }
    }

    let mut buffer = vec![0u8; options.max_response_bytes];
    match timeout(options.timeout, stream.read(&mut buffer)).await {
        Ok(Ok(n)) => {
            buffer.truncate(n);
            Ok(Some(buffer))
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Ok(None),
    }
}
