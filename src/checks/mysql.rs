//! MySQL greeting decoder.
//!
//! A MySQL server speaks first. Depending on whether the client is allowed in,
//! the first packet is either an initial handshake (protocol version 10) or an
//! ERR packet. Both prove a MySQL server is listening.
//!
//! Reference: <https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_basic_packets.html>

use tracing::trace;

use crate::checks::{validate, CheckModule, Checker, Params, ProtocolTag, Response};
use crate::error::{CheckError, CheckResult};
use crate::types::Port;

/// Marker byte of an ERR packet.
pub const ERR_PACKET_MARKER: u8 = 0xFF;

/// Protocol version announced by a HandshakeV10 packet.
pub const PROTOCOL_VERSION_10: u8 = 0x0A;

/// Smallest ERR payload: marker, error code, SQL state marker and state.
const MIN_ERR_PAYLOAD: usize = 9;

/// Bounds on a plausible handshake payload.
const MIN_HANDSHAKE_PAYLOAD: usize = 15;
const MAX_HANDSHAKE_PAYLOAD: usize = 128;

/// Connection id (4) + auth-plugin-data part 1 (8) precede the filler.
const FILLER_OFFSET: usize = 4 + 8;

/// MySQL packet header (4 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Payload length (3 bytes, little endian)
    pub payload_length: u32,
    /// Sequence ID (1 byte)
    pub sequence_id: u8,
}

impl PacketHeader {
    /// Size of the header on the wire.
    pub const SIZE: usize = 4;

    /// Read a header from the start of `buf`.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let header = buf.get(..Self::SIZE)?;
        Some(Self {
            payload_length: u32::from_le_bytes([header[0], header[1], header[2], 0]),
            sequence_id: header[3],
        })
    }

    /// Encode the header for a payload of `payload_length` bytes.
    pub fn encode(payload_length: u32, sequence_id: u8) -> [u8; 4] {
        let len = payload_length.to_le_bytes();
        [len[0], len[1], len[2], sequence_id]
    }
}

/// Check the framing of a captured buffer.
///
/// Accepts only a single, complete first packet: the announced length must be
/// non-zero and equal to what follows the header, and the sequence id must be 0.
pub fn sanity_check(response: Option<&[u8]>) -> bool {
    let Some(buf) = response else {
        return false;
    };
    let Some(header) = PacketHeader::parse(buf) else {
        trace!(len = buf.len(), "mysql: response shorter than packet header");
        return false;
    };

    if header.payload_length == 0 {
        trace!("mysql: announced payload length is 0");
        return false;
    }

    let actual = buf.len() - PacketHeader::SIZE;
    if header.payload_length as usize != actual {
        trace!(
            announced = header.payload_length,
            actual,
            "mysql: payload length mismatch"
        );
        return false;
    }

    if header.sequence_id != 0 {
        trace!(sequence_id = header.sequence_id, "mysql: rejecting non-initial packet");
        return false;
    }

    true
}

/// Recognize an ERR packet payload.
pub fn is_error_packet(payload: &[u8]) -> bool {
    payload.len() >= MIN_ERR_PAYLOAD && payload[0] == ERR_PACKET_MARKER
}

/// Recognize an initial HandshakeV10 payload.
///
/// Validates the protocol version, the NUL terminated server version and the
/// filler byte. Everything after the filler is optional and left alone.
pub fn is_initial_handshake_packet(payload: &[u8]) -> bool {
    if !(MIN_HANDSHAKE_PAYLOAD..=MAX_HANDSHAKE_PAYLOAD).contains(&payload.len()) {
        return false;
    }

    if payload[0] != PROTOCOL_VERSION_10 {
        return false;
    }

    let rest = &payload[1..];
    let Some(nul) = rest.iter().position(|&b| b == 0) else {
        return false;
    };

    let server_version: String = rest[..nul].iter().map(|&b| char::from(b)).collect();
    trace!(%server_version, "mysql: handshake server version");

    rest.get(nul + 1 + FILLER_OFFSET) == Some(&0x00)
}

/// Validated MySQL parameters.
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    pub port: Port,
}

#[derive(Debug, Clone)]
pub struct MysqlChecker {
    config: MysqlConfig,
}

impl MysqlChecker {
    pub fn port(&self) -> Port {
        self.config.port
    }

    fn check_bytes(&self, buf: &[u8]) -> bool {
        if !sanity_check(Some(buf)) {
            return false;
        }

        let payload = &buf[PacketHeader::SIZE..];
        // An ERR packet (e.g. host not allowed) still proves a MySQL server.
        is_error_packet(payload) || is_initial_handshake_packet(payload)
    }
}

impl Checker for MysqlChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool> {
        match response {
            Response::Bytes(buf) => Ok(self.check_bytes(buf)),
            Response::Nothing | Response::Connected => Ok(false),
            other => Err(CheckError::response_check(format!(
                "Did not get expected response: expected binary data, got {}.",
                other.kind()
            ))),
        }
    }
}

impl CheckModule for MysqlChecker {
    type Config = MysqlConfig;

    const NAME: &'static str = "mysql";
    const PROTOCOL: ProtocolTag = ProtocolTag::RawTcp;

    fn validate_config(params: &Params) -> CheckResult<MysqlConfig> {
        Ok(MysqlConfig {
            port: validate::port_param(params)?,
        })
    }

    fn construct(config: MysqlConfig) -> Self {
        Self { config }
    }
}
