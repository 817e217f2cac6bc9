//! UDP packet source for the game's "data out" stream

use std::net::SocketAddr;
use std::time::SystemTime;
use tokio::net::UdpSocket;
use tracing::{debug, info, trace, warn};

use crate::source::PacketSource;
use crate::types::RawPacket;
use crate::{Result, TelemetryError};

/// Default port the game is configured to send to.
pub const DEFAULT_PORT: u16 = 10001;

/// Default receive buffer; comfortably larger than one 324-byte packet.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Receives one datagram per packet.
///
/// A datagram that fills the whole receive buffer may have been cut short by
/// the OS and is dropped, so the buffer must be larger than the biggest
/// datagram worth keeping. Everything else is forwarded as received; the
/// decoder rejects lengths that do not match the schema.
#[derive(Debug)]
pub struct UdpSource {
    socket: UdpSocket,
    buf: Vec<u8>,
    sequence: u64,
    dropped_oversized: u64,
}

impl UdpSource {
    /// Bind a listening socket.
    pub async fn bind(addr: SocketAddr, buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(TelemetryError::config_error("UDP buffer size must be non-zero"));
        }

        let socket = UdpSocket::bind(addr).await.map_err(|e| {
            TelemetryError::connection_failed_with_source(
                format!("failed to bind UDP socket on {addr}"),
                Box::new(e),
            )
        })?;

        let local = socket.local_addr().unwrap_or(addr);
        info!("Listening for telemetry on udp://{}", local);

        Ok(Self { socket, buf: vec![0u8; buffer_size], sequence: 0, dropped_oversized: 0 })
    }

    /// Address the socket is actually bound to (resolves port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(|e| {
            TelemetryError::connection_failed_with_source("failed to read local address", Box::new(e))
        })
    }

    /// Datagrams discarded because they filled the receive buffer.
    pub fn dropped_oversized(&self) -> u64 {
        self.dropped_oversized
    }
}

#[async_trait::async_trait]
impl PacketSource for UdpSource {
    async fn next_packet(&mut self) -> Result<Option<RawPacket>> {
        loop {
            let (len, peer) = self.socket.recv_from(&mut self.buf).await.map_err(|e| {
                TelemetryError::connection_failed_with_source(
                    "failed to read from UDP socket",
                    Box::new(e),
                )
            })?;
            let received_at = SystemTime::now();

            if len == self.buf.len() {
                self.dropped_oversized += 1;
                warn!(
                    "Dropping datagram from {} that filled the {} byte receive buffer",
                    peer,
                    self.buf.len()
                );
                continue;
            }

            self.sequence += 1;
            trace!("Datagram {}: {} bytes from {}", self.sequence, len, peer);
            if self.sequence == 1 {
                debug!("First datagram received from {}", peer);
            }

            return Ok(Some(RawPacket::new(&self.buf[..len], self.sequence, received_at)));
        }
    }
}
