//! UDP broadcast discovery
//!
//! A poll frame is broadcast to the configured target and the first
//! datagram that comes back identifies the scale: its source address is
//! where the scale accepts TCP commands.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, info, trace};

use scalepoll_core::constants::{DEFAULT_DISCOVERY_TIMEOUT, MAX_DATAGRAM_SIZE};
use scalepoll_core::{Command, Frame};
use scalepoll_types::DeviceAddress;

use crate::{error::*, resolve};

/// Broadcast discovery of a scale on the local network
#[derive(Debug, Clone)]
pub struct UdpDiscovery {
    host: String,
    port: u16,
    command: Command,
    timeout: Duration,
}

impl UdpDiscovery {
    /// Create discovery aimed at `host:port` (usually a broadcast address)
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            command: Command::poll(),
            timeout: Duration::from_secs(DEFAULT_DISCOVERY_TIMEOUT),
        }
    }

    /// Set how long to wait for a reply
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll command carried by the broadcast frame
    pub fn with_command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }

    /// Broadcast one poll frame and wait for the first reply
    ///
    /// Returns `Ok(None)` when nothing answers within the timeout. The
    /// socket is released on every path.
    pub async fn discover(&self) -> Result<Option<DeviceAddress>> {
        let frame = Frame::new(self.command.clone())?.encode();
        let target = resolve(&self.host, self.port).await?;

        let bind_addr: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(bind_addr).await?;
        socket.set_broadcast(true)?;

        trace!(
            "Broadcasting {} bytes to {}: {:02X?}",
            frame.len(),
            target,
            &frame[..]
        );
        socket.send_to(&frame, target).await?;

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        match timeout(self.timeout, socket.recv_from(&mut buf)).await {
            Err(_) => {
                debug!("No reply to discovery on {} within {:?}", target, self.timeout);
                Ok(None)
            }
            Ok(Err(e)) => Err(Error::Io(e)),
            Ok(Ok((n, from))) => {
                trace!("Discovery reply from {}: {:02X?}", from, &buf[..n.min(32)]);
                info!("Scale found at {}", from);
                Ok(Some(from.into()))
            }
        }
    }
}
