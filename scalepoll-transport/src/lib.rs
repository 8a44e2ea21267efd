//! Transport layer for the scale protocol
//!
//! Provides UDP broadcast discovery and the TCP command exchange.

pub mod error;
pub mod tcp;
pub mod udp;

pub use error::{Error, Result};
pub use tcp::{ReadMode, TcpTransport};
pub use udp::UdpDiscovery;

use std::net::SocketAddr;

/// Resolve `host:port` to the first socket address it names
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let addr_str = format!("{}:{}", host, port);
    
    let mut addrs = tokio::net::lookup_host(&addr_str)
        .await
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?;
    
    addrs
        .next()
        .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))
}
