//! Network address of a scale

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Address a scale can be reached at
///
/// Produced by discovery (the sender of the broadcast reply) or taken from
/// configuration, and consumed by the command client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    pub host: IpAddr,
    pub port: u16,
}

impl DeviceAddress {
    pub fn new(host: impl Into<IpAddr>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl From<SocketAddr> for DeviceAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl From<DeviceAddress> for SocketAddr {
    fn from(addr: DeviceAddress) -> Self {
        addr.socket_addr()
    }
}

impl FromStr for DeviceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let addr: SocketAddr = s
            .parse()
            .map_err(|e| Error::Parse(format!("invalid device address '{}': {}", s, e)))?;

        if addr.port() == 0 {
            return Err(Error::Validation(format!("port 0 is not reachable: '{}'", s)));
        }

        Ok(addr.into())
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.socket_addr().fmt(f)
    }
}
