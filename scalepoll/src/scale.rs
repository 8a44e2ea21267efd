//! High-level scale interface

use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, info, trace};

use scalepoll_core::{Command, WeightResponse};
use scalepoll_transport::{resolve, ReadMode, TcpTransport, UdpDiscovery};
use scalepoll_types::{DeviceAddress, Reading};

use crate::config::DeviceConfig;
use crate::error::{Error, Result};

/// Networked weighing scale
///
/// Every call runs its own exchange: nothing is cached between calls, so a
/// scale that moved to another address is found again on the next cycle.
///
/// # Examples
///
/// ```no_run
/// use scalepoll::{config::DeviceConfig, Scale};
///
/// #[tokio::main]
/// async fn main() -> scalepoll::Result<()> {
///     let scale = Scale::new(&DeviceConfig::default())?;
///
///     let reading = scale.read_weight().await?;
///     println!("{}", reading);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Scale {
    host: String,
    port: u16,
    discovery: bool,
    poll_command: Command,
    weight_command: Command,
    discovery_timeout: Duration,
    connect_timeout: Duration,
    read_timeout: Duration,
    read_mode: ReadMode,
}

impl Scale {
    /// Create a scale handle from its configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a configured command is not valid hex.
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            discovery: config.discovery,
            poll_command: config.poll_command()?,
            weight_command: config.weight_command()?,
            discovery_timeout: config.discovery_timeout(),
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
            read_mode: config.read_mode.into(),
        })
    }

    /// Find the scale's command address
    ///
    /// Broadcasts a discovery poll when discovery is enabled, otherwise
    /// resolves the configured host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryTimeout`] if no scale answered in time.
    pub async fn locate(&self) -> Result<DeviceAddress> {
        if !self.discovery {
            let addr = resolve(&self.host, self.port).await?;
            debug!("Using configured scale address {}", addr);
            return Ok(addr.into());
        }

        debug!("Discovering scale via {}:{}...", self.host, self.port);

        UdpDiscovery::new(self.host.clone(), self.port)
            .with_command(self.poll_command.clone())
            .with_timeout(self.discovery_timeout)
            .discover()
            .await?
            .ok_or(Error::DiscoveryTimeout(self.discovery_timeout))
    }

    /// Send one command to the scale at `address` and return the raw response
    pub async fn query(&self, address: DeviceAddress, command: Command) -> Result<BytesMut> {
        debug!("Sending {} to {}", command, address);

        let mut transport = TcpTransport::new(address)
            .with_connect_timeout(self.connect_timeout)
            .with_read_timeout(self.read_timeout)
            .with_read_mode(self.read_mode);

        Ok(transport.request(command).await?)
    }

    /// Locate the scale and read its current weight
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No scale answers discovery ([`Error::DiscoveryTimeout`])
    /// - The TCP exchange fails ([`Error::Connection`])
    /// - The scale sends nothing back ([`Error::EmptyResponse`])
    /// - The response has an unexpected layout ([`Error::Protocol`])
    pub async fn read_weight(&self) -> Result<Reading> {
        let address = self.locate().await?;

        let raw = self.query(address, self.weight_command.clone()).await?;
        if raw.is_empty() {
            return Err(Error::EmptyResponse);
        }

        trace!("Weight response: {:02X?}", &raw[..]);

        let reading = WeightResponse::decode(&raw)?.reading();

        info!(
            weight = reading.weight,
            division = reading.division,
            stable = reading.stable,
            "Read weight from {}",
            address
        );

        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_create() {
        let scale = Scale::new(&DeviceConfig::default()).unwrap();
        assert!(scale.discovery);
        assert_eq!(scale.weight_command, Command::get_weight());
        assert_eq!(scale.read_mode, ReadMode::Framed);
    }

    #[test]
    fn test_scale_rejects_bad_command() {
        let config = DeviceConfig {
            weight_command: "not hex".to_string(),
            ..DeviceConfig::default()
        };
        assert!(matches!(Scale::new(&config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_locate_without_discovery() {
        let config = DeviceConfig {
            host: "127.0.0.1".to_string(),
            port: 5001,
            discovery: false,
            ..DeviceConfig::default()
        };

        let address = Scale::new(&config).unwrap().locate().await.unwrap();
        assert_eq!(address.to_string(), "127.0.0.1:5001");
    }
}
