//! High-level error types

use std::time::Duration;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Protocol(#[from] scalepoll_core::Error),

    #[error("Connection error: {0}")]
    Connection(#[from] scalepoll_transport::Error),

    #[error("No scale answered discovery within {0:?}")]
    DiscoveryTimeout(Duration),

    #[error("No response received from the scale")]
    EmptyResponse,

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Check if the next polling cycle might succeed where this one failed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DiscoveryTimeout(_)
                | Self::Connection(_)
                | Self::EmptyResponse
                | Self::Sink(_)
        ) && !self.is_protocol_drift()
    }

    /// Check if the scale answered with a layout we do not understand
    pub fn is_protocol_drift(&self) -> bool {
        match self {
            Self::Protocol(e) => e.is_protocol_drift(),
            Self::Connection(scalepoll_transport::Error::Core(e)) => e.is_protocol_drift(),
            Self::Connection(scalepoll_transport::Error::FrameTooLarge { .. }) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Error::DiscoveryTimeout(Duration::from_secs(5)).is_recoverable());
        assert!(Error::Connection(scalepoll_transport::Error::ConnectionClosed).is_recoverable());

        let malformed = Error::Protocol(scalepoll_core::Error::MalformedFrame {
            expected: 14,
            actual: 9,
        });
        assert!(malformed.is_protocol_drift());
        assert!(!malformed.is_recoverable());

        let too_large = Error::Connection(scalepoll_transport::Error::FrameTooLarge {
            declared: 4096,
            max: 1024,
        });
        assert!(too_large.is_protocol_drift());
        assert!(!too_large.is_recoverable());
    }
}
