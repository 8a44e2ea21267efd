//! Error types for scalepoll-core

/// Result type alias for scalepoll protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Received byte count does not match the expected frame layout
    #[error("Malformed frame: expected {expected} bytes, got {actual} bytes")]
    MalformedFrame {
        expected: usize,
        actual: usize,
    },
    
    /// Frame does not start with the protocol marker
    #[error("Invalid frame header: {received}")]
    InvalidHeader {
        received: String,
    },
    
    /// Command does not fit the 16-bit length field
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },
    
    /// Command text is not valid hex
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if the error means the device speaks a layout we do not expect
    pub fn is_protocol_drift(&self) -> bool {
        matches!(
            self,
            Self::MalformedFrame { .. } | Self::InvalidHeader { .. }
        )
    }
}
