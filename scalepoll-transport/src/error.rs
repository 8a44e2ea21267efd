//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,
    
    #[error("Already connected")]
    AlreadyConnected,
    
    #[error("Connection timeout")]
    ConnectionTimeout,
    
    #[error("Read timeout")]
    ReadTimeout,
    
    #[error("Connection closed by remote")]
    ConnectionClosed,
    
    #[error("Frame too large: device declared {declared} bytes (max: {max} bytes)")]
    FrameTooLarge {
        declared: usize,
        max: usize,
    },
    
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    
    #[error("Unknown read mode '{0}' (expected 'framed' or 'single')")]
    InvalidReadMode(String),
    
    #[error("Protocol error: {0}")]
    Core(#[from] scalepoll_core::Error),
}
