//! Protocol constants

/// Default discovery timeout (seconds)
pub const DEFAULT_DISCOVERY_TIMEOUT: u64 = 5;

/// Default connection timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 5;

/// Default read timeout (seconds)
pub const DEFAULT_READ_TIMEOUT: u64 = 5;

/// Largest response the device sends in one exchange
pub const MAX_RESPONSE_SIZE: usize = 1024;

/// Largest datagram accepted as a discovery reply
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// Command byte codes
pub mod codes {
    /// Discovery poll, as sent by older host software
    pub const UDP_POLL: u8 = 0x00;
    
    /// Read current weight
    pub const GET_WEIGHT: u8 = 0xA0;
}
