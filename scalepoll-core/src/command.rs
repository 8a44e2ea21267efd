//! Scale protocol commands
//!
//! A command is an opaque byte sequence wrapped into a [`Frame`](crate::Frame)
//! as its payload. The device answers each command with exactly one frame.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::constants::codes;
use crate::error::{Error, Result};

/// Protocol command bytes
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Command(Bytes);

impl Command {
    /// Create a command from raw bytes
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Zero-length discovery poll
    pub fn poll() -> Self {
        Self(Bytes::new())
    }

    /// One-byte `00` discovery poll understood by older firmware
    pub fn poll_legacy() -> Self {
        Self(Bytes::from_static(&[codes::UDP_POLL]))
    }

    /// Query the current weight
    pub fn get_weight() -> Self {
        Self(Bytes::from_static(&[codes::GET_WEIGHT]))
    }

    /// Leading command byte, if any
    pub fn code(&self) -> Option<u8> {
        self.0.first().copied()
    }

    /// Get command name
    pub fn name(&self) -> &'static str {
        match (self.0.len(), self.code()) {
            (0, _) => "CMD_UDP_POLL",
            (1, Some(codes::UDP_POLL)) => "CMD_UDP_POLL",
            (1, Some(codes::GET_WEIGHT)) => "CMD_GET_WEIGHT",
            _ => "CMD_RAW",
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Command {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Command> for Bytes {
    fn from(cmd: Command) -> Bytes {
        cmd.0
    }
}

impl From<&'static [u8]> for Command {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }
}

impl From<Vec<u8>> for Command {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

/// Parses commands written as hex, e.g. `"A0"`
impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        hex::decode(s.trim())
            .map(Self::from)
            .map_err(|e| Error::InvalidCommand(format!("'{}': {}", s, e)))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({})", hex::encode_upper(&self.0))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), hex::encode_upper(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_commands() {
        assert!(Command::poll().is_empty());
        assert_eq!(Command::poll_legacy().as_bytes(), &[0x00]);
        assert_eq!(Command::get_weight().code(), Some(0xA0));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::poll().name(), "CMD_UDP_POLL");
        assert_eq!(Command::get_weight().name(), "CMD_GET_WEIGHT");
        assert_eq!(Command::from(vec![0xA0, 0x01]).name(), "CMD_RAW");
    }

    #[test]
    fn test_command_from_hex() {
        assert_eq!("A0".parse::<Command>().unwrap(), Command::get_weight());
        assert_eq!("".parse::<Command>().unwrap(), Command::poll());
        assert!("A".parse::<Command>().is_err());
        assert!("ZZ".parse::<Command>().is_err());
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::get_weight().to_string(), "CMD_GET_WEIGHT(A0)");
    }
}
