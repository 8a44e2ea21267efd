//! # scalepoll-core
//!
//! Core protocol implementation for networked weighing scales.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - CRC-16 checksum calculation
//! - Command definitions
//! - The fixed weight response layout and its decoding into a [`Reading`]

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod response;

pub use command::Command;
pub use error::{Error, Result};
pub use frame::Frame;
pub use response::WeightResponse;
pub use scalepoll_types::Reading;

/// Default device port
pub const DEFAULT_PORT: u16 = 5001;

/// Frame marker preceding every request and response
pub const HEADER: [u8; 3] = [0xF8, 0x55, 0xCE];

/// Header marker plus the 16-bit length field
pub const PREFIX_SIZE: usize = HEADER.len() + 2;

/// Trailing checksum size
pub const CHECKSUM_SIZE: usize = 2;
