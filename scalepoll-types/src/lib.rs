//! Type definitions for scalepoll

pub mod address;
pub mod error;
pub mod reading;

pub use address::DeviceAddress;
pub use error::{Error, Result};
pub use reading::{Reading, Record};
