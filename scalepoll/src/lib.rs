//! # scalepoll
//!
//! Polls a networked weighing scale for weight readings and records them on
//! a fixed schedule.
//!
//! ## Features
//!
//! - UDP broadcast discovery of the scale
//! - Framed TCP command exchange with bit-exact CRC-16 checksums
//! - Fixed-layout weight response decoding
//! - Interval scheduler that survives any single failed cycle
//! - Pluggable record sinks
//!
//! ## Quick Start
//!
//! ```no_run
//! use scalepoll::{config::Config, JsonLinesSink, Poller};
//!
//! #[tokio::main]
//! async fn main() -> scalepoll::Result<()> {
//!     let config = Config::load(None)?;
//!     let sink = JsonLinesSink::new(&config.sink.path);
//!
//!     let mut poller = Poller::from_config(&config, sink)?;
//!     let record = poller.poll_once().await;
//!     println!("{:?}", record);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod poller;
pub mod scale;
pub mod sink;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use poller::Poller;
pub use scale::Scale;
pub use sink::{JsonLinesSink, MemorySink, ReadingSink};

// Re-export types
pub use scalepoll_core::{Command, Frame, WeightResponse};
pub use scalepoll_transport::ReadMode;
pub use scalepoll_types::{DeviceAddress, Reading, Record};
