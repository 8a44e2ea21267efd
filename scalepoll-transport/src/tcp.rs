//! TCP command transport
//!
//! Each command runs in its own session: connect, write one frame, read one
//! response, shut down.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use scalepoll_core::constants::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, MAX_RESPONSE_SIZE};
use scalepoll_core::{Command, Frame, CHECKSUM_SIZE, PREFIX_SIZE};
use scalepoll_types::DeviceAddress;

use crate::error::*;

/// How a response is read off the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Keep reading until the frame's declared length has arrived
    #[default]
    Framed,

    /// A single read of up to [`MAX_RESPONSE_SIZE`] bytes, returned as-is.
    /// Matches older host software, which never reassembled segmented replies.
    Single,
}

impl FromStr for ReadMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "framed" => Ok(Self::Framed),
            "single" => Ok(Self::Single),
            other => Err(Error::InvalidReadMode(other.to_string())),
        }
    }
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Framed => "framed",
            Self::Single => "single",
        })
    }
}

/// TCP transport for scale commands
pub struct TcpTransport {
    address: DeviceAddress,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
    read_timeout: Duration,
    read_mode: ReadMode,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(address: DeviceAddress) -> Self {
        Self {
            address,
            stream: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT),
            read_mode: ReadMode::default(),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set response read mode
    pub fn with_read_mode(mut self, mode: ReadMode) -> Self {
        self.read_mode = mode;
        self
    }

    pub fn remote_addr(&self) -> DeviceAddress {
        self.address
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Send one command and return the raw, undecoded response
    ///
    /// The session is closed before returning, whatever the outcome.
    pub async fn request(&mut self, command: Command) -> Result<BytesMut> {
        let frame = Frame::new(command)?;

        self.connect().await?;

        let result = match self.send(&frame.encode()).await {
            Ok(()) => self.receive().await,
            Err(e) => Err(e),
        };

        self.disconnect().await?;

        result
    }

    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.address.socket_addr();

        debug!("Connecting to {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Io)?;

        stream.set_nodelay(true)?;

        debug!("Connected to {}", addr);

        self.stream = Some(stream);
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Disconnecting from {}...", self.address);

            let _ = stream.shutdown().await;
        }

        Ok(())
    }

    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), &data[..data.len().min(16)]);

        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    /// Read one response according to the configured [`ReadMode`]
    pub async fn receive(&mut self) -> Result<BytesMut> {
        let read_timeout = self.read_timeout;
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let buf = match self.read_mode {
            ReadMode::Single => receive_single(stream, read_timeout).await?,
            ReadMode::Framed => receive_framed(stream, read_timeout).await?,
        };

        trace!("Received {} bytes: {:02X?}", buf.len(), &buf[..buf.len().min(16)]);

        Ok(buf)
    }
}

async fn read_some(stream: &mut TcpStream, buf: &mut BytesMut, read_timeout: Duration) -> Result<usize> {
    timeout(read_timeout, stream.read_buf(buf))
        .await
        .map_err(|_| Error::ReadTimeout)?
        .map_err(Error::Io)
}

async fn receive_single(stream: &mut TcpStream, read_timeout: Duration) -> Result<BytesMut> {
    let mut buf = BytesMut::zeroed(MAX_RESPONSE_SIZE);

    let n = timeout(read_timeout, stream.read(&mut buf))
        .await
        .map_err(|_| Error::ReadTimeout)?
        .map_err(Error::Io)?;

    buf.truncate(n);
    Ok(buf)
}

async fn receive_framed(stream: &mut TcpStream, read_timeout: Duration) -> Result<BytesMut> {
    let mut buf = BytesMut::with_capacity(MAX_RESPONSE_SIZE);
    let mut expected: Option<usize> = None;

    while buf.len() < expected.unwrap_or(PREFIX_SIZE) {
        let n = read_some(stream, &mut buf, read_timeout).await?;

        if n == 0 {
            warn!("Connection closed after {} bytes", buf.len());
            return Err(Error::ConnectionClosed);
        }

        if expected.is_none() && buf.len() >= PREFIX_SIZE {
            // Response length fields are little-endian, like the rest of the response
            let declared = u16::from_le_bytes([buf[3], buf[4]]) as usize;
            let total = PREFIX_SIZE + declared + CHECKSUM_SIZE;

            if total > MAX_RESPONSE_SIZE {
                return Err(Error::FrameTooLarge {
                    declared: total,
                    max: MAX_RESPONSE_SIZE,
                });
            }

            expected = Some(total);
        }
    }

    Ok(buf)
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("TCP transport dropped while still connected");
        }
    }
}
