//! Scale protocol frame structure and encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    command::Command,
    error::{Error, Result},
    CHECKSUM_SIZE, HEADER, PREFIX_SIZE,
};

/// Scale protocol frame
///
/// # Frame Structure
///
/// ```text
/// ┌─────────────┬─────────────┬─────────────┬─────────────┐
/// │   Header    │   Length    │   Payload   │  Checksum   │
/// │   3 bytes   │   2 bytes   │   N bytes   │   2 bytes   │
/// │  F8 55 CE   │  (BE u16)   │  (command)  │  (BE u16)   │
/// └─────────────┴─────────────┴─────────────┴─────────────┘
/// ```
///
/// The checksum covers the payload only; header and length are excluded.
///
/// # Examples
///
/// ```
/// use scalepoll_core::{Command, Frame};
///
/// let frame = Frame::new(Command::get_weight()).unwrap();
/// let encoded = frame.encode();
/// assert_eq!(&encoded[..], &[0xF8, 0x55, 0xCE, 0x00, 0x01, 0xA0, 0x00, 0xA0]);
///
/// let decoded = Frame::decode(&encoded).unwrap();
/// assert_eq!(decoded.payload, frame.payload);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Protocol marker
    pub header: [u8; 3],

    /// Payload byte count
    pub length: u16,

    /// Command bytes
    pub payload: Bytes,

    /// Checksum as transmitted (or computed, for outgoing frames)
    pub checksum: u16,
}

impl Frame {
    /// Size of a frame with an empty payload
    pub const OVERHEAD: usize = PREFIX_SIZE + CHECKSUM_SIZE;

    /// Maximum payload size
    pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

    /// Wrap a command into a frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the command does not fit the
    /// 16-bit length field.
    pub fn new(command: Command) -> Result<Self> {
        let payload: Bytes = command.into();

        let length = u16::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge {
            size: payload.len(),
            max: Self::MAX_PAYLOAD_SIZE,
        })?;

        Ok(Self {
            header: HEADER,
            length,
            checksum: checksum::calculate(&payload),
            payload,
        })
    }

    /// Encode frame to bytes
    ///
    /// Output length is always `7 + payload.len()`.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.size());

        buf.put_slice(&self.header);
        buf.put_u16(self.length);
        buf.put_slice(&self.payload);
        buf.put_u16(self.checksum);

        buf
    }

    /// Decode a frame laid out as [`encode`](Self::encode) writes it
    ///
    /// The checksum is carried over as received and not verified; use
    /// [`checksum_matches`](Self::checksum_matches) for that.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] if the buffer is shorter than the
    /// frame overhead or its size disagrees with the declared length, and
    /// [`Error::InvalidHeader`] if the marker is wrong.
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::OVERHEAD {
            return Err(Error::MalformedFrame {
                expected: Self::OVERHEAD,
                actual: buf.len(),
            });
        }

        let mut header = [0u8; 3];
        buf.copy_to_slice(&mut header);
        check_header(&header)?;

        let length = buf.get_u16();
        let expected = Self::OVERHEAD + length as usize;
        let actual = PREFIX_SIZE + buf.remaining();
        if actual != expected {
            return Err(Error::MalformedFrame { expected, actual });
        }

        let payload = buf.copy_to_bytes(length as usize);
        let checksum = buf.get_u16();

        Ok(Self {
            header,
            length,
            payload,
            checksum,
        })
    }

    /// Whether the carried checksum matches one recomputed over the payload
    pub fn checksum_matches(&self) -> bool {
        checksum::verify(&self.payload, self.checksum)
    }

    /// Get total frame size
    pub fn size(&self) -> usize {
        Self::OVERHEAD + self.payload.len()
    }
}

pub(crate) fn check_header(header: &[u8; 3]) -> Result<()> {
    if *header != HEADER {
        return Err(Error::InvalidHeader {
            received: hex::encode_upper(header),
        });
    }
    Ok(())
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("header", &hex::encode_upper(self.header))
            .field("length", &self.length)
            .field("payload", &hex::encode_upper(&self.payload))
            .field("checksum", &format!("0x{:04X}", self.checksum))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame(len={}, crc=0x{:04X})",
            self.length, self.checksum
        )
    }
}
