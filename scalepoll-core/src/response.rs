//! Weight query response layout
//!
//! The scale answers [`Command::get_weight`](crate::Command::get_weight)
//! with a fixed 14-byte record. Numeric fields are little-endian, unlike
//! the big-endian length field of request frames.
//!
//! ```text
//! ┌────────┬────────┬──────┬──────────┬──────────┬────────┬──────────┐
//! │ Header │ Length │ Echo │  Weight  │ Division │ Stable │ Checksum │
//! │   3    │ LE u16 │  u8  │  LE i32  │    i8    │   u8   │    2     │
//! └────────┴────────┴──────┴──────────┴──────────┴────────┴──────────┘
//! ```

use std::fmt;
use std::io::{Cursor, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use tracing::{trace, warn};

use scalepoll_types::Reading;

use crate::{
    checksum,
    error::{Error, Result},
    frame::check_header,
};

/// Decoded weight response
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WeightResponse {
    pub header: [u8; 3],
    pub length: u16,
    /// Command byte echoed back by the device
    pub command: u8,
    pub weight: i32,
    pub division: i8,
    pub stable: u8,
    pub checksum: u16,
}

impl WeightResponse {
    /// Exact size of a weight response on the wire
    pub const SIZE: usize = 14;

    /// Bytes covered by the checksum: echo, weight, division, stable
    pub const PAYLOAD_SIZE: usize = 7;

    /// Decode a weight response
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] unless `buf` is exactly
    /// [`SIZE`](Self::SIZE) bytes long, and [`Error::InvalidHeader`] if the
    /// frame marker is wrong. A checksum mismatch is logged, not rejected.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != Self::SIZE {
            return Err(Error::MalformedFrame {
                expected: Self::SIZE,
                actual: buf.len(),
            });
        }

        let mut cursor = Cursor::new(buf);
        let mut header = [0u8; 3];
        cursor.read_exact(&mut header)?;
        check_header(&header)?;

        let response = Self {
            header,
            length: cursor.read_u16::<LittleEndian>()?,
            command: cursor.read_u8()?,
            weight: cursor.read_i32::<LittleEndian>()?,
            division: cursor.read_i8()?,
            stable: cursor.read_u8()?,
            checksum: cursor.read_u16::<BigEndian>()?,
        };

        trace!("Decoded: {:?}", response);

        if !response.checksum_matches() {
            warn!(
                received = format!("0x{:04X}", response.checksum),
                calculated = format!("0x{:04X}", checksum::calculate(&response.payload())),
                "Weight response checksum mismatch"
            );
        }

        Ok(response)
    }

    /// Payload bytes as they were laid out on the wire
    pub fn payload(&self) -> [u8; Self::PAYLOAD_SIZE] {
        let w = self.weight.to_le_bytes();
        [
            self.command,
            w[0],
            w[1],
            w[2],
            w[3],
            self.division as u8,
            self.stable,
        ]
    }

    /// Whether the carried checksum matches one recomputed over the payload
    pub fn checksum_matches(&self) -> bool {
        checksum::verify(&self.payload(), self.checksum)
    }

    /// Reading carried by this response
    pub fn reading(&self) -> Reading {
        Reading::from(self)
    }
}

impl From<&WeightResponse> for Reading {
    fn from(response: &WeightResponse) -> Self {
        Reading::new(response.weight, response.division, response.stable)
    }
}

impl fmt::Debug for WeightResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightResponse")
            .field("header", &hex::encode_upper(self.header))
            .field("length", &self.length)
            .field("command", &format!("0x{:02X}", self.command))
            .field("weight", &self.weight)
            .field("division", &self.division)
            .field("stable", &self.stable)
            .field("checksum", &format!("0x{:04X}", self.checksum))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // weight=1234, division=1, stable=1
    const SAMPLE: [u8; 14] = [
        0xF8, 0x55, 0xCE, // header
        0x07, 0x00, // length
        0xA0, // echo
        0xD2, 0x04, 0x00, 0x00, // weight
        0x01, // division
        0x01, // stable
        0xB2, 0xCE, // checksum
    ];

    #[test]
    fn test_decode_sample() {
        let response = WeightResponse::decode(&SAMPLE).unwrap();

        assert_eq!(response.length, 7);
        assert_eq!(response.command, 0xA0);
        assert_eq!(response.reading(), Reading::new(1234, 1, 1));
        assert!(response.checksum_matches());
    }

    #[test]
    fn test_decode_is_deterministic() {
        let first = WeightResponse::decode(&SAMPLE).unwrap();
        let second = WeightResponse::decode(&SAMPLE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_signed_fields() {
        let mut buf = SAMPLE;
        buf[6..10].copy_from_slice(&(-250i32).to_le_bytes());
        buf[10] = 0xFE;
        buf[11] = 0x00;

        let reading = WeightResponse::decode(&buf).unwrap().reading();
        assert_eq!(reading, Reading::new(-250, -2, 0));
        assert!(!reading.is_stable());
    }

    #[test]
    fn test_decode_wrong_size() {
        for len in [0, 5, 13, 15, 64] {
            let buf = vec![0u8; len];
            assert!(
                matches!(
                    WeightResponse::decode(&buf),
                    Err(Error::MalformedFrame { expected: 14, actual }) if actual == len
                ),
                "length {}",
                len
            );
        }
    }

    #[test]
    fn test_decode_bad_header() {
        let mut buf = SAMPLE;
        buf[2] = 0x00;

        assert!(matches!(
            WeightResponse::decode(&buf),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_checksum_mismatch_still_decodes() {
        let mut buf = SAMPLE;
        buf[13] ^= 0x01;

        let response = WeightResponse::decode(&buf).unwrap();
        assert!(!response.checksum_matches());
        assert_eq!(response.weight, 1234);
    }

    #[test]
    fn test_payload_matches_wire() {
        let response = WeightResponse::decode(&SAMPLE).unwrap();
        assert_eq!(&response.payload()[..], &SAMPLE[5..12]);
    }
}
