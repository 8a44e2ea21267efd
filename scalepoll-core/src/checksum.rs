//! Scale frame checksum
//!
//! CRC-16 with polynomial 0x1021, zero initial value, no reflection and no
//! final XOR. Unlike CRC-16/XMODEM the input byte is folded into the low
//! byte of the register, after the high byte has been run through the
//! polynomial on its own.
//!
//! The device firmware computes the register in a wider integer and only
//! ever transmits the low 16 bits. Bit 15 of `temp ^ acc` is the only bit
//! tested, so wrapping 16-bit arithmetic yields the same low 16 bits.

use tracing::trace;

/// CCITT generator polynomial
pub const POLYNOMIAL: u16 = 0x1021;

/// Calculate the checksum of a frame payload
///
/// # Algorithm
///
/// ```text
/// for each byte b:
///     temp = crc & 0xFF00; acc = 0
///     8 times:
///         acc = if (temp ^ acc) & 0x8000 != 0 { (acc << 1) ^ 0x1021 } else { acc << 1 }
///         temp <<= 1
///     crc = acc ^ (crc << 8) ^ b
/// ```
///
/// # Examples
///
/// ```
/// use scalepoll_core::checksum;
///
/// assert_eq!(checksum::calculate(b"123456789"), 0xBEEF);
/// ```
pub fn calculate(data: &[u8]) -> u16 {
    let crc = data.iter().fold(0u16, |crc, &byte| {
        let mut temp = crc & 0xFF00;
        let mut acc: u16 = 0;

        for _ in 0..8 {
            acc = if (temp ^ acc) & 0x8000 != 0 {
                (acc << 1) ^ POLYNOMIAL
            } else {
                acc << 1
            };
            temp <<= 1;
        }

        acc ^ (crc << 8) ^ u16::from(byte)
    });

    trace!(
        data_len = data.len(),
        checksum = format!("0x{:04X}", crc),
        "Calculated checksum"
    );

    crc
}

/// Checksum serialized as it appears on the wire (most significant byte first)
pub fn to_bytes(data: &[u8]) -> [u8; 2] {
    calculate(data).to_be_bytes()
}

/// Verify a received checksum against the payload
pub fn verify(data: &[u8], expected: u16) -> bool {
    calculate(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Captured from the device's reference computation
    const GOLDEN: &[(&[u8], u16)] = &[
        (&[], 0x0000),
        (&[0x00], 0x0000),
        (&[0xA0], 0x00A0),
        (&[0x01, 0x02], 0x0102),
        (&[0x01, 0x02, 0x03], 0x1222),
        (b"123456789", 0xBEEF),
        (&[0xA0, 0xD2, 0x04, 0x00, 0x00, 0x01, 0x01], 0xB2CE),
        (&[0xFF, 0xFF, 0xFF, 0xFF], 0xE2F0),
    ];

    #[test]
    fn test_golden_vectors() {
        for (input, expected) in GOLDEN {
            assert_eq!(
                calculate(input),
                *expected,
                "checksum of {}",
                hex::encode(input)
            );
        }
    }

    #[test]
    fn test_to_bytes_is_big_endian() {
        assert_eq!(to_bytes(&[0xA0]), [0x00, 0xA0]);
        assert_eq!(to_bytes(b"123456789"), [0xBE, 0xEF]);
    }

    #[test]
    fn test_checksum_is_deterministic() {
        let payload = vec![0x5A; 300];
        assert_eq!(calculate(&payload), calculate(&payload));
    }

    #[test]
    fn test_checksum_verify() {
        let payload = [0xA0, 0xD2, 0x04, 0x00, 0x00, 0x01, 0x01];

        assert!(verify(&payload, 0xB2CE));
        assert!(!verify(&payload, 0xB2CF));
    }

    #[test]
    fn test_checksum_order_sensitive() {
        assert_ne!(calculate(&[0x01, 0x02, 0x03]), calculate(&[0x03, 0x02, 0x01]));
    }

    #[test]
    fn test_checksum_large_payload() {
        // Must not overflow on long inputs
        let payload = vec![0xFF; 65535];
        assert_eq!(calculate(&payload), calculate(&payload));
    }
}
