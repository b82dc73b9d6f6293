//! Frame checksum
//!
//! The EIS appends the one's complement of the wrapping 8-bit sum of the
//! payload. This is weaker than a CRC: any corruption that leaves the sum
//! unchanged modulo 256 (for example `+1` on one byte and `-1` on another)
//! passes. It is kept as-is because the instrument computes it this way.

use super::ProtocolError;

/// Calculate the checksum byte for a payload
pub fn calculate(payload: &[u8]) -> u8 {
    !payload.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Verify a captured frame body whose last byte is the checksum
pub fn verify(capture: &[u8]) -> Result<(), ProtocolError> {
    let Some((&actual, payload)) = capture.split_last() else {
        return Err(ProtocolError::InvalidFrame("empty capture".to_string()));
    };

    let expected = calculate(payload);
    if expected != actual {
        return Err(ProtocolError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_is_complement_of_sum() {
        assert_eq!(calculate(&[]), 0xFF);
        assert_eq!(calculate(&[0x01, 0x02, 0x03]), 0xFF - 6);
        // 0x80 + 0x80 wraps to 0
        assert_eq!(calculate(&[0x80, 0x80]), 0xFF);
    }

    #[test]
    fn test_appended_checksum_always_validates() {
        let payloads: [&[u8]; 4] = [
            &[0; 69],
            &[0xFF; 69],
            &[0x12, 0x34, 0x56, 0x78],
            &[0xFE, 0xFF, 0xFE],
        ];
        for payload in payloads {
            let mut capture = payload.to_vec();
            capture.push(calculate(payload));
            assert!(verify(&capture).is_ok(), "payload {payload:02x?}");
        }
    }

    #[test]
    fn test_single_byte_corruption_detected() {
        let mut capture: Vec<u8> = (0..69u8).collect();
        capture.push(calculate(&capture));

        for index in 0..capture.len() {
            for bit in 0..8 {
                let mut corrupted = capture.clone();
                corrupted[index] ^= 1 << bit;
                assert!(
                    matches!(verify(&corrupted), Err(ProtocolError::ChecksumMismatch { .. })),
                    "flip of bit {bit} in byte {index} went undetected"
                );
            }
        }
    }

    #[test]
    fn test_sum_preserving_corruption_is_not_detected() {
        let mut capture = vec![0x10; 69];
        capture.push(calculate(&capture[..69]));

        // Moving one unit between two bytes keeps the sum intact
        capture[4] += 1;
        capture[20] -= 1;
        assert!(verify(&capture).is_ok());
    }

    #[test]
    fn test_empty_capture_rejected() {
        assert!(matches!(verify(&[]), Err(ProtocolError::InvalidFrame(_))));
    }
}
