//! Raw frame capture

use super::{checksum, ProtocolError, CAPTURE_LEN, FRAME_LEN, HEADER, HEADER_LEN, LAYOUT_LEN};

/// One complete frame as it appeared on the wire.
///
/// Built once per matched header and consumed by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    bytes: [u8; FRAME_LEN],
}

impl RawFrame {
    /// Build a frame from the bytes read after a matched header
    pub fn from_capture(capture: [u8; CAPTURE_LEN]) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..HEADER_LEN].copy_from_slice(&HEADER);
        bytes[HEADER_LEN..].copy_from_slice(&capture);
        Self { bytes }
    }

    /// Build a frame from header and payload, appending the checksum
    pub fn seal(layout: [u8; LAYOUT_LEN]) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..LAYOUT_LEN].copy_from_slice(&layout);
        bytes[LAYOUT_LEN] = checksum::calculate(&layout[HEADER_LEN..]);
        Self { bytes }
    }

    /// Parse a complete frame, header included
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        let bytes: [u8; FRAME_LEN] = data.try_into().map_err(|_| {
            ProtocolError::InvalidFrame(format!(
                "expected {} bytes, got {}",
                FRAME_LEN,
                data.len()
            ))
        })?;
        if bytes[..HEADER_LEN] != HEADER {
            return Err(ProtocolError::InvalidFrame(format!(
                "bad header {:02X?}",
                &bytes[..HEADER_LEN]
            )));
        }
        Ok(Self { bytes })
    }

    /// The whole frame
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Header bytes
    pub fn header(&self) -> &[u8] {
        &self.bytes[..HEADER_LEN]
    }

    /// Bytes read after the header: payload and checksum
    pub fn capture(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Payload bytes covered by the checksum
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..LAYOUT_LEN]
    }

    /// Bytes described by the record layout, header included
    pub fn layout_bytes(&self) -> &[u8] {
        &self.bytes[..LAYOUT_LEN]
    }

    /// Transmitted checksum byte
    pub fn checksum(&self) -> u8 {
        self.bytes[LAYOUT_LEN]
    }

    /// Check the transmitted checksum against the payload
    pub fn verify_checksum(&self) -> Result<(), ProtocolError> {
        checksum::verify(self.capture())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths() {
        assert_eq!(HEADER_LEN + CAPTURE_LEN, FRAME_LEN);
        assert_eq!(FRAME_LEN, 73);
        assert_eq!(CAPTURE_LEN, 70);
    }

    #[test]
    fn test_capture_gets_header_prefix() {
        let mut capture = [0u8; CAPTURE_LEN];
        capture[0] = 0xAB;
        let frame = RawFrame::from_capture(capture);
        assert_eq!(frame.header(), &HEADER);
        assert_eq!(frame.layout_bytes()[HEADER_LEN], 0xAB);
        assert_eq!(frame.capture(), &capture[..]);
    }

    #[test]
    fn test_seal_produces_valid_checksum() {
        let mut layout = [0u8; LAYOUT_LEN];
        layout[..HEADER_LEN].copy_from_slice(&HEADER);
        layout[10] = 0x42;
        let frame = RawFrame::seal(layout);
        assert_eq!(frame.checksum(), !0x42);
        assert!(frame.verify_checksum().is_ok());
    }

    #[test]
    fn test_header_not_covered_by_checksum() {
        let frame = RawFrame::seal([0u8; LAYOUT_LEN]);
        assert_eq!(frame.checksum(), 0xFF);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length_and_header() {
        assert!(matches!(
            RawFrame::from_bytes(&[0xFE, 0xFF, 0xFE]),
            Err(ProtocolError::InvalidFrame(_))
        ));

        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = 0xFE;
        assert!(matches!(
            RawFrame::from_bytes(&bytes),
            Err(ProtocolError::InvalidFrame(_))
        ));

        bytes[..HEADER_LEN].copy_from_slice(&HEADER);
        assert!(RawFrame::from_bytes(&bytes).is_ok());
    }
}
