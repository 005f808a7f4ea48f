use crate::crc::{crc16_update, CRC16_INIT};
use crate::error::{FrameError, Result};

/// Frame header size on the wire.
pub const HEADER_SIZE: usize = 8;

/// First byte of every frame.
pub const MARKER: u8 = 0xA0;

/// Largest payload the protocol accepts. Smaller than what the 13-bit
/// length field can express, and always the cap that governs acceptance.
pub const MAX_PAYLOAD: usize = 512;

/// Largest complete frame.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD;

/// Offset of the CRC field; the CRC covers the header bytes before it.
pub const CRC_OFFSET: usize = 6;

/// Low 13 bits of the length+flags field.
pub const LENGTH_MASK: u16 = 0x1FFF;

/// High 3 bits of the length+flags field.
pub const FLAGS_MASK: u16 = 0xE000;

pub const FLAGS_SHIFT: u16 = 13;

/// Decoded 8-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub marker: u8,
    pub sequence: u8,
    pub component_id: u8,
    pub data_id: u8,
    length_and_flags: u16,
    pub crc16: u16,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            marker: MARKER,
            sequence: 0,
            component_id: 0,
            data_id: 0,
            length_and_flags: 0,
            crc16: 0,
        }
    }
}

impl FrameHeader {
    /// Header with the marker set, flags cleared and no CRC yet.
    pub fn new(sequence: u8, component_id: u8, data_id: u8, length: u16) -> Self {
        let mut header = Self {
            sequence,
            component_id,
            data_id,
            ..Self::default()
        };
        header.set_flags_and_length(0, length);
        header
    }

    /// Payload length (low 13 bits).
    #[inline]
    pub fn length(&self) -> u16 {
        self.length_and_flags & LENGTH_MASK
    }

    /// Set the payload length, keeping the flags. Values are masked to 13 bits.
    #[inline]
    pub fn set_length(&mut self, length: u16) {
        self.length_and_flags = (self.length_and_flags & FLAGS_MASK) | (length & LENGTH_MASK);
    }

    /// Reserved flags (high 3 bits).
    #[inline]
    pub fn flags(&self) -> u8 {
        ((self.length_and_flags >> FLAGS_SHIFT) & 0x7) as u8
    }

    /// Set the flags, keeping the length. Values are masked to 3 bits.
    #[inline]
    pub fn set_flags(&mut self, flags: u8) {
        self.length_and_flags =
            (self.length_and_flags & LENGTH_MASK) | (((flags as u16) & 0x7) << FLAGS_SHIFT);
    }

    /// Set both halves of the field at once.
    #[inline]
    pub fn set_flags_and_length(&mut self, flags: u8, length: u16) {
        self.length_and_flags = (((flags as u16) & 0x7) << FLAGS_SHIFT) | (length & LENGTH_MASK);
    }

    /// Raw length+flags field as carried on the wire.
    #[inline]
    pub fn length_and_flags(&self) -> u16 {
        self.length_and_flags
    }

    #[inline]
    pub fn has_marker(&self) -> bool {
        self.marker == MARKER
    }

    /// Header plus declared payload.
    #[inline]
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.length() as usize
    }

    /// Decode from exactly one header's worth of bytes. Performs no validation.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        Self {
            marker: buf[0],
            sequence: buf[1],
            component_id: buf[2],
            data_id: buf[3],
            length_and_flags: u16::from_le_bytes([buf[4], buf[5]]),
            crc16: u16::from_le_bytes([buf[6], buf[7]]),
        }
    }

    /// Decode from the front of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let bytes: &[u8; HEADER_SIZE] = buf
            .get(..HEADER_SIZE)
            .and_then(|head| head.try_into().ok())
            .ok_or(FrameError::Truncated { len: buf.len() })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Encode to the wire layout.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let len = self.length_and_flags.to_le_bytes();
        let crc = self.crc16.to_le_bytes();
        [
            self.marker,
            self.sequence,
            self.component_id,
            self.data_id,
            len[0],
            len[1],
            crc[0],
            crc[1],
        ]
    }

    /// CRC over the header bytes before the CRC field, continued over `payload`.
    pub fn compute_crc(&self, payload: &[u8]) -> u16 {
        let bytes = self.to_bytes();
        let crc = crc16_update(CRC16_INIT, &bytes[..CRC_OFFSET]);
        crc16_update(crc, payload)
    }

    /// Store the CRC for `payload` in the header.
    pub fn seal(&mut self, payload: &[u8]) {
        self.crc16 = self.compute_crc(payload);
    }

    /// Whether the carried CRC matches `payload`.
    pub fn verify(&self, payload: &[u8]) -> bool {
        self.compute_crc(payload) == self.crc16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed() -> FrameHeader {
        FrameHeader::from_bytes(&[0u8; HEADER_SIZE])
    }

    #[test]
    fn header_is_eight_bytes() {
        assert_eq!(FrameHeader::default().to_bytes().len(), HEADER_SIZE);
        assert!(MAX_PAYLOAD < LENGTH_MASK as usize);
    }

    #[test]
    fn length_accessors_mask_to_13_bits() {
        let mut header = zeroed();
        header.set_length(0x1234);
        assert_eq!(header.length(), 0x1234 & 0x1FFF);

        header.set_length(0x1FFF);
        assert_eq!(header.length(), 0x1FFF);

        header.set_length(0x2000);
        assert_eq!(header.length(), 0);
    }

    #[test]
    fn flags_accessors_preserve_length() {
        let mut header = zeroed();
        header.set_flags(0x05);
        assert_eq!(header.flags(), 0x05);

        header.set_flags(0x07);
        assert_eq!(header.flags(), 0x07);

        header.set_length(100);
        header.set_flags(0x03);
        assert_eq!(header.length(), 100);
        assert_eq!(header.flags(), 0x03);

        header.set_length(42);
        assert_eq!(header.flags(), 0x03);
    }

    #[test]
    fn combined_setter() {
        let mut header = zeroed();
        header.set_flags_and_length(0x05, 0x0ABC);
        assert_eq!(header.flags(), 0x05);
        assert_eq!(header.length(), 0x0ABC);
        assert_eq!(header.length_and_flags(), 0xAABC);
    }

    #[test]
    fn wire_layout_is_little_endian() {
        let mut header = FrameHeader::new(7, 0x01, 0x02, 0x0102);
        header.set_flags(0x1);
        header.crc16 = 0xBEEF;

        assert_eq!(
            header.to_bytes(),
            [0xA0, 7, 0x01, 0x02, 0x02, 0x21, 0xEF, 0xBE]
        );
        assert_eq!(FrameHeader::from_bytes(&header.to_bytes()), header);
    }

    #[test]
    fn parse_rejects_short_input() {
        assert_eq!(
            FrameHeader::parse(&[0xA0, 0, 0]),
            Err(FrameError::Truncated { len: 3 })
        );
    }

    #[test]
    fn seal_and_verify() {
        let payload = b"telemetry";
        let mut header = FrameHeader::new(1, 3, 4, payload.len() as u16);
        header.seal(payload);

        assert!(header.verify(payload));
        assert!(!header.verify(b"telemetrY"));

        let mut corrupted = header;
        corrupted.crc16 ^= 0x0100;
        assert!(!corrupted.verify(payload));
    }

    #[test]
    fn crc_covers_header_fields() {
        let mut header = FrameHeader::new(1, 3, 4, 0);
        header.seal(&[]);

        let mut other = header;
        other.data_id = 5;
        assert!(!other.verify(&[]));
    }
}
