/// Errors from strict (one-shot) frame encoding and decoding.
///
/// The streaming parser never surfaces these; it resynchronizes instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than a full header were supplied.
    #[error("truncated header ({len} bytes, need 8)")]
    Truncated { len: usize },

    /// The first byte is not the frame marker.
    #[error("invalid frame marker 0x{0:02X} (expected 0xA0)")]
    InvalidMarker(u8),

    /// The payload exceeds the protocol maximum.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The CRC carried in the header does not match the computed one.
    #[error("crc mismatch (header 0x{expected:04X}, computed 0x{actual:04X})")]
    CrcMismatch { expected: u16, actual: u16 },

    /// The output buffer cannot hold the encoded frame.
    #[error("output buffer too small ({available} bytes, need {needed})")]
    BufferTooSmall { needed: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
