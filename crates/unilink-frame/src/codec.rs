use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::header::{FrameHeader, HEADER_SIZE, MAX_PAYLOAD};

/// Encode a sealed frame into `out` without allocating.
///
/// Returns the number of bytes written (header + payload).
pub fn write_frame(
    out: &mut [u8],
    sequence: u8,
    component_id: u8,
    data_id: u8,
    flags: u8,
    payload: &[u8],
) -> Result<usize> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let total = HEADER_SIZE + payload.len();
    if out.len() < total {
        return Err(FrameError::BufferTooSmall {
            needed: total,
            available: out.len(),
        });
    }

    let mut header = FrameHeader::new(sequence, component_id, data_id, payload.len() as u16);
    header.set_flags(flags);
    header.seal(payload);

    out[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
    out[HEADER_SIZE..total].copy_from_slice(payload);
    Ok(total)
}

/// Encode a sealed frame and append it to `dst`.
pub fn encode_frame(
    sequence: u8,
    component_id: u8,
    data_id: u8,
    flags: u8,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<usize> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let mut header = FrameHeader::new(sequence, component_id, data_id, payload.len() as u16);
    header.set_flags(flags);
    header.seal(payload);

    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&header.to_bytes());
    dst.put_slice(payload);
    Ok(HEADER_SIZE + payload.len())
}

/// Strictly decode one frame from the front of `src`.
///
/// Returns `Ok(None)` if `src` doesn't contain a complete frame yet. Unlike
/// the streaming parser this does not resynchronize: the first bad marker,
/// length or CRC is an error.
pub fn decode_frame(src: &[u8]) -> Result<Option<(FrameHeader, &[u8])>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let header = FrameHeader::parse(src)?;
    if !header.has_marker() {
        return Err(FrameError::InvalidMarker(header.marker));
    }

    let payload_len = header.length() as usize;
    if payload_len > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None);
    }

    let payload = &src[HEADER_SIZE..total];
    let actual = header.compute_crc(payload);
    if actual != header.crc16 {
        return Err(FrameError::CrcMismatch {
            expected: header.crc16,
            actual,
        });
    }

    Ok(Some((header, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MARKER, MAX_FRAME_SIZE};

    #[test]
    fn encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let written = encode_frame(9, 0x01, 0x02, 0, b"hello, unilink!", &mut buf).unwrap();
        assert_eq!(written, HEADER_SIZE + 15);
        assert_eq!(buf[0], MARKER);

        let (header, payload) = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(header.sequence, 9);
        assert_eq!(header.component_id, 0x01);
        assert_eq!(header.data_id, 0x02);
        assert_eq!(payload, b"hello, unilink!");
    }

    #[test]
    fn write_frame_matches_encode_frame() {
        let mut fixed = [0u8; MAX_FRAME_SIZE];
        let n = write_frame(&mut fixed, 3, 4, 5, 0x2, b"abc").unwrap();

        let mut dynamic = BytesMut::new();
        encode_frame(3, 4, 5, 0x2, b"abc", &mut dynamic).unwrap();
        assert_eq!(&fixed[..n], &dynamic[..]);

        let (header, _) = decode_frame(&fixed[..n]).unwrap().unwrap();
        assert_eq!(header.flags(), 0x2);
    }

    #[test]
    fn write_frame_rejects_small_output() {
        let mut out = [0u8; 10];
        assert_eq!(
            write_frame(&mut out, 0, 0, 0, 0, b"abc"),
            Err(FrameError::BufferTooSmall {
                needed: 11,
                available: 10
            })
        );
    }

    #[test]
    fn oversized_payload_rejected() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut buf = BytesMut::new();
        assert!(matches!(
            encode_frame(0, 0, 0, 0, &payload, &mut buf),
            Err(FrameError::PayloadTooLarge { .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn max_payload_accepted() {
        let payload = vec![0x5A; MAX_PAYLOAD];
        let mut buf = BytesMut::new();
        encode_frame(0, 1, 1, 0, &payload, &mut buf).unwrap();
        let (header, decoded) = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(header.length() as usize, MAX_PAYLOAD);
        assert_eq!(decoded.len(), MAX_PAYLOAD);
    }

    #[test]
    fn incomplete_input_waits() {
        let mut buf = BytesMut::new();
        encode_frame(0, 1, 1, 0, b"hello", &mut buf).unwrap();

        assert_eq!(decode_frame(&buf[..3]).unwrap(), None);
        assert_eq!(decode_frame(&buf[..HEADER_SIZE + 2]).unwrap(), None);
    }

    #[test]
    fn invalid_marker() {
        let bytes = [0xFF, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode_frame(&bytes), Err(FrameError::InvalidMarker(0xFF)));
    }

    #[test]
    fn declared_length_over_protocol_max() {
        let mut header = FrameHeader::new(0, 0, 0, 0);
        header.set_length(600);
        assert!(matches!(
            decode_frame(&header.to_bytes()),
            Err(FrameError::PayloadTooLarge { size: 600, .. })
        ));
    }

    #[test]
    fn crc_corruption_detected() {
        let mut buf = BytesMut::new();
        encode_frame(0, 1, 2, 0, b"payload", &mut buf).unwrap();
        buf[HEADER_SIZE + 1] ^= 0x10;

        assert!(matches!(
            decode_frame(&buf),
            Err(FrameError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn empty_payload() {
        let mut buf = BytesMut::new();
        encode_frame(0, 1, 2, 0, b"", &mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);

        let (header, payload) = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(header.length(), 0);
        assert!(payload.is_empty());
    }
}
