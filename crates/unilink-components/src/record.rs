use bytes::{Buf, BufMut};

/// A packed little-endian record with a fixed wire size.
pub trait Record: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Append the encoded record to `buf`.
    fn encode<B: BufMut>(&self, buf: &mut B);

    /// Decode one record from the front of `buf`.
    ///
    /// `buf` must hold at least [`Self::SIZE`] bytes.
    fn decode<B: Buf>(buf: &mut B) -> Self;

    /// Encoded bytes of a single record.
    fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        self.encode(&mut out);
        out
    }

    /// Decode from the front of `bytes`, or `None` if it is too short.
    fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut buf = bytes;
        Some(Self::decode(&mut buf))
    }
}

/// Encode a run of records back to back.
pub fn encode_all<R: Record>(records: &[R]) -> Vec<u8> {
    let mut out = Vec::with_capacity(R::SIZE * records.len());
    for record in records {
        record.encode(&mut out);
    }
    out
}

/// Decode `N` consecutive records, or `None` if `bytes` is too short.
pub fn decode_array<R: Record + Default + Copy, const N: usize>(bytes: &[u8]) -> Option<[R; N]> {
    if bytes.len() < R::SIZE * N {
        return None;
    }
    let mut buf = bytes;
    let mut out = [R::default(); N];
    for slot in out.iter_mut() {
        *slot = R::decode(&mut buf);
    }
    Some(out)
}

/// Fixed-size text field: bytes up to the first NUL, lossily decoded.
pub fn fixed_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Copy `text` into a fixed-size field, truncating and NUL padding.
pub fn fill_fixed<const N: usize>(text: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let len = text.len().min(N);
    out[..len].copy_from_slice(&text.as_bytes()[..len]);
    out
}

pub(crate) fn serialize_fixed_str<S, const N: usize>(
    bytes: &[u8; N],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&fixed_str(bytes))
}

pub(crate) fn get_array<B: Buf, const N: usize>(buf: &mut B) -> [u8; N] {
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    out
}
