//! CRC-16/MCRF4XX: reflected polynomial 0x1021 (0x8408), init 0xFFFF, no
//! final XOR. The running value can be continued across buffers, which is
//! how a frame CRC covers header and payload without copying them together.

/// Initial value of a running CRC.
pub const CRC16_INIT: u16 = 0xFFFF;

const POLY_REFLECTED: u16 = 0x8408;

/// Byte-wise lookup table.
pub static CRC16_TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLY_REFLECTED
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Continue a running CRC over `data`.
#[inline]
pub fn crc16_update(crc: u16, data: &[u8]) -> u16 {
    data.iter().fold(crc, |crc, &byte| {
        (crc >> 8) ^ CRC16_TABLE[((crc ^ byte as u16) & 0xFF) as usize]
    })
}

/// CRC of a single buffer.
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    crc16_update(CRC16_INIT, data)
}
