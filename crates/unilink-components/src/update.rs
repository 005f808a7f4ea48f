//! Firmware update transfer: data blocks and the image checksum.

use bytes::{Buf, BufMut};
use serde::Serialize;
use unilink_frame::UPDATE;
use unilink_link::{Link, Result};
use unilink_registry::Handler;

use crate::record::Record;
use crate::Component;

pub const FIRMWARE_INFO_ID: u8 = 1;
pub const FIRMWARE_CRC_ID: u8 = 2;

/// Bytes of firmware carried per block.
pub const FIRMWARE_BLOCK_SIZE: usize = 256;

/// One block of firmware image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirmwareInfo {
    #[serde(serialize_with = "serialize_hex")]
    pub data: [u8; FIRMWARE_BLOCK_SIZE],
}

impl Default for FirmwareInfo {
    fn default() -> Self {
        Self {
            data: [0u8; FIRMWARE_BLOCK_SIZE],
        }
    }
}

impl Record for FirmwareInfo {
    const SIZE: usize = FIRMWARE_BLOCK_SIZE;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.data);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        let mut data = [0u8; FIRMWARE_BLOCK_SIZE];
        buf.copy_to_slice(&mut data);
        Self { data }
    }
}

/// CRC16 of the transferred image.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FirmwareCrc {
    pub crc16: u16,
}

impl Record for FirmwareCrc {
    const SIZE: usize = 2;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.crc16);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            crc16: buf.get_u16_le(),
        }
    }
}

/// The firmware update component.
pub struct Update;

impl Component for Update {
    const ID: u8 = UPDATE;

    fn register(link: &mut Link) -> Result<()> {
        link.register(
            Self::ID,
            FIRMWARE_INFO_ID,
            vec![0u8; FirmwareInfo::SIZE],
            Handler::Copy,
            FirmwareInfo::SIZE as u16,
        )?;
        link.register(
            Self::ID,
            FIRMWARE_CRC_ID,
            vec![0u8; FirmwareCrc::SIZE],
            Handler::Copy,
            FirmwareCrc::SIZE as u16,
        )
    }

    fn data_name(data_id: u8) -> Option<&'static str> {
        match data_id {
            FIRMWARE_INFO_ID => Some("firmware_info"),
            FIRMWARE_CRC_ID => Some("firmware_crc"),
            _ => None,
        }
    }
}

impl Update {
    pub fn firmware_info(link: &Link) -> Option<FirmwareInfo> {
        FirmwareInfo::from_slice(link.record(Self::ID, FIRMWARE_INFO_ID)?)
    }

    pub fn firmware_crc(link: &Link) -> Option<FirmwareCrc> {
        FirmwareCrc::from_slice(link.record(Self::ID, FIRMWARE_CRC_ID)?)
    }

    pub fn send_firmware_info(link: &mut Link, info: &FirmwareInfo) -> usize {
        link.build(Self::ID, FIRMWARE_INFO_ID, &info.data)
    }

    pub fn send_firmware_crc(link: &mut Link, crc: &FirmwareCrc) -> usize {
        link.build(Self::ID, FIRMWARE_CRC_ID, &crc.to_vec())
    }

    /// Queue an image as consecutive blocks, zero padding the last one.
    ///
    /// Stops at the first block the send buffer cannot take and returns the
    /// number of blocks queued.
    pub fn send_image(link: &mut Link, image: &[u8]) -> usize {
        let mut queued = 0;
        for chunk in image.chunks(FIRMWARE_BLOCK_SIZE) {
            let mut block = FirmwareInfo::default();
            block.data[..chunk.len()].copy_from_slice(chunk);
            if Self::send_firmware_info(link, &block) == 0 {
                break;
            }
            queued += 1;
        }
        queued
    }
}

fn serialize_hex<S: serde::Serializer>(
    data: &[u8; FIRMWARE_BLOCK_SIZE],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(data))
}
