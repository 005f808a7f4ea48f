//! Encoder feedback and configuration.

use bytes::{Buf, BufMut};
use serde::Serialize;
use unilink_frame::ENCODERS;
use unilink_link::{Link, Result};
use unilink_registry::Handler;

use crate::record::{decode_array, encode_all, fixed_str, get_array, serialize_fixed_str, Record};
use crate::Component;

pub const MAX_ENCODERS: usize = 8;

pub const ENCODER_BASIC_ID: u8 = 1;
pub const ENCODER_INFO_ID: u8 = 2;
pub const ENCODER_SETTING_ID: u8 = 3;

/// Fault reported in [`EncoderBasic::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderFault {
    Ok,
    Overflow,
    MagnetTooStrong,
    MagnetTooWeak,
    Internal,
    Other(u8),
}

impl From<u8> for EncoderFault {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Overflow,
            2 => Self::MagnetTooStrong,
            3 => Self::MagnetTooWeak,
            255 => Self::Internal,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncoderBasic {
    pub position: u16,
    pub velocity: i32,
    pub error: u8,
}

impl EncoderBasic {
    pub fn fault(&self) -> EncoderFault {
        EncoderFault::from(self.error)
    }
}

impl Record for EncoderBasic {
    const SIZE: usize = 7;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.position);
        buf.put_i32_le(self.velocity);
        buf.put_u8(self.error);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            position: buf.get_u16_le(),
            velocity: buf.get_i32_le(),
            error: buf.get_u8(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncoderInfo {
    pub encoder_id: u8,
    /// Bits per revolution.
    pub resolution: u8,
    pub max_velocity: u32,
    pub max_position: u32,
    pub run_time: u32,
    #[serde(serialize_with = "serialize_fixed_str")]
    pub model: [u8; 32],
    pub serial: [u8; 12],
    pub firmware_version: u32,
}

impl EncoderInfo {
    pub fn model(&self) -> String {
        fixed_str(&self.model)
    }
}

impl Record for EncoderInfo {
    const SIZE: usize = 62;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.encoder_id);
        buf.put_u8(self.resolution);
        buf.put_u32_le(self.max_velocity);
        buf.put_u32_le(self.max_position);
        buf.put_u32_le(self.run_time);
        buf.put_slice(&self.model);
        buf.put_slice(&self.serial);
        buf.put_u32_le(self.firmware_version);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            encoder_id: buf.get_u8(),
            resolution: buf.get_u8(),
            max_velocity: buf.get_u32_le(),
            max_position: buf.get_u32_le(),
            run_time: buf.get_u32_le(),
            model: get_array(buf),
            serial: get_array(buf),
            firmware_version: buf.get_u32_le(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncoderSetting {
    /// Feedback period in ms.
    pub feedback_interval: u8,
    pub reset_id: u8,
}

impl Record for EncoderSetting {
    const SIZE: usize = 2;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.feedback_interval);
        buf.put_u8(self.reset_id);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            feedback_interval: buf.get_u8(),
            reset_id: buf.get_u8(),
        }
    }
}

/// The encoder component.
pub struct Encoders;

impl Component for Encoders {
    const ID: u8 = ENCODERS;

    fn register(link: &mut Link) -> Result<()> {
        let basic_len = EncoderBasic::SIZE * MAX_ENCODERS;
        link.register(
            Self::ID,
            ENCODER_BASIC_ID,
            vec![0u8; basic_len],
            Handler::Copy,
            basic_len as u16,
        )?;
        link.register(
            Self::ID,
            ENCODER_INFO_ID,
            vec![0u8; EncoderInfo::SIZE],
            Handler::Copy,
            EncoderInfo::SIZE as u16,
        )?;
        link.register(
            Self::ID,
            ENCODER_SETTING_ID,
            vec![0u8; EncoderSetting::SIZE],
            Handler::Copy,
            EncoderSetting::SIZE as u16,
        )
    }

    fn data_name(data_id: u8) -> Option<&'static str> {
        match data_id {
            ENCODER_BASIC_ID => Some("encoder_basic"),
            ENCODER_INFO_ID => Some("encoder_info"),
            ENCODER_SETTING_ID => Some("encoder_setting"),
            _ => None,
        }
    }
}

impl Encoders {
    pub fn basic(link: &Link) -> Option<[EncoderBasic; MAX_ENCODERS]> {
        decode_array(link.record(Self::ID, ENCODER_BASIC_ID)?)
    }

    pub fn info(link: &Link) -> Option<EncoderInfo> {
        EncoderInfo::from_slice(link.record(Self::ID, ENCODER_INFO_ID)?)
    }

    pub fn setting(link: &Link) -> Option<EncoderSetting> {
        EncoderSetting::from_slice(link.record(Self::ID, ENCODER_SETTING_ID)?)
    }

    pub fn send_basic(link: &mut Link, basic: &[EncoderBasic; MAX_ENCODERS]) -> usize {
        link.build(Self::ID, ENCODER_BASIC_ID, &encode_all(basic))
    }

    pub fn send_info(link: &mut Link, info: &EncoderInfo) -> usize {
        link.build(Self::ID, ENCODER_INFO_ID, &info.to_vec())
    }

    pub fn send_setting(link: &mut Link, setting: &EncoderSetting) -> usize {
        link.build(Self::ID, ENCODER_SETTING_ID, &setting.to_vec())
    }

    /// Ask the peer for its current encoder info.
    pub fn request_info(link: &mut Link) -> usize {
        link.build(Self::ID, ENCODER_INFO_ID, &[])
    }
}
