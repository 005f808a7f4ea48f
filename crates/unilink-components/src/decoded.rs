//! Typed view of a payload, for tools that print what crossed the wire.

use serde::Serialize;
use unilink_frame::{ENCODERS, MOTORS, UPDATE};

use crate::encoder::{
    EncoderBasic, EncoderInfo, EncoderSetting, ENCODER_BASIC_ID, ENCODER_INFO_ID,
    ENCODER_SETTING_ID, MAX_ENCODERS,
};
use crate::motor::{
    MotorBasic, MotorInfo, MotorSet, MotorSettings, MAX_MOTORS, MOTOR_BASIC_ID,
    MOTOR_INFO_ID, MOTOR_SETTINGS_ID, MOTOR_SET_ID,
};
use crate::record::{decode_array, Record};
use crate::update::{FirmwareCrc, FirmwareInfo, FIRMWARE_CRC_ID, FIRMWARE_INFO_ID};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", content = "value", rename_all = "snake_case")]
pub enum Decoded {
    MotorBasic([MotorBasic; MAX_MOTORS]),
    MotorInfo(MotorInfo),
    MotorSettings(MotorSettings),
    MotorSet([MotorSet; MAX_MOTORS]),
    EncoderBasic([EncoderBasic; MAX_ENCODERS]),
    EncoderInfo(EncoderInfo),
    EncoderSetting(EncoderSetting),
    FirmwareInfo(FirmwareInfo),
    FirmwareCrc(FirmwareCrc),
}

/// Decode a payload of a known (component id, data id).
///
/// Returns `None` for unknown pairs, read requests and payloads whose
/// length does not match the record.
pub fn decode(component_id: u8, data_id: u8, payload: &[u8]) -> Option<Decoded> {
    match (component_id, data_id) {
        (MOTORS, MOTOR_BASIC_ID) => array(payload).map(Decoded::MotorBasic),
        (MOTORS, MOTOR_INFO_ID) => single(payload).map(Decoded::MotorInfo),
        (MOTORS, MOTOR_SETTINGS_ID) => single(payload).map(Decoded::MotorSettings),
        (MOTORS, MOTOR_SET_ID) => array(payload).map(Decoded::MotorSet),
        (ENCODERS, ENCODER_BASIC_ID) => array(payload).map(Decoded::EncoderBasic),
        (ENCODERS, ENCODER_INFO_ID) => single(payload).map(Decoded::EncoderInfo),
        (ENCODERS, ENCODER_SETTING_ID) => single(payload).map(Decoded::EncoderSetting),
        (UPDATE, FIRMWARE_INFO_ID) => single(payload).map(Decoded::FirmwareInfo),
        (UPDATE, FIRMWARE_CRC_ID) => single(payload).map(Decoded::FirmwareCrc),
        _ => None,
    }
}

fn single<R: Record>(payload: &[u8]) -> Option<R> {
    if payload.len() != R::SIZE {
        return None;
    }
    R::from_slice(payload)
}

fn array<R: Record + Default + Copy, const N: usize>(payload: &[u8]) -> Option<[R; N]> {
    if payload.len() != R::SIZE * N {
        return None;
    }
    decode_array(payload)
}
