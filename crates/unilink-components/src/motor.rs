//! Motor telemetry, configuration and set points.

use bytes::{Buf, BufMut};
use serde::Serialize;
use tracing::debug;
use unilink_frame::component::MOTORS;
use unilink_link::{Link, Result};
use unilink_registry::Handler;

use crate::record::{decode_array, encode_all, fixed_str, get_array, serialize_fixed_str, Record};
use crate::Component;

/// Motors addressed by one link.
pub const MAX_MOTORS: usize = 8;

pub const MOTOR_BASIC_ID: u8 = 1;
pub const MOTOR_INFO_ID: u8 = 2;
pub const MOTOR_SETTINGS_ID: u8 = 3;
pub const MOTOR_SET_ID: u8 = 4;

/// Fault reported in [`MotorBasic::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorFault {
    Ok,
    OverHeat,
    Internal,
    Other(u8),
}

impl From<u8> for MotorFault {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::OverHeat,
            255 => Self::Internal,
            other => Self::Other(other),
        }
    }
}

/// Control loop selected by [`MotorSettings::mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorMode {
    Current,
    Speed,
    Position,
    Mit,
}

impl TryFrom<u8> for MotorMode {
    type Error = u8;

    fn try_from(mode: u8) -> std::result::Result<Self, u8> {
        match mode {
            0 => Ok(Self::Current),
            1 => Ok(Self::Speed),
            2 => Ok(Self::Position),
            3 => Ok(Self::Mit),
            other => Err(other),
        }
    }
}

/// Periodic feedback of one motor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotorBasic {
    pub position: u16,
    pub speed: i16,
    pub current: u16,
    pub temperature: i8,
    pub error: u8,
}

impl MotorBasic {
    pub fn fault(&self) -> MotorFault {
        MotorFault::from(self.error)
    }
}

impl Record for MotorBasic {
    const SIZE: usize = 8;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.position);
        buf.put_i16_le(self.speed);
        buf.put_u16_le(self.current);
        buf.put_i8(self.temperature);
        buf.put_u8(self.error);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            position: buf.get_u16_le(),
            speed: buf.get_i16_le(),
            current: buf.get_u16_le(),
            temperature: buf.get_i8(),
            error: buf.get_u8(),
        }
    }
}

/// Static description of one motor, addressed by `motor_id`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct MotorInfo {
    pub motor_id: u8,
    /// Gear reduction ratio.
    pub ratio: f32,
    /// rad/s
    pub max_speed: f32,
    /// A
    pub max_current: f32,
    /// Nm/A
    pub torque_constant: f32,
    pub max_position: u32,
    /// Hours.
    pub run_time: u32,
    #[serde(serialize_with = "serialize_fixed_str")]
    pub model: [u8; 32],
    pub serial: [u8; 12],
    pub firmware_version: u32,
}

impl MotorInfo {
    pub fn model(&self) -> String {
        fixed_str(&self.model)
    }
}

impl Record for MotorInfo {
    const SIZE: usize = 73;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.motor_id);
        buf.put_f32_le(self.ratio);
        buf.put_f32_le(self.max_speed);
        buf.put_f32_le(self.max_current);
        buf.put_f32_le(self.torque_constant);
        buf.put_u32_le(self.max_position);
        buf.put_u32_le(self.run_time);
        buf.put_slice(&self.model);
        buf.put_slice(&self.serial);
        buf.put_u32_le(self.firmware_version);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            motor_id: buf.get_u8(),
            ratio: buf.get_f32_le(),
            max_speed: buf.get_f32_le(),
            max_current: buf.get_f32_le(),
            torque_constant: buf.get_f32_le(),
            max_position: buf.get_u32_le(),
            run_time: buf.get_u32_le(),
            model: get_array(buf),
            serial: get_array(buf),
            firmware_version: buf.get_u32_le(),
        }
    }
}

/// Settings shared by every motor on the link.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotorSettings {
    /// Feedback period in ms.
    pub feedback_interval: u8,
    pub reset_id: u8,
    pub mode: u8,
}

impl MotorSettings {
    pub fn mode(&self) -> Option<MotorMode> {
        MotorMode::try_from(self.mode).ok()
    }
}

impl Record for MotorSettings {
    const SIZE: usize = 3;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.feedback_interval);
        buf.put_u8(self.reset_id);
        buf.put_u8(self.mode);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            feedback_interval: buf.get_u8(),
            reset_id: buf.get_u8(),
            mode: buf.get_u8(),
        }
    }
}

/// Set point of one motor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotorSet {
    pub set: i16,
    pub extra: i16,
}

impl Record for MotorSet {
    const SIZE: usize = 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i16_le(self.set);
        buf.put_i16_le(self.extra);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            set: buf.get_i16_le(),
            extra: buf.get_i16_le(),
        }
    }
}

/// The motor component.
///
/// Records live in the link's registry; this type only knows their layout.
pub struct Motors;

impl Component for Motors {
    const ID: u8 = MOTORS;

    fn register(link: &mut Link) -> Result<()> {
        let basic_len = MotorBasic::SIZE * MAX_MOTORS;
        link.register(
            Self::ID,
            MOTOR_BASIC_ID,
            vec![0u8; basic_len],
            Handler::Copy,
            basic_len as u16,
        )?;

        // One payload carries one motor; the record keeps all of them.
        link.register(
            Self::ID,
            MOTOR_INFO_ID,
            vec![0u8; MotorInfo::SIZE * MAX_MOTORS],
            Handler::custom(store_motor_info),
            MotorInfo::SIZE as u16,
        )?;

        link.register(
            Self::ID,
            MOTOR_SETTINGS_ID,
            vec![0u8; MotorSettings::SIZE],
            Handler::Copy,
            MotorSettings::SIZE as u16,
        )?;

        let set_len = MotorSet::SIZE * MAX_MOTORS;
        link.register(
            Self::ID,
            MOTOR_SET_ID,
            vec![0u8; set_len],
            Handler::Copy,
            set_len as u16,
        )
    }

    fn data_name(data_id: u8) -> Option<&'static str> {
        match data_id {
            MOTOR_BASIC_ID => Some("motor_basic"),
            MOTOR_INFO_ID => Some("motor_info"),
            MOTOR_SETTINGS_ID => Some("motor_settings"),
            MOTOR_SET_ID => Some("motor_set"),
            _ => None,
        }
    }
}

fn store_motor_info(payload: &[u8], record: &mut [u8]) -> bool {
    let motor_id = payload[0] as usize;
    if motor_id >= MAX_MOTORS {
        debug!(motor_id, "motor info for unknown motor");
        return false;
    }
    let start = motor_id * MotorInfo::SIZE;
    record[start..start + MotorInfo::SIZE].copy_from_slice(payload);
    true
}

impl Motors {
    pub fn basic(link: &Link) -> Option<[MotorBasic; MAX_MOTORS]> {
        decode_array(link.record(Self::ID, MOTOR_BASIC_ID)?)
    }

    /// Last info received for `motor_id`.
    pub fn info(link: &Link, motor_id: u8) -> Option<MotorInfo> {
        let motor_id = motor_id as usize;
        if motor_id >= MAX_MOTORS {
            return None;
        }
        let record = link.record(Self::ID, MOTOR_INFO_ID)?;
        MotorInfo::from_slice(&record[motor_id * MotorInfo::SIZE..])
    }

    pub fn settings(link: &Link) -> Option<MotorSettings> {
        MotorSettings::from_slice(link.record(Self::ID, MOTOR_SETTINGS_ID)?)
    }

    pub fn set_points(link: &Link) -> Option<[MotorSet; MAX_MOTORS]> {
        decode_array(link.record(Self::ID, MOTOR_SET_ID)?)
    }

    /// Update the local set point of one motor, clearing its extra field.
    ///
    /// Returns `false` for an unknown motor or an unregistered link.
    pub fn set_motor_current(link: &mut Link, motor_id: u8, current: i16) -> bool {
        let motor_id = motor_id as usize;
        if motor_id >= MAX_MOTORS {
            return false;
        }
        let Some(record) = link.record_mut(Self::ID, MOTOR_SET_ID) else {
            return false;
        };
        let start = motor_id * MotorSet::SIZE;
        let mut slot = &mut record[start..start + MotorSet::SIZE];
        MotorSet {
            set: current,
            extra: 0,
        }
        .encode(&mut slot);
        true
    }

    pub fn send_basic(link: &mut Link, basic: &[MotorBasic; MAX_MOTORS]) -> usize {
        link.build(Self::ID, MOTOR_BASIC_ID, &encode_all(basic))
    }

    pub fn send_info(link: &mut Link, info: &MotorInfo) -> usize {
        link.build(Self::ID, MOTOR_INFO_ID, &info.to_vec())
    }

    pub fn send_settings(link: &mut Link, settings: &MotorSettings) -> usize {
        link.build(Self::ID, MOTOR_SETTINGS_ID, &settings.to_vec())
    }

    pub fn send_set(link: &mut Link, set: &[MotorSet; MAX_MOTORS]) -> usize {
        link.build(Self::ID, MOTOR_SET_ID, &encode_all(set))
    }

    /// Publish the locally held set points.
    pub fn send_set_points(link: &mut Link) -> usize {
        link.send_record(Self::ID, MOTOR_SET_ID)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    fn pair() -> (Link, Link) {
        let mut sender = Link::new().unwrap();
        let mut receiver = Link::new().unwrap();
        Motors::register(&mut sender).unwrap();
        Motors::register(&mut receiver).unwrap();
        (sender, receiver)
    }

    fn deliver(sender: &mut Link, receiver: &mut Link) -> usize {
        let mut wire = BytesMut::new();
        sender.drain_outbound(&mut wire);
        receiver.ingest(&wire);
        receiver.run_parse_pass()
    }

    fn info(motor_id: u8) -> MotorInfo {
        MotorInfo {
            motor_id,
            ratio: 19.2,
            max_speed: 48.5,
            max_current: 20.0,
            torque_constant: 0.3,
            max_position: 8191,
            run_time: 1200,
            model: crate::record::fill_fixed("M3508"),
            serial: [0xAB; 12],
            firmware_version: 0x0102_0304,
        }
    }

    #[test]
    fn record_sizes() {
        assert_eq!(MotorBasic::default().to_vec().len(), MotorBasic::SIZE);
        assert_eq!(info(0).to_vec().len(), MotorInfo::SIZE);
        assert_eq!(MotorSettings::default().to_vec().len(), MotorSettings::SIZE);
        assert_eq!(MotorSet::default().to_vec().len(), MotorSet::SIZE);
    }

    #[test]
    fn basic_feedback_reaches_receiver() {
        let (mut sender, mut receiver) = pair();
        let mut basic = [MotorBasic::default(); MAX_MOTORS];
        basic[2] = MotorBasic {
            position: 4096,
            speed: -300,
            current: 1500,
            temperature: 41,
            error: 1,
        };

        assert_eq!(Motors::send_basic(&mut sender, &basic), 8 + 64);
        assert_eq!(deliver(&mut sender, &mut receiver), 1);

        let received = Motors::basic(&receiver).unwrap();
        assert_eq!(received, basic);
        assert_eq!(received[2].fault(), MotorFault::OverHeat);
    }

    #[test]
    fn info_is_stored_by_motor_id() {
        let (mut sender, mut receiver) = pair();
        Motors::send_info(&mut sender, &info(3));
        Motors::send_info(&mut sender, &info(5));
        assert_eq!(deliver(&mut sender, &mut receiver), 2);

        assert_eq!(Motors::info(&receiver, 3), Some(info(3)));
        assert_eq!(Motors::info(&receiver, 5).unwrap().model(), "M3508");
        assert_eq!(Motors::info(&receiver, 0), Some(MotorInfo::default()));
        assert_eq!(Motors::info(&receiver, 8), None);
        assert_eq!(receiver.success_count(), 2);
    }

    #[test]
    fn info_for_unknown_motor_is_rejected() {
        let (mut sender, mut receiver) = pair();
        Motors::send_info(&mut sender, &info(9));
        deliver(&mut sender, &mut receiver);

        assert_eq!(receiver.decode_error_count(), 1);
        assert_eq!(receiver.success_count(), 0);
    }

    #[test]
    fn settings_and_mode() {
        let (mut sender, mut receiver) = pair();
        let settings = MotorSettings {
            feedback_interval: 10,
            reset_id: 0,
            mode: 1,
        };
        Motors::send_settings(&mut sender, &settings);
        deliver(&mut sender, &mut receiver);

        let received = Motors::settings(&receiver).unwrap();
        assert_eq!(received, settings);
        assert_eq!(received.mode(), Some(MotorMode::Speed));
    }

    #[test]
    fn set_motor_current_then_publish() {
        let (mut sender, mut receiver) = pair();
        assert!(Motors::set_motor_current(&mut sender, 1, -2000));
        assert!(!Motors::set_motor_current(&mut sender, 8, 100));

        Motors::send_set_points(&mut sender);
        deliver(&mut sender, &mut receiver);

        let set = Motors::set_points(&receiver).unwrap();
        assert_eq!(set[1], MotorSet { set: -2000, extra: 0 });
        assert_eq!(set[0], MotorSet::default());
    }

    #[test]
    fn info_serializes_model_as_text() {
        let json = serde_json::to_value(info(1)).unwrap();
        assert_eq!(json["model"], "M3508");
        assert_eq!(json["motor_id"], 1);
    }
}
