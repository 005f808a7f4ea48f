//! Fixed-size records carried over unilink.
//!
//! Each component binds its records to (component id, data id) pairs on a
//! [`Link`] through the generic registry contract, then reads them back with
//! typed getters and publishes them with `send_*`. Records are packed
//! little-endian with no padding.

pub mod decoded;
pub mod encoder;
pub mod motor;
pub mod record;
pub mod update;

pub use decoded::{decode, Decoded};
pub use encoder::Encoders;
pub use motor::Motors;
pub use record::Record;
pub use update::Update;

use unilink_link::{Link, Result};

/// A subsystem that owns a set of data ids under one component id.
pub trait Component {
    /// Component id every frame of this subsystem carries.
    const ID: u8;

    /// Register all of the component's records on `link`.
    fn register(link: &mut Link) -> Result<()>;

    /// Name of a data id within this component.
    fn data_name(data_id: u8) -> Option<&'static str>;
}

/// Register motors, encoders and firmware update on one link.
pub fn register_all(link: &mut Link) -> Result<()> {
    Motors::register(link)?;
    Encoders::register(link)?;
    Update::register(link)
}

/// Name of a data id of any known component.
pub fn data_name(component_id: u8, data_id: u8) -> Option<&'static str> {
    match component_id {
        unilink_frame::MOTORS => Motors::data_name(data_id),
        unilink_frame::ENCODERS => Encoders::data_name(data_id),
        unilink_frame::UPDATE => Update::data_name(data_id),
        _ => None,
    }
}
