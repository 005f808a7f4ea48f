//! Well-known component ids.
//!
//! A component id is the first level of the (component, data id) namespace;
//! each component defines its own data ids.

/// Link-level and system messages.
pub const SYSTEM: u8 = 0x00;

/// Motor telemetry and commands.
pub const MOTORS: u8 = 0x01;

/// Firmware update transfer.
pub const UPDATE: u8 = 0x02;

/// Encoder feedback.
pub const ENCODERS: u8 = 0x03;

/// Free for demos and tests.
pub const EXAMPLES: u8 = 0x04;

/// Returns a human-readable name for a component id.
pub fn component_name(id: u8) -> &'static str {
    match id {
        SYSTEM => "SYSTEM",
        MOTORS => "MOTORS",
        UPDATE => "UPDATE",
        ENCODERS => "ENCODERS",
        EXAMPLES => "EXAMPLES",
        _ => "USER",
    }
}
