//! Wire format of the unilink protocol.
//!
//! Every frame is an 8-byte header immediately followed by 0..=512 payload
//! bytes. Frames are sent back to back; the only delimiters are the marker
//! byte and the CRC16 that covers the header (minus its own field) and the
//! payload. Multi-byte fields are little-endian.
//!
//! ```text
//! ┌────────┬──────────┬───────────┬─────────┬──────────────────┬─────────┐
//! │ marker │ sequence │ component │ data id │ length+flags (LE)│ crc16   │
//! │ 0xA0   │ 1B       │ 1B        │ 1B      │ 13b len / 3b flag│ 2B LE   │
//! └────────┴──────────┴───────────┴─────────┴──────────────────┴─────────┘
//! ```

pub mod codec;
pub mod component;
pub mod crc;
pub mod error;
pub mod header;

pub use codec::{decode_frame, encode_frame, write_frame};
pub use component::{component_name, ENCODERS, EXAMPLES, MOTORS, SYSTEM, UPDATE};
pub use crc::{crc16, crc16_update, CRC16_INIT};
pub use error::{FrameError, Result};
pub use header::{
    FrameHeader, CRC_OFFSET, FLAGS_MASK, FLAGS_SHIFT, HEADER_SIZE, LENGTH_MASK, MARKER,
    MAX_FRAME_SIZE, MAX_PAYLOAD,
};
