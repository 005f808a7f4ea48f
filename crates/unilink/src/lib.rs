//! Resynchronizing binary framing for byte streams.
//!
//! unilink carries small fixed-size records between a host and embedded
//! peers over any byte stream: serial ports, USB CDC, pipes. Frames are
//! marker-prefixed and CRC16-protected, and a receiver recovers from
//! corruption by sliding forward one byte at a time.
//!
//! # Crate Structure
//!
//! - [`transport`]: lock-free SPSC byte rings and `std::io` stream adapters
//! - [`frame`]: wire header, CRC16 and a slice frame codec
//! - [`registry`]: (component id, data id) dispatch table
//! - [`link`]: the parse/dispatch engine and frame builder
//! - [`components`]: motor, encoder and firmware-update records (behind the
//!   `components` feature)
//!
//! ```
//! use unilink::{Handler, Link};
//!
//! let mut device = Link::new()?;
//! let mut host = Link::new()?;
//! host.register(0x04, 0x01, vec![0u8; 2], Handler::Copy, 2)?;
//!
//! device.build(0x04, 0x01, &[0x12, 0x34]);
//! let mut wire = Vec::new();
//! device.drain_outbound(&mut wire);
//!
//! host.ingest(&wire);
//! assert_eq!(host.run_parse_pass(), 1);
//! assert_eq!(host.record(0x04, 0x01), Some(&[0x12, 0x34][..]));
//! # Ok::<(), unilink::LinkError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use unilink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use unilink_frame::*;
}

/// Re-export registry types.
pub mod registry {
    pub use unilink_registry::*;
}

/// Re-export link types.
pub mod link {
    pub use unilink_link::*;
}

/// Re-export component records (requires `components` feature).
#[cfg(feature = "components")]
pub mod components {
    pub use unilink_components::*;
}

pub use unilink_frame::FrameHeader;
pub use unilink_link::{FrameOutcome, Link, LinkConfig, LinkError, LinkStats};
pub use unilink_registry::Handler;
