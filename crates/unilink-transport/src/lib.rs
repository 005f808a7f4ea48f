//! Byte transport for unilink.
//!
//! This is the lowest layer. It knows nothing about frames:
//! - [`ring`]: a fixed-capacity, lock-free single-producer/single-consumer
//!   byte queue, handed out as a [`Producer`] / [`Consumer`] pair.
//! - [`stream`]: adapters that move bytes between `std::io` streams
//!   (serial devices, files, pipes) and those ring handles.

pub mod error;
pub mod ring;
pub mod stream;

pub use error::{Result, TransportError};
pub use ring::{ring_buffer, Consumer, Producer};
pub use stream::ByteStream;
