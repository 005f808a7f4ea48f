//! Dispatch registry for unilink frames.
//!
//! Maps a (component id, data id) pair to a handler entry: the destination
//! record, how payloads reach it ([`Handler`]) and the exact payload length
//! the message type carries. The registry knows nothing about bytes on the
//! wire; the link engine hands it validated payloads.

pub mod config;
pub mod error;
pub mod handler;
pub mod registry;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use handler::{CustomHandler, Entry, Handler};
pub use registry::{Dispatch, Key, Registry};
