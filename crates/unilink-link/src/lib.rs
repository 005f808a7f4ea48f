//! The unilink link engine.
//!
//! A [`Link`] owns a receive ring, a send ring, the dispatch registry and the
//! protocol counters. Bytes come in through [`Link::ingest`] (or a detached
//! ingest [`Producer`](unilink_transport::Producer)), a parse pass
//! synchronizes on the marker, validates length and CRC, accounts sequence
//! gaps and dispatches each frame. Outbound frames are built into the send
//! ring and drained by the caller.
//!
//! Nothing here blocks, spawns threads or panics on malformed input: every
//! operation completes immediately or reports that it could not proceed.

pub mod config;
pub mod error;
pub mod link;
pub mod outcome;
pub mod stats;

mod outbound;

pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use link::{Link, INITIAL_SEQUENCE};
pub use outcome::FrameOutcome;
pub use stats::LinkStats;
