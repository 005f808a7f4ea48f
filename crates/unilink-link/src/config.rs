use unilink_frame::{MAX_FRAME_SIZE, MAX_PAYLOAD};
use unilink_registry::RegistryConfig;

use crate::error::{LinkError, Result};

/// Default ring capacity: room for four maximum payloads.
pub const DEFAULT_RING_CAPACITY: usize = MAX_PAYLOAD * 4;

/// Sizing of a [`Link`](crate::Link).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Receive ring slots (usable bytes = capacity - 1).
    pub rx_capacity: usize,
    /// Send ring slots (usable bytes = capacity - 1).
    pub tx_capacity: usize,
    /// Registry bounds.
    pub registry: RegistryConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            rx_capacity: DEFAULT_RING_CAPACITY,
            tx_capacity: DEFAULT_RING_CAPACITY,
            registry: RegistryConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Both rings must fit at least one maximum frame.
    pub fn validate(&self) -> Result<()> {
        check_ring("rx", self.rx_capacity)?;
        check_ring("tx", self.tx_capacity)
    }
}

fn check_ring(ring: &'static str, capacity: usize) -> Result<()> {
    if capacity.saturating_sub(1) < MAX_FRAME_SIZE {
        return Err(LinkError::InvalidCapacity {
            ring,
            capacity,
            needed: MAX_FRAME_SIZE,
        });
    }
    Ok(())
}
