use std::collections::HashMap;

use tracing::debug;
use unilink_frame::MAX_PAYLOAD;

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::handler::{Entry, Handler};

/// (component id, data id).
pub type Key = (u8, u8);

/// What happened to a payload handed to [`Registry::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing is registered for the pair.
    Unregistered,
    /// Empty payload for a registered pair: the peer asks for the current value.
    ReadRequest,
    /// Non-empty payload whose length differs from the registered one.
    LengthMismatch { expected: u16, actual: u16 },
    /// The payload was stored.
    Delivered,
    /// A custom handler refused the payload.
    Rejected,
}

/// Bounded table of handler entries keyed by (component id, data id).
///
/// Entries are populated during setup. Dispatch never allocates. Mutating
/// the registry needs `&mut`, so it cannot race a parse pass that borrows it.
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<Key, Entry>,
    config: RegistryConfig,
}

impl Registry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entries: HashMap::with_capacity(config.max_handlers),
            config,
        }
    }

    /// Register a destination record for `(component_id, data_id)`.
    ///
    /// `record` must hold at least `expected_len` bytes. Registering an
    /// existing pair replaces it.
    pub fn register(
        &mut self,
        component_id: u8,
        data_id: u8,
        record: impl Into<Box<[u8]>>,
        handler: Handler,
        expected_len: u16,
    ) -> Result<()> {
        let record = record.into();

        if expected_len as usize > MAX_PAYLOAD {
            return Err(RegistryError::PayloadTooLarge {
                len: expected_len as usize,
                max: MAX_PAYLOAD,
            });
        }
        if record.len() < expected_len as usize {
            return Err(RegistryError::RecordTooSmall {
                component_id,
                data_id,
                record: record.len(),
                expected: expected_len as usize,
            });
        }

        let key = (component_id, data_id);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_handlers {
            return Err(RegistryError::TooManyHandlers {
                max: self.config.max_handlers,
            });
        }

        debug!(
            component_id,
            data_id,
            expected_len,
            record_len = record.len(),
            custom = matches!(handler, Handler::Custom(_)),
            "registered handler"
        );
        self.entries
            .insert(key, Entry::new(record, handler, expected_len));
        Ok(())
    }

    /// Route a validated payload to its entry.
    pub fn dispatch(&mut self, component_id: u8, data_id: u8, payload: &[u8]) -> Dispatch {
        let Some(entry) = self.entries.get_mut(&(component_id, data_id)) else {
            return Dispatch::Unregistered;
        };

        if payload.is_empty() {
            return Dispatch::ReadRequest;
        }

        if payload.len() != entry.expected_len() as usize {
            return Dispatch::LengthMismatch {
                expected: entry.expected_len(),
                actual: payload.len() as u16,
            };
        }

        if entry.deliver(payload) {
            Dispatch::Delivered
        } else {
            Dispatch::Rejected
        }
    }

    pub fn get(&self, component_id: u8, data_id: u8) -> Option<&Entry> {
        self.entries.get(&(component_id, data_id))
    }

    pub fn get_mut(&mut self, component_id: u8, data_id: u8) -> Option<&mut Entry> {
        self.entries.get_mut(&(component_id, data_id))
    }

    /// Current contents of a registered record.
    pub fn record(&self, component_id: u8, data_id: u8) -> Option<&[u8]> {
        self.get(component_id, data_id).map(Entry::record)
    }

    pub fn record_mut(&mut self, component_id: u8, data_id: u8) -> Option<&mut [u8]> {
        self.get_mut(component_id, data_id).map(Entry::record_mut)
    }

    pub fn contains(&self, component_id: u8, data_id: u8) -> bool {
        self.entries.contains_key(&(component_id, data_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered pairs, sorted.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
