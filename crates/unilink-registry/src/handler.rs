use std::fmt;

/// Transform invoked with `(payload, record)` instead of a raw copy.
///
/// Returns whether the payload was accepted.
pub type CustomHandler = Box<dyn FnMut(&[u8], &mut [u8]) -> bool + Send>;

/// How a validated payload reaches the destination record.
#[derive(Default)]
pub enum Handler {
    /// Copy the payload into the front of the record.
    #[default]
    Copy,
    /// Hand the payload and the whole record to a transform.
    Custom(CustomHandler),
}

impl Handler {
    /// Wrap a closure as a [`Handler::Custom`].
    pub fn custom<F>(f: F) -> Self
    where
        F: FnMut(&[u8], &mut [u8]) -> bool + Send + 'static,
    {
        Self::Custom(Box::new(f))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => f.write_str("Copy"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One registered (component id, data id) slot.
#[derive(Debug)]
pub struct Entry {
    record: Box<[u8]>,
    expected_len: u16,
    handler: Handler,
}

impl Entry {
    pub(crate) fn new(record: Box<[u8]>, handler: Handler, expected_len: u16) -> Self {
        Self {
            record,
            expected_len,
            handler,
        }
    }

    /// Exact payload length this message type carries.
    pub fn expected_len(&self) -> u16 {
        self.expected_len
    }

    /// The whole destination record.
    pub fn record(&self) -> &[u8] {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut [u8] {
        &mut self.record
    }

    /// The first `expected_len` bytes of the record: what a read request echoes.
    pub fn snapshot(&self) -> &[u8] {
        &self.record[..self.expected_len as usize]
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.handler, Handler::Custom(_))
    }

    /// Store a payload of the expected length.
    pub(crate) fn deliver(&mut self, payload: &[u8]) -> bool {
        match &mut self.handler {
            Handler::Copy => {
                self.record[..payload.len()].copy_from_slice(payload);
                true
            }
            Handler::Custom(transform) => transform(payload, &mut self.record),
        }
    }
}
