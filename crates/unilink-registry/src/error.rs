/// Errors that can occur while registering handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The registry already holds `max` distinct registrations.
    #[error("too many handlers (max {max})")]
    TooManyHandlers { max: usize },

    /// The expected payload length exceeds the protocol maximum.
    #[error("expected length {len} exceeds max payload {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// The destination record cannot hold one expected payload.
    #[error("record for ({component_id:#04x}, {data_id:#04x}) is {record} bytes, need {expected}")]
    RecordTooSmall {
        component_id: u8,
        data_id: u8,
        record: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
