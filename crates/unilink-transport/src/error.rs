/// Errors that can occur while moving bytes between a stream and a ring.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reached EOF or refused to accept more bytes.
    #[error("stream closed")]
    Closed,

    /// The requested ring capacity cannot hold any byte.
    #[error("invalid ring capacity {0} (minimum 2)")]
    InvalidCapacity(usize),
}

pub type Result<T> = std::result::Result<T, TransportError>;
