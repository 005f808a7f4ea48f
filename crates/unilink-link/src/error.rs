/// Errors that can occur while setting up a link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// A ring's usable space cannot hold one maximum-size frame.
    #[error("{ring} capacity {capacity} cannot hold a {needed}-byte frame")]
    InvalidCapacity {
        ring: &'static str,
        capacity: usize,
        needed: usize,
    },

    /// Registration was refused.
    #[error("registry error: {0}")]
    Registry(#[from] unilink_registry::RegistryError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] unilink_frame::FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] unilink_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, LinkError>;
