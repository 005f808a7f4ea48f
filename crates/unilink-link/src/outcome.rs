use std::fmt;

/// How a committed frame was handled.
///
/// Every committed frame counts exactly once: as a success when
/// [`FrameOutcome::is_success`] holds, as a decode error otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Payload copied into the destination record or accepted by its handler.
    Delivered,
    /// The custom handler refused the payload.
    HandlerRejected,
    /// No entry for the (component id, data id) pair.
    Unregistered,
    /// Payload length differs from the registered length.
    LengthMismatch { expected: u16, actual: u16 },
    /// Read request answered; `bytes` were queued for sending.
    Echoed { bytes: usize },
    /// Read request could not be answered: the send buffer is full.
    EchoDropped,
}

impl FrameOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered | Self::Echoed { .. })
    }

    /// Short stable label for logs and tooling.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::HandlerRejected => "handler-rejected",
            Self::Unregistered => "unregistered",
            Self::LengthMismatch { .. } => "length-mismatch",
            Self::Echoed { .. } => "echoed",
            Self::EchoDropped => "echo-dropped",
        }
    }
}

impl fmt::Display for FrameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, actual } => {
                write!(f, "length-mismatch (expected {expected}, got {actual})")
            }
            Self::Echoed { bytes } => write!(f, "echoed ({bytes} bytes)"),
            other => f.write_str(other.label()),
        }
    }
}
