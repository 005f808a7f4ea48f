use serde::Serialize;

/// Snapshot of a link's protocol counters.
///
/// Counters are monotone for the life of the link and reset only at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Frames dispatched successfully.
    pub success_count: u64,
    /// Committed frames that were unregistered, mis-sized or refused.
    pub decode_error_count: u64,
    /// Frames presumed lost, from sequence gaps.
    pub com_error_count: u64,
    /// Bytes dropped while resynchronizing (bad marker, length or CRC).
    pub resync_count: u64,
    /// Sequence id of the last committed frame.
    pub last_sequence_id: u8,
}
