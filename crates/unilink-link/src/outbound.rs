use tracing::debug;
use unilink_frame::{write_frame, HEADER_SIZE, MAX_FRAME_SIZE, MAX_PAYLOAD};
use unilink_transport::Producer;

/// Producer side of the send ring plus the sender's sequence counter.
pub(crate) struct Outbound {
    tx: Producer,
    sequence: u8,
    scratch: Box<[u8]>,
}

impl Outbound {
    pub(crate) fn new(tx: Producer) -> Self {
        Self {
            tx,
            sequence: 0,
            scratch: vec![0u8; MAX_FRAME_SIZE].into_boxed_slice(),
        }
    }

    /// Seal a frame and push it whole into the send ring.
    ///
    /// Returns the bytes queued, or `0` with nothing changed when the payload
    /// is too large or the ring lacks room.
    pub(crate) fn build(&mut self, component_id: u8, data_id: u8, payload: &[u8]) -> usize {
        if payload.len() > MAX_PAYLOAD {
            debug!(
                component_id,
                data_id,
                len = payload.len(),
                "build rejected: payload over max"
            );
            return 0;
        }
        if self.tx.remain() < HEADER_SIZE + payload.len() {
            debug!(
                component_id,
                data_id,
                len = payload.len(),
                remain = self.tx.remain(),
                "build rejected: send buffer full"
            );
            return 0;
        }

        let len = match write_frame(
            &mut self.scratch,
            self.sequence,
            component_id,
            data_id,
            0,
            payload,
        ) {
            Ok(len) => len,
            Err(err) => {
                debug!(error = %err, "build rejected");
                return 0;
            }
        };
        self.sequence = self.sequence.wrapping_add(1);

        self.tx.push(&self.scratch[..len])
    }

    pub(crate) fn next_sequence(&self) -> u8 {
        self.sequence
    }

    pub(crate) fn used(&self) -> usize {
        self.tx.used()
    }

    pub(crate) fn remain(&self) -> usize {
        self.tx.remain()
    }
}
