use bytes::BufMut;
use tracing::{debug, info, trace};
use unilink_frame::{FrameHeader, HEADER_SIZE, MARKER, MAX_PAYLOAD};
use unilink_registry::{Dispatch, Handler, Registry};
use unilink_transport::{ring_buffer, Consumer, Producer};

use crate::config::LinkConfig;
use crate::error::Result;
use crate::outbound::Outbound;
use crate::outcome::FrameOutcome;
use crate::stats::LinkStats;

/// Last-seen sequence id of a fresh link: the first expected id is 0.
pub const INITIAL_SEQUENCE: u8 = 0xFF;

/// One endpoint of a unilink byte stream.
///
/// The receive ring is fed by [`ingest`](Self::ingest) (or by a producer
/// detached with [`take_ingest`](Self::take_ingest)) and consumed by parse
/// passes. The send ring is fed by [`build`](Self::build) and read-request
/// echoes, and emptied by [`drain_outbound`](Self::drain_outbound) (or a
/// consumer detached with [`take_drain`](Self::take_drain)).
pub struct Link {
    rx: Consumer,
    ingest: Option<Producer>,
    outbound: Outbound,
    drain: Option<Consumer>,
    registry: Registry,
    header: FrameHeader,
    payload: Box<[u8]>,
    stats: LinkStats,
}

impl Link {
    /// Create a link with default ring sizes and registry bounds.
    pub fn new() -> Result<Self> {
        Self::with_config(LinkConfig::default())
    }

    /// Create a link with explicit config.
    pub fn with_config(config: LinkConfig) -> Result<Self> {
        config.validate()?;

        let (ingest, rx) = ring_buffer(config.rx_capacity)?;
        let (tx, drain) = ring_buffer(config.tx_capacity)?;

        info!(
            rx_capacity = config.rx_capacity,
            tx_capacity = config.tx_capacity,
            max_handlers = config.registry.max_handlers,
            "link created"
        );

        Ok(Self {
            rx,
            ingest: Some(ingest),
            outbound: Outbound::new(tx),
            drain: Some(drain),
            registry: Registry::with_config(config.registry),
            header: FrameHeader::default(),
            payload: vec![0u8; MAX_PAYLOAD].into_boxed_slice(),
            stats: LinkStats {
                success_count: 0,
                decode_error_count: 0,
                com_error_count: 0,
                resync_count: 0,
                last_sequence_id: INITIAL_SEQUENCE,
            },
        })
    }

    /// Bind a destination record to `(component_id, data_id)`.
    ///
    /// See [`Registry::register`].
    pub fn register(
        &mut self,
        component_id: u8,
        data_id: u8,
        record: impl Into<Box<[u8]>>,
        handler: Handler,
        expected_len: u16,
    ) -> Result<()> {
        self.registry
            .register(component_id, data_id, record, handler, expected_len)?;
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Current contents of a registered record.
    pub fn record(&self, component_id: u8, data_id: u8) -> Option<&[u8]> {
        self.registry.record(component_id, data_id)
    }

    pub fn record_mut(&mut self, component_id: u8, data_id: u8) -> Option<&mut [u8]> {
        self.registry.record_mut(component_id, data_id)
    }

    /// Append received bytes to the receive ring.
    ///
    /// All-or-nothing: returns `bytes.len()`, or `0` when the ring lacks room
    /// or the ingest producer has been detached.
    pub fn ingest(&mut self, bytes: &[u8]) -> usize {
        let Some(producer) = self.ingest.as_mut() else {
            debug!(len = bytes.len(), "ingest producer detached");
            return 0;
        };

        let pushed = producer.push(bytes);
        if pushed == 0 && !bytes.is_empty() {
            debug!(
                len = bytes.len(),
                remain = producer.remain(),
                "receive buffer full, input dropped"
            );
        }
        pushed
    }

    /// Detach the receive ring's producer so another thread can feed it.
    ///
    /// Afterwards [`ingest`](Self::ingest) always returns `0`.
    pub fn take_ingest(&mut self) -> Option<Producer> {
        self.ingest.take()
    }

    /// Detach the send ring's consumer so another thread can drain it.
    ///
    /// Afterwards [`drain_outbound`](Self::drain_outbound) always returns `0`.
    pub fn take_drain(&mut self) -> Option<Consumer> {
        self.drain.take()
    }

    /// Parse and dispatch every complete frame currently buffered.
    ///
    /// Returns the number of frames committed.
    pub fn run_parse_pass(&mut self) -> usize {
        self.parse_with(|_, _, _| {})
    }

    /// Like [`run_parse_pass`](Self::run_parse_pass), reporting each
    /// committed frame to `observe` after it has been dispatched.
    pub fn parse_with<F>(&mut self, mut observe: F) -> usize
    where
        F: FnMut(&FrameHeader, &[u8], FrameOutcome),
    {
        let mut committed = 0;

        while self.seek_marker() {
            let len = self.header.length() as usize;
            if len > MAX_PAYLOAD {
                trace!(declared = len, "declared length over max, resyncing");
                self.skip_byte();
                continue;
            }

            if self.rx.used() < HEADER_SIZE + len {
                break;
            }

            self.rx.read_at(&mut self.payload[..len], HEADER_SIZE);
            if !self.header.verify(&self.payload[..len]) {
                trace!(
                    sequence = self.header.sequence,
                    component_id = self.header.component_id,
                    data_id = self.header.data_id,
                    "crc mismatch, resyncing"
                );
                self.skip_byte();
                continue;
            }

            self.account_sequence();
            self.rx.pop(HEADER_SIZE + len);

            let outcome = Self::dispatch(
                &mut self.registry,
                &mut self.outbound,
                &self.header,
                &self.payload[..len],
            );
            self.count(outcome);
            observe(&self.header, &self.payload[..len], outcome);
            committed += 1;
        }

        committed
    }

    /// Discard bytes until the front of the ring holds a marker and at least
    /// a full header, then decode that header.
    fn seek_marker(&mut self) -> bool {
        let mut window = [0u8; HEADER_SIZE];
        while self.rx.read(&mut window) == HEADER_SIZE {
            if window[0] == MARKER {
                self.header = FrameHeader::from_bytes(&window);
                return true;
            }
            trace!(byte = window[0], "no marker, resyncing");
            self.skip_byte();
        }
        false
    }

    fn skip_byte(&mut self) {
        self.rx.pop(1);
        self.stats.resync_count += 1;
    }

    fn account_sequence(&mut self) {
        let expected = self.stats.last_sequence_id.wrapping_add(1);
        let received = self.header.sequence;
        if received != expected {
            let gap = received.wrapping_sub(expected);
            self.stats.com_error_count += u64::from(gap);
            debug!(expected, received, gap, "sequence gap");
        }
        self.stats.last_sequence_id = received;
    }

    fn dispatch(
        registry: &mut Registry,
        outbound: &mut Outbound,
        header: &FrameHeader,
        payload: &[u8],
    ) -> FrameOutcome {
        let (component_id, data_id) = (header.component_id, header.data_id);
        match registry.dispatch(component_id, data_id, payload) {
            Dispatch::Delivered => FrameOutcome::Delivered,
            Dispatch::Rejected => FrameOutcome::HandlerRejected,
            Dispatch::Unregistered => FrameOutcome::Unregistered,
            Dispatch::LengthMismatch { expected, actual } => {
                FrameOutcome::LengthMismatch { expected, actual }
            }
            Dispatch::ReadRequest => match registry.get(component_id, data_id) {
                Some(entry) => match outbound.build(component_id, data_id, entry.snapshot()) {
                    0 => FrameOutcome::EchoDropped,
                    bytes => FrameOutcome::Echoed { bytes },
                },
                None => FrameOutcome::Unregistered,
            },
        }
    }

    fn count(&mut self, outcome: FrameOutcome) {
        if outcome.is_success() {
            self.stats.success_count += 1;
            return;
        }

        self.stats.decode_error_count += 1;
        debug!(
            component_id = self.header.component_id,
            data_id = self.header.data_id,
            sequence = self.header.sequence,
            %outcome,
            "frame not delivered"
        );
    }

    /// Seal a frame around `payload` and queue it in the send ring.
    ///
    /// Returns the bytes queued, or `0` when the payload exceeds the maximum
    /// or the send ring lacks room. A rejected build changes nothing, the
    /// sequence counter included.
    pub fn build(&mut self, component_id: u8, data_id: u8, payload: &[u8]) -> usize {
        self.outbound.build(component_id, data_id, payload)
    }

    /// Queue the current contents of a registered record.
    ///
    /// Returns `0` for an unregistered pair or a full send ring.
    pub fn send_record(&mut self, component_id: u8, data_id: u8) -> usize {
        let Some(entry) = self.registry.get(component_id, data_id) else {
            debug!(component_id, data_id, "send_record on unregistered pair");
            return 0;
        };
        self.outbound.build(component_id, data_id, entry.snapshot())
    }

    /// Move queued outbound bytes into `out`.
    ///
    /// Returns `0` when less than one header's worth is queued, or when the
    /// drain consumer has been detached. Otherwise moves as much as `out`
    /// can take.
    pub fn drain_outbound<B: BufMut>(&mut self, out: &mut B) -> usize {
        let Some(drain) = self.drain.as_mut() else {
            return 0;
        };
        if drain.used() < HEADER_SIZE {
            return 0;
        }
        drain.drain_into(out)
    }

    pub fn success_count(&self) -> u64 {
        self.stats.success_count
    }

    pub fn decode_error_count(&self) -> u64 {
        self.stats.decode_error_count
    }

    pub fn com_error_count(&self) -> u64 {
        self.stats.com_error_count
    }

    pub fn last_sequence_id(&self) -> u8 {
        self.stats.last_sequence_id
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Sequence id the next built frame will carry.
    pub fn next_sequence_id(&self) -> u8 {
        self.outbound.next_sequence()
    }

    pub fn receive_buffer_used(&self) -> usize {
        self.rx.used()
    }

    pub fn receive_buffer_remain(&self) -> usize {
        self.rx.remain()
    }

    pub fn send_buffer_used(&self) -> usize {
        self.outbound.used()
    }

    pub fn send_buffer_remain(&self) -> usize {
        self.outbound.remain()
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("rx", &self.rx)
            .field("registry", &self.registry)
            .field("stats", &self.stats)
            .field("ingest_attached", &self.ingest.is_some())
            .field("drain_attached", &self.drain.is_some())
            .finish_non_exhaustive()
    }
}
