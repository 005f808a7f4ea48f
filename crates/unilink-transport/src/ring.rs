//! Lock-free single-producer/single-consumer byte ring buffer.
//!
//! A ring of capacity `N` stores at most `N - 1` bytes: one slot is kept
//! empty so that `head == tail` always means "empty" without a separate
//! counter. Both indices live in `0..N`.
//!
//! # Ordering contract
//!
//! - `head` is written only by the [`Producer`], with `Release` ordering, and
//!   only after the pushed bytes are fully copied in. The [`Consumer`] loads it
//!   with `Acquire`, so every byte below `head` is visible to it.
//! - `tail` is written only by the [`Consumer`], with `Release` ordering, after
//!   it is done reading the popped bytes. The [`Producer`] loads it with
//!   `Acquire` before reusing those slots.
//!
//! This is the minimal ordering for a lock-free handoff between exactly one
//! producer and one consumer. The handles are not `Clone`, which is what
//! keeps it sound: each index has a single writer for the life of the ring.

use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::BufMut;

use crate::error::{Result, TransportError};

/// Keeps `head` and `tail` on separate cache lines.
#[repr(C, align(64))]
struct CachePadded<T> {
    value: T,
}

impl<T> CachePadded<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

struct Shared {
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    buf: Box<[UnsafeCell<u8>]>,
}

// SAFETY: the producer only writes slots in the free region `[head, tail - 1)`
// and the consumer only reads slots in the used region `[tail, head)`. The
// regions never overlap, and they move only through the Release/Acquire pairs
// on `head` and `tail` described in the module docs.
unsafe impl Sync for Shared {}

impl Shared {
    #[inline(always)]
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    fn used_between(&self, head: usize, tail: usize) -> usize {
        (head + self.capacity() - tail) % self.capacity()
    }

    #[inline(always)]
    fn used(&self) -> usize {
        let head = self.head.value.load(Ordering::Acquire);
        let tail = self.tail.value.load(Ordering::Acquire);
        self.used_between(head, tail)
    }

    #[inline(always)]
    fn base(&self) -> *mut u8 {
        UnsafeCell::raw_get(self.buf.as_ptr())
    }

    /// # Safety
    /// `src.len()` bytes starting at `start` must lie in the free region.
    unsafe fn write_at(&self, start: usize, src: &[u8]) {
        let first = src.len().min(self.capacity() - start);
        let base = self.base();
        std::ptr::copy_nonoverlapping(src.as_ptr(), base.add(start), first);
        std::ptr::copy_nonoverlapping(src.as_ptr().add(first), base, src.len() - first);
    }

    /// # Safety
    /// `dst.len()` bytes starting at `start` must lie in the used region.
    unsafe fn read_at(&self, start: usize, dst: &mut [u8]) {
        let first = dst.len().min(self.capacity() - start);
        let base = self.base();
        std::ptr::copy_nonoverlapping(base.add(start), dst.as_mut_ptr(), first);
        std::ptr::copy_nonoverlapping(base, dst.as_mut_ptr().add(first), dst.len() - first);
    }
}

/// Create a ring with `capacity` slots (`capacity - 1` usable bytes).
///
/// Allocation happens once, here. Returns the only producer and the only
/// consumer that will ever exist for this ring.
pub fn ring_buffer(capacity: usize) -> Result<(Producer, Consumer)> {
    if capacity < 2 {
        return Err(TransportError::InvalidCapacity(capacity));
    }

    let buf: Box<[UnsafeCell<u8>]> = (0..capacity).map(|_| UnsafeCell::new(0)).collect();
    let shared = Arc::new(Shared {
        head: CachePadded::new(AtomicUsize::new(0)),
        tail: CachePadded::new(AtomicUsize::new(0)),
        buf,
    });

    Ok((
        Producer {
            shared: Arc::clone(&shared),
        },
        Consumer { shared },
    ))
}

/// Writing half of a ring. Owns the `head` index.
pub struct Producer {
    shared: Arc<Shared>,
}

impl Producer {
    /// Copy all of `src` into the ring, or nothing.
    ///
    /// Returns `src.len()` on success and `0` when `src` is empty or larger
    /// than the current free space. Never writes partially.
    #[inline]
    pub fn push(&mut self, src: &[u8]) -> usize {
        if src.is_empty() {
            return 0;
        }

        let head = self.shared.head.value.load(Ordering::Relaxed);
        let tail = self.shared.tail.value.load(Ordering::Acquire);
        let free = self.shared.capacity() - 1 - self.shared.used_between(head, tail);
        if src.len() > free {
            return 0;
        }

        // SAFETY: `src.len() <= free`, so every written slot is in the free
        // region, which the consumer does not touch.
        unsafe { self.shared.write_at(head, src) };

        self.shared
            .head
            .value
            .store((head + src.len()) % self.shared.capacity(), Ordering::Release);
        src.len()
    }

    /// Bytes currently buffered.
    pub fn used(&self) -> usize {
        self.shared.used()
    }

    /// Bytes that can still be pushed.
    pub fn remain(&self) -> usize {
        self.shared.capacity() - 1 - self.shared.used()
    }

    /// Number of slots, including the sentinel slot.
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

/// Reading half of a ring. Owns the `tail` index.
pub struct Consumer {
    shared: Arc<Shared>,
}

impl Consumer {
    /// Peek `dst.len()` bytes from the front without consuming them.
    #[inline]
    pub fn read(&self, dst: &mut [u8]) -> usize {
        self.read_at(dst, 0)
    }

    /// Peek `dst.len()` bytes starting `offset` bytes past the oldest unread
    /// byte. Returns `0` when `offset + dst.len()` exceeds the buffered bytes.
    #[inline]
    pub fn read_at(&self, dst: &mut [u8], offset: usize) -> usize {
        if dst.is_empty() {
            return 0;
        }

        let tail = self.shared.tail.value.load(Ordering::Relaxed);
        let head = self.shared.head.value.load(Ordering::Acquire);
        let Some(end) = offset.checked_add(dst.len()) else {
            return 0;
        };
        if end > self.shared.used_between(head, tail) {
            return 0;
        }

        let start = (tail + offset) % self.shared.capacity();
        // SAFETY: the range was checked against the used region above, and
        // the producer never writes there until `tail` moves past it.
        unsafe { self.shared.read_at(start, dst) };
        dst.len()
    }

    /// Consume `len` bytes from the front. Returns `0` (no-op) when fewer
    /// than `len` bytes are buffered.
    #[inline]
    pub fn pop(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }

        let tail = self.shared.tail.value.load(Ordering::Relaxed);
        let head = self.shared.head.value.load(Ordering::Acquire);
        if len > self.shared.used_between(head, tail) {
            return 0;
        }

        self.shared
            .tail
            .value
            .store((tail + len) % self.shared.capacity(), Ordering::Release);
        len
    }

    /// Move buffered bytes into `out` and consume them.
    ///
    /// Moves everything buffered, bounded by `out.remaining_mut()`.
    pub fn drain_into<B: BufMut>(&mut self, out: &mut B) -> usize {
        let tail = self.shared.tail.value.load(Ordering::Relaxed);
        let head = self.shared.head.value.load(Ordering::Acquire);
        let len = self
            .shared
            .used_between(head, tail)
            .min(out.remaining_mut());
        if len == 0 {
            return 0;
        }

        let capacity = self.shared.capacity();
        let first = len.min(capacity - tail);
        let base = self.shared.base();
        // SAFETY: both slices cover only the used region `[tail, tail + len)`,
        // which the producer does not write until `tail` is released below.
        unsafe {
            out.put_slice(std::slice::from_raw_parts(base.add(tail), first));
            out.put_slice(std::slice::from_raw_parts(base, len - first));
        }

        self.shared
            .tail
            .value
            .store((tail + len) % capacity, Ordering::Release);
        len
    }

    /// Bytes currently buffered.
    pub fn used(&self) -> usize {
        self.shared.used()
    }

    /// Bytes the producer can still push.
    pub fn remain(&self) -> usize {
        self.shared.capacity() - 1 - self.shared.used()
    }

    /// Number of slots, including the sentinel slot.
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .finish()
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPACITY: usize = 256;

    fn ring() -> (Producer, Consumer) {
        ring_buffer(CAPACITY).unwrap()
    }

    #[test]
    fn initial_state() {
        let (tx, rx) = ring();
        assert_eq!(tx.used(), 0);
        assert_eq!(rx.used(), 0);
        assert_eq!(tx.remain(), CAPACITY - 1);
        assert_eq!(rx.capacity(), CAPACITY);
    }

    #[test]
    fn rejects_tiny_capacity() {
        assert!(matches!(
            ring_buffer(1),
            Err(TransportError::InvalidCapacity(1))
        ));
    }

    #[test]
    fn push_and_read_does_not_consume() {
        let (mut tx, rx) = ring();
        let input = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut output = [0u8; 5];

        assert_eq!(tx.push(&input), 5);
        assert_eq!(rx.used(), 5);
        assert_eq!(rx.read(&mut output), 5);
        assert_eq!(output, input);
        assert_eq!(rx.used(), 5);
    }

    #[test]
    fn push_and_pop() {
        let (mut tx, mut rx) = ring();
        tx.push(&[0xAA, 0xBB, 0xCC]);

        assert_eq!(rx.pop(2), 2);
        assert_eq!(rx.used(), 1);
        assert_eq!(rx.pop(1), 1);
        assert_eq!(rx.used(), 0);
    }

    #[test]
    fn pop_more_than_buffered_is_noop() {
        let (mut tx, mut rx) = ring();
        tx.push(&[1, 2, 3]);

        assert_eq!(rx.pop(4), 0);
        assert_eq!(rx.used(), 3);
        assert_eq!(rx.pop(0), 0);
    }

    #[test]
    fn read_with_offset() {
        let (mut tx, rx) = ring();
        tx.push(&[0x10, 0x20, 0x30, 0x40, 0x50]);

        let mut output = [0u8; 2];
        assert_eq!(rx.read_at(&mut output, 2), 2);
        assert_eq!(output, [0x30, 0x40]);

        // offset + len past the buffered bytes
        assert_eq!(rx.read_at(&mut output, 4), 0);
    }

    #[test]
    fn read_at_rejects_offsets_that_overflow() {
        let (mut tx, rx) = ring_buffer(4).unwrap();
        tx.push(&[0x7E]);

        let mut output = [0u8; 9];
        assert_eq!(rx.read_at(&mut output, usize::MAX - 8), 0);
        assert_eq!(rx.read_at(&mut output[..1], usize::MAX), 0);
        assert_eq!(output, [0u8; 9]);
        assert_eq!(rx.read_at(&mut output[..1], 0), 1);
        assert_eq!(output[0], 0x7E);
    }

    #[test]
    fn full_buffer_rejects_without_side_effects() {
        let (mut tx, rx) = ring();
        let fill: Vec<u8> = (0..CAPACITY - 1).map(|i| i as u8).collect();

        assert_eq!(tx.push(&fill), CAPACITY - 1);
        assert_eq!(tx.remain(), 0);

        assert_eq!(tx.push(&[0xFF]), 0);
        assert_eq!(rx.used(), CAPACITY - 1);

        let mut first = [0u8; 1];
        rx.read(&mut first);
        assert_eq!(first[0], 0);
    }

    #[test]
    fn push_larger_than_free_space_is_all_or_nothing() {
        let (mut tx, rx) = ring();
        tx.push(&[0u8; 200]);

        assert_eq!(tx.push(&[1u8; 56]), 0);
        assert_eq!(rx.used(), 200);
        assert_eq!(tx.push(&[1u8; 55]), 55);
        assert_eq!(rx.used(), 255);
    }

    #[test]
    fn wraparound_preserves_order() {
        let (mut tx, mut rx) = ring();
        let first: Vec<u8> = (0..200).map(|i| i as u8).collect();
        let second: Vec<u8> = (0..100).map(|i| (i + 100) as u8).collect();

        tx.push(&first);
        rx.pop(150);
        assert_eq!(tx.push(&second), 100);

        let mut remaining = [0u8; 150];
        assert_eq!(rx.read(&mut remaining), 150);
        assert_eq!(&remaining[..50], &first[150..]);
        assert_eq!(&remaining[50..], second.as_slice());
    }

    #[test]
    fn drain_into_moves_everything_across_the_wrap() {
        let (mut tx, mut rx) = ring();
        tx.push(&[0u8; 250]);
        rx.pop(250);
        tx.push(b"wrapped payload");

        let mut out = Vec::new();
        assert_eq!(rx.drain_into(&mut out), 15);
        assert_eq!(out, b"wrapped payload");
        assert_eq!(rx.used(), 0);
        assert_eq!(rx.drain_into(&mut out), 0);
    }

    #[test]
    fn drain_into_respects_destination_capacity() {
        let (mut tx, mut rx) = ring();
        tx.push(b"abcdef");

        let mut storage = [0u8; 4];
        let mut out = &mut storage[..];
        assert_eq!(rx.drain_into(&mut out), 4);
        assert_eq!(&storage, b"abcd");
        assert_eq!(rx.used(), 2);
    }

    #[test]
    fn concurrent_producer_consumer_keeps_order() {
        use std::sync::atomic::AtomicBool;

        const TOTAL: usize = 200_000;
        const CHUNK: usize = 64;
        let (mut tx, mut rx) = ring_buffer(1024).unwrap();
        let done = Arc::new(AtomicBool::new(false));
        let producer_done = Arc::clone(&done);

        let producer = std::thread::spawn(move || {
            let mut pushed = 0usize;
            let mut last_accepted = false;
            let mut chunk = [0u8; CHUNK];
            for start in (0..TOTAL).step_by(CHUNK) {
                for (i, slot) in chunk.iter_mut().enumerate() {
                    *slot = ((start + i) & 0xFF) as u8;
                }
                // Drop-on-full, like an interrupt handler would.
                let n = tx.push(&chunk);
                pushed += n;
                last_accepted = n == CHUNK;
            }
            producer_done.store(true, Ordering::Release);
            (pushed, last_accepted)
        });

        let mut consumed = 0usize;
        let mut last: Option<u8> = None;
        let mut out = [0u8; 48];
        loop {
            let finished = done.load(Ordering::Acquire);
            let available = rx.used();
            if available == 0 {
                if finished {
                    break;
                }
                std::hint::spin_loop();
                continue;
            }

            let take = available.min(out.len());
            assert_eq!(rx.read(&mut out[..take]), take);
            for &byte in &out[..take] {
                if let Some(prev) = last {
                    // Whole chunks are dropped, so the counter only ever
                    // advances by one plus a multiple of the chunk size.
                    assert_eq!(
                        byte.wrapping_sub(prev) as usize % CHUNK,
                        1,
                        "out of order after {consumed} bytes: {prev} -> {byte}"
                    );
                }
                last = Some(byte);
            }
            assert_eq!(rx.pop(take), take);
            consumed += take;
        }

        let (pushed, last_accepted) = producer.join().unwrap();
        assert!(consumed > 0);
        assert_eq!(consumed, pushed);
        assert_eq!(consumed % CHUNK, 0);
        if last_accepted {
            assert_eq!(last, Some(((TOTAL - 1) & 0xFF) as u8));
        }
    }
}
