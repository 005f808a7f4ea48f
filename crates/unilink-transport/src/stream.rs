use std::io::{ErrorKind, Read, Write};

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::ring::{Consumer, Producer};

const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Moves bytes between a `std::io` stream and ring handles.
///
/// Typical use is a serial device opened as a file: one side feeds the
/// receive ring with [`ByteStream::read_into`], the other flushes the send
/// ring with [`ByteStream::write_from`].
pub struct ByteStream<T> {
    inner: T,
    chunk: Box<[u8]>,
}

impl<T> ByteStream<T> {
    /// Wrap a stream with the default 1 KiB transfer chunk.
    pub fn new(inner: T) -> Self {
        Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
    }

    /// Wrap a stream with an explicit transfer chunk size.
    pub fn with_chunk_size(inner: T, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk: vec![0u8; chunk_size.max(1)].into_boxed_slice(),
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the adapter and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> ByteStream<T> {
    /// Read once from the stream into the ring.
    ///
    /// Reads at most the ring's free space, so nothing read is ever dropped.
    /// Returns `Ok(0)` when the ring is full or the stream has nothing ready
    /// (`WouldBlock` / `TimedOut`), and `Err(TransportError::Closed)` on EOF.
    pub fn read_into(&mut self, rx: &mut Producer) -> Result<usize> {
        let want = rx.remain().min(self.chunk.len());
        if want == 0 {
            return Ok(0);
        }

        loop {
            match self.inner.read(&mut self.chunk[..want]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    let pushed = rx.push(&self.chunk[..n]);
                    debug_assert_eq!(pushed, n, "free space shrank under the producer");
                    return Ok(pushed);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Ok(0)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T: Write> ByteStream<T> {
    /// Write every byte currently buffered in the ring to the stream.
    ///
    /// Bytes are consumed from the ring once they were written, including
    /// the part of a chunk that went out before an error. Returns early with
    /// the count so far when the stream reports `WouldBlock`.
    pub fn write_from(&mut self, tx: &mut Consumer) -> Result<usize> {
        let mut total = 0usize;

        'chunks: loop {
            let len = tx.used().min(self.chunk.len());
            if len == 0 {
                break;
            }
            tx.read(&mut self.chunk[..len]);

            let mut offset = 0usize;
            while offset < len {
                match self.inner.write(&self.chunk[offset..len]) {
                    Ok(0) => {
                        tx.pop(offset);
                        return Err(TransportError::Closed);
                    }
                    Ok(n) => offset += n,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) if err.kind() == ErrorKind::WouldBlock => {
                        tx.pop(offset);
                        total += offset;
                        break 'chunks;
                    }
                    Err(err) => {
                        tx.pop(offset);
                        return Err(TransportError::Io(err));
                    }
                }
            }

            tx.pop(len);
            total += len;
        }

        if total > 0 {
            self.flush()?;
            debug!(bytes = total, pending = tx.used(), "flushed outbound bytes");
        }
        Ok(total)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}
