//! Descriptor core: handle ownership, transfer lock, full-transfer loops
//!
//! A [`Descriptor`] owns one OS-level file descriptor and serializes every
//! transfer on it — synchronous or thread-offloaded — behind a single
//! exclusive lock. The internal loops keep issuing syscalls until the
//! requested size is satisfied or the stream ends, hiding partial syscall
//! transfers from callers.

use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

use crate::buffer::FixedBuffer;
use crate::error::{FdError, Result};
use crate::transfer::{self, TransferHandle, TransferKind};

/// Abstraction over one owned POSIX file descriptor.
///
/// Offers blocking full-transfer reads and writes plus thread-offloaded
/// variants ([`start_read`](Self::start_read) /
/// [`start_write`](Self::start_write)). All transfers on one descriptor are
/// mutually exclusive; at most one is in flight at any time.
///
/// The descriptor is closed when the last owner drops. `Descriptor` is
/// deliberately not `Clone`: cloning would duplicate a live handle.
#[derive(Debug)]
pub struct Descriptor {
    shared: Arc<Shared>,
}

/// State shared with transfer workers.
#[derive(Debug)]
pub(crate) struct Shared {
    fd: OwnedFd,
    /// Serializes every transfer, sync and async, on this descriptor.
    lock: Mutex<()>,
    /// Set while an offloaded transfer is staged or running.
    pub(crate) in_flight: AtomicBool,
}

impl Shared {
    /// Run `op` with the transfer lock held.
    ///
    /// A worker that panicked mid-transfer leaves no state behind the lock
    /// that we rely on, so poisoning is stripped rather than propagated.
    pub(crate) fn locked<T>(&self, op: impl FnOnce(BorrowedFd<'_>) -> T) -> T {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        op(self.fd.as_fd())
    }
}

impl Descriptor {
    /// Wrap an already-open file descriptor.
    ///
    /// The descriptor takes exclusive ownership; the fd is closed on drop.
    #[must_use]
    pub fn from_fd(fd: OwnedFd) -> Self {
        tracing::debug!("wrapping fd {}", fd.as_raw_fd());
        Self {
            shared: Arc::new(Shared {
                fd,
                lock: Mutex::new(()),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Read into a span, blocking until it is full or the stream ends.
    ///
    /// Returns the number of bytes actually transferred. A count short of
    /// `buf.len()` means the source reported end-of-stream; it is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`FdError::Io`] if the underlying read primitive fails; no
    /// partial count is reported in that case.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.shared.locked(|fd| read_full(fd, buf))
    }

    /// Read up to `len` bytes into a managed buffer.
    ///
    /// Validates before touching the descriptor: the buffer must have
    /// nonzero capacity and `len` must not exceed it. On success the
    /// buffer's filled length is set to the transferred count.
    ///
    /// # Errors
    ///
    /// [`FdError::InvalidArgument`] if the buffer cannot hold `len` bytes
    /// (the descriptor receives no syscall at all); [`FdError::Io`] if the
    /// underlying read fails.
    pub fn read_buffer(&self, buf: &mut FixedBuffer, len: usize) -> Result<usize> {
        check_buffer(buf.capacity(), len)?;
        let n = self
            .shared
            .locked(|fd| read_full(fd, &mut buf.space_mut()[..len]))?;
        buf.set_filled(n);
        Ok(n)
    }

    /// Write a span, blocking until it is fully written or the sink stops
    /// accepting bytes.
    ///
    /// A zero-byte underlying write stops the loop and the count written so
    /// far is returned; whether that means end-of-stream or backpressure is
    /// not distinguished.
    ///
    /// # Errors
    ///
    /// Returns [`FdError::Io`] if the underlying write primitive fails.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        self.shared.locked(|fd| write_full(fd, buf))
    }

    /// Write the first `len` bytes of a managed buffer's region.
    ///
    /// Same validation as [`read_buffer`](Self::read_buffer): zero capacity
    /// or `len` beyond capacity fails without touching the descriptor.
    ///
    /// # Errors
    ///
    /// [`FdError::InvalidArgument`] on a buffer that cannot supply `len`
    /// bytes; [`FdError::Io`] if the underlying write fails.
    pub fn write_buffer(&self, buf: &FixedBuffer, len: usize) -> Result<usize> {
        check_buffer(buf.capacity(), len)?;
        self.shared.locked(|fd| write_full(fd, &buf.bytes()[..len]))
    }

    /// Write a string's raw bytes, with no added terminator framing.
    ///
    /// # Errors
    ///
    /// Returns [`FdError::Io`] if the underlying write primitive fails.
    pub fn write_str(&self, s: &str) -> Result<usize> {
        self.write(s.as_bytes())
    }

    /// Start a thread-offloaded read of up to `len` bytes into `buf`.
    ///
    /// The transfer runs on a dedicated worker thread; the caller's thread
    /// never blocks on it. The buffer moves into the worker and comes back
    /// in the [`Completion`](crate::Completion). The descriptor
    /// lock is released before the completion is delivered, so the
    /// completion side may immediately start another transfer on this
    /// descriptor.
    ///
    /// # Errors
    ///
    /// [`FdError::InvalidArgument`] on the same preconditions as
    /// [`read_buffer`](Self::read_buffer); [`FdError::ProtocolViolation`]
    /// if a previous offloaded transfer on this descriptor has not yet
    /// completed.
    pub fn start_read(&self, buf: FixedBuffer, len: usize) -> Result<TransferHandle> {
        check_buffer(buf.capacity(), len)?;
        transfer::start(&self.shared, TransferKind::Read, buf, len)
    }

    /// Start a thread-offloaded write of the first `len` bytes of `buf`.
    ///
    /// Same contract as [`start_read`](Self::start_read), for output.
    ///
    /// # Errors
    ///
    /// [`FdError::InvalidArgument`] on buffer preconditions;
    /// [`FdError::ProtocolViolation`] on an overlapping start.
    pub fn start_write(&self, buf: FixedBuffer, len: usize) -> Result<TransferHandle> {
        check_buffer(buf.capacity(), len)?;
        transfer::start(&self.shared, TransferKind::Write, buf, len)
    }
}

impl AsFd for Descriptor {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.shared.fd.as_fd()
    }
}

impl AsRawFd for Descriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.shared.fd.as_raw_fd()
    }
}

impl From<OwnedFd> for Descriptor {
    fn from(fd: OwnedFd) -> Self {
        Self::from_fd(fd)
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        // OwnedFd closes the handle; this is just the teardown trace.
        tracing::debug!("closing fd {}", self.fd.as_raw_fd());
    }
}

/// Validate a managed-buffer target before any syscall is issued.
fn check_buffer(capacity: usize, len: usize) -> Result<()> {
    if capacity == 0 || len > capacity {
        tracing::error!("buffer too small: capacity {capacity}, requested {len}");
        return Err(FdError::invalid_argument(format!(
            "buffer capacity {capacity} cannot hold {len} bytes"
        )));
    }
    Ok(())
}

/// Read until `buf` is full or the source reports end-of-stream.
///
/// A single read on a stream-oriented descriptor may transfer fewer bytes
/// than requested; this loop hides that, giving fill-or-fail semantics.
pub(crate) fn read_full(fd: BorrowedFd<'_>, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = rustix::io::read(fd, &mut buf[filled..]).map_err(std::io::Error::from)?;
        if n == 0 {
            // End of stream
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Write until `buf` is drained or the sink accepts no more bytes.
pub(crate) fn write_full(fd: BorrowedFd<'_>, buf: &[u8]) -> Result<usize> {
    let mut written = 0;
    while written < buf.len() {
        let n = rustix::io::write(fd, &buf[written..]).map_err(std::io::Error::from)?;
        if n == 0 {
            // No forward progress possible
            break;
        }
        written += n;
    }
    Ok(written)
}
