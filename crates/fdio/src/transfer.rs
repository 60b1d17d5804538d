//! Thread-offloaded transfers: one worker thread per operation
//!
//! Each [`Descriptor::start_read`](crate::Descriptor::start_read) /
//! [`start_write`](crate::Descriptor::start_write) call spawns one dedicated
//! worker that performs a single blocking transfer through the same internal
//! loops the synchronous path uses, then delivers exactly one
//! [`Completion`] through the channel owned by the returned
//! [`TransferHandle`]. There is no pooling, no queueing, and no
//! cancellation: a started transfer runs to completion, error, or
//! end-of-stream partial fill.
//!
//! Ordering guarantee: the descriptor's transfer lock is released, and the
//! runner returned to idle, strictly before the completion is delivered.
//! Code reacting to a completion may therefore immediately start the next
//! synchronous or offloaded transfer on the same descriptor without
//! deadlocking — but it runs on the worker thread, not the thread that
//! started the operation.

use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::buffer::FixedBuffer;
use crate::descriptor::{read_full, write_full, Shared};
use crate::error::{FdError, Result};

/// Direction of an offloaded transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransferKind {
    Read,
    Write,
}

/// Outcome of one offloaded transfer.
///
/// The buffer that was moved into the worker comes back here regardless of
/// outcome. Success and failure are signaled by `result`, out of band from
/// the byte count: a short count with `Ok` is a normal end-of-stream
/// partial fill, never an error.
#[derive(Debug)]
pub struct Completion {
    /// The transfer target, returned to the caller. For a read, its filled
    /// length is the transferred count.
    pub buffer: FixedBuffer,
    /// Bytes transferred, or the I/O failure that aborted the transfer.
    pub result: Result<usize>,
}

/// Handle to one in-flight offloaded transfer.
///
/// Dropping the handle does not cancel the transfer; the worker runs to
/// completion either way.
#[derive(Debug)]
pub struct TransferHandle {
    rx: mpsc::Receiver<Completion>,
    worker: Option<JoinHandle<()>>,
}

impl TransferHandle {
    /// Block until the transfer completes and take its [`Completion`].
    ///
    /// # Errors
    ///
    /// [`FdError::ProtocolViolation`] if the worker exited without
    /// reporting a completion (it panicked); the failure is surfaced here
    /// rather than lost on the detached thread.
    pub fn wait(mut self) -> Result<Completion> {
        let completion = self.rx.recv().map_err(|_| {
            FdError::protocol_violation("transfer worker exited without reporting a completion")
        })?;
        if let Some(worker) = self.worker.take() {
            // Completion already arrived, so the join cannot block for long.
            let _ = worker.join();
        }
        Ok(completion)
    }

    /// Take the completion if the transfer has already finished.
    pub fn try_complete(&mut self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(completion) => {
                if let Some(worker) = self.worker.take() {
                    let _ = worker.join();
                }
                Some(completion)
            }
            Err(_) => None,
        }
    }
}

/// Stage and launch one offloaded transfer.
///
/// Flips the descriptor's in-flight flag before spawning; a second start
/// while the flag is set is a caller error, reported as
/// [`FdError::ProtocolViolation`] rather than raised on a thread nobody
/// observes.
pub(crate) fn start(
    shared: &Arc<Shared>,
    kind: TransferKind,
    buffer: FixedBuffer,
    len: usize,
) -> Result<TransferHandle> {
    if shared.in_flight.swap(true, Ordering::AcqRel) {
        return Err(FdError::protocol_violation(
            "offloaded transfer already in flight on this descriptor",
        ));
    }

    let (tx, rx) = mpsc::channel();
    let worker_shared = Arc::clone(shared);
    let spawned = thread::Builder::new()
        .name("fdio-transfer".into())
        .spawn(move || run_transfer(&worker_shared, kind, buffer, len, &tx));

    match spawned {
        Ok(worker) => Ok(TransferHandle {
            rx,
            worker: Some(worker),
        }),
        Err(e) => {
            // Never launched; return the runner to idle before reporting.
            shared.in_flight.store(false, Ordering::Release);
            Err(FdError::from(e))
        }
    }
}

/// Worker body: one blocking transfer, then exactly one completion.
fn run_transfer(
    shared: &Shared,
    kind: TransferKind,
    mut buffer: FixedBuffer,
    len: usize,
    tx: &mpsc::Sender<Completion>,
) {
    let result = shared.locked(|fd| match kind {
        TransferKind::Read => {
            let r = read_full(fd, &mut buffer.space_mut()[..len]);
            if let Ok(n) = &r {
                buffer.set_filled(*n);
            }
            r
        }
        TransferKind::Write => write_full(fd, &buffer.bytes()[..len]),
    });
    // Lock released above; return to idle before delivering, so the
    // completion side can start the next transfer right away.
    shared.in_flight.store(false, Ordering::Release);

    if let Err(e) = &result {
        tracing::debug!("offloaded {kind:?} transfer failed: {e}");
    }
    let _ = tx.send(Completion { buffer, result });
}
