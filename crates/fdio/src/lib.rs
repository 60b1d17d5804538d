//! Blocking and thread-offloaded I/O over POSIX file descriptors.
//!
//! One [`Descriptor`] owns one OS-level handle — socket, file, or pipe —
//! and offers the same two things for all of them:
//!
//! - **Full-transfer blocking I/O**: [`Descriptor::read`] and
//!   [`Descriptor::write`] keep issuing syscalls until the requested span
//!   is satisfied or the stream ends, so callers never see a partial
//!   syscall transfer. A short count means end-of-stream, never an error.
//! - **Thread-offloaded I/O**: [`Descriptor::start_read`] and
//!   [`Descriptor::start_write`] run the same loops on a dedicated worker
//!   thread and deliver a [`Completion`] through the returned
//!   [`TransferHandle`]. The descriptor's transfer lock is released before
//!   the completion is delivered.
//!
//! All transfers on one descriptor — synchronous and offloaded — are
//! serialized by a single exclusive lock; at most one is in flight at any
//! time. This is not an async reactor: there is no event loop, no
//! multiplexing, and no cancellation.
//!
//! # Quick start
//!
//! ```
//! use fdio::{pipe, FixedBuffer};
//!
//! # fn main() -> fdio::Result<()> {
//! let (reader, writer) = pipe()?;
//!
//! writer.write_str("hello")?;
//! let mut span = [0u8; 5];
//! let n = reader.read(&mut span)?;
//! assert_eq!(&span[..n], b"hello");
//!
//! // Offloaded: the read runs on a worker thread.
//! let handle = reader.start_read(FixedBuffer::with_capacity(8), 5)?;
//! writer.write_str("world")?;
//! let completion = handle.wait()?;
//! assert_eq!(completion.result?, 5);
//! assert_eq!(completion.buffer.as_slice(), b"world");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod buffer;
mod descriptor;
mod error;
mod file;
mod pipe;
mod socket;
mod transfer;

pub use buffer::FixedBuffer;
pub use descriptor::Descriptor;
pub use error::{FdError, Result};
pub use file::FileDescriptor;
pub use pipe::{pipe, PipeReader, PipeWriter};
pub use socket::StreamSocket;
pub use transfer::{Completion, TransferHandle};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        pipe, Completion, Descriptor, FdError, FileDescriptor, FixedBuffer, PipeReader,
        PipeWriter, Result, StreamSocket, TransferHandle,
    };
}
