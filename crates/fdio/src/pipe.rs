//! Anonymous pipe descriptors
//!
//! The read and write ends are independent descriptors, each with its own
//! transfer lock. Pipes double as the loopback vehicle in this crate's
//! tests.

use crate::descriptor::Descriptor;
use crate::error::Result;

/// Read end of an anonymous pipe.
#[derive(Debug)]
pub struct PipeReader {
    descriptor: Descriptor,
}

/// Write end of an anonymous pipe.
#[derive(Debug)]
pub struct PipeWriter {
    descriptor: Descriptor,
}

/// Create an anonymous pipe pair.
///
/// Bytes written to the [`PipeWriter`] become readable on the
/// [`PipeReader`] in order. Dropping the writer makes the reader see
/// end-of-stream once the pipe drains.
///
/// # Errors
///
/// [`FdError::Io`](crate::FdError::Io) if the pipe cannot be created.
pub fn pipe() -> Result<(PipeReader, PipeWriter)> {
    let (read_fd, write_fd) = rustix::pipe::pipe().map_err(std::io::Error::from)?;
    tracing::debug!("created pipe pair");
    Ok((
        PipeReader {
            descriptor: Descriptor::from_fd(read_fd),
        },
        PipeWriter {
            descriptor: Descriptor::from_fd(write_fd),
        },
    ))
}

impl PipeReader {
    /// Give up the pipe identity, keeping the open descriptor
    #[must_use]
    pub fn into_descriptor(self) -> Descriptor {
        self.descriptor
    }
}

impl PipeWriter {
    /// Give up the pipe identity, keeping the open descriptor
    #[must_use]
    pub fn into_descriptor(self) -> Descriptor {
        self.descriptor
    }
}

impl std::ops::Deref for PipeReader {
    type Target = Descriptor;

    fn deref(&self) -> &Descriptor {
        &self.descriptor
    }
}

impl std::ops::Deref for PipeWriter {
    type Target = Descriptor;

    fn deref(&self) -> &Descriptor {
        &self.descriptor
    }
}
