//! Connection-oriented client socket descriptors
//!
//! Mirrors the two classic client shapes: connect to a remote address and
//! port over TCP, or to a local endpoint name over a Unix-domain stream
//! socket. Connection setup goes through the standard library; once the
//! stream is connected its fd is taken over by the [`Descriptor`] core.

use std::net::{TcpStream, ToSocketAddrs};
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::path::Path;

use crate::descriptor::Descriptor;
use crate::error::Result;

/// Descriptor over a connected stream-socket client.
#[derive(Debug)]
pub struct StreamSocket {
    descriptor: Descriptor,
}

impl StreamSocket {
    /// Connect to a remote address and port.
    ///
    /// # Errors
    ///
    /// [`FdError::Io`](crate::FdError::Io) if resolution or connection
    /// fails.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        if let Ok(peer) = stream.peer_addr() {
            tracing::info!("connected to {peer}");
        }
        Ok(Self {
            descriptor: Descriptor::from_fd(OwnedFd::from(stream)),
        })
    }

    /// Connect to a local Unix-domain endpoint by name.
    ///
    /// # Errors
    ///
    /// [`FdError::Io`](crate::FdError::Io) if the endpoint cannot be
    /// connected.
    pub fn connect_unix(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path)?;
        tracing::info!("connected to {}", path.display());
        Ok(Self {
            descriptor: Descriptor::from_fd(OwnedFd::from(stream)),
        })
    }

    /// Wrap an already-connected Unix stream (e.g. one half of a pair).
    #[must_use]
    pub fn from_unix_stream(stream: UnixStream) -> Self {
        Self {
            descriptor: Descriptor::from_fd(OwnedFd::from(stream)),
        }
    }

    /// Give up the socket identity, keeping the open descriptor
    #[must_use]
    pub fn into_descriptor(self) -> Descriptor {
        self.descriptor
    }
}

impl std::ops::Deref for StreamSocket {
    type Target = Descriptor;

    fn deref(&self) -> &Descriptor {
        &self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_pair_round_trips() {
        let (a, b) = UnixStream::pair().expect("socketpair");
        let left = StreamSocket::from_unix_stream(a);
        let right = StreamSocket::from_unix_stream(b);

        left.write_str("ping").expect("write");
        let mut buf = [0u8; 4];
        let n = right.read(&mut buf).expect("read");
        assert_eq!(&buf[..n], b"ping");
    }
}
