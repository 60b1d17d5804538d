//! File-backed descriptors

use std::fs::OpenOptions;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};

use crate::descriptor::Descriptor;
use crate::error::{FdError, Result};

/// Descriptor over a regular file.
///
/// Thin constructor layer: produces an open handle and hands the lock and
/// transfer machinery to the inherited [`Descriptor`] unchanged.
#[derive(Debug)]
pub struct FileDescriptor {
    descriptor: Descriptor,
    path: PathBuf,
}

impl FileDescriptor {
    /// Open an existing file for reading and writing.
    ///
    /// # Errors
    ///
    /// [`FdError::NotFound`] if the path does not exist; [`FdError::Io`] if
    /// it cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FdError::not_found(path));
        }
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        tracing::debug!("opened file {}", path.display());
        Ok(Self {
            descriptor: Descriptor::from_fd(OwnedFd::from(file)),
            path: path.to_path_buf(),
        })
    }

    /// Create (or truncate) a file and open it for reading and writing.
    ///
    /// # Errors
    ///
    /// [`FdError::Io`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        tracing::debug!("created file {}", path.display());
        Ok(Self {
            descriptor: Descriptor::from_fd(OwnedFd::from(file)),
            path: path.to_path_buf(),
        })
    }

    /// Path this descriptor was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Give up the file identity, keeping the open descriptor
    #[must_use]
    pub fn into_descriptor(self) -> Descriptor {
        self.descriptor
    }
}

impl std::ops::Deref for FileDescriptor {
    type Target = Descriptor;

    fn deref(&self) -> &Descriptor {
        &self.descriptor
    }
}
