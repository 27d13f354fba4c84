//! Exclusive advisory lock on the store file.

use std::fs::File;
use std::io;

/// Try to take an exclusive lock without blocking
///
/// Fails with `ErrorKind::WouldBlock` when another handle holds it. The lock
/// is released when the file handle is closed.
#[cfg(unix)]
pub(crate) fn try_lock_exclusive(file: &File) -> io::Result<()> {
    use rustix::fs::{flock, FlockOperation};
    use std::os::unix::io::AsFd;

    flock(file.as_fd(), FlockOperation::NonBlockingLockExclusive)
        .map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

#[cfg(not(unix))]
pub(crate) fn try_lock_exclusive(file: &File) -> io::Result<()> {
    use std::fs::TryLockError;

    file.try_lock().map_err(|e| match e {
        TryLockError::WouldBlock => io::Error::from(io::ErrorKind::WouldBlock),
        TryLockError::Error(e) => e,
    })
}
