//! Caller memory which the driver copies to and from.
//!
//! Reads and writes go through these traits rather than plain slices so that a platform can hand
//! in memory which may fault on access, such as a user-space buffer. A failed copy is reported as
//! [`Error::CopyFault`](crate::Error::CopyFault).

use crate::{Error, Result};

/// Memory the driver reads a write request from.
pub trait UserBuffer {
    /// The length of the buffer in bytes.
    fn len(&self) -> usize;

    /// Returns whether the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the first `dst.len()` bytes of the buffer into `dst`.
    fn copy_from_user(&self, dst: &mut [u8]) -> Result;
}

/// Memory the driver stores received data into.
pub trait UserBufferMut {
    /// The length of the buffer in bytes.
    fn len(&self) -> usize;

    /// Returns whether the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies `src` to the start of the buffer.
    fn copy_to_user(&mut self, src: &[u8]) -> Result;
}

impl UserBuffer for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_from_user(&self, dst: &mut [u8]) -> Result {
        let src = self.get(..dst.len()).ok_or(Error::CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl UserBufferMut for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to_user(&mut self, src: &[u8]) -> Result {
        let dst = self.get_mut(..src.len()).ok_or(Error::CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}
