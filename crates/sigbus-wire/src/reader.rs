use bytes::Buf;

use crate::error::{Result, WireError};
use crate::fixed::FixedPointValue;

/// Cursor-based reader over a borrowed byte buffer.
///
/// Reads are all-or-nothing: a read that cannot be satisfied returns
/// [`WireError::BufferUnderrun`] and leaves the cursor where it was.
/// The reader is `Copy`, so callers can try a speculative decode on a copy
/// and commit it only when the whole datagram parsed.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut src = self.take(1)?;
        Ok(src.get_u8())
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut src = self.take(2)?;
        Ok(src.get_u16())
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut src = self.take(4)?;
        Ok(src.get_u32())
    }

    /// Read a big-endian two's-complement `i32`.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut src = self.take(4)?;
        Ok(src.get_i32())
    }

    /// Read a raw fixed-point lattice value into `value`, keeping its resolution.
    pub fn read_fixed(&mut self, value: &mut FixedPointValue) -> Result<()> {
        let raw = self.read_u32()?;
        value.decode(raw);
        Ok(())
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Number of unread bytes.
    pub fn bytes_available(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Number of bytes consumed since the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread tail of the buffer.
    pub fn remaining(&self) -> &'a [u8] {
        self.buf.get(self.pos..).unwrap_or_default()
    }

    /// Rewind to the start of the buffer. Contents are untouched.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.bytes_available();
        let chunk = self
            .remaining()
            .get(..len)
            .ok_or(WireError::BufferUnderrun {
                needed: len,
                available,
            })?;
        self.pos += len;
        Ok(chunk)
    }
}
