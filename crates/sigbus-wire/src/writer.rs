use crate::error::{Result, WireError};
use crate::fixed::FixedPointValue;

/// Cursor-based writer into a caller-owned, fixed-capacity buffer.
///
/// Multi-byte values are written one byte at a time. When capacity runs out
/// midway, the bytes written before the failing byte stay in place and the
/// cursor stays after them; nothing is rolled back. Callers that need an
/// all-or-nothing write check [`ByteWriter::bytes_available`] first.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    /// Create a writer positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Write one byte.
    pub fn write_u8(&mut self, val: u8) -> Result<()> {
        match self.buf.get_mut(self.pos) {
            Some(slot) => {
                *slot = val;
                self.pos += 1;
                Ok(())
            }
            None => Err(WireError::BufferOverflow {
                needed: 1,
                available: 0,
            }),
        }
    }

    /// Write a big-endian `u16`.
    pub fn write_u16(&mut self, val: u16) -> Result<()> {
        self.put(&val.to_be_bytes())
    }

    /// Write a big-endian `u32`.
    pub fn write_u32(&mut self, val: u32) -> Result<()> {
        self.put(&val.to_be_bytes())
    }

    /// Write the raw lattice value of a fixed-point quantity.
    pub fn write_fixed(&mut self, val: &FixedPointValue) -> Result<()> {
        self.write_u32(val.encode())
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.put(bytes)
    }

    /// Remaining capacity in bytes.
    pub fn bytes_available(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Number of bytes written since the start of the buffer.
    pub fn bytes_written(&self) -> usize {
        self.pos
    }

    /// The written prefix of the buffer.
    pub fn written(&self) -> &[u8] {
        self.buf.get(..self.pos).unwrap_or_default()
    }

    /// Rewind to the start of the buffer. Contents are not cleared.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let available = self.bytes_available();
        for &byte in bytes {
            if self.write_u8(byte).is_err() {
                return Err(WireError::BufferOverflow {
                    needed: bytes.len(),
                    available,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ByteReader;

    #[test]
    fn write_then_read_sequence() {
        let mut buf = [0u8; 7];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_u8(0xA5).unwrap();
        writer.write_u16(0xBEEF).unwrap();
        writer.write_u32(0x0102_0304).unwrap();
        assert_eq!(writer.bytes_written(), 7);
        assert_eq!(writer.bytes_available(), 0);

        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_u8().unwrap(), 0xA5);
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert_eq!(reader.read_u32().unwrap(), 0x0102_0304);
    }

    #[test]
    fn multi_byte_values_are_big_endian() {
        let mut buf = [0u8; 6];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_u16(0x1234).unwrap();
        writer.write_u32(0xAABB_CCDD).unwrap();

        assert_eq!(buf, [0x12, 0x34, 0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn overflow_keeps_partial_prefix() {
        let mut buf = [0xFFu8; 3];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_u8(0x00).unwrap();

        let err = writer.write_u32(0x1122_3344).unwrap_err();
        assert_eq!(
            err,
            WireError::BufferOverflow {
                needed: 4,
                available: 2
            }
        );
        assert_eq!(writer.bytes_written(), 3);
        assert_eq!(writer.bytes_available(), 0);
        assert_eq!(buf, [0x00, 0x11, 0x22]);
    }

    #[test]
    fn overflow_leaves_bytes_beyond_capacity_untouched() {
        let mut backing = [0xEEu8; 6];
        {
            let (head, _) = backing.split_at_mut(2);
            let mut writer = ByteWriter::new(head);
            assert!(writer.write_u32(0).is_err());
        }
        assert_eq!(backing, [0x00, 0x00, 0xEE, 0xEE, 0xEE, 0xEE]);
    }

    #[test]
    fn zero_capacity_fails_immediately() {
        let mut buf = [0u8; 0];
        let mut writer = ByteWriter::new(&mut buf);
        assert!(writer.write_u8(1).is_err());
        assert_eq!(writer.bytes_written(), 0);
        assert!(writer.written().is_empty());
    }

    #[test]
    fn reset_rewinds_without_clearing() {
        let mut buf = [0u8; 2];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_u16(0xCAFE).unwrap();
        writer.reset();
        assert_eq!(writer.bytes_available(), 2);
        assert_eq!(writer.written(), &[] as &[u8]);
        writer.write_u8(0x01).unwrap();

        assert_eq!(buf, [0x01, 0xFE]);
    }

    #[test]
    fn write_fixed_emits_lattice_value() {
        let mut value = FixedPointValue::new(0.5).unwrap();
        value.set_value(-2.0);

        let mut buf = [0u8; 4];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_fixed(&value).unwrap();

        assert_eq!(buf, (-4i32).to_be_bytes());
    }
}
