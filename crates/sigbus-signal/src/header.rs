use std::fmt;

use sigbus_wire::{ByteReader, ByteWriter};

use crate::error::Result;
use crate::identity::SignalIdentity;

/// Wire size of a datagram header: device, priority, category, subcategory, timestamp.
pub const HEADER_SIZE: usize = 8;

/// Source-health flag and arbitration rank carried in one priority byte.
///
/// On the wire, bit 7 is the health flag and bits 0-6 the rank. Priorities
/// order by health first, then rank, which is the same order as comparing
/// the raw bytes: any healthy source outranks any unhealthy one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Priority {
    healthy: bool,
    rank: u8,
}

impl Priority {
    pub const HEALTHY_BIT: u8 = 0x80;
    pub const RANK_MASK: u8 = 0x7F;

    /// Build a priority. Rank bits above bit 6 are discarded.
    pub const fn new(healthy: bool, rank: u8) -> Self {
        Self {
            healthy,
            rank: rank & Self::RANK_MASK,
        }
    }

    pub const fn from_byte(byte: u8) -> Self {
        Self::new(byte & Self::HEALTHY_BIT != 0, byte)
    }

    pub const fn to_byte(self) -> u8 {
        if self.healthy {
            Self::HEALTHY_BIT | self.rank
        } else {
            self.rank
        }
    }

    pub const fn is_healthy(self) -> bool {
        self.healthy
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.to_byte())
    }
}

/// The fixed 8-byte prefix of every signal datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalHeader {
    pub from_device: u8,
    pub priority: Priority,
    pub identity: SignalIdentity,
    pub timestamp: u32,
}

impl SignalHeader {
    /// Decode a header, advancing `reader` only if all 8 bytes were present.
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let mut probe = *reader;
        let from_device = probe.read_u8()?;
        let priority = Priority::from_byte(probe.read_u8()?);
        let category = probe.read_u8()?;
        let subcategory = probe.read_u8()?;
        let timestamp = probe.read_u32()?;
        *reader = probe;

        Ok(Self {
            from_device,
            priority,
            identity: SignalIdentity::new(category, subcategory),
            timestamp,
        })
    }

    /// Decode a header without moving the caller's cursor.
    pub fn peek(reader: &ByteReader<'_>) -> Result<Self> {
        let mut probe = *reader;
        Self::read(&mut probe)
    }

    /// Encode the header.
    ///
    /// On overflow the bytes that fit are left written.
    pub fn write(&self, writer: &mut ByteWriter<'_>) -> Result<()> {
        writer.write_u8(self.from_device)?;
        writer.write_u8(self.priority.to_byte())?;
        writer.write_u8(self.identity.category)?;
        writer.write_u8(self.identity.subcategory)?;
        writer.write_u32(self.timestamp)?;
        Ok(())
    }
}
