use std::fmt;

use sigbus_wire::{ByteReader, ByteWriter, FixedPointValue};

use crate::error::{Result, SignalError};

/// Size of the scaled and integer payloads, and of the buffer length prefix.
const WORD_SIZE: usize = 4;

/// Largest buffer length a signal may register.
pub const MAX_BUFFER_LENGTH: usize = 4096;

/// Payload shape bound to a signal at registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadKind {
    /// Fixed-point engineering value with the given resolution.
    Scaled { resolution: f64 },
    /// Raw 32-bit integer.
    Integer,
    /// Fixed-length byte array.
    Buffer { length: usize },
}

impl PayloadKind {
    pub fn name(&self) -> &'static str {
        match self {
            PayloadKind::Scaled { .. } => "scaled",
            PayloadKind::Integer => "integer",
            PayloadKind::Buffer { .. } => "buffer",
        }
    }

    /// Bytes the payload occupies on the wire.
    pub fn required_size(&self) -> usize {
        match self {
            PayloadKind::Scaled { .. } | PayloadKind::Integer => WORD_SIZE,
            PayloadKind::Buffer { length } => WORD_SIZE.saturating_add(*length),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Scaled { resolution } => write!(f, "scaled({resolution:e})"),
            PayloadKind::Integer => f.write_str("integer"),
            PayloadKind::Buffer { length } => write!(f, "buffer[{length}]"),
        }
    }
}

/// The typed value a record holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Scaled(FixedPointValue),
    Integer(u32),
    Buffer(Box<[u8]>),
}

impl Payload {
    /// A zeroed payload of the given kind.
    ///
    /// Buffers longer than [`MAX_BUFFER_LENGTH`] are refused before allocating.
    pub fn new(kind: PayloadKind) -> Result<Self> {
        Ok(match kind {
            PayloadKind::Scaled { resolution } => {
                Payload::Scaled(FixedPointValue::new(resolution)?)
            }
            PayloadKind::Integer => Payload::Integer(0),
            PayloadKind::Buffer { length } if length > MAX_BUFFER_LENGTH => {
                return Err(SignalError::PayloadTooLarge {
                    length,
                    max: MAX_BUFFER_LENGTH,
                });
            }
            PayloadKind::Buffer { length } => Payload::Buffer(vec![0; length].into_boxed_slice()),
        })
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Scaled(value) => PayloadKind::Scaled {
                resolution: value.resolution(),
            },
            Payload::Integer(_) => PayloadKind::Integer,
            Payload::Buffer(bytes) => PayloadKind::Buffer {
                length: bytes.len(),
            },
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn required_size(&self) -> usize {
        self.kind().required_size()
    }

    /// Encode the payload. On overflow the bytes that fit are left written.
    pub fn write(&self, writer: &mut ByteWriter<'_>) -> Result<()> {
        match self {
            Payload::Scaled(value) => writer.write_fixed(value)?,
            Payload::Integer(value) => writer.write_u32(*value)?,
            Payload::Buffer(bytes) => {
                let length = u32::try_from(bytes.len()).map_err(|_| {
                    SignalError::PayloadSizeMismatch {
                        expected: u32::MAX as usize,
                        actual: bytes.len(),
                    }
                })?;
                writer.write_u32(length)?;
                writer.write_bytes(bytes)?;
            }
        }
        Ok(())
    }

    /// Decode a candidate payload of the same shape as `self`.
    ///
    /// `self` is left untouched so the caller can commit the candidate only
    /// after arbitration. `reader` advances only on success.
    pub fn read_candidate(&self, reader: &mut ByteReader<'_>) -> Result<Payload> {
        let mut probe = *reader;
        let candidate = match self {
            Payload::Scaled(current) => {
                let mut value = *current;
                probe.read_fixed(&mut value)?;
                Payload::Scaled(value)
            }
            Payload::Integer(_) => Payload::Integer(probe.read_u32()?),
            Payload::Buffer(current) => {
                let declared = probe.read_u32()? as usize;
                if declared != current.len() {
                    return Err(SignalError::PayloadSizeMismatch {
                        expected: current.len(),
                        actual: declared,
                    });
                }
                Payload::Buffer(probe.read_bytes(declared)?.into())
            }
        };
        *reader = probe;
        Ok(candidate)
    }
}
