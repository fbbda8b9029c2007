use std::fmt;

use sigbus_wire::{ByteReader, ByteWriter, FixedPointValue};
use tracing::{debug, trace};

use crate::error::{Result, SignalError};
use crate::header::{Priority, SignalHeader, HEADER_SIZE};
use crate::identity::{SignalDescriptor, SignalIdentity};
use crate::payload::{Payload, PayloadKind};

/// Whether this node is the authority for a signal or a passive acceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Values are set locally and emitted to the network.
    Transmit,
    /// Values arrive from the network, gated by arbitration.
    Receive,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Transmit => f.write_str("transmit"),
            Mode::Receive => f.write_str("receive"),
        }
    }
}

/// Result of offering a well-formed datagram to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The candidate superseded the held value.
    Accepted,
    /// The held value stays authoritative. Normal steady-state traffic.
    Rejected,
}

/// The live state of one signal.
#[derive(Debug, Clone)]
pub struct SignalRecord {
    descriptor: SignalDescriptor,
    header: SignalHeader,
    payload: Payload,
    mode: Mode,
    last_update_time: u32,
}

impl SignalRecord {
    /// Create a record with a zeroed payload and an invalid (unhealthy) header.
    pub fn new(descriptor: SignalDescriptor, kind: PayloadKind, mode: Mode) -> Result<Self> {
        Ok(Self {
            descriptor,
            header: SignalHeader {
                identity: descriptor.identity,
                ..SignalHeader::default()
            },
            payload: Payload::new(kind)?,
            mode,
            last_update_time: 0,
        })
    }

    pub fn descriptor(&self) -> &SignalDescriptor {
        &self.descriptor
    }

    pub fn identity(&self) -> SignalIdentity {
        self.descriptor.identity
    }

    pub fn header(&self) -> &SignalHeader {
        &self.header
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_transmit(&self) -> bool {
        self.mode == Mode::Transmit
    }

    /// Local clock reading of the last accepted update or local mutation.
    pub fn last_update_time(&self) -> u32 {
        self.last_update_time
    }

    /// Payload bytes following the header.
    pub fn required_payload_size(&self) -> usize {
        self.payload.required_size()
    }

    /// Full datagram size, header included.
    pub fn packet_size(&self) -> usize {
        HEADER_SIZE + self.required_payload_size()
    }

    /// Whether the held value is authoritative at local time `now`.
    ///
    /// Requires the health flag and an update no older than the timeout.
    pub fn is_valid(&self, now: u32) -> bool {
        self.header.priority.is_healthy()
            && now.wrapping_sub(self.last_update_time) <= self.descriptor.timeout_ms
    }

    /// Whether `candidate` supersedes the held header at local time `now`.
    pub fn accepts(&self, candidate: &SignalHeader, now: u32) -> bool {
        if candidate.identity != self.descriptor.identity {
            return false;
        }
        let current = &self.header;
        !self.is_valid(now)
            || candidate.priority > current.priority
            || (candidate.from_device == current.from_device
                && candidate.timestamp >= current.timestamp)
    }

    /// Encode header and payload. Transmit mode only.
    pub fn serialize(&self, writer: &mut ByteWriter<'_>) -> Result<()> {
        self.require_mode(Mode::Transmit)?;
        self.header.write(writer)?;
        self.payload.write(writer)
    }

    /// Offer a datagram to the record. Receive mode only.
    ///
    /// The candidate header and payload are decoded in full before either is
    /// applied, so a malformed datagram never leaves the record half updated.
    /// On error `reader` is unchanged; otherwise it is advanced past the
    /// datagram whether or not arbitration accepted it.
    pub fn deserialize(&mut self, reader: &mut ByteReader<'_>, now: u32) -> Result<IngestOutcome> {
        self.require_mode(Mode::Receive)?;

        let mut probe = *reader;
        let candidate = SignalHeader::read(&mut probe)?;
        if candidate.identity != self.descriptor.identity {
            return Err(SignalError::IdentityMismatch {
                expected: self.descriptor.identity,
                actual: candidate.identity,
            });
        }
        let payload = self.payload.read_candidate(&mut probe)?;
        *reader = probe;

        if !self.accepts(&candidate, now) {
            debug!(
                identity = %self.descriptor.identity,
                device = candidate.from_device,
                priority = %candidate.priority,
                timestamp = candidate.timestamp,
                held_device = self.header.from_device,
                held_priority = %self.header.priority,
                "update rejected by arbitration"
            );
            return Ok(IngestOutcome::Rejected);
        }

        trace!(
            identity = %self.descriptor.identity,
            device = candidate.from_device,
            priority = %candidate.priority,
            timestamp = candidate.timestamp,
            "update accepted"
        );
        self.header = candidate;
        self.payload = payload;
        self.last_update_time = now;
        Ok(IngestOutcome::Accepted)
    }

    /// Set a scaled value, saturating at its representable range.
    pub fn set_scaled(&mut self, value: f64, now: u32) -> Result<()> {
        self.require_mode(Mode::Transmit)?;
        match &mut self.payload {
            Payload::Scaled(fixed) => fixed.set_value(value),
            other => return Err(type_mismatch("scaled", other)),
        }
        self.touch(now);
        Ok(())
    }

    pub fn set_integer(&mut self, value: u32, now: u32) -> Result<()> {
        self.require_mode(Mode::Transmit)?;
        match &mut self.payload {
            Payload::Integer(held) => *held = value,
            other => return Err(type_mismatch("integer", other)),
        }
        self.touch(now);
        Ok(())
    }

    /// Replace the whole buffer. `bytes` must match the registered length.
    pub fn set_bytes(&mut self, bytes: &[u8], now: u32) -> Result<()> {
        self.require_mode(Mode::Transmit)?;
        match &mut self.payload {
            Payload::Buffer(held) => {
                if held.len() != bytes.len() {
                    return Err(SignalError::PayloadSizeMismatch {
                        expected: held.len(),
                        actual: bytes.len(),
                    });
                }
                held.copy_from_slice(bytes);
            }
            other => return Err(type_mismatch("buffer", other)),
        }
        self.touch(now);
        Ok(())
    }

    /// Set one byte of the buffer.
    pub fn set_byte(&mut self, index: usize, value: u8, now: u32) -> Result<()> {
        self.require_mode(Mode::Transmit)?;
        match &mut self.payload {
            Payload::Buffer(held) => {
                let length = held.len();
                let slot = held
                    .get_mut(index)
                    .ok_or(SignalError::IndexOutOfRange { index, length })?;
                *slot = value;
            }
            other => return Err(type_mismatch("buffer", other)),
        }
        self.touch(now);
        Ok(())
    }

    pub fn set_priority(&mut self, priority: Priority) -> Result<()> {
        self.require_mode(Mode::Transmit)?;
        self.header.priority = priority;
        Ok(())
    }

    pub fn set_from_device(&mut self, device: u8) -> Result<()> {
        self.require_mode(Mode::Transmit)?;
        self.header.from_device = device;
        Ok(())
    }

    /// Typed view of a scaled payload.
    pub fn scaled(&self) -> Option<&FixedPointValue> {
        match &self.payload {
            Payload::Scaled(value) => Some(value),
            _ => None,
        }
    }

    pub fn integer(&self) -> Option<u32> {
        match self.payload {
            Payload::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Buffer(bytes) => Some(&bytes[..]),
            _ => None,
        }
    }

    fn touch(&mut self, now: u32) {
        self.last_update_time = now;
        self.header.timestamp = now;
    }

    fn require_mode(&self, mode: Mode) -> Result<()> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(SignalError::WrongMode {
                identity: self.descriptor.identity,
                mode: self.mode,
            })
        }
    }
}

fn type_mismatch(expected: &'static str, actual: &Payload) -> SignalError {
    SignalError::TypeMismatch {
        expected,
        actual: actual.kind_name(),
    }
}
