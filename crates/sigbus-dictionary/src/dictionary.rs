use std::fmt;

use bytes::Bytes;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use sigbus_signal::{
    Clock, IngestOutcome, MonotonicClock, Priority, SignalError, SignalHeader, SignalIdentity,
    SignalRecord, MAX_SIGNAL_COUNT,
};
use sigbus_wire::{ByteReader, ByteWriter};
use tracing::{debug, info, trace, warn};

use crate::config::DictionaryConfig;
use crate::error::{DictionaryError, Result};
use crate::integrity::{IntegrityCheck, INTEGRITY_SIZE};

type Slot = Option<Box<RwLock<SignalRecord>>>;

/// Fixed-size table of signal records keyed by identity.
///
/// Built by [`crate::DictionaryBuilder`]. Every record sits behind its own
/// read-write lock; ingest and setters take the write side, readers and
/// `emit` the read side.
pub struct SignalDictionary<C: Clock = MonotonicClock> {
    slots: Box<[Slot]>,
    identities: Vec<SignalIdentity>,
    config: DictionaryConfig,
    clock: C,
}

impl<C: Clock> SignalDictionary<C> {
    pub(crate) fn from_records(
        records: impl IntoIterator<Item = SignalRecord>,
        config: DictionaryConfig,
        clock: C,
    ) -> Self {
        let mut slots: Vec<Slot> = Vec::with_capacity(MAX_SIGNAL_COUNT);
        slots.resize_with(MAX_SIGNAL_COUNT, || None);

        for record in records {
            if let Some(slot) = slots.get_mut(record.identity().index()) {
                *slot = Some(Box::new(RwLock::new(record)));
            }
        }
        let identities: Vec<SignalIdentity> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .filter_map(|(index, _)| SignalIdentity::from_index(index))
            .collect();

        info!(
            signals = identities.len(),
            device = config.local_device,
            priority = %config.transmit_priority,
            integrity = config.integrity.is_some(),
            "signal dictionary ready"
        );

        Self {
            slots: slots.into_boxed_slice(),
            identities,
            config,
            clock,
        }
    }

    /// Ingest one datagram from `reader`.
    ///
    /// The header is peeked to route the datagram; the record then decodes
    /// and arbitrates header and payload together. On error the cursor and
    /// every record are unchanged. On `Accepted` or `Rejected` the cursor
    /// moves past the datagram, so concatenated datagrams can be ingested
    /// one call at a time.
    pub fn ingest(&self, reader: &mut ByteReader<'_>) -> Result<IngestOutcome> {
        let header = SignalHeader::peek(reader)?;
        let identity = header.identity;
        let slot = self.slot(identity).inspect_err(|_| {
            debug!(
                %identity,
                device = header.from_device,
                "datagram for unregistered signal dropped"
            );
        })?;

        let mut record = slot.write();
        let datagram = record.packet_size();
        let needed = datagram + self.trailer_size();
        let available = reader.bytes_available();
        if available < needed {
            return Err(DictionaryError::BufferUnderrun { needed, available });
        }

        if let Some(check) = &self.config.integrity {
            verify(check.as_ref(), identity, reader.remaining(), datagram)?;
        }

        let mut probe = *reader;
        let outcome = record.deserialize(&mut probe, self.clock.now_millis())?;
        if self.config.integrity.is_some() {
            probe.read_u16()?;
        }
        *reader = probe;
        Ok(outcome)
    }

    /// Ingest the datagram at the start of `bytes`.
    pub fn ingest_slice(&self, bytes: &[u8]) -> Result<IngestOutcome> {
        self.ingest(&mut ByteReader::new(bytes))
    }

    /// Encode the current value of a Transmit-mode signal.
    ///
    /// Capacity is checked up front, so on error nothing is written.
    /// Returns the number of bytes written.
    pub fn emit(&self, identity: SignalIdentity, writer: &mut ByteWriter<'_>) -> Result<usize> {
        let record = self.slot(identity)?.read();
        if !record.is_transmit() {
            return Err(DictionaryError::WrongMode {
                identity,
                mode: record.mode(),
            });
        }

        let needed = record.packet_size() + self.trailer_size();
        let available = writer.bytes_available();
        if available < needed {
            return Err(DictionaryError::BufferOverflow { needed, available });
        }

        let start = writer.bytes_written();
        record.serialize(writer)?;
        if let Some(check) = &self.config.integrity {
            let code = check.compute(writer.written().get(start..).unwrap_or_default());
            writer.write_u16(code)?;
        }

        trace!(
            %identity,
            timestamp = record.header().timestamp,
            bytes = needed,
            "signal emitted"
        );
        Ok(needed)
    }

    /// Encode the current value of a Transmit-mode signal into a new buffer.
    pub fn emit_bytes(&self, identity: SignalIdentity) -> Result<Bytes> {
        let mut buf = vec![0u8; self.datagram_size(identity)?];
        let mut writer = ByteWriter::new(&mut buf);
        let written = self.emit(identity, &mut writer)?;
        buf.truncate(written);
        Ok(Bytes::from(buf))
    }

    /// Wire size of one datagram for `identity`, trailer included.
    pub fn datagram_size(&self, identity: SignalIdentity) -> Result<usize> {
        Ok(self.slot(identity)?.read().packet_size() + self.trailer_size())
    }

    pub fn set_scaled(&self, identity: SignalIdentity, value: f64) -> Result<()> {
        self.update(identity, |record, now| record.set_scaled(value, now))
    }

    pub fn set_integer(&self, identity: SignalIdentity, value: u32) -> Result<()> {
        self.update(identity, |record, now| record.set_integer(value, now))
    }

    pub fn set_bytes(&self, identity: SignalIdentity, bytes: &[u8]) -> Result<()> {
        self.update(identity, |record, now| record.set_bytes(bytes, now))
    }

    pub fn set_byte(&self, identity: SignalIdentity, index: usize, value: u8) -> Result<()> {
        self.update(identity, |record, now| record.set_byte(index, value, now))
    }

    pub fn set_priority(&self, identity: SignalIdentity, priority: Priority) -> Result<()> {
        self.update(identity, |record, _| record.set_priority(priority))
    }

    pub fn set_from_device(&self, identity: SignalIdentity, device: u8) -> Result<()> {
        self.update(identity, |record, _| record.set_from_device(device))
    }

    /// Shared access to a record for the life of the guard.
    pub fn read(&self, identity: SignalIdentity) -> Result<RwLockReadGuard<'_, SignalRecord>> {
        Ok(self.slot(identity)?.read())
    }

    /// A copy of a record's current state.
    pub fn snapshot(&self, identity: SignalIdentity) -> Result<SignalRecord> {
        Ok(self.read(identity)?.clone())
    }

    /// Current engineering value of a scaled signal.
    pub fn scaled(&self, identity: SignalIdentity) -> Result<f64> {
        let record = self.read(identity)?;
        record
            .scaled()
            .map(|value| value.value())
            .ok_or_else(|| type_mismatch("scaled", &record))
    }

    /// Current value of a scaled signal, or `None` while it is not valid.
    pub fn scaled_if_valid(&self, identity: SignalIdentity) -> Result<Option<f64>> {
        let record = self.read(identity)?;
        let now = self.clock.now_millis();
        let value = record
            .scaled()
            .map(|value| value.value())
            .ok_or_else(|| type_mismatch("scaled", &record))?;
        Ok(record.is_valid(now).then_some(value))
    }

    pub fn integer(&self, identity: SignalIdentity) -> Result<u32> {
        let record = self.read(identity)?;
        record
            .integer()
            .ok_or_else(|| type_mismatch("integer", &record))
    }

    /// Borrowed view of a buffer signal's bytes.
    pub fn buffer(&self, identity: SignalIdentity) -> Result<MappedRwLockReadGuard<'_, [u8]>> {
        let record = self.read(identity)?;
        RwLockReadGuard::try_map(record, SignalRecord::bytes)
            .map_err(|record| type_mismatch("buffer", &record))
    }

    /// Whether the signal's held value is authoritative right now.
    pub fn is_valid(&self, identity: SignalIdentity) -> Result<bool> {
        let record = self.read(identity)?;
        Ok(record.is_valid(self.clock.now_millis()))
    }

    pub fn contains(&self, identity: SignalIdentity) -> bool {
        self.slot(identity).is_ok()
    }

    /// Registered identities in ascending order.
    pub fn identities(&self) -> &[SignalIdentity] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn slot(&self, identity: SignalIdentity) -> Result<&RwLock<SignalRecord>> {
        self.slots
            .get(identity.index())
            .and_then(|slot| slot.as_deref())
            .ok_or(DictionaryError::UnknownIdentity(identity))
    }

    fn update<F>(&self, identity: SignalIdentity, apply: F) -> Result<()>
    where
        F: FnOnce(&mut SignalRecord, u32) -> sigbus_signal::Result<()>,
    {
        let mut record = self.slot(identity)?.write();
        let now = self.clock.now_millis();
        apply(&mut record, now)?;
        Ok(())
    }

    fn trailer_size(&self) -> usize {
        if self.config.integrity.is_some() {
            INTEGRITY_SIZE
        } else {
            0
        }
    }
}

impl<C: Clock> fmt::Debug for SignalDictionary<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalDictionary")
            .field("signals", &self.identities.len())
            .field("config", &self.config)
            .field("now_ms", &self.clock.now_millis())
            .finish()
    }
}

fn verify(
    check: &dyn IntegrityCheck,
    identity: SignalIdentity,
    input: &[u8],
    datagram: usize,
) -> Result<()> {
    let mut reader = ByteReader::new(input);
    let body = reader.read_bytes(datagram)?;
    let actual = reader.read_u16()?;
    let expected = check.compute(body);
    if expected != actual {
        warn!(
            %identity,
            expected = format_args!("{expected:#06x}"),
            actual = format_args!("{actual:#06x}"),
            "integrity check failed"
        );
        return Err(DictionaryError::IntegrityMismatch { expected, actual });
    }
    Ok(())
}

fn type_mismatch(expected: &'static str, record: &SignalRecord) -> DictionaryError {
    SignalError::TypeMismatch {
        expected,
        actual: record.kind().name(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sigbus_signal::{ManualClock, Mode, PayloadKind, SignalDescriptor};

    use super::*;
    use crate::builder::DictionaryBuilder;
    use crate::integrity::NullIntegrity;

    const ALTITUDE: SignalIdentity = SignalIdentity::new(10, 20);
    const FLAGS: SignalIdentity = SignalIdentity::new(30, 1);
    const TAIL: SignalIdentity = SignalIdentity::new(30, 2);
    const LOCAL_ALT: SignalIdentity = SignalIdentity::new(40, 1);

    fn datagram(
        device: u8,
        priority: u8,
        identity: SignalIdentity,
        ts: u32,
        payload: &[u8],
    ) -> Vec<u8> {
        let mut out = vec![device, priority, identity.category, identity.subcategory];
        out.extend_from_slice(&ts.to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn build(config: DictionaryConfig) -> SignalDictionary<Arc<ManualClock>> {
        let mut builder = DictionaryBuilder::with_config(config);
        builder
            .register(
                SignalDescriptor::new(ALTITUDE, 1000),
                PayloadKind::Scaled { resolution: 0.01 },
                Mode::Receive,
            )
            .unwrap()
            .register(SignalDescriptor::new(FLAGS, 1000), PayloadKind::Integer, Mode::Receive)
            .unwrap()
            .register(
                SignalDescriptor::new(TAIL, 1000),
                PayloadKind::Buffer { length: 4 },
                Mode::Transmit,
            )
            .unwrap()
            .register(
                SignalDescriptor::new(LOCAL_ALT, 1000),
                PayloadKind::Scaled { resolution: 0.01 },
                Mode::Transmit,
            )
            .unwrap();
        builder.build_with_clock(Arc::new(ManualClock::new(0)))
    }

    fn dictionary() -> SignalDictionary<Arc<ManualClock>> {
        build(DictionaryConfig::default())
    }

    #[test]
    fn unknown_identity_touches_nothing() {
        let dict = dictionary();
        let wire = datagram(1, 0x81, SignalIdentity::new(99, 99), 0, &[0, 0, 0, 1]);
        let mut reader = ByteReader::new(&wire);

        assert_eq!(
            dict.ingest(&mut reader).unwrap_err(),
            DictionaryError::UnknownIdentity(SignalIdentity::new(99, 99))
        );
        assert_eq!(reader.position(), 0);
        assert!(!dict.contains(SignalIdentity::new(99, 99)));
    }

    #[test]
    fn short_header_is_underrun() {
        let dict = dictionary();
        let mut reader = ByteReader::new(&[1, 0x81, 10]);
        assert!(matches!(
            dict.ingest(&mut reader),
            Err(DictionaryError::BufferUnderrun { .. })
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn short_payload_is_underrun_and_atomic() {
        let dict = dictionary();
        let wire = datagram(1, 0x81, ALTITUDE, 5, &[0, 0, 0x30]);
        let mut reader = ByteReader::new(&wire);

        assert_eq!(
            dict.ingest(&mut reader).unwrap_err(),
            DictionaryError::BufferUnderrun {
                needed: 12,
                available: 11
            }
        );
        assert_eq!(reader.position(), 0);
        let record = dict.snapshot(ALTITUDE).unwrap();
        assert_eq!(record.header().timestamp, 0);
        assert!(!record.header().priority.is_healthy());
    }

    #[test]
    fn concatenated_datagrams_ingest_in_sequence() {
        let dict = dictionary();
        let mut wire = datagram(1, 0x81, ALTITUDE, 1, &12345u32.to_be_bytes());
        wire.extend(datagram(1, 0x81, FLAGS, 1, &0xDEAD_BEEFu32.to_be_bytes()));
        wire.extend(datagram(2, 0x81, ALTITUDE, 1, &1u32.to_be_bytes()));
        let mut reader = ByteReader::new(&wire);

        assert_eq!(dict.ingest(&mut reader).unwrap(), IngestOutcome::Accepted);
        assert_eq!(dict.ingest(&mut reader).unwrap(), IngestOutcome::Accepted);
        assert_eq!(dict.ingest(&mut reader).unwrap(), IngestOutcome::Rejected);
        assert_eq!(reader.bytes_available(), 0);

        assert!((dict.scaled(ALTITUDE).unwrap() - 123.45).abs() < 0.01);
        assert_eq!(dict.integer(FLAGS).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn ingest_into_transmit_record_is_wrong_mode() {
        let dict = dictionary();
        let wire = datagram(1, 0xFF, LOCAL_ALT, 1, &[0, 0, 0, 1]);
        assert!(matches!(
            dict.ingest_slice(&wire),
            Err(DictionaryError::WrongMode {
                mode: Mode::Transmit,
                ..
            })
        ));
    }

    #[test]
    fn buffer_length_mismatch_is_rejected_atomically() {
        let mut builder = DictionaryBuilder::new();
        builder
            .register(
                SignalDescriptor::new(TAIL, 1000),
                PayloadKind::Buffer { length: 4 },
                Mode::Receive,
            )
            .unwrap();
        let dict = builder.build_with_clock(ManualClock::new(0));

        let wire = datagram(1, 0x81, TAIL, 1, &[0, 0, 0, 3, 1, 2, 3, 4]);
        assert!(matches!(
            dict.ingest_slice(&wire),
            Err(DictionaryError::Signal(SignalError::PayloadSizeMismatch {
                expected: 4,
                actual: 3
            }))
        ));
        assert_eq!(&*dict.buffer(TAIL).unwrap(), &[0, 0, 0, 0]);
        assert_eq!(dict.snapshot(TAIL).unwrap().header().timestamp, 0);

        let wire = datagram(1, 0x81, TAIL, 1, &[0, 0, 0, 4, 1, 2, 3, 4]);
        assert_eq!(dict.ingest_slice(&wire).unwrap(), IngestOutcome::Accepted);
        assert_eq!(&*dict.buffer(TAIL).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn emit_writes_stamped_datagram() {
        let dict = build(DictionaryConfig {
            local_device: 9,
            transmit_priority: Priority::from_byte(0x83),
            integrity: None,
        });
        dict.clock().set(250);
        dict.set_scaled(LOCAL_ALT, 123.45).unwrap();

        let bytes = dict.emit_bytes(LOCAL_ALT).unwrap();
        assert_eq!(
            bytes.as_ref(),
            datagram(9, 0x83, LOCAL_ALT, 250, &12345u32.to_be_bytes()).as_slice()
        );
    }

    #[test]
    fn emit_from_receive_record_is_wrong_mode() {
        let dict = dictionary();
        let mut buf = [0u8; 16];
        let mut writer = ByteWriter::new(&mut buf);
        assert_eq!(
            dict.emit(ALTITUDE, &mut writer).unwrap_err(),
            DictionaryError::WrongMode {
                identity: ALTITUDE,
                mode: Mode::Receive
            }
        );
        assert_eq!(
            dict.emit(SignalIdentity::new(1, 1), &mut writer).unwrap_err(),
            DictionaryError::UnknownIdentity(SignalIdentity::new(1, 1))
        );
        assert_eq!(writer.bytes_written(), 0);
    }

    #[test]
    fn emit_overflow_writes_nothing() {
        let dict = dictionary();
        let mut buf = [0xEEu8; 11];
        let mut writer = ByteWriter::new(&mut buf);

        assert_eq!(
            dict.emit(LOCAL_ALT, &mut writer).unwrap_err(),
            DictionaryError::BufferOverflow {
                needed: 12,
                available: 11
            }
        );
        assert_eq!(writer.bytes_written(), 0);
        assert_eq!(buf, [0xEE; 11]);
    }

    #[test]
    fn setters_require_transmit_mode_and_matching_kind() {
        let dict = dictionary();
        assert!(matches!(
            dict.set_scaled(ALTITUDE, 1.0),
            Err(DictionaryError::WrongMode { .. })
        ));
        assert!(matches!(
            dict.set_integer(LOCAL_ALT, 1),
            Err(DictionaryError::Signal(SignalError::TypeMismatch {
                expected: "integer",
                actual: "scaled"
            }))
        ));
        assert!(matches!(
            dict.set_byte(TAIL, 4, 1),
            Err(DictionaryError::Signal(SignalError::IndexOutOfRange { .. }))
        ));
        assert!(matches!(
            dict.set_bytes(TAIL, &[1, 2]),
            Err(DictionaryError::Signal(SignalError::PayloadSizeMismatch { .. }))
        ));

        dict.set_bytes(TAIL, b"N123").unwrap();
        dict.set_byte(TAIL, 3, b'4').unwrap();
        assert_eq!(&*dict.buffer(TAIL).unwrap(), b"N124");
    }

    #[test]
    fn typed_accessors_reject_wrong_kind() {
        let dict = dictionary();
        assert!(matches!(
            dict.integer(ALTITUDE),
            Err(DictionaryError::Signal(SignalError::TypeMismatch { .. }))
        ));
        assert!(dict.buffer(FLAGS).is_err());
        assert!(dict.scaled(TAIL).is_err());
    }

    #[test]
    fn validity_follows_the_clock() {
        let dict = dictionary();
        assert!(!dict.is_valid(ALTITUDE).unwrap());
        assert_eq!(dict.scaled_if_valid(ALTITUDE).unwrap(), None);

        dict.clock().set(100);
        dict.ingest_slice(&datagram(1, 0x81, ALTITUDE, 1, &100u32.to_be_bytes()))
            .unwrap();
        assert!(dict.is_valid(ALTITUDE).unwrap());
        let value = dict.scaled_if_valid(ALTITUDE).unwrap().unwrap();
        assert!((value - 1.0).abs() < 1e-9);

        dict.clock().set(1101);
        assert!(!dict.is_valid(ALTITUDE).unwrap());
        assert_eq!(dict.scaled_if_valid(ALTITUDE).unwrap(), None);
    }

    #[test]
    fn integrity_trailer_round_trip() {
        let sum = |data: &[u8]| data.iter().fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
        let config = DictionaryConfig {
            integrity: Some(Arc::new(sum)),
            ..DictionaryConfig::default()
        };
        let tx = build(config.clone());
        let rx = build(config);

        tx.set_scaled(LOCAL_ALT, 1.0).unwrap();
        let mut wire = tx.emit_bytes(LOCAL_ALT).unwrap().to_vec();
        assert_eq!(wire.len(), 14);
        assert_eq!(tx.datagram_size(LOCAL_ALT).unwrap(), 14);

        // Re-address the datagram to a receive-mode signal and fix the trailer.
        wire[2] = ALTITUDE.category;
        wire[3] = ALTITUDE.subcategory;
        let code = sum(&wire[..12]).to_be_bytes();
        wire[12] = code[0];
        wire[13] = code[1];

        let mut reader = ByteReader::new(&wire);
        assert_eq!(rx.ingest(&mut reader).unwrap(), IngestOutcome::Accepted);
        assert_eq!(reader.bytes_available(), 0);

        wire[13] ^= 0xFF;
        let mut reader = ByteReader::new(&wire);
        assert!(matches!(
            rx.ingest(&mut reader),
            Err(DictionaryError::IntegrityMismatch { .. })
        ));
        assert_eq!(reader.position(), 0);

        assert!(matches!(
            rx.ingest_slice(&wire[..12]),
            Err(DictionaryError::BufferUnderrun {
                needed: 14,
                available: 12
            })
        ));
    }

    #[test]
    fn null_integrity_appends_zero_trailer() {
        let dict = build(DictionaryConfig {
            integrity: Some(Arc::new(NullIntegrity)),
            ..DictionaryConfig::default()
        });
        let bytes = dict.emit_bytes(TAIL).unwrap();
        assert_eq!(bytes.len(), 8 + 8 + 2);
        assert_eq!(&bytes[16..], &[0, 0]);
    }

    #[test]
    fn identities_are_sorted() {
        let dict = dictionary();
        assert_eq!(dict.identities(), &[ALTITUDE, FLAGS, TAIL, LOCAL_ALT]);
        assert_eq!(dict.len(), 4);
        assert!(!dict.is_empty());
    }
}
