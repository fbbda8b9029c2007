/// Width of the integrity trailer on the wire.
pub const INTEGRITY_SIZE: usize = 2;

/// Checksum over one encoded datagram (header and payload).
///
/// When a dictionary is configured with a check, `emit` appends the value as
/// a big-endian trailer and `ingest` verifies it before arbitration.
pub trait IntegrityCheck: Send + Sync {
    fn compute(&self, data: &[u8]) -> u16;
}

/// Placeholder check that always yields zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIntegrity;

impl IntegrityCheck for NullIntegrity {
    fn compute(&self, _data: &[u8]) -> u16 {
        0
    }
}

impl<F> IntegrityCheck for F
where
    F: Fn(&[u8]) -> u16 + Send + Sync,
{
    fn compute(&self, data: &[u8]) -> u16 {
        self(data)
    }
}
