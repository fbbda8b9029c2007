use crate::identity::SignalIdentity;
use crate::record::Mode;

/// Errors that can occur while mutating, encoding or decoding a signal record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    /// Low-level codec failure (underrun, overflow, bad resolution).
    #[error("wire error: {0}")]
    Wire(#[from] sigbus_wire::WireError),

    /// A buffer payload's length disagrees with the registered length.
    #[error("payload size mismatch (expected {expected} bytes, got {actual})")]
    PayloadSizeMismatch { expected: usize, actual: usize },

    /// A buffer length beyond what a signal may register.
    #[error("buffer length {length} exceeds the maximum of {max} bytes")]
    PayloadTooLarge { length: usize, max: usize },

    /// The caller asked for a payload kind the record does not carry.
    #[error("payload type mismatch (expected {expected}, record holds {actual})")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The operation is not permitted in the record's mode.
    #[error("signal {identity} is in {mode} mode")]
    WrongMode {
        identity: SignalIdentity,
        mode: Mode,
    },

    /// The datagram names a different signal than the record.
    #[error("identity mismatch (record {expected}, datagram {actual})")]
    IdentityMismatch {
        expected: SignalIdentity,
        actual: SignalIdentity,
    },

    /// A buffer index past the registered length.
    #[error("index {index} out of range for buffer of length {length}")]
    IndexOutOfRange { index: usize, length: usize },
}

pub type Result<T> = std::result::Result<T, SignalError>;
