use sigbus_signal::{Mode, SignalError, SignalIdentity};
use sigbus_wire::WireError;

/// Errors returned by dictionary registration and traffic operations.
///
/// Arbitration losses are not errors; see [`crate::IngestOutcome`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DictionaryError {
    /// Not enough input for the header, the payload, or the integrity trailer.
    #[error("buffer underrun ({needed} bytes needed, {available} available)")]
    BufferUnderrun { needed: usize, available: usize },

    /// Not enough output capacity for the full datagram.
    #[error("buffer overflow ({needed} bytes needed, {available} available)")]
    BufferOverflow { needed: usize, available: usize },

    /// No record is registered for the identity.
    #[error("unknown signal identity {0}")]
    UnknownIdentity(SignalIdentity),

    /// The identity was registered twice.
    #[error("signal {0} is already registered")]
    AlreadyRegistered(SignalIdentity),

    /// The operation is not permitted in the record's mode.
    #[error("signal {identity} is in {mode} mode")]
    WrongMode { identity: SignalIdentity, mode: Mode },

    /// The integrity trailer does not match the datagram.
    #[error("integrity check failed (computed {expected:#06x}, received {actual:#06x})")]
    IntegrityMismatch { expected: u16, actual: u16 },

    /// Payload shape or accessor misuse reported by the record.
    #[error(transparent)]
    Signal(SignalError),
}

impl From<SignalError> for DictionaryError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::Wire(WireError::BufferUnderrun { needed, available }) => {
                DictionaryError::BufferUnderrun { needed, available }
            }
            SignalError::Wire(WireError::BufferOverflow { needed, available }) => {
                DictionaryError::BufferOverflow { needed, available }
            }
            SignalError::WrongMode { identity, mode } => {
                DictionaryError::WrongMode { identity, mode }
            }
            other => DictionaryError::Signal(other),
        }
    }
}

impl From<WireError> for DictionaryError {
    fn from(err: WireError) -> Self {
        SignalError::Wire(err).into()
    }
}

pub type Result<T> = std::result::Result<T, DictionaryError>;
