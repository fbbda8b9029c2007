use std::fmt;
use std::io;

use sigbus_catalog::CatalogError;
use sigbus_dictionary::DictionaryError;
use sigbus_signal::SignalError;
use sigbus_wire::WireError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn catalog_error(context: &str, err: CatalogError) -> CliError {
    let code = match err {
        CatalogError::LoadFailed(_) => FAILURE,
        _ => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn signal_error(context: &str, err: SignalError) -> CliError {
    let code = match err {
        SignalError::Wire(WireError::InvalidResolution(_)) => INTERNAL,
        SignalError::Wire(_)
        | SignalError::PayloadSizeMismatch { .. }
        | SignalError::PayloadTooLarge { .. }
        | SignalError::IdentityMismatch { .. } => DATA_INVALID,
        SignalError::TypeMismatch { .. } | SignalError::IndexOutOfRange { .. } => USAGE,
        SignalError::WrongMode { .. } => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn dictionary_error(context: &str, err: DictionaryError) -> CliError {
    match err {
        DictionaryError::Signal(err) => signal_error(context, err),
        DictionaryError::BufferUnderrun { .. }
        | DictionaryError::UnknownIdentity(_)
        | DictionaryError::IntegrityMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
