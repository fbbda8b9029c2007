use sigbus_signal::SignalIdentity;

/// Errors that can occur while building or loading a signal catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The signal list could not be read.
    #[error("failed to load signal list: {0}")]
    LoadFailed(String),

    /// The signal list is not valid JSON or does not match the expected shape.
    #[error("signal list is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The signal list failed schema validation.
    #[error("signal list failed validation: {0}")]
    ValidationFailed(String),

    /// The list version must be a positive integer.
    #[error("signal list version must be > 0 (got {0})")]
    InvalidVersion(i64),

    /// Two signals share a name.
    #[error("duplicate signal name: {0}")]
    DuplicateName(String),

    /// Two signals share a `(category, subcategory)` pair.
    #[error("signals {first} and {second} share identity {identity}")]
    DuplicateIdentity {
        identity: SignalIdentity,
        first: String,
        second: String,
    },

    /// A signal definition is internally inconsistent.
    #[error("invalid definition for {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// More signals than the configured maximum.
    #[error("signal count exceeds configured max ({max}): {count}")]
    TooManySignals { count: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
