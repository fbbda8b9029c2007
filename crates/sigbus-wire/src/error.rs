/// Errors that can occur while reading or writing wire values.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum WireError {
    /// Fewer bytes remain in the input than the value requires.
    #[error("buffer underrun ({needed} bytes needed, {available} available)")]
    BufferUnderrun { needed: usize, available: usize },

    /// Fewer bytes of capacity remain in the output than the value requires.
    #[error("buffer overflow ({needed} bytes needed, {available} available)")]
    BufferOverflow { needed: usize, available: usize },

    /// A fixed-point resolution must be finite and strictly positive.
    #[error("invalid fixed-point resolution {0}")]
    InvalidResolution(f64),
}

pub type Result<T> = std::result::Result<T, WireError>;
