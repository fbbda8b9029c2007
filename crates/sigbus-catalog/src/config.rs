/// Limits applied when loading a signal list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Maximum number of signals in one list.
    pub max_signals: usize,
    /// Maximum bytes read from a signal-list file.
    pub max_file_size: usize,
    /// When true, the document is checked against the signal-list schema
    /// before typed parsing.
    pub validate_schema: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_signals: 4096,
            max_file_size: 1024 * 1024,
            validate_schema: true,
        }
    }
}
