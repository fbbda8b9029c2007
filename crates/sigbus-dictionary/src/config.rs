use std::fmt;
use std::sync::Arc;

use sigbus_signal::Priority;

use crate::integrity::IntegrityCheck;

/// Node-level settings applied when the dictionary is built.
#[derive(Clone)]
pub struct DictionaryConfig {
    /// Device number stamped on every Transmit-mode header.
    pub local_device: u8,
    /// Priority stamped on every Transmit-mode header.
    pub transmit_priority: Priority,
    /// Optional datagram checksum. `None` keeps the bare wire format.
    pub integrity: Option<Arc<dyn IntegrityCheck>>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            local_device: 0,
            transmit_priority: Priority::new(true, 0),
            integrity: None,
        }
    }
}

impl fmt::Debug for DictionaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryConfig")
            .field("local_device", &self.local_device)
            .field("transmit_priority", &self.transmit_priority)
            .field("integrity", &self.integrity.is_some())
            .finish()
    }
}
