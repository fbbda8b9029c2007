use std::fmt;

/// Number of distinct identities: one slot per `(u8, u8)` pair.
pub const MAX_SIGNAL_COUNT: usize = 1 << 16;

/// The `(category, subcategory)` key naming a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SignalIdentity {
    pub category: u8,
    pub subcategory: u8,
}

impl SignalIdentity {
    pub const fn new(category: u8, subcategory: u8) -> Self {
        Self {
            category,
            subcategory,
        }
    }

    /// Table index `category * 256 + subcategory`, in `0..MAX_SIGNAL_COUNT`.
    pub const fn index(&self) -> usize {
        ((self.category as usize) << 8) | self.subcategory as usize
    }

    /// Inverse of [`SignalIdentity::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        let packed = u16::try_from(index).ok()?;
        let [category, subcategory] = packed.to_be_bytes();
        Some(Self::new(category, subcategory))
    }
}

impl fmt::Display for SignalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.subcategory)
    }
}

/// A signal identity plus the validity window after its last accepted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalDescriptor {
    pub identity: SignalIdentity,
    pub timeout_ms: u32,
}

impl SignalDescriptor {
    pub const fn new(identity: SignalIdentity, timeout_ms: u32) -> Self {
        Self {
            identity,
            timeout_ms,
        }
    }
}
