use std::collections::BTreeMap;

use sigbus_catalog::{SignalCatalog, SignalDefinition};
use sigbus_signal::{
    Clock, Mode, MonotonicClock, PayloadKind, SignalDescriptor, SignalIdentity, SignalRecord,
};
use tracing::debug;

use crate::config::DictionaryConfig;
use crate::dictionary::SignalDictionary;
use crate::error::{DictionaryError, Result};

/// Collects record registrations before any traffic flows.
///
/// Registration needs `&mut self`; [`DictionaryBuilder::build`] consumes the
/// builder, so a running dictionary can never gain or lose records.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    records: BTreeMap<SignalIdentity, SignalRecord>,
    config: DictionaryConfig,
}

impl DictionaryBuilder {
    /// Create an empty builder with default config.
    pub fn new() -> Self {
        Self::with_config(DictionaryConfig::default())
    }

    /// Create an empty builder with explicit config.
    pub fn with_config(config: DictionaryConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            config,
        }
    }

    /// Register one signal.
    ///
    /// Transmit-mode records get the configured device and priority stamped
    /// on their header.
    pub fn register(
        &mut self,
        descriptor: SignalDescriptor,
        kind: PayloadKind,
        mode: Mode,
    ) -> Result<&mut Self> {
        let identity = descriptor.identity;
        if self.records.contains_key(&identity) {
            return Err(DictionaryError::AlreadyRegistered(identity));
        }

        let mut record = SignalRecord::new(descriptor, kind, mode)?;
        if mode == Mode::Transmit {
            record.set_from_device(self.config.local_device)?;
            record.set_priority(self.config.transmit_priority)?;
        }

        debug!(%identity, %kind, %mode, timeout_ms = descriptor.timeout_ms, "signal registered");
        self.records.insert(identity, record);
        Ok(self)
    }

    /// Register every catalog entry, choosing each signal's mode with `mode_for`.
    pub fn register_catalog<F>(
        &mut self,
        catalog: &SignalCatalog,
        mut mode_for: F,
    ) -> Result<&mut Self>
    where
        F: FnMut(&SignalDefinition) -> Mode,
    {
        for definition in catalog.iter() {
            let mode = mode_for(definition);
            self.register(definition.descriptor(), definition.kind, mode)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// Freeze the registrations into a dictionary on the monotonic clock.
    pub fn build(self) -> SignalDictionary<MonotonicClock> {
        self.build_with_clock(MonotonicClock::new())
    }

    /// Freeze the registrations into a dictionary reading `clock`.
    pub fn build_with_clock<C: Clock>(self, clock: C) -> SignalDictionary<C> {
        SignalDictionary::from_records(self.records.into_values(), self.config, clock)
    }
}
