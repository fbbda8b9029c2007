//! The sigbus signal dictionary.
//!
//! A [`SignalDictionary`] owns one record per registered
//! `(category, subcategory)` identity and is the single entry point for
//! network traffic:
//!
//! - [`SignalDictionary::ingest`] decodes one inbound datagram, routes it to
//!   its record and lets the record's arbitration decide whether it replaces
//!   the held value
//! - [`SignalDictionary::emit`] encodes the current value of a locally
//!   transmitted signal
//!
//! Registration happens on a [`DictionaryBuilder`] before traffic starts.
//! The built dictionary is `Send + Sync`; share it behind an `Arc` between
//! the receive path, the transmit path and consumers. Each record has its own
//! lock, so traffic for different signals never contends.

pub mod builder;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod integrity;

pub use builder::DictionaryBuilder;
pub use config::DictionaryConfig;
pub use dictionary::SignalDictionary;
pub use error::{DictionaryError, Result};
pub use integrity::{IntegrityCheck, NullIntegrity, INTEGRITY_SIZE};
pub use sigbus_signal::IngestOutcome;
