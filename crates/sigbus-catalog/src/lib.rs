//! Name registry for sigbus signals.
//!
//! Maps human-readable signal names to `(category, subcategory)` identities
//! and records each signal's payload shape, units and timeout. Catalogs come
//! from the built-in cockpit table or from a JSON signal list validated
//! against an embedded schema before it is parsed.
//!
//! The catalog is configuration data: arbitration never consults it.

pub mod builtin;
pub mod catalog;
pub mod config;
pub mod definition;
pub mod error;
mod schema;

pub use catalog::SignalCatalog;
pub use config::CatalogConfig;
pub use definition::SignalDefinition;
pub use error::{CatalogError, Result};
