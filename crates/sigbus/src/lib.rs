//! Arbitrated exchange of cockpit signals between redundant devices.
//!
//! Several sensors may publish the same quantity; every receiver keeps
//! exactly one authoritative value per signal, chosen by source health,
//! priority rank and timestamp freshness, and expired when its source goes
//! quiet.
//!
//! # Crate Structure
//!
//! - [`wire`]: big-endian byte codec and fixed-point values
//! - [`signal`]: identities, headers, payloads and the per-signal arbitration record
//! - [`catalog`]: name registry, built-in signal table and JSON signal lists
//! - [`dictionary`]: the shared signal table with `ingest` and `emit`

/// Re-export wire codec types.
pub mod wire {
    pub use sigbus_wire::*;
}

/// Re-export signal record types.
pub mod signal {
    pub use sigbus_signal::*;
}

/// Re-export catalog types.
pub mod catalog {
    pub use sigbus_catalog::*;
}

/// Re-export dictionary types.
pub mod dictionary {
    pub use sigbus_dictionary::*;
}
