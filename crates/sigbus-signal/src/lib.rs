//! Signal records and the arbitration rule that gates their updates.
//!
//! A signal is a physical quantity (altitude, attitude, engine RPM, ...)
//! named by a `(category, subcategory)` identity. Several devices may
//! publish the same signal; each [`SignalRecord`] decides per inbound
//! datagram whether the candidate supersedes the value it holds:
//!
//! - an invalid (unhealthy or timed-out) record accepts any candidate
//! - a strictly higher priority always preempts
//! - the current source may refresh its own claim with a non-decreasing timestamp
//!
//! Everything else is rejected without error.

pub mod clock;
pub mod error;
pub mod header;
pub mod identity;
pub mod payload;
pub mod record;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{Result, SignalError};
pub use header::{Priority, SignalHeader, HEADER_SIZE};
pub use identity::{SignalDescriptor, SignalIdentity, MAX_SIGNAL_COUNT};
pub use payload::{Payload, PayloadKind, MAX_BUFFER_LENGTH};
pub use record::{IngestOutcome, Mode, SignalRecord};
