//! Bounds-checked byte codec for the sigbus wire format.
//!
//! Every multi-byte value on the wire is big-endian (network byte order).
//! Readers and writers operate over caller-owned buffers and never panic on
//! short input:
//! - [`ByteReader`] fails without advancing when too few bytes remain
//! - [`ByteWriter`] writes byte-by-byte and keeps whatever fit before failing
//! - [`FixedPointValue`] maps a float onto a signed 32-bit lattice so every
//!   node decodes the same quantity regardless of its float hardware

pub mod error;
pub mod fixed;
pub mod reader;
pub mod writer;

pub use error::{Result, WireError};
pub use fixed::{FixedPointValue, SEMI_TO_DEGREES};
pub use reader::ByteReader;
pub use writer::ByteWriter;
