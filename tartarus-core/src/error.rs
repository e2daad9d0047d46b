//! Typed errors for the translation engine, per the transport/allocation/protocol/
//! validation error taxonomy.

use thiserror::Error;

/// Names the transport/allocation/protocol/validation error taxonomy at this crate's
/// boundary. The decode/resolve/profile-store paths are designed to recover from every
/// one of these locally (malformed input is clamped, never rejected), so nothing in this
/// crate constructs a `DriverError` today; it documents the space a caller embedding this
/// engine alongside a fallible transport can report errors in without improvising its own
/// taxonomy.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("allocation failed while handling an event")]
    Allocation,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid profile number: {0}")]
    InvalidProfileNum(u8),
}
