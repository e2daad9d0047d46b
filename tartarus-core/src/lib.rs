//! Report decoding, profile storage and bind resolution for the Tartarus V2 input
//! translation engine.
//!
//! This crate has no I/O of its own: it consumes raw 8-byte HID reports and produces
//! [`resolver::HostAction`]s, leaving transport, uinput emission and the control surface
//! to the daemon that embeds it.

pub mod bind;
pub mod decoder;
pub mod error;
pub mod led;
pub mod profile;
pub mod resolver;
pub mod state;

pub use bind::{Bind, BindKind};
pub use error::DriverError;
pub use profile::{Profile, ProfileStore};
pub use resolver::{process_report, set_active_profile, HostAction};
pub use state::InterfaceState;
