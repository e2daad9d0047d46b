//! hidraw transport, the 90-byte Tartarus V2 wire protocol, and asynchronous LED
//! dispatch. Pairs with `tartarus-core`, which owns the protocol-independent decoding
//! and resolution logic.

pub mod error;
pub mod led;
pub mod protocol;
pub mod transport;

pub use error::TransportError;
pub use protocol::{RazerReport, PRODUCT_ID, REPORT_LEN, VENDOR_ID};
pub use transport::DeviceIo;
