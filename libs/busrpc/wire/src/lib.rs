//! The wire packet codec: header framing, per-argument byte-order-aware
//! serialization, and the packet builder/parser pair described by the
//! external interface's wire format.

mod codec;
mod error;
mod header;
mod packet;
mod request_id;

pub use error::{DecodeError, EncodeError};
pub use header::{Header, HEADER_LEN};
pub use packet::{Packet, PacketBuilder};
pub use request_id::next_request_id;
