//! Shared value types for the busrpc wire protocol: the closed set of
//! argument type tags, the error-code enum carried in every header, the
//! `Argument` tagged union, and the id newtypes used to correlate calls.

mod argument;
mod data_type;
mod error_code;
mod ids;

pub use argument::Argument;
pub use data_type::{DataType, UnknownDataType};
pub use error_code::ErrorCode;
pub use ids::{ClientId, FunctionId, RequestId};

/// Mandatory 8-byte signature opening every packet on the wire.
pub const WIRE_SIGNATURE: [u8; 8] = *b"***PRPC\0";
