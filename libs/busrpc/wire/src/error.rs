/// Failure building the single contiguous wire buffer for a packet.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("allocation failed while serializing the packet")]
    OutOfMemory,
}

/// Failure parsing a received frame as an RPC packet. On any of these the
/// whole parse is abandoned; the caller routes the raw frame to the
/// peer-message path instead of treating it as RPC traffic.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame shorter than the fixed header")]
    Truncated,
    #[error("signature mismatch")]
    BadSignature,
    #[error("request_id is zero")]
    ZeroRequestId,
    #[error("function_id is zero")]
    ZeroFunctionId,
    #[error("argument prefix truncated at offset {offset}")]
    TruncatedArgumentPrefix { offset: usize },
    #[error("argument tag {0} is outside the closed set")]
    UnknownTag(u8),
    #[error("argument body at offset {offset} overruns the buffer")]
    ArgumentOverrun { offset: usize },
}
