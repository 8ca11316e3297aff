use busrpc_bus::TimerId;
use busrpc_types::{FunctionId, RequestId};

/// One outstanding request. Kept until a reply arrives, the timer fires,
/// or the session closes — whichever happens first removes it.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub request_id: RequestId,
    pub function_id: FunctionId,
    pub magic1: u64,
    pub magic2: u64,
    pub magic_str: String,
    pub timer_id: TimerId,
}
