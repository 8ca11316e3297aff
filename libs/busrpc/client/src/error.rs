use busrpc_types::FunctionId;

/// Leaf cause attached to the [`error_stack::Report`] every fallible
/// client-engine operation returns. `send`'s preconditions are all
/// synchronous rejections per spec.md §4.4 — the engine never blocks to
/// wait for capacity or a connection.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not logged in to the bus")]
    NotConnected,
    #[error("pending-call cap reached")]
    ClientBusy,
    #[error("function {0} is not registered")]
    InvalidFunction(FunctionId),
    #[error("argument tags do not match the registered signature")]
    MismatchedParameter,
    #[error("the bus refused the send")]
    NetworkBusy,
    #[error("a registration argument was invalid")]
    InvalidArgument,
}
