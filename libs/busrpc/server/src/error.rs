use busrpc_types::{ClientId, FunctionId};

/// Leaf cause attached to the [`error_stack::Report`] every fallible
/// server-engine operation returns.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("function {0} is not registered")]
    InvalidFunction(FunctionId),
    #[error("return argument tags do not match the registered signature")]
    MismatchedParameter,
    #[error("client {0} is not connected")]
    NotConnected(ClientId),
    #[error("the bus refused the send")]
    NetworkBusy,
}
