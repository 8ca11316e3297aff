use bytes::Bytes;
use busrpc_bus::UserAddress;
use busrpc_types::ClientId;
use busrpc_wire::Packet;

/// Application-facing callbacks the server engine invokes after releasing
/// its own bookkeeping lock and, for `on_request`, from the issuing
/// client's dedicated worker — never concurrently with another request
/// from the same client, matching the per-client serialized worker model.
pub trait ServerObserver: Send + Sync + 'static {
    /// A call was admitted, validated against the registered signature,
    /// and is within its deadline. The application computes a result and
    /// hands it back through [`crate::ServerEngine::send_result`].
    fn on_request(&self, request: Packet);

    /// A client session has logged in; its worker is already running.
    fn on_client_login(&self, client_id: ClientId, address: UserAddress);

    /// A client session has logged off; its worker has been torn down and
    /// any work still queued for it has been discarded.
    fn on_client_logoff(&self, client_id: ClientId);

    /// An inbound frame from `client_id` that did not parse as (or match
    /// the registered signature of) an RPC request.
    fn on_peer_message(&self, client_id: ClientId, frame: Bytes);
}
