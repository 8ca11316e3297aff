use bytes::Bytes;
use busrpc_wire::Packet;

/// Application-facing callbacks the client engine invokes after releasing
/// its own lock. Never invoked twice for the same request: a real reply,
/// a timeout, and a broken-connection synthetic are mutually exclusive.
pub trait ClientObserver: Send + Sync + 'static {
    /// Delivers exactly one result per request that was sent without
    /// `no_reply`: a real reply, or a synthesized timeout/broken-connection
    /// packet carrying the same `magic1`/`magic2`.
    fn on_rpc_result(&self, result: Packet);

    /// An inbound frame from the server that did not parse as (or match
    /// the registered signature of) an RPC result.
    fn on_peer_message(&self, frame: Bytes);
}
