use bytes::Bytes;
use busrpc_types::ClientId;

use crate::user_address::UserAddress;

/// The capability set the core consumes from the underlying message bus:
/// unicast/multicast send and forced disconnect. Implemented by whatever
/// transport hosts the RPC layer; the core never reaches into the bus
/// beyond this trait.
pub trait MessageBus: Send + Sync + 'static {
    /// Sends `frame` to `dst`. Returns `false` if the bus refuses the send
    /// (e.g. its own outbound queue is full) — the engine surfaces that as
    /// `NetworkBusy`.
    fn send(&self, dst: UserAddress, frame: Bytes) -> bool;

    /// Sends `frame` to every address in `dsts`. The default
    /// implementation fans out to [`MessageBus::send`]; a transport with a
    /// native multicast primitive can override it.
    fn send_multicast(&self, dsts: &[UserAddress], frame: Bytes) -> bool {
        dsts.iter().all(|&dst| self.send(dst, frame.clone()))
    }

    /// Forces the bus to drop the session behind `dst`.
    fn kickout(&self, dst: UserAddress);

    /// Asks the bus to reestablish its own session (e.g. after an
    /// unexpected disconnect). A no-op default for buses that manage their
    /// own reconnection without the RPC layer's involvement.
    fn reconnect(&self) {}
}

/// The observer surface the bus drives the core with. Implemented by the
/// client/server engines, not by the application — login/logoff/recv/
/// check-user are bus-level lifecycle events, distinct from the
/// application-facing request/result callbacks the engines expose on top.
pub trait BusObserver: Send + Sync + 'static {
    /// A session has logged in under `address`, assigned `client_id` by
    /// the bus. Return `true` to accept it; `false` to have the bus
    /// refuse/close it immediately (the server engine uses this to filter
    /// to the RPC user-class, per [`UserAddress::is_rpc_client`]).
    fn on_check_user(&self, address: UserAddress) -> bool;

    fn on_login(&self, client_id: ClientId, address: UserAddress);

    fn on_logoff(&self, client_id: ClientId);

    /// A raw inbound frame from `client_id`. The core's own engines parse
    /// this as an RPC packet first; only a genuine parse failure is routed
    /// on to the application's peer-message path unchanged. A frame that
    /// parses but names an unregistered function, or whose argument tags
    /// don't match the registered signature, is silently dropped instead —
    /// it was RPC traffic, just not valid RPC traffic, so it isn't a plain
    /// message either.
    fn on_recv(&self, client_id: ClientId, frame: Bytes);
}
