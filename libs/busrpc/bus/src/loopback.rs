use std::sync::Arc;

use bytes::Bytes;
use busrpc_types::ClientId;

use crate::bus::{BusObserver, MessageBus};
use crate::user_address::UserAddress;

struct Endpoint {
    observer: Arc<dyn BusObserver>,
    client_id: ClientId,
}

/// An in-memory [`MessageBus`] that hands a sent frame straight to the
/// registered observer at the destination address. Not a transport — a
/// test double for wiring a client engine and a server engine together
/// without a real bus, the way `tower-test`'s mock service stands in for
/// a real `Service` in its own crate's tests.
#[derive(Default)]
pub struct LoopbackBus {
    endpoints: scc::HashMap<UserAddress, Endpoint>,
}

impl LoopbackBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` to receive frames sent to `address`, and
    /// immediately runs the login handshake (`on_check_user`/`on_login`)
    /// the way a real bus would on session establishment.
    pub fn login(&self, address: UserAddress, client_id: ClientId, observer: Arc<dyn BusObserver>) {
        if observer.on_check_user(address) {
            let _ = self.endpoints.insert(address, Endpoint { observer: observer.clone(), client_id });
            observer.on_login(client_id, address);
        }
    }

    pub fn logoff(&self, address: UserAddress) {
        if let Some((_, endpoint)) = self.endpoints.remove(&address) {
            endpoint.observer.on_logoff(endpoint.client_id);
        }
    }
}

impl MessageBus for LoopbackBus {
    fn send(&self, dst: UserAddress, frame: Bytes) -> bool {
        let Some(endpoint) = self.endpoints.read(&dst, |_, endpoint| (endpoint.observer.clone(), endpoint.client_id)) else {
            return false;
        };
        let (observer, client_id) = endpoint;
        observer.on_recv(client_id, frame);
        true
    }

    fn kickout(&self, dst: UserAddress) {
        self.logoff(dst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct RecordingObserver {
        received: Mutex<Vec<Bytes>>,
    }

    impl BusObserver for RecordingObserver {
        fn on_check_user(&self, _address: UserAddress) -> bool {
            true
        }

        fn on_login(&self, _client_id: ClientId, _address: UserAddress) {}

        fn on_logoff(&self, _client_id: ClientId) {}

        fn on_recv(&self, _client_id: ClientId, frame: Bytes) {
            self.received.lock().unwrap().push(frame);
        }
    }

    #[test]
    fn delivers_sent_frames_to_the_registered_observer() {
        let bus = LoopbackBus::new();
        let observer = Arc::new(RecordingObserver { received: Mutex::new(Vec::new()) });
        let address = UserAddress::new(2, 1);
        bus.login(address, ClientId(7), observer.clone());

        assert!(bus.send(address, Bytes::from_static(b"hello")));
        assert_eq!(observer.received.lock().unwrap().as_slice(), [Bytes::from_static(b"hello")]);
    }

    #[test]
    fn send_to_unknown_address_fails() {
        let bus = LoopbackBus::new();
        assert!(!bus.send(UserAddress::new(2, 1), Bytes::from_static(b"x")));
    }
}
