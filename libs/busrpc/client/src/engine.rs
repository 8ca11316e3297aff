use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use busrpc_bus::{BusObserver, MessageBus, TimerId, TimerObserver, TimerSource, UserAddress};
use busrpc_registry::Registry;
use busrpc_types::{Argument, ClientId, DataType, ErrorCode, FunctionId, RequestId};
use busrpc_wire::{Packet, PacketBuilder};
use bytes::Bytes;
use error_stack::{Report, ResultExt};
use tracing::{debug, trace, warn};

use crate::error::ClientError;
use crate::observer::ClientObserver;
use crate::pending::PendingCall;

#[derive(Default)]
struct State {
    client_id: Option<ClientId>,
    pending_by_request: HashMap<RequestId, PendingCall>,
    pending_by_timer: HashMap<TimerId, RequestId>,
}

/// The client-side request tracker: issues requests, tracks outstanding
/// calls by request-id and by timer-id, and synthesizes timeout/broken
/// results. All mutable bookkeeping lives behind one [`Mutex`], matching
/// the single-lock-per-engine concurrency model; the lock is never held
/// while invoking [`ClientObserver`] callbacks.
pub struct ClientEngine {
    registry: Registry,
    bus: Arc<dyn MessageBus>,
    timer_source: Arc<dyn TimerSource>,
    observer: Arc<dyn ClientObserver>,
    server_address: UserAddress,
    config: busrpc_bus::ClientConfig,
    state: Mutex<State>,
    weak_self: Weak<ClientEngine>,
}

impl ClientEngine {
    #[must_use]
    pub fn new(
        bus: Arc<dyn MessageBus>,
        timer_source: Arc<dyn TimerSource>,
        server_address: UserAddress,
        config: busrpc_bus::ClientConfig,
        observer: Arc<dyn ClientObserver>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            registry: Registry::new(),
            bus,
            timer_source,
            observer,
            server_address,
            config,
            state: Mutex::new(State::default()),
            weak_self: weak_self.clone(),
        })
    }

    fn self_arc(&self) -> Arc<Self> {
        self.weak_self.upgrade().expect("engine dropped while still issuing calls")
    }

    pub fn register(&self, function_id: FunctionId, call_types: Vec<DataType>, return_types: Vec<DataType>) -> error_stack::Result<(), ClientError> {
        if !function_id.is_valid() {
            return Err(Report::new(ClientError::InvalidArgument).attach_printable("function_id must be non-zero"));
        }
        self.registry.register(function_id, call_types, return_types);
        Ok(())
    }

    pub fn unregister(&self, function_id: FunctionId) {
        self.registry.unregister(function_id);
    }

    pub fn reconnect(&self) {
        self.bus.reconnect();
    }

    /// Sends a request. Returns `Ok(None)` for `no_reply` sends (no pending
    /// state is created); otherwise `Ok(Some(request_id))` once the send
    /// has been accepted by the bus and a timer has been armed.
    #[expect(clippy::too_many_arguments, reason = "mirrors the wire header fields a caller must supply")]
    pub fn send(
        &self,
        function_id: FunctionId,
        args: Vec<Argument>,
        no_reply: bool,
        timeout_s: u32,
        magic1: u64,
        magic2: u64,
        magic_str: impl Into<String>,
    ) -> error_stack::Result<Option<RequestId>, ClientError> {
        let signature = self
            .registry
            .lookup(function_id)
            .ok_or_else(|| Report::new(ClientError::InvalidFunction(function_id)))?;

        let tags: Vec<DataType> = args.iter().map(Argument::data_type).collect();
        if tags != signature.call_types {
            return Err(Report::new(ClientError::MismatchedParameter));
        }

        let effective_timeout = if timeout_s == 0 { self.config.rpcc_rpc_timeout } else { timeout_s };
        let request_id = busrpc_wire::next_request_id();

        let mut builder = PacketBuilder::begin()
            .convert_byte_order(true)
            .magic(magic1, magic2)
            .magic_str(magic_str);
        builder.push_many(args).change_context(ClientError::InvalidArgument)?;
        let packet = builder
            .end_with_request_id(request_id, function_id, ErrorCode::Ok, no_reply, effective_timeout)
            .change_context(ClientError::InvalidArgument)?;

        let mut state = self.state.lock().expect("client engine mutex poisoned");

        if state.client_id.is_none() {
            return Err(Report::new(ClientError::NotConnected));
        }
        if !no_reply && state.pending_by_request.len() >= self.config.rpcc_pending_calls as usize {
            return Err(Report::new(ClientError::ClientBusy));
        }

        if !self.bus.send(self.server_address, packet.wire_bytes().clone()) {
            return Err(Report::new(ClientError::NetworkBusy));
        }

        if no_reply {
            trace!(%request_id, %function_id, "sent no_reply request");
            return Ok(None);
        }

        let timer_id = self
            .timer_source
            .schedule_timer(Duration::from_secs(u64::from(effective_timeout)), self.self_arc());
        state.pending_by_request.insert(
            request_id,
            PendingCall { request_id, function_id, magic1, magic2, magic_str: packet.magic_str().to_owned(), timer_id },
        );
        state.pending_by_timer.insert(timer_id, request_id);
        drop(state);

        debug!(%request_id, %function_id, effective_timeout, "sent request, awaiting reply");
        Ok(Some(request_id))
    }

    fn deliver_synthetic(&self, pending: PendingCall, rpc_code: ErrorCode) {
        let result = PacketBuilder::begin()
            .convert_byte_order(true)
            .magic(pending.magic1, pending.magic2)
            .magic_str(pending.magic_str)
            .end_with_request_id(pending.request_id, pending.function_id, rpc_code, false, 0);
        match result {
            Ok(packet) => self.observer.on_rpc_result(packet),
            Err(error) => warn!(?error, "failed to build synthetic result packet"),
        }
    }
}

impl TimerObserver for ClientEngine {
    fn on_timer(&self, timer_id: TimerId) {
        let pending = {
            let mut state = self.state.lock().expect("client engine mutex poisoned");
            let Some(request_id) = state.pending_by_timer.remove(&timer_id) else {
                return;
            };
            state.pending_by_request.remove(&request_id)
        };
        let Some(pending) = pending else {
            return;
        };
        debug!(request_id = %pending.request_id, "request timed out");
        self.deliver_synthetic(pending, ErrorCode::NetworkTimeout);
    }
}

impl BusObserver for ClientEngine {
    fn on_check_user(&self, _address: UserAddress) -> bool {
        true
    }

    fn on_login(&self, client_id: ClientId, _address: UserAddress) {
        self.state.lock().expect("client engine mutex poisoned").client_id = Some(client_id);
    }

    fn on_logoff(&self, _client_id: ClientId) {
        let drained: Vec<PendingCall> = {
            let mut state = self.state.lock().expect("client engine mutex poisoned");
            state.client_id = None;
            state.pending_by_timer.clear();
            state.pending_by_request.drain().map(|(_, pending)| pending).collect()
        };
        for pending in drained {
            self.timer_source.cancel_timer(pending.timer_id);
            self.deliver_synthetic(pending, ErrorCode::NetworkBroken);
        }
    }

    fn on_recv(&self, _client_id: ClientId, frame: Bytes) {
        let Ok(packet) = Packet::parse(frame.clone(), true) else {
            self.observer.on_peer_message(frame);
            return;
        };

        let request_id = packet.request_id();
        let snapshot = {
            let state = self.state.lock().expect("client engine mutex poisoned");
            state.pending_by_request.get(&request_id).cloned()
        };
        let Some(pending) = snapshot else {
            trace!(%request_id, "reply for unknown or already-resolved request, dropping");
            return;
        };

        let tags = packet.data_types();
        if !self.registry.matches_return(pending.function_id, &tags) {
            debug!(%request_id, "result argument tags do not match the registered signature, dropping");
            return;
        }

        let removed = {
            let mut state = self.state.lock().expect("client engine mutex poisoned");
            let Some(removed) = state.pending_by_request.remove(&request_id) else {
                return;
            };
            state.pending_by_timer.remove(&removed.timer_id);
            removed
        };
        self.timer_source.cancel_timer(removed.timer_id);

        let mut builder = PacketBuilder::begin()
            .convert_byte_order(true)
            .magic(removed.magic1, removed.magic2)
            .magic_str(removed.magic_str);
        if let Err(error) = builder.push_many(packet.arguments().iter().cloned()) {
            warn!(?error, "failed to rebuild result packet");
            return;
        }
        match builder.end_with_request_id(request_id, removed.function_id, packet.rpc_code(), false, 0) {
            Ok(result) => self.observer.on_rpc_result(result),
            Err(error) => warn!(?error, "failed to rebuild result packet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use busrpc_bus::TokioTimerSource;

    use super::*;

    #[derive(Default)]
    struct RecordingBus {
        sent: StdMutex<Vec<Bytes>>,
        refuse: std::sync::atomic::AtomicBool,
    }

    impl MessageBus for RecordingBus {
        fn send(&self, _dst: UserAddress, frame: Bytes) -> bool {
            if self.refuse.load(std::sync::atomic::Ordering::SeqCst) {
                return false;
            }
            self.sent.lock().unwrap().push(frame);
            true
        }

        fn kickout(&self, _dst: UserAddress) {}
    }

    #[derive(Default)]
    struct RecordingObserver {
        results: StdMutex<Vec<Packet>>,
    }

    impl ClientObserver for RecordingObserver {
        fn on_rpc_result(&self, result: Packet) {
            self.results.lock().unwrap().push(result);
        }

        fn on_peer_message(&self, _frame: Bytes) {}
    }

    fn make_engine(bus: Arc<RecordingBus>, observer: Arc<RecordingObserver>) -> Arc<ClientEngine> {
        let timer_source = Arc::new(TokioTimerSource::new());
        let engine = ClientEngine::new(bus, timer_source, UserAddress::new(1, 0), busrpc_bus::ClientConfig::default(), observer);
        engine.on_login(ClientId(0), UserAddress::new(1, 0));
        engine
    }

    #[tokio::test]
    async fn times_out_and_preserves_magic_values() {
        let bus = Arc::new(RecordingBus::default());
        let observer = Arc::new(RecordingObserver::default());
        let engine = make_engine(bus, observer.clone());
        engine.register(FunctionId(1), vec![DataType::Int64], vec![DataType::Bool8, DataType::Int64]).unwrap();

        let request_id = engine
            .send(FunctionId(1), vec![Argument::Int64 { value: 9, big_endian: false }], false, 1, 11, 22, "")
            .unwrap()
            .expect("non-no_reply send yields a request id");

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let results = observer.results.lock().unwrap();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.request_id(), request_id);
        assert_eq!(result.function_id(), FunctionId(1));
        assert_eq!(result.rpc_code(), ErrorCode::NetworkTimeout);
        assert_eq!(result.magic1(), 11);
        assert_eq!(result.magic2(), 22);
    }

    #[tokio::test]
    async fn mismatched_argument_shape_is_rejected_locally() {
        let bus = Arc::new(RecordingBus::default());
        let observer = Arc::new(RecordingObserver::default());
        let engine = make_engine(bus.clone(), observer);
        engine
            .register(FunctionId(1), vec![DataType::Int32, DataType::Int32, DataType::Int32Array, DataType::Int64], vec![])
            .unwrap();

        let result = engine.send(
            FunctionId(1),
            vec![Argument::Int32 { value: 1, big_endian: false }, Argument::Int32 { value: 2, big_endian: false }],
            false,
            10,
            0,
            0,
            "",
        );

        assert!(result.is_err());
        assert!(bus.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_cap_reports_client_busy() {
        let bus = Arc::new(RecordingBus::default());
        let observer = Arc::new(RecordingObserver::default());
        let timer_source = Arc::new(TokioTimerSource::new());
        let config = busrpc_bus::ClientConfig { rpcc_pending_calls: 1, rpcc_rpc_timeout: 10 };
        let engine = ClientEngine::new(bus, timer_source, UserAddress::new(1, 0), config, observer);
        engine.on_login(ClientId(0), UserAddress::new(1, 0));
        engine.register(FunctionId(1), vec![], vec![]).unwrap();

        engine.send(FunctionId(1), vec![], false, 10, 0, 0, "").unwrap();
        let second = engine.send(FunctionId(1), vec![], false, 10, 0, 0, "");
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn no_reply_send_creates_no_pending_state() {
        let bus = Arc::new(RecordingBus::default());
        let observer = Arc::new(RecordingObserver::default());
        let engine = make_engine(bus, observer.clone());
        engine.register(FunctionId(1), vec![], vec![]).unwrap();

        let request_id = engine.send(FunctionId(1), vec![], true, 10, 0, 0, "").unwrap();
        assert!(request_id.is_none());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(observer.results.lock().unwrap().is_empty());
    }
}
