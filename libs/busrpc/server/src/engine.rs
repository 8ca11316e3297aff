use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use busrpc_bus::{BusObserver, MessageBus, ServerConfig, UserAddress};
use busrpc_registry::Registry;
use busrpc_types::{ClientId, DataType, ErrorCode, FunctionId};
use busrpc_wire::{Packet, PacketBuilder};
use bytes::Bytes;
use error_stack::Report;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::{debug, trace, warn};

use crate::error::ServerError;
use crate::observer::ServerObserver;

/// One admitted call sitting in a client's worker queue, timestamped at
/// arrival so the worker can discard it without a reply if it has already
/// timed out by the time its turn comes up.
struct QueuedRequest {
    packet: Packet,
    arrival: Instant,
    timeout_s: u32,
}

/// A logged-in client's bookkeeping: its reply address and its own FIFO of
/// admitted, not-yet-dispatched work. `busy` is set while a ready token for
/// this client is outstanding in the pool's shared queue, so at most one
/// worker is ever draining a given client's queue at a time.
struct ClientSlot {
    queue: VecDeque<QueuedRequest>,
    address: UserAddress,
    busy: bool,
}

/// The server-side dispatch engine: a fixed-size pool of `rpcs_worker_count`
/// workers multiplexes across every connected client's own FIFO, so total
/// task count stays bounded independent of how many clients are logged in
/// while each client's calls still dispatch in arrival order. Bounded
/// pending-work admission replies `SERVER_BUSY`, arrival-timestamp discard
/// drops work that ages past its `timeout_s` before a worker gets to it, and
/// signature validation runs against the registered function table.
/// Bookkeeping (the client table) lives behind one [`Mutex`]; `pending_count`
/// is a separate atomic since pool workers must update it without taking
/// that lock.
pub struct ServerEngine {
    registry: Registry,
    bus: Arc<dyn MessageBus>,
    observer: Arc<dyn ServerObserver>,
    config: ServerConfig,
    pending_count: Arc<AtomicUsize>,
    clients: Arc<Mutex<HashMap<ClientId, ClientSlot>>>,
    ready: mpsc::UnboundedSender<ClientId>,
}

/// Runs on one of the pool's fixed worker tasks: waits for a client to have
/// ready work, drains exactly one item from that client's queue, and
/// re-enqueues a ready token for it if more work remains — so a busy client
/// keeps getting serviced without monopolizing a worker indefinitely.
async fn run_worker(
    ready_rx: Arc<AsyncMutex<mpsc::UnboundedReceiver<ClientId>>>,
    clients: Arc<Mutex<HashMap<ClientId, ClientSlot>>>,
    observer: Arc<dyn ServerObserver>,
    pending_count: Arc<AtomicUsize>,
    ready_tx: mpsc::UnboundedSender<ClientId>,
) {
    loop {
        let client_id = {
            let mut rx = ready_rx.lock().await;
            match rx.recv().await {
                Some(client_id) => client_id,
                None => return,
            }
        };

        let popped = {
            let mut clients = clients.lock().expect("server engine mutex poisoned");
            let Some(slot) = clients.get_mut(&client_id) else {
                continue;
            };
            let item = slot.queue.pop_front();
            if item.is_none() {
                slot.busy = false;
            } else if slot.queue.is_empty() {
                slot.busy = false;
            }
            item.map(|item| (item, !slot.queue.is_empty()))
        };
        let Some((item, more_pending)) = popped else {
            continue;
        };
        if more_pending {
            let _ = ready_tx.send(client_id);
        }
        pending_count.fetch_sub(1, Ordering::SeqCst);

        let age = item.arrival.elapsed();
        if age >= Duration::from_secs(u64::from(item.timeout_s)) {
            debug!(request_id = %item.packet.request_id(), "discarding request that expired before execution");
            continue;
        }
        observer.on_request(item.packet);
    }
}

impl ServerEngine {
    #[must_use]
    pub fn new(bus: Arc<dyn MessageBus>, config: ServerConfig, observer: Arc<dyn ServerObserver>) -> Self {
        let (ready_tx, ready_rx) = mpsc::unbounded_channel::<ClientId>();
        let ready_rx = Arc::new(AsyncMutex::new(ready_rx));
        let clients: Arc<Mutex<HashMap<ClientId, ClientSlot>>> = Arc::new(Mutex::new(HashMap::new()));
        let pending_count = Arc::new(AtomicUsize::new(0));

        for _ in 0..config.rpcs_worker_count {
            tokio::spawn(run_worker(ready_rx.clone(), clients.clone(), observer.clone(), pending_count.clone(), ready_tx.clone()));
        }

        Self { registry: Registry::new(), bus, observer, config, pending_count, clients, ready: ready_tx }
    }

    pub fn register(&self, function_id: FunctionId, call_types: Vec<DataType>, return_types: Vec<DataType>) -> error_stack::Result<(), ServerError> {
        if !function_id.is_valid() {
            return Err(Report::new(ServerError::InvalidFunction(function_id)).attach_printable("function_id must be non-zero"));
        }
        self.registry.register(function_id, call_types, return_types);
        Ok(())
    }

    pub fn unregister(&self, function_id: FunctionId) {
        self.registry.unregister(function_id);
    }

    fn address_of(&self, client_id: ClientId) -> Option<UserAddress> {
        self.clients.lock().expect("server engine mutex poisoned").get(&client_id).map(|slot| slot.address)
    }

    /// Sends a computed result back to the client that issued `request_id`.
    /// Validates the return-argument tags against the registered signature
    /// when `packet.rpc_code()` is `Ok` — an error result carries no
    /// arguments to validate.
    pub fn send_result(&self, client_id: ClientId, packet: Packet) -> error_stack::Result<(), ServerError> {
        let signature = self
            .registry
            .lookup(packet.function_id())
            .ok_or_else(|| Report::new(ServerError::InvalidFunction(packet.function_id())))?;

        if packet.rpc_code().is_ok() {
            let tags = packet.data_types();
            if tags != signature.return_types {
                return Err(Report::new(ServerError::MismatchedParameter));
            }
        }

        let address = self
            .address_of(client_id)
            .ok_or_else(|| Report::new(ServerError::NotConnected(client_id)))?;
        if !self.bus.send(address, packet.wire_bytes().clone()) {
            return Err(Report::new(ServerError::NetworkBusy));
        }
        Ok(())
    }

    #[must_use]
    pub fn send_message_to_clients(&self, addresses: &[UserAddress], frame: Bytes) -> bool {
        self.bus.send_multicast(addresses, frame)
    }

    pub fn kickout_client(&self, client_id: ClientId) {
        if let Some(address) = self.address_of(client_id) {
            self.bus.kickout(address);
        }
    }

    fn reply_with_code(&self, client_id: ClientId, address: UserAddress, request_id: busrpc_types::RequestId, function_id: FunctionId, rpc_code: ErrorCode) {
        let result = PacketBuilder::begin()
            .convert_byte_order(true)
            .client_id(client_id)
            .end_with_request_id(request_id, function_id, rpc_code, false, 0);
        match result {
            Ok(packet) => {
                if !self.bus.send(address, packet.wire_bytes().clone()) {
                    warn!(%client_id, %request_id, "bus refused synthetic reply");
                }
            }
            Err(error) => warn!(?error, "failed to build synthetic reply packet"),
        }
    }
}

impl BusObserver for ServerEngine {
    fn on_check_user(&self, address: UserAddress) -> bool {
        address.is_rpc_client()
    }

    fn on_login(&self, client_id: ClientId, address: UserAddress) {
        self.clients
            .lock()
            .expect("server engine mutex poisoned")
            .insert(client_id, ClientSlot { queue: VecDeque::new(), address, busy: false });

        debug!(%client_id, "client logged in");
        self.observer.on_client_login(client_id, address);
    }

    fn on_logoff(&self, client_id: ClientId) {
        let discarded = self
            .clients
            .lock()
            .expect("server engine mutex poisoned")
            .remove(&client_id)
            .map_or(0, |slot| slot.queue.len());
        if discarded > 0 {
            self.pending_count.fetch_sub(discarded, Ordering::SeqCst);
        }
        debug!(%client_id, discarded, "client logged off, queued work discarded");
        self.observer.on_client_logoff(client_id);
    }

    fn on_recv(&self, client_id: ClientId, frame: Bytes) {
        let packet = match Packet::parse(frame.clone(), true) {
            Ok(packet) => packet,
            Err(error) => {
                trace!(%client_id, ?error, "inbound frame did not parse as an RPC request");
                self.observer.on_peer_message(client_id, frame);
                return;
            }
        };

        let Some(signature) = self.registry.lookup(packet.function_id()) else {
            trace!(%client_id, function_id = %packet.function_id(), "request for unregistered function, dropping");
            return;
        };
        let tags = packet.data_types();
        if tags != signature.call_types {
            debug!(%client_id, function_id = %packet.function_id(), "request argument tags do not match the registered signature, dropping");
            return;
        }

        if self.pending_count.load(Ordering::SeqCst) >= self.config.rpcs_pending_calls as usize {
            if !packet.header().no_reply {
                if let Some(address) = self.address_of(client_id) {
                    self.reply_with_code(client_id, address, packet.request_id(), packet.function_id(), ErrorCode::ServerBusy);
                }
            }
            return;
        }

        let mut builder = PacketBuilder::begin().convert_byte_order(true).client_id(client_id);
        if let Err(error) = builder.push_many(packet.arguments().iter().cloned()) {
            warn!(?error, "failed to rebuild inbound request packet");
            return;
        }
        let rebuilt = match builder.end_with_request_id(packet.request_id(), packet.function_id(), ErrorCode::Ok, packet.header().no_reply, packet.header().timeout_s) {
            Ok(rebuilt) => rebuilt,
            Err(error) => {
                warn!(?error, "failed to rebuild inbound request packet");
                return;
            }
        };

        let queued = QueuedRequest { packet: rebuilt, arrival: Instant::now(), timeout_s: packet.header().timeout_s };
        let needs_token = {
            let mut clients = self.clients.lock().expect("server engine mutex poisoned");
            let Some(slot) = clients.get_mut(&client_id) else {
                trace!(%client_id, "request from a client with no active session, dropping");
                return;
            };
            slot.queue.push_back(queued);
            let needs_token = !slot.busy;
            slot.busy = true;
            needs_token
        };

        self.pending_count.fetch_add(1, Ordering::SeqCst);
        if needs_token {
            let _ = self.ready.send(client_id);
        }
    }
}
