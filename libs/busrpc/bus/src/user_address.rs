/// A bus-level user address: the `(class, instance)` pair the underlying
/// message bus uses to route frames. The RPC layer only cares whether an
/// address belongs to an RPC client or an upstream relay; everything else
/// about addressing is the bus's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserAddress {
    pub class: u8,
    pub instance: u8,
}

const RPC_CLIENT_CLASS: u8 = 2;
const RPC_CLIENT_INSTANCE: u8 = 1;
const UPSTREAM_RELAY_CLASS_A: u8 = 1;
const UPSTREAM_RELAY_CLASS_B: u8 = 255;

impl UserAddress {
    #[must_use]
    pub const fn new(class: u8, instance: u8) -> Self {
        Self { class, instance }
    }

    #[must_use]
    pub const fn is_rpc_client(self) -> bool {
        self.class == RPC_CLIENT_CLASS && self.instance == RPC_CLIENT_INSTANCE
    }

    #[must_use]
    pub const fn is_upstream_relay(self) -> bool {
        self.class == UPSTREAM_RELAY_CLASS_A || self.class == UPSTREAM_RELAY_CLASS_B
    }
}

#[cfg(test)]
mod tests {
    use super::UserAddress;

    #[test]
    fn classifies_rpc_clients_and_relays() {
        assert!(UserAddress::new(2, 1).is_rpc_client());
        assert!(!UserAddress::new(2, 2).is_rpc_client());
        assert!(UserAddress::new(1, 0).is_upstream_relay());
        assert!(UserAddress::new(255, 0).is_upstream_relay());
        assert!(!UserAddress::new(3, 0).is_upstream_relay());
    }
}
