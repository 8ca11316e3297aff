use derive_more::Display;

/// Correlates a request with its eventual result. Allocated by the codec,
/// monotone and non-zero on the wire (see [`crate::WIRE_SIGNATURE`]).
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId(pub u64);

/// Names a registered function. Non-zero by construction of the registry.
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionId(pub u32);

/// Identifies a logged-in client session to the server engine. Zero on
/// client-built outbound request packets; set by the server on inbound
/// packets and on synthesized results.
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl FunctionId {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}
