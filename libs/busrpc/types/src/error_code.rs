/// The `rpc_code` carried in every packet header. Zero is success;
/// negative values name an error class. Mirrors the closed set a peer is
/// allowed to put on the wire — an unrecognized negative value is still
/// accepted (`Other`) since the header format does not validate it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    Ok,
    Error,
    NotEnoughMemory,
    MismatchedParameter,
    InvalidArgument,
    InvalidFunction,
    ClientBusy,
    ServerBusy,
    NetworkNotConnected,
    NetworkBroken,
    NetworkTimeout,
    NetworkBusy,
    Other(i32),
}

impl Default for ErrorCode {
    fn default() -> Self {
        Self::Ok
    }
}

impl ErrorCode {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Error => -1,
            Self::NotEnoughMemory => -2,
            Self::MismatchedParameter => -1001,
            Self::InvalidArgument => -1002,
            Self::InvalidFunction => -1003,
            Self::ClientBusy => -1088,
            Self::ServerBusy => -1099,
            Self::NetworkNotConnected => -2001,
            Self::NetworkBroken => -2054,
            Self::NetworkTimeout => -2060,
            Self::NetworkBusy => -2099,
            Self::Other(code) => code,
        }
    }

    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            -1 => Self::Error,
            -2 => Self::NotEnoughMemory,
            -1001 => Self::MismatchedParameter,
            -1002 => Self::InvalidArgument,
            -1003 => Self::InvalidFunction,
            -1088 => Self::ClientBusy,
            -1099 => Self::ServerBusy,
            -2001 => Self::NetworkNotConnected,
            -2054 => Self::NetworkBroken,
            -2060 => Self::NetworkTimeout,
            -2099 => Self::NetworkBusy,
            other => Self::Other(other),
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}
