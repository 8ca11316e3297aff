use busrpc_types::{ErrorCode, FunctionId, RequestId};
use bytes::{Buf, BufMut};

use crate::error::DecodeError;

/// Fixed-size prefix of every packet on the wire: signature, then five
/// network-order fields. 32 bytes total.
pub const HEADER_LEN: usize = 8 + 8 + 4 + 4 + 1 + 3 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub request_id: RequestId,
    pub function_id: FunctionId,
    pub rpc_code: ErrorCode,
    pub no_reply: bool,
    pub timeout_s: u32,
}

impl Header {
    pub(crate) fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&busrpc_types::WIRE_SIGNATURE);
        buf.put_u64(self.request_id.0);
        buf.put_u32(self.function_id.0);
        buf.put_i32(self.rpc_code.code());
        buf.put_u8(u8::from(self.no_reply));
        buf.put_slice(&[0, 0, 0]);
        buf.put_u32(self.timeout_s);
    }

    pub(crate) fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        if buf.remaining() < HEADER_LEN {
            return Err(DecodeError::Truncated);
        }

        let mut signature = [0_u8; 8];
        buf.copy_to_slice(&mut signature);
        if signature != busrpc_types::WIRE_SIGNATURE {
            return Err(DecodeError::BadSignature);
        }

        let request_id = buf.get_u64();
        if request_id == 0 {
            return Err(DecodeError::ZeroRequestId);
        }
        let function_id = buf.get_u32();
        if function_id == 0 {
            return Err(DecodeError::ZeroFunctionId);
        }
        let rpc_code = buf.get_i32();
        let no_reply = buf.get_u8() != 0;
        buf.advance(3);
        let timeout_s = buf.get_u32();

        Ok(Self {
            request_id: RequestId(request_id),
            function_id: FunctionId(function_id),
            rpc_code: ErrorCode::from(rpc_code),
            no_reply,
            timeout_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut as _, BytesMut};

    use super::{Header, HEADER_LEN};
    use busrpc_types::{ErrorCode, FunctionId, RequestId};

    #[test]
    fn round_trips_through_wire_bytes() {
        let header = Header {
            request_id: RequestId(7),
            function_id: FunctionId(2),
            rpc_code: ErrorCode::Ok,
            no_reply: false,
            timeout_s: 10,
        };
        let mut buf = BytesMut::new();
        header.write(&mut buf);
        assert_eq!(buf.len(), HEADER_LEN);

        let mut cursor = buf.freeze();
        let parsed = Header::read(&mut cursor).expect("valid header");
        assert_eq!(parsed, header);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut buf = BytesMut::new();
        buf.put_bytes(0, HEADER_LEN);
        let mut cursor = buf.freeze();
        assert!(Header::read(&mut cursor).is_err());
    }
}
