use std::sync::Arc;

use busrpc_types::{Argument, ClientId, DataType, ErrorCode, FunctionId, RequestId};
use bytes::{Buf as _, Bytes, BytesMut};

use crate::codec::{decode_argument, encode_argument, wire_len};
use crate::error::{DecodeError, EncodeError};
use crate::header::{Header, HEADER_LEN};
use crate::request_id::next_request_id;

/// A built or parsed packet. Immutable once constructed and cheap to
/// share: both the application and the owning engine hold an `Arc` to the
/// same buffer and decoded argument list.
#[derive(Debug, Clone)]
pub struct Packet(Arc<PacketInner>);

#[derive(Debug)]
struct PacketInner {
    header: Header,
    arguments: Vec<Argument>,
    buffer: Bytes,
    magic1: u64,
    magic2: u64,
    magic_str: String,
    client_id: ClientId,
}

impl Packet {
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.0.header
    }

    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.0.arguments
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.0.header.request_id
    }

    #[must_use]
    pub fn function_id(&self) -> FunctionId {
        self.0.header.function_id
    }

    #[must_use]
    pub fn rpc_code(&self) -> ErrorCode {
        self.0.header.rpc_code
    }

    /// The serialized frame body, ready to hand to the bus.
    #[must_use]
    pub fn wire_bytes(&self) -> &Bytes {
        &self.0.buffer
    }

    #[must_use]
    pub fn magic1(&self) -> u64 {
        self.0.magic1
    }

    #[must_use]
    pub fn magic2(&self) -> u64 {
        self.0.magic2
    }

    #[must_use]
    pub fn magic_str(&self) -> &str {
        &self.0.magic_str
    }

    #[must_use]
    pub fn client_id(&self) -> ClientId {
        self.0.client_id
    }

    #[must_use]
    pub fn data_types(&self) -> Vec<DataType> {
        self.0.arguments.iter().map(Argument::data_type).collect()
    }

    /// Parses a frame received from the bus. `convert_byte_order` should be
    /// `true` for packets built from untrusted inbound bytes, matching the
    /// engines' own convention of rebuilding inbound packets convertibly.
    pub fn parse(mut buf: Bytes, convert_byte_order: bool) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::Truncated);
        }
        let whole = buf.clone();
        let header = Header::read(&mut buf)?;

        let mut arguments = Vec::new();
        let mut offset = HEADER_LEN;
        while buf.has_remaining() {
            let arg = decode_argument(&mut buf, offset, convert_byte_order)?;
            offset += wire_len(&arg);
            arguments.push(arg);
        }

        Ok(Self(Arc::new(PacketInner {
            header,
            arguments,
            buffer: whole,
            magic1: 0,
            magic2: 0,
            magic_str: String::new(),
            client_id: ClientId::default(),
        })))
    }
}

/// Builds a single packet. Not reusable across `end()` calls — construct a
/// fresh builder per packet, matching `begin()`/`push()`/`end()` from the
/// wire format's own build sequence.
#[derive(Debug, Default)]
pub struct PacketBuilder {
    arguments: Vec<Argument>,
    magic1: u64,
    magic2: u64,
    magic_str: String,
    client_id: ClientId,
    convert_byte_order: bool,
}

impl PacketBuilder {
    #[must_use]
    pub fn begin() -> Self {
        Self { convert_byte_order: true, ..Self::default() }
    }

    #[must_use]
    pub fn convert_byte_order(mut self, convert: bool) -> Self {
        self.convert_byte_order = convert;
        self
    }

    #[must_use]
    pub fn magic(mut self, magic1: u64, magic2: u64) -> Self {
        self.magic1 = magic1;
        self.magic2 = magic2;
        self
    }

    #[must_use]
    pub fn magic_str(mut self, magic_str: impl Into<String>) -> Self {
        self.magic_str = magic_str.into();
        self
    }

    #[must_use]
    pub fn client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn push(&mut self, arg: Argument) -> Result<(), EncodeError> {
        self.arguments.push(arg);
        Ok(())
    }

    pub fn push_many(&mut self, args: impl IntoIterator<Item = Argument>) -> Result<(), EncodeError> {
        for arg in args {
            self.push(arg)?;
        }
        Ok(())
    }

    /// Finalizes the packet, allocating a request-id automatically.
    pub fn end(
        self,
        function_id: FunctionId,
        rpc_code: ErrorCode,
        no_reply: bool,
        timeout_s: u32,
    ) -> Result<Packet, EncodeError> {
        self.end_with_request_id(next_request_id(), function_id, rpc_code, no_reply, timeout_s)
    }

    /// Finalizes the packet with an explicit request-id, used when
    /// rebuilding a result packet that must echo the request's id.
    pub fn end_with_request_id(
        self,
        request_id: RequestId,
        function_id: FunctionId,
        rpc_code: ErrorCode,
        no_reply: bool,
        timeout_s: u32,
    ) -> Result<Packet, EncodeError> {
        let header = Header { request_id, function_id, rpc_code, no_reply, timeout_s };

        let body_len: usize = self.arguments.iter().map(wire_len).sum();
        let mut buf = BytesMut::with_capacity(HEADER_LEN + body_len);
        header.write(&mut buf);
        for arg in &self.arguments {
            encode_argument(&mut buf, arg, self.convert_byte_order);
        }

        Ok(Packet(Arc::new(PacketInner {
            header,
            arguments: self.arguments,
            buffer: buf.freeze(),
            magic1: self.magic1,
            magic2: self.magic2,
            magic_str: self.magic_str,
            client_id: self.client_id,
        })))
    }
}
