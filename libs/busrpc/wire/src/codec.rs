use busrpc_types::{Argument, DataType};
use bytes::{Buf, BufMut, Bytes};

use crate::error::DecodeError;

const ARG_PREFIX_LEN: usize = 8;
const SCALAR_PAYLOAD_LEN: usize = 8;

#[must_use]
pub(crate) const fn local_is_big_endian() -> bool {
    cfg!(target_endian = "big")
}

const fn pad_to_4(len: usize) -> usize {
    (len + 3) & !3
}

fn needs_swap(declared_big_endian: bool, convert_byte_order: bool) -> bool {
    convert_byte_order && declared_big_endian != local_is_big_endian()
}

/// Size in bytes this argument will occupy on the wire, prefix included.
#[must_use]
pub(crate) fn wire_len(arg: &Argument) -> usize {
    ARG_PREFIX_LEN
        + if arg.data_type().is_array() {
            let raw = arg.count() as usize * arg.data_type().element_size();
            if arg.data_type().element_size() <= 2 { pad_to_4(raw) } else { raw }
        } else {
            SCALAR_PAYLOAD_LEN
        }
}

pub(crate) fn encode_argument(buf: &mut impl BufMut, arg: &Argument, convert_byte_order: bool) {
    buf.put_u8(u8::from(arg.big_endian()));
    buf.put_u8(arg.data_type().tag());
    buf.put_slice(&[0, 0]);

    if let Some(data) = arg.array_data() {
        let elem_size = arg.data_type().element_size();
        buf.put_u32(arg.count());
        let swap = needs_swap(arg.big_endian(), convert_byte_order);
        write_array_body(buf, data, elem_size, swap);
    } else {
        buf.put_u32(0);
        write_scalar_body(buf, arg, convert_byte_order);
    }
}

fn write_scalar_body(buf: &mut impl BufMut, arg: &Argument, convert_byte_order: bool) {
    let swap = needs_swap(arg.big_endian(), convert_byte_order);
    let mut scratch = [0_u8; SCALAR_PAYLOAD_LEN];
    match *arg {
        Argument::Bool8 { value, .. } => scratch[0] = u8::from(value),
        Argument::Int8 { value, .. } => scratch[0] = value.to_ne_bytes()[0],
        Argument::Uint8 { value, .. } => scratch[0] = value,
        Argument::Int16 { value, .. } => {
            let bytes = if swap { value.swap_bytes().to_ne_bytes() } else { value.to_ne_bytes() };
            scratch[..2].copy_from_slice(&bytes);
        }
        Argument::Uint16 { value, .. } => {
            let bytes = if swap { value.swap_bytes().to_ne_bytes() } else { value.to_ne_bytes() };
            scratch[..2].copy_from_slice(&bytes);
        }
        Argument::Int32 { value, .. } => {
            let bytes = if swap { value.swap_bytes().to_ne_bytes() } else { value.to_ne_bytes() };
            scratch[..4].copy_from_slice(&bytes);
        }
        Argument::Uint32 { value, .. } => {
            let bytes = if swap { value.swap_bytes().to_ne_bytes() } else { value.to_ne_bytes() };
            scratch[..4].copy_from_slice(&bytes);
        }
        Argument::Float32 { value, .. } => {
            let bits = if swap { value.to_bits().swap_bytes() } else { value.to_bits() };
            scratch[..4].copy_from_slice(&bits.to_ne_bytes());
        }
        Argument::Int64 { value, .. } => {
            let bytes = if swap { value.swap_bytes().to_ne_bytes() } else { value.to_ne_bytes() };
            scratch[..8].copy_from_slice(&bytes);
        }
        Argument::Uint64 { value, .. } => {
            let bytes = if swap { value.swap_bytes().to_ne_bytes() } else { value.to_ne_bytes() };
            scratch[..8].copy_from_slice(&bytes);
        }
        Argument::Float64 { value, .. } => {
            let bits = if swap { value.to_bits().swap_bytes() } else { value.to_bits() };
            scratch[..8].copy_from_slice(&bits.to_ne_bytes());
        }
        Argument::Bool8Array { .. }
        | Argument::Int8Array { .. }
        | Argument::Uint8Array { .. }
        | Argument::Int16Array { .. }
        | Argument::Uint16Array { .. }
        | Argument::Int32Array { .. }
        | Argument::Uint32Array { .. }
        | Argument::Int64Array { .. }
        | Argument::Uint64Array { .. }
        | Argument::Float32Array { .. }
        | Argument::Float64Array { .. } => unreachable!("array variants never reach the scalar writer"),
    }
    buf.put_slice(&scratch);
}

fn write_array_body(buf: &mut impl BufMut, data: &Bytes, elem_size: usize, swap: bool) {
    if swap && elem_size > 1 {
        for chunk in data.chunks(elem_size) {
            let mut element = chunk.to_vec();
            element.reverse();
            buf.put_slice(&element);
        }
    } else {
        buf.put_slice(data);
    }
    let written = data.len();
    let padded = pad_to_4(written);
    if padded > written {
        buf.put_bytes(0, padded - written);
    }
}

pub(crate) fn decode_argument(buf: &mut Bytes, offset: usize, convert_byte_order: bool) -> Result<Argument, DecodeError> {
    if buf.remaining() < ARG_PREFIX_LEN {
        return Err(DecodeError::TruncatedArgumentPrefix { offset });
    }
    let declared_big_endian = buf.get_u8() != 0;
    let tag = buf.get_u8();
    buf.advance(2);
    let count = buf.get_u32();

    let data_type = DataType::try_from_tag(tag).map_err(|_| DecodeError::UnknownTag(tag))?;
    let swap = needs_swap(declared_big_endian, convert_byte_order);

    if data_type.is_array() {
        let elem_size = data_type.element_size();
        let raw_len = count as usize * elem_size;
        let body_len = if elem_size <= 2 { pad_to_4(raw_len) } else { raw_len };
        if buf.remaining() < body_len {
            return Err(DecodeError::ArgumentOverrun { offset });
        }
        let mut body = buf.copy_to_bytes(body_len);
        body.truncate(raw_len);
        let data = if swap && elem_size > 1 {
            let mut swapped = Vec::with_capacity(raw_len);
            for chunk in body.chunks(elem_size) {
                swapped.extend(chunk.iter().rev());
            }
            Bytes::from(swapped)
        } else {
            body
        };
        Ok(build_array_argument(data_type, data, declared_big_endian))
    } else {
        if buf.remaining() < SCALAR_PAYLOAD_LEN {
            return Err(DecodeError::ArgumentOverrun { offset });
        }
        let mut scratch = [0_u8; SCALAR_PAYLOAD_LEN];
        buf.copy_to_slice(&mut scratch);
        Ok(build_scalar_argument(data_type, &scratch, swap, declared_big_endian))
    }
}

fn build_array_argument(data_type: DataType, data: Bytes, big_endian: bool) -> Argument {
    match data_type {
        DataType::Bool8Array => Argument::Bool8Array { data, big_endian },
        DataType::Int8Array => Argument::Int8Array { data, big_endian },
        DataType::Uint8Array => Argument::Uint8Array { data, big_endian },
        DataType::Int16Array => Argument::Int16Array { data, big_endian },
        DataType::Uint16Array => Argument::Uint16Array { data, big_endian },
        DataType::Int32Array => Argument::Int32Array { data, big_endian },
        DataType::Uint32Array => Argument::Uint32Array { data, big_endian },
        DataType::Int64Array => Argument::Int64Array { data, big_endian },
        DataType::Uint64Array => Argument::Uint64Array { data, big_endian },
        DataType::Float32Array => Argument::Float32Array { data, big_endian },
        DataType::Float64Array => Argument::Float64Array { data, big_endian },
        _ => unreachable!("caller only passes array tags"),
    }
}

fn build_scalar_argument(data_type: DataType, scratch: &[u8; SCALAR_PAYLOAD_LEN], swap: bool, big_endian: bool) -> Argument {
    match data_type {
        DataType::Bool8 => Argument::Bool8 { value: scratch[0] != 0, big_endian },
        DataType::Int8 => Argument::Int8 { value: scratch[0] as i8, big_endian },
        DataType::Uint8 => Argument::Uint8 { value: scratch[0], big_endian },
        DataType::Int16 => {
            let mut raw = [0_u8; 2];
            raw.copy_from_slice(&scratch[..2]);
            let value = i16::from_ne_bytes(raw);
            Argument::Int16 { value: if swap { value.swap_bytes() } else { value }, big_endian }
        }
        DataType::Uint16 => {
            let mut raw = [0_u8; 2];
            raw.copy_from_slice(&scratch[..2]);
            let value = u16::from_ne_bytes(raw);
            Argument::Uint16 { value: if swap { value.swap_bytes() } else { value }, big_endian }
        }
        DataType::Int32 => {
            let mut raw = [0_u8; 4];
            raw.copy_from_slice(&scratch[..4]);
            let value = i32::from_ne_bytes(raw);
            Argument::Int32 { value: if swap { value.swap_bytes() } else { value }, big_endian }
        }
        DataType::Uint32 => {
            let mut raw = [0_u8; 4];
            raw.copy_from_slice(&scratch[..4]);
            let value = u32::from_ne_bytes(raw);
            Argument::Uint32 { value: if swap { value.swap_bytes() } else { value }, big_endian }
        }
        DataType::Float32 => {
            let mut raw = [0_u8; 4];
            raw.copy_from_slice(&scratch[..4]);
            let bits = u32::from_ne_bytes(raw);
            Argument::Float32 { value: f32::from_bits(if swap { bits.swap_bytes() } else { bits }), big_endian }
        }
        DataType::Int64 => {
            let value = i64::from_ne_bytes(*scratch);
            Argument::Int64 { value: if swap { value.swap_bytes() } else { value }, big_endian }
        }
        DataType::Uint64 => {
            let value = u64::from_ne_bytes(*scratch);
            Argument::Uint64 { value: if swap { value.swap_bytes() } else { value }, big_endian }
        }
        DataType::Float64 => {
            let bits = u64::from_ne_bytes(*scratch);
            Argument::Float64 { value: f64::from_bits(if swap { bits.swap_bytes() } else { bits }), big_endian }
        }
        _ => unreachable!("caller only passes scalar tags"),
    }
}
