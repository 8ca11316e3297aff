use bytes::Bytes;

use crate::DataType;

/// One call or return value. The numeric payload is always held in host
/// byte order in memory; `big_endian` only records the order the value is
/// declared to have *on the wire* — the codec decides at serialize/parse
/// time whether a swap is needed by comparing this flag against the local
/// machine order (see `busrpc-wire`).
///
/// Array variants borrow their backing via [`Bytes`], which is how this
/// type gets zero-copy parsing without unsafe lifetime plumbing: a parsed
/// array argument is a cheaply-cloned slice of the packet's own buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Bool8 { value: bool, big_endian: bool },
    Int8 { value: i8, big_endian: bool },
    Uint8 { value: u8, big_endian: bool },
    Int16 { value: i16, big_endian: bool },
    Uint16 { value: u16, big_endian: bool },
    Int32 { value: i32, big_endian: bool },
    Uint32 { value: u32, big_endian: bool },
    Int64 { value: i64, big_endian: bool },
    Uint64 { value: u64, big_endian: bool },
    Float32 { value: f32, big_endian: bool },
    Float64 { value: f64, big_endian: bool },
    Bool8Array { data: Bytes, big_endian: bool },
    Int8Array { data: Bytes, big_endian: bool },
    Uint8Array { data: Bytes, big_endian: bool },
    Int16Array { data: Bytes, big_endian: bool },
    Uint16Array { data: Bytes, big_endian: bool },
    Int32Array { data: Bytes, big_endian: bool },
    Uint32Array { data: Bytes, big_endian: bool },
    Int64Array { data: Bytes, big_endian: bool },
    Uint64Array { data: Bytes, big_endian: bool },
    Float32Array { data: Bytes, big_endian: bool },
    Float64Array { data: Bytes, big_endian: bool },
}

impl Argument {
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Bool8 { .. } => DataType::Bool8,
            Self::Int8 { .. } => DataType::Int8,
            Self::Uint8 { .. } => DataType::Uint8,
            Self::Int16 { .. } => DataType::Int16,
            Self::Uint16 { .. } => DataType::Uint16,
            Self::Int32 { .. } => DataType::Int32,
            Self::Uint32 { .. } => DataType::Uint32,
            Self::Int64 { .. } => DataType::Int64,
            Self::Uint64 { .. } => DataType::Uint64,
            Self::Float32 { .. } => DataType::Float32,
            Self::Float64 { .. } => DataType::Float64,
            Self::Bool8Array { .. } => DataType::Bool8Array,
            Self::Int8Array { .. } => DataType::Int8Array,
            Self::Uint8Array { .. } => DataType::Uint8Array,
            Self::Int16Array { .. } => DataType::Int16Array,
            Self::Uint16Array { .. } => DataType::Uint16Array,
            Self::Int32Array { .. } => DataType::Int32Array,
            Self::Uint32Array { .. } => DataType::Uint32Array,
            Self::Int64Array { .. } => DataType::Int64Array,
            Self::Uint64Array { .. } => DataType::Uint64Array,
            Self::Float32Array { .. } => DataType::Float32Array,
            Self::Float64Array { .. } => DataType::Float64Array,
        }
    }

    /// Element count for array variants; zero for scalars, matching the
    /// wire `count` field's scalar convention.
    #[must_use]
    pub fn count(&self) -> u32 {
        let Some(data) = self.array_data() else {
            return 0;
        };
        let elem_size = self.data_type().element_size();
        u32::try_from(data.len() / elem_size).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub const fn big_endian(&self) -> bool {
        match self {
            Self::Bool8 { big_endian, .. }
            | Self::Int8 { big_endian, .. }
            | Self::Uint8 { big_endian, .. }
            | Self::Int16 { big_endian, .. }
            | Self::Uint16 { big_endian, .. }
            | Self::Int32 { big_endian, .. }
            | Self::Uint32 { big_endian, .. }
            | Self::Int64 { big_endian, .. }
            | Self::Uint64 { big_endian, .. }
            | Self::Float32 { big_endian, .. }
            | Self::Float64 { big_endian, .. }
            | Self::Bool8Array { big_endian, .. }
            | Self::Int8Array { big_endian, .. }
            | Self::Uint8Array { big_endian, .. }
            | Self::Int16Array { big_endian, .. }
            | Self::Uint16Array { big_endian, .. }
            | Self::Int32Array { big_endian, .. }
            | Self::Uint32Array { big_endian, .. }
            | Self::Int64Array { big_endian, .. }
            | Self::Uint64Array { big_endian, .. }
            | Self::Float32Array { big_endian, .. }
            | Self::Float64Array { big_endian, .. } => *big_endian,
        }
    }

    #[must_use]
    pub const fn array_data(&self) -> Option<&Bytes> {
        match self {
            Self::Bool8Array { data, .. }
            | Self::Int8Array { data, .. }
            | Self::Uint8Array { data, .. }
            | Self::Int16Array { data, .. }
            | Self::Uint16Array { data, .. }
            | Self::Int32Array { data, .. }
            | Self::Uint32Array { data, .. }
            | Self::Int64Array { data, .. }
            | Self::Uint64Array { data, .. }
            | Self::Float32Array { data, .. }
            | Self::Float64Array { data, .. } => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::Argument;
    use crate::DataType;

    #[test]
    fn scalar_count_is_zero() {
        let arg = Argument::Int64 { value: 1_700_000_000_000, big_endian: false };
        assert_eq!(arg.count(), 0);
        assert_eq!(arg.data_type(), DataType::Int64);
    }

    #[test]
    fn array_count_matches_element_width() {
        let arg = Argument::Int32Array { data: Bytes::from_static(&[0, 0, 0, 2, 0, 0, 0, 3]), big_endian: true };
        assert_eq!(arg.count(), 2);
    }
}
