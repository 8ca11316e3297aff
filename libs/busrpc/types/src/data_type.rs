/// A wire-level type tag. The set is closed: every value the codec can
/// carry is one of these 22 tags, scalar or array.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DataType {
    Bool8 = 1,
    Int8 = 7,
    Uint8 = 8,
    Int16 = 15,
    Uint16 = 16,
    Int32 = 31,
    Uint32 = 32,
    Int64 = 63,
    Uint64 = 64,
    Float32 = 65,
    Float64 = 66,
    Bool8Array = 101,
    Int8Array = 107,
    Uint8Array = 108,
    Int16Array = 115,
    Uint16Array = 116,
    Int32Array = 131,
    Uint32Array = 132,
    Int64Array = 163,
    Uint64Array = 164,
    Float32Array = 165,
    Float64Array = 166,
}

/// Returned when a wire byte does not match any tag in the closed set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data type tag: {0}")]
pub struct UnknownDataType(pub u8);

impl DataType {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn is_array(self) -> bool {
        self.tag() >= Self::Bool8Array.tag()
    }

    /// Size in bytes of a single element (scalar payload width for scalar
    /// tags, per-element width for array tags).
    #[must_use]
    pub const fn element_size(self) -> usize {
        match self {
            Self::Bool8 | Self::Int8 | Self::Uint8 | Self::Bool8Array | Self::Int8Array | Self::Uint8Array => 1,
            Self::Int16 | Self::Uint16 | Self::Int16Array | Self::Uint16Array => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 | Self::Int32Array | Self::Uint32Array | Self::Float32Array => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 | Self::Int64Array | Self::Uint64Array | Self::Float64Array => 8,
        }
    }

    pub const fn try_from_tag(tag: u8) -> Result<Self, UnknownDataType> {
        Ok(match tag {
            1 => Self::Bool8,
            7 => Self::Int8,
            8 => Self::Uint8,
            15 => Self::Int16,
            16 => Self::Uint16,
            31 => Self::Int32,
            32 => Self::Uint32,
            63 => Self::Int64,
            64 => Self::Uint64,
            65 => Self::Float32,
            66 => Self::Float64,
            101 => Self::Bool8Array,
            107 => Self::Int8Array,
            108 => Self::Uint8Array,
            115 => Self::Int16Array,
            116 => Self::Uint16Array,
            131 => Self::Int32Array,
            132 => Self::Uint32Array,
            163 => Self::Int64Array,
            164 => Self::Uint64Array,
            165 => Self::Float32Array,
            166 => Self::Float64Array,
            other => return Err(UnknownDataType(other)),
        })
    }
}

impl TryFrom<u8> for DataType {
    type Error = UnknownDataType;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::try_from_tag(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::DataType;

    #[test]
    fn tag_round_trips_for_every_variant() {
        let all = [
            DataType::Bool8,
            DataType::Int8,
            DataType::Uint8,
            DataType::Int16,
            DataType::Uint16,
            DataType::Int32,
            DataType::Uint32,
            DataType::Int64,
            DataType::Uint64,
            DataType::Float32,
            DataType::Float64,
            DataType::Bool8Array,
            DataType::Int8Array,
            DataType::Uint8Array,
            DataType::Int16Array,
            DataType::Uint16Array,
            DataType::Int32Array,
            DataType::Uint32Array,
            DataType::Int64Array,
            DataType::Uint64Array,
            DataType::Float32Array,
            DataType::Float64Array,
        ];
        for ty in all {
            assert_eq!(DataType::try_from_tag(ty.tag()), Ok(ty));
        }
    }

    #[test]
    fn scalar_tags_are_not_array_tags() {
        assert!(!DataType::Int64.is_array());
        assert!(DataType::Int64Array.is_array());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(DataType::try_from_tag(200).is_err());
    }
}
