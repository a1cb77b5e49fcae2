use prost::{bytes::Bytes, encoding::WireType};

use crate::codec::{Buffer, DecodeError, DecodeErrorKind};

/// A field in a protobuf message which did not match any known field or extension.
///
/// Unknown fields are retained so that re-serializing a message reproduces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    number: u32,
    value: UnknownFieldValue,
}

/// The raw value of an [`UnknownField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownFieldValue {
    /// An unknown field with the `Varint` wire type.
    Varint(u64),
    /// An unknown field with the `SixtyFourBit` wire type.
    SixtyFourBit([u8; 8]),
    /// An unknown field with the `LengthDelimited` wire type.
    LengthDelimited(Bytes),
    /// An unknown field with the group wire type. Holds the encoded contents of the group.
    Group(Bytes),
    /// An unknown field with the `ThirtyTwoBit` wire type.
    ThirtyTwoBit([u8; 4]),
}

impl UnknownField {
    /// Creates an unknown field from its number and raw value.
    pub fn new(number: u32, value: UnknownFieldValue) -> Self {
        UnknownField { number, value }
    }

    /// Reads the value of a field whose key has just been read from `buf`.
    pub fn decode(
        number: u32,
        wire_type: WireType,
        buf: &mut Buffer<'_>,
    ) -> Result<Self, DecodeError> {
        let value = match wire_type {
            WireType::Varint => UnknownFieldValue::Varint(buf.decode_varint()?),
            WireType::SixtyFourBit => {
                UnknownFieldValue::SixtyFourBit(buf.decode_fixed64()?.to_le_bytes())
            }
            WireType::LengthDelimited => {
                UnknownFieldValue::LengthDelimited(Bytes::copy_from_slice(&buf.decode_raw_bytes(false)?))
            }
            WireType::StartGroup => {
                UnknownFieldValue::Group(Bytes::copy_from_slice(buf.read_group(number)?))
            }
            WireType::EndGroup => return Err(DecodeErrorKind::UnexpectedEndGroup(number).into()),
            WireType::ThirtyTwoBit => {
                UnknownFieldValue::ThirtyTwoBit(buf.decode_fixed32()?.to_le_bytes())
            }
        };
        Ok(UnknownField { number, value })
    }

    /// The field number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The raw value.
    pub fn value(&self) -> &UnknownFieldValue {
        &self.value
    }

    /// The wire type the field was read with.
    pub fn wire_type(&self) -> WireType {
        match self.value {
            UnknownFieldValue::Varint(_) => WireType::Varint,
            UnknownFieldValue::SixtyFourBit(_) => WireType::SixtyFourBit,
            UnknownFieldValue::LengthDelimited(_) => WireType::LengthDelimited,
            UnknownFieldValue::Group(_) => WireType::StartGroup,
            UnknownFieldValue::ThirtyTwoBit(_) => WireType::ThirtyTwoBit,
        }
    }
}
