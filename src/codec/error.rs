use std::fmt;

use prost::encoding::WireType;

/// An error that may occur while decoding protobuf wire data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
}

/// The reason decoding failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// A varint needed more than 64 bits, or a numeric value did not fit in the
    /// field's declared type.
    Overflow,
    /// The input ended in the middle of a value.
    UnexpectedEndOfInput,
    /// The wire type bits held a value outside the protobuf wire types.
    BadWireType(u64),
    /// The field number was zero or above the maximum field number.
    InvalidTag(u64),
    /// A known field arrived with a wire type its declared kind cannot use.
    UnexpectedWireType {
        /// The field number.
        number: u32,
        /// The wire type the field's kind expects.
        expected: WireType,
        /// The wire type found in the input.
        actual: WireType,
    },
    /// An end group tag did not match the open group, or appeared outside a group.
    UnexpectedEndGroup(u32),
    /// A string field did not contain valid UTF-8.
    InvalidUtf8,
    /// A length prefix does not fit in memory.
    LengthOverflow,
    /// Message or group values were nested more than [`RECURSION_LIMIT`](super::RECURSION_LIMIT) deep.
    RecursionLimitReached,
}

impl DecodeError {
    pub(crate) fn new(kind: DecodeErrorKind) -> Self {
        DecodeError { kind }
    }

    /// Returns the reason decoding failed.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

impl From<DecodeErrorKind> for DecodeError {
    fn from(kind: DecodeErrorKind) -> Self {
        DecodeError::new(kind)
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DecodeErrorKind::Overflow => write!(f, "numeric overflow"),
            DecodeErrorKind::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            DecodeErrorKind::BadWireType(value) => write!(f, "invalid wire type value: {}", value),
            DecodeErrorKind::InvalidTag(number) => write!(f, "invalid field number: {}", number),
            DecodeErrorKind::UnexpectedWireType {
                number,
                expected,
                actual,
            } => write!(
                f,
                "field {} has wire type {:?} but expected {:?}",
                number, actual, expected
            ),
            DecodeErrorKind::UnexpectedEndGroup(number) => {
                write!(f, "unexpected end group tag for field {}", number)
            }
            DecodeErrorKind::InvalidUtf8 => write!(f, "invalid string value: data is not UTF-8"),
            DecodeErrorKind::LengthOverflow => write!(f, "length prefix is too large"),
            DecodeErrorKind::RecursionLimitReached => write!(f, "recursion limit reached"),
        }
    }
}
