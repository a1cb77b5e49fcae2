//! Reading and writing the protobuf binary wire format.
//!
//! [`Buffer`] is a byte cursor with the primitive operations (varints, fixed-width values, zigzag,
//! length-delimited data and groups), plus descriptor-driven operations to encode and decode
//! whole field values.

mod buffer;
mod error;
mod field;
mod message;

pub use prost::encoding::WireType;

pub use self::buffer::{
    from_sint32, from_sint64, to_sint32, to_sint64, Buffer, MAX_FIELD_NUMBER, RECURSION_LIMIT,
};
pub use self::error::{DecodeError, DecodeErrorKind};
pub use self::field::{
    DecodedField, DecodedValue, DefaultMessageFactory, FieldFinder, FieldRef, MessageFactory,
};
pub use self::message::{Append, DeterministicAppend, EncodeMessage, ProstMessage, SizedAppend};

/// Field numbers in this range are reserved for the protobuf implementation.
pub const RESERVED_FIELD_NUMBERS: std::ops::RangeInclusive<u32> = 19_000..=19_999;
