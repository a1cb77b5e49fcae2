use prost::{bytes::Bytes, encoding::WireType};
use prost_reflect::{ExtensionDescriptor, FieldDescriptor, Kind, MessageDescriptor};
use tracing::trace;

use super::{Buffer, DecodeError, DecodeErrorKind};
use crate::dynamic::{
    is_packable, DynamicMessage, ExtensionRegistry, FieldDescriptorLike, MapKey, UnknownField,
    UnknownFieldValue, Value,
};

/// A field or extension field of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// A field declared in the message itself.
    Field(FieldDescriptor),
    /// An extension field declared elsewhere.
    Extension(ExtensionDescriptor),
}

/// Looks up the field for a tag number while decoding.
pub trait FieldFinder {
    /// Returns the field with the given number, or `None` if it should be kept as an unknown field.
    fn find_field(&self, number: u32) -> Option<FieldRef>;
}

/// Creates message values for message and group fields while decoding.
pub trait MessageFactory {
    /// Returns a new, empty message of type `desc`.
    fn new_message(&self, desc: &MessageDescriptor) -> DynamicMessage;
}

/// A [`MessageFactory`] creating [`DynamicMessage`]s without an extension registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessageFactory;

/// The result of [`Buffer::decode_field_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedField {
    /// A field the [`FieldFinder`] recognized.
    Known {
        /// The field.
        field: FieldRef,
        /// The decoded value.
        value: DecodedValue,
    },
    /// A field the [`FieldFinder`] did not recognize.
    Unknown(UnknownField),
}

/// A single occurrence of a field on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// One value. For repeated fields this is a single element.
    Single(Value),
    /// The elements of a packed repeated field.
    Packed(Vec<Value>),
    /// One entry of a map field.
    MapEntry(MapKey, Value),
}

impl FieldFinder for MessageDescriptor {
    fn find_field(&self, number: u32) -> Option<FieldRef> {
        if let Some(field) = self.get_field(number) {
            Some(FieldRef::Field(field))
        } else {
            self.get_extension(number).map(FieldRef::Extension)
        }
    }
}

impl MessageFactory for DefaultMessageFactory {
    fn new_message(&self, desc: &MessageDescriptor) -> DynamicMessage {
        DynamicMessage::new(desc.clone())
    }
}

impl MessageFactory for ExtensionRegistry {
    fn new_message(&self, desc: &MessageDescriptor) -> DynamicMessage {
        DynamicMessage::new_with_extensions(desc.clone(), self.clone())
    }
}

impl From<FieldDescriptor> for FieldRef {
    fn from(field: FieldDescriptor) -> Self {
        FieldRef::Field(field)
    }
}

impl From<ExtensionDescriptor> for FieldRef {
    fn from(extension: ExtensionDescriptor) -> Self {
        FieldRef::Extension(extension)
    }
}

impl FieldRef {
    /// The field number.
    pub fn number(&self) -> u32 {
        match self {
            FieldRef::Field(field) => field.number(),
            FieldRef::Extension(extension) => extension.number(),
        }
    }

    /// The fully-qualified name of the field.
    pub fn full_name(&self) -> &str {
        match self {
            FieldRef::Field(field) => field.full_name(),
            FieldRef::Extension(extension) => extension.full_name(),
        }
    }

    /// The type of the field.
    pub fn kind(&self) -> Kind {
        match self {
            FieldRef::Field(field) => field.kind(),
            FieldRef::Extension(extension) => extension.kind(),
        }
    }

    /// Returns the extension descriptor if this is an extension field.
    pub fn as_extension(&self) -> Option<&ExtensionDescriptor> {
        match self {
            FieldRef::Field(_) => None,
            FieldRef::Extension(extension) => Some(extension),
        }
    }
}

impl Buffer<'_> {
    /// Appends every occurrence of `value` for `field`, including keys.
    ///
    /// Map entries are written in key order if the buffer is deterministic. Repeated numeric fields
    /// are packed if the field is packed and there is more than one element.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not match the type of `field`.
    pub fn encode_field_value(&mut self, field: &FieldRef, value: &Value) {
        self.encode_field(field, value)
    }

    pub(crate) fn encode_field(&mut self, field: &impl FieldDescriptorLike, value: &Value) {
        let number = field.number();
        let kind = field.kind();
        match value {
            Value::Map(map) if field.is_map() => {
                let entry_desc = match kind.as_message() {
                    Some(entry_desc) => entry_desc.clone(),
                    None => panic!("map field {:?} does not have a message type", field),
                };
                let key_field = entry_desc.map_entry_key_field();
                let value_field = entry_desc.map_entry_value_field();

                let mut entries: Vec<(&MapKey, &Value)> = map.iter().collect();
                if self.is_deterministic() {
                    entries.sort_by(|l, r| l.0.cmp(r.0));
                }

                let mut scratch = self.take_scratch();
                for (key, value) in entries {
                    scratch.reset();
                    scratch.encode_single(&key_field, &Value::from(key.clone()));
                    scratch.encode_single(&value_field, value);
                    self.encode_tag_and_wire_type(number, WireType::LengthDelimited);
                    self.encode_raw_bytes(scratch.bytes());
                }
                self.restore_scratch(scratch);
            }
            Value::List(list) if field.is_list() => {
                if field.is_packed() && is_packable(&kind) && list.len() > 1 {
                    let mut scratch = self.take_scratch();
                    for element in list {
                        scratch.encode_raw_value(&kind, element);
                    }
                    self.encode_tag_and_wire_type(number, WireType::LengthDelimited);
                    self.encode_raw_bytes(scratch.bytes());
                    self.restore_scratch(scratch);
                } else {
                    for element in list {
                        self.encode_single(field, element);
                    }
                }
            }
            value => self.encode_single(field, value),
        }
    }

    fn encode_single(&mut self, field: &impl FieldDescriptorLike, value: &Value) {
        let number = field.number();
        match value {
            Value::Message(message) if field.is_group() => {
                self.encode_tag_and_wire_type(number, WireType::StartGroup);
                self.encode_message(message);
                self.encode_tag_and_wire_type(number, WireType::EndGroup);
            }
            Value::Message(message) => {
                self.encode_tag_and_wire_type(number, WireType::LengthDelimited);
                self.encode_delimited_message(message);
            }
            value => {
                let kind = field.kind();
                self.encode_tag_and_wire_type(number, kind.wire_type());
                self.encode_raw_value(&kind, value);
            }
        }
    }

    /// Appends a scalar value without its key.
    fn encode_raw_value(&mut self, kind: &Kind, value: &Value) {
        match (value, kind) {
            (Value::Bool(value), Kind::Bool) => self.encode_varint(u64::from(*value)),
            (Value::I32(value), Kind::Int32) => self.encode_varint(*value as i64 as u64),
            (Value::I32(value), Kind::Sint32) => self.encode_zigzag32(*value),
            (Value::I32(value), Kind::Sfixed32) => self.encode_fixed32(*value as u32),
            (Value::I64(value), Kind::Int64) => self.encode_varint(*value as u64),
            (Value::I64(value), Kind::Sint64) => self.encode_zigzag64(*value),
            (Value::I64(value), Kind::Sfixed64) => self.encode_fixed64(*value as u64),
            (Value::U32(value), Kind::Uint32) => self.encode_varint(u64::from(*value)),
            (Value::U32(value), Kind::Fixed32) => self.encode_fixed32(*value),
            (Value::U64(value), Kind::Uint64) => self.encode_varint(*value),
            (Value::U64(value), Kind::Fixed64) => self.encode_fixed64(*value),
            (Value::F32(value), Kind::Float) => self.encode_fixed32(value.to_bits()),
            (Value::F64(value), Kind::Double) => self.encode_fixed64(value.to_bits()),
            (Value::String(value), Kind::String) => self.encode_raw_bytes(value.as_bytes()),
            (Value::Bytes(value), Kind::Bytes) => self.encode_raw_bytes(value),
            (Value::EnumNumber(value), Kind::Enum(_)) => self.encode_varint(*value as i64 as u64),
            (value, kind) => panic!(
                "mismatch between DynamicMessage value {:?} and type {:?}",
                value, kind
            ),
        }
    }

    /// Appends an unknown field exactly as it was read.
    pub fn encode_unknown_field(&mut self, field: &UnknownField) {
        let number = field.number();
        match field.value() {
            UnknownFieldValue::Varint(value) => {
                self.encode_tag_and_wire_type(number, WireType::Varint);
                self.encode_varint(*value);
            }
            UnknownFieldValue::SixtyFourBit(value) => {
                self.encode_tag_and_wire_type(number, WireType::SixtyFourBit);
                self.vec_mut().extend_from_slice(value);
            }
            UnknownFieldValue::LengthDelimited(value) => {
                self.encode_tag_and_wire_type(number, WireType::LengthDelimited);
                self.encode_raw_bytes(value);
            }
            UnknownFieldValue::Group(value) => {
                self.encode_tag_and_wire_type(number, WireType::StartGroup);
                self.vec_mut().extend_from_slice(value);
                self.encode_tag_and_wire_type(number, WireType::EndGroup);
            }
            UnknownFieldValue::ThirtyTwoBit(value) => {
                self.encode_tag_and_wire_type(number, WireType::ThirtyTwoBit);
                self.vec_mut().extend_from_slice(value);
            }
        }
    }

    /// Reads one field, key included.
    ///
    /// Numbers `finder` does not recognize are returned as [`DecodedField::Unknown`]. Message and
    /// group values are created by `factory`.
    ///
    /// Any numeric field arriving length-delimited is unpacked as a packed list, even if the field
    /// is not declared `repeated`. Callers storing into a singular field keep the last element.
    pub fn decode_field_value(
        &mut self,
        finder: &(impl FieldFinder + ?Sized),
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<DecodedField, DecodeError> {
        let (number, wire_type) = self.decode_tag_and_wire_type()?;
        match finder.find_field(number) {
            Some(field) => {
                let value = self.decode_known_field(&field, wire_type, factory)?;
                Ok(DecodedField::Known { field, value })
            }
            None => {
                let unknown = UnknownField::decode(number, wire_type, self)?;
                trace!(number, ?wire_type, "captured unknown field");
                Ok(DecodedField::Unknown(unknown))
            }
        }
    }

    pub(crate) fn decode_known_field(
        &mut self,
        field: &impl FieldDescriptorLike,
        wire_type: WireType,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<DecodedValue, DecodeError> {
        let number = field.number();
        let kind = field.kind();

        if field.is_map() {
            expect_wire_type(number, WireType::LengthDelimited, wire_type)?;
            let entry_desc = match kind.as_message() {
                Some(entry_desc) => entry_desc.clone(),
                None => panic!("map field {:?} does not have a message type", field),
            };
            let depth = self.depth();
            let bytes = self.decode_raw_bytes(false)?;
            let entry = Buffer::from_slice(&bytes).with_depth(depth);
            let (key, value) = decode_map_entry(entry, &entry_desc, factory)?;
            return Ok(DecodedValue::MapEntry(key, value));
        }

        if wire_type == WireType::LengthDelimited && is_packable(&kind) {
            let element_wire_type = kind.wire_type();
            let bytes = self.decode_raw_bytes(false)?;
            let mut packed = Buffer::from_slice(&bytes);
            let mut values = Vec::new();
            while !packed.eof() {
                values.push(packed.decode_scalar(number, &kind, element_wire_type)?);
            }
            return Ok(DecodedValue::Packed(values));
        }

        let expected = if field.is_group() {
            WireType::StartGroup
        } else {
            kind.wire_type()
        };
        expect_wire_type(number, expected, wire_type)?;

        let value = match &kind {
            Kind::Message(desc) if field.is_group() => {
                let depth = self.nested_depth()?;
                let bytes = self.read_group(number)?;
                decode_message(Buffer::from_slice(bytes).with_depth(depth), desc, factory)?
            }
            Kind::Message(desc) => {
                let depth = self.nested_depth()?;
                let bytes = self.decode_raw_bytes(false)?;
                decode_message(Buffer::from_slice(&bytes).with_depth(depth), desc, factory)?
            }
            Kind::String => {
                let bytes = self.decode_raw_bytes(true)?.into_owned();
                let string =
                    String::from_utf8(bytes).map_err(|_| DecodeErrorKind::InvalidUtf8)?;
                Value::String(string)
            }
            Kind::Bytes => {
                let bytes = self.decode_raw_bytes(false)?;
                Value::Bytes(Bytes::copy_from_slice(&bytes))
            }
            kind => self.decode_scalar(number, kind, wire_type)?,
        };
        Ok(DecodedValue::Single(value))
    }

    /// Decodes a numeric, boolean or enum value without its key.
    fn decode_scalar(
        &mut self,
        number: u32,
        kind: &Kind,
        wire_type: WireType,
    ) -> Result<Value, DecodeError> {
        expect_wire_type(number, kind.wire_type(), wire_type)?;
        let value = match kind {
            Kind::Bool => Value::Bool(self.decode_varint()? != 0),
            Kind::Int32 => Value::I32(narrow_i32(self.decode_varint()?)?),
            Kind::Enum(_) => Value::EnumNumber(narrow_i32(self.decode_varint()?)?),
            Kind::Int64 => Value::I64(self.decode_varint()? as i64),
            Kind::Uint32 => Value::U32(
                u32::try_from(self.decode_varint()?).map_err(|_| DecodeErrorKind::Overflow)?,
            ),
            Kind::Uint64 => Value::U64(self.decode_varint()?),
            Kind::Sint32 => Value::I32(self.decode_zigzag32()?),
            Kind::Sint64 => Value::I64(self.decode_zigzag64()?),
            Kind::Fixed32 => Value::U32(self.decode_fixed32()?),
            Kind::Sfixed32 => Value::I32(self.decode_fixed32()? as i32),
            Kind::Float => Value::F32(f32::from_bits(self.decode_fixed32()?)),
            Kind::Fixed64 => Value::U64(self.decode_fixed64()?),
            Kind::Sfixed64 => Value::I64(self.decode_fixed64()? as i64),
            Kind::Double => Value::F64(f64::from_bits(self.decode_fixed64()?)),
            Kind::String | Kind::Bytes | Kind::Message(_) => {
                panic!("{:?} is not a scalar type", kind)
            }
        };
        Ok(value)
    }
}

fn expect_wire_type(number: u32, expected: WireType, actual: WireType) -> Result<(), DecodeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(DecodeErrorKind::UnexpectedWireType {
            number,
            expected,
            actual,
        }
        .into())
    }
}

/// Int32 and enum values are sign-extended to 64 bits on the wire.
fn narrow_i32(value: u64) -> Result<i32, DecodeError> {
    i32::try_from(value as i64).map_err(|_| DecodeErrorKind::Overflow.into())
}

fn decode_message(
    mut buf: Buffer<'_>,
    desc: &MessageDescriptor,
    factory: &(impl MessageFactory + ?Sized),
) -> Result<Value, DecodeError> {
    let mut message = factory.new_message(desc);
    message.merge_buffer(&mut buf, factory)?;
    Ok(Value::Message(message))
}

/// Entries sit at the depth of their map field. Message values inside them nest one level deeper.
fn decode_map_entry(
    mut entry: Buffer<'_>,
    entry_desc: &MessageDescriptor,
    factory: &(impl MessageFactory + ?Sized),
) -> Result<(MapKey, Value), DecodeError> {
    let key_field = entry_desc.map_entry_key_field();
    let value_field = entry_desc.map_entry_value_field();

    let mut key = None;
    let mut value = None;
    while !entry.eof() {
        let (number, wire_type) = entry.decode_tag_and_wire_type()?;
        let target = if number == key_field.number() {
            &key_field
        } else if number == value_field.number() {
            &value_field
        } else {
            entry.skip_value(number, wire_type)?;
            continue;
        };

        let decoded = match entry.decode_known_field(target, wire_type, factory)? {
            DecodedValue::Single(decoded) => Some(decoded),
            DecodedValue::Packed(mut decoded) => decoded.pop(),
            DecodedValue::MapEntry(..) => None,
        };
        if decoded.is_some() {
            if number == key_field.number() {
                key = decoded;
            } else {
                value = decoded;
            }
        }
    }

    let key = match key.and_then(Value::into_map_key) {
        Some(key) => key,
        None => MapKey::default_value(&key_field.kind()),
    };
    let value = match value {
        Some(value) => value,
        None => value_field.default_field_value(),
    };
    Ok((key, value))
}
