use prost_reflect::MessageDescriptor;

use super::{
    fields::{FieldDescriptorLike, StoredField},
    DynamicMessage, FieldError,
};
use crate::codec::{
    Append, Buffer, DecodeError, DecodedField, DeterministicAppend, EncodeMessage, FieldRef,
    MessageFactory,
};

impl DynamicMessage {
    /// Appends the encoded fields of this message to `buf`, in field number order.
    ///
    /// Unknown fields are written back exactly as they were read. If `buf` is deterministic,
    /// map entries are written in key order.
    pub fn encode(&self, buf: &mut Buffer<'_>) {
        for entry in self.fields.iter() {
            match entry {
                StoredField::Field(number, value) => {
                    if let Some(field) = self.desc.get_field(number) {
                        if field.has(value) {
                            buf.encode_field(&field, value);
                        }
                    }
                }
                StoredField::Extension(extension, value) => {
                    if extension.has(value) {
                        buf.encode_field(extension, value);
                    }
                }
                StoredField::Unknown(unknown) => {
                    for field in unknown {
                        buf.encode_unknown_field(field);
                    }
                }
            }
        }
    }

    /// Encodes this message into a new vector.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Buffer::new();
        self.encode(&mut buf);
        buf.into_vec()
    }

    /// Encodes this message into a new vector with map entries in key order, so equal messages
    /// always produce identical bytes.
    pub fn encode_deterministic(&self) -> Vec<u8> {
        let mut buf = Buffer::new();
        buf.set_deterministic(true);
        self.encode(&mut buf);
        buf.into_vec()
    }

    /// Decodes an instance of the message type specified by the [`MessageDescriptor`] from
    /// `bytes`.
    pub fn decode(desc: MessageDescriptor, bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut message = DynamicMessage::new(desc);
        message.merge(bytes)?;
        Ok(message)
    }

    /// Decodes `bytes` and merges the fields into this message.
    ///
    /// Singular fields present in `bytes` replace the current value, except message fields which
    /// are merged recursively. Repeated and map fields are appended to.
    pub fn merge(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let registry = self.extensions.clone();
        self.merge_buffer(&mut Buffer::from_slice(bytes), &registry)
    }

    /// Decodes the rest of `buf` and merges the fields into this message, creating nested
    /// messages with `factory`.
    pub fn merge_buffer(
        &mut self,
        buf: &mut Buffer<'_>,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<(), DecodeError> {
        while !buf.eof() {
            match buf.decode_field_value(&*self, factory)? {
                DecodedField::Known { field, value } => {
                    self.fields.merge_decoded(&field, value, factory)?
                }
                DecodedField::Unknown(unknown) => self.fields.add_unknown(unknown, factory)?,
            }
        }
        Ok(())
    }

    /// Merges the fields of `other` into this message.
    ///
    /// Both messages must have the same type. Fields are combined the same way as
    /// [`merge`](DynamicMessage::merge) combines decoded data.
    pub fn try_merge_from(&mut self, other: &DynamicMessage) -> Result<(), FieldError> {
        if other.desc.full_name() != self.desc.full_name() {
            return Err(FieldError::type_mismatch(
                other.desc.full_name(),
                self.desc.full_name(),
            ));
        }
        let mut merged = self.clone();
        let registry = self.extensions.clone();
        merged.merge_inner(other.clone(), &registry)?;
        *self = merged;
        Ok(())
    }

    /// Panicking version of [`try_merge_from`](DynamicMessage::try_merge_from).
    pub fn merge_from(&mut self, other: &DynamicMessage) {
        if let Err(err) = self.try_merge_from(other) {
            panic!("{}", err)
        }
    }

    pub(crate) fn merge_inner(
        &mut self,
        other: DynamicMessage,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<(), DecodeError> {
        let (fields, extensions, unknown) = other.fields.into_parts();
        for (number, value) in fields {
            if let Some(field) = self.desc.get_field(number) {
                self.fields
                    .merge_value(&FieldRef::Field(field), value, factory)?;
            }
        }
        for (extension, value) in extensions.into_values() {
            self.fields
                .merge_value(&FieldRef::Extension(extension), value, factory)?;
        }
        for field in unknown.into_values().flatten() {
            self.fields.add_unknown(field, factory)?;
        }
        Ok(())
    }
}

impl EncodeMessage for DynamicMessage {
    fn encode_to_vec(&self) -> Vec<u8> {
        DynamicMessage::encode_to_vec(self)
    }

    fn as_deterministic(&self) -> Option<&dyn DeterministicAppend> {
        Some(self)
    }

    fn as_append(&self) -> Option<&dyn Append> {
        Some(self)
    }
}

impl DeterministicAppend for DynamicMessage {
    fn append_deterministic(&self, buf: &mut Buffer<'_>) {
        debug_assert!(buf.is_deterministic());
        self.encode(buf);
    }
}

impl Append for DynamicMessage {
    fn append_to(&self, buf: &mut Buffer<'_>) {
        self.encode(buf);
    }
}
