use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt,
};

use prost_reflect::{ExtensionDescriptor, FieldDescriptor, Kind, OneofDescriptor};
use prost_types::FieldDescriptorProto;
use tracing::trace;

use super::{unknown::UnknownField, value::parse_default_value, MapKey, Value};
use crate::codec::{Buffer, DecodeError, DecodedValue, FieldRef, MessageFactory};

pub(crate) trait FieldDescriptorLike: fmt::Debug {
    fn number(&self) -> u32;
    fn kind(&self) -> Kind;
    fn is_group(&self) -> bool;
    fn is_list(&self) -> bool;
    fn is_map(&self) -> bool;
    fn is_packed(&self) -> bool;
    fn supports_presence(&self) -> bool;
    fn containing_oneof(&self) -> Option<OneofDescriptor>;
    fn field_descriptor_proto(&self) -> &FieldDescriptorProto;

    fn default_field_value(&self) -> Value {
        if self.is_map() {
            Value::Map(HashMap::new())
        } else if self.is_list() {
            Value::List(Vec::new())
        } else {
            let kind = self.kind();
            self.field_descriptor_proto()
                .default_value
                .as_deref()
                .and_then(|default| parse_default_value(&kind, default))
                .unwrap_or_else(|| Value::default_value(&kind))
        }
    }

    fn is_default_field_value(&self, value: &Value) -> bool {
        match value {
            Value::List(list) if self.is_list() => list.is_empty(),
            Value::Map(map) if self.is_map() => map.is_empty(),
            value => *value == self.default_field_value(),
        }
    }

    fn is_valid_field_value(&self, value: &Value) -> bool {
        let kind = self.kind();
        if self.is_map() {
            let entry = match kind.as_message() {
                Some(entry) => entry,
                None => return false,
            };
            let key_kind = entry.map_entry_key_field().kind();
            let value_kind = entry.map_entry_value_field().kind();
            match value {
                Value::Map(map) => map
                    .iter()
                    .all(|(k, v)| k.is_valid(&key_kind) && v.is_valid(&value_kind)),
                _ => false,
            }
        } else if self.is_list() {
            match value {
                Value::List(list) => list.iter().all(|v| v.is_valid(&kind)),
                _ => false,
            }
        } else {
            value.is_valid(&kind)
        }
    }

    fn has(&self, value: &Value) -> bool {
        self.supports_presence() || !self.is_default_field_value(value)
    }
}

/// Returns `true` if repeated values of this kind may use the packed encoding.
pub(crate) fn is_packable(kind: &Kind) -> bool {
    !matches!(kind, Kind::String | Kind::Bytes | Kind::Message(_))
}

/// The values of a [`DynamicMessage`](super::DynamicMessage).
///
/// Each field number is held by at most one of the three maps.
#[derive(Debug, Default, Clone)]
pub(super) struct DynamicMessageFieldSet {
    fields: BTreeMap<u32, Value>,
    extensions: BTreeMap<u32, (ExtensionDescriptor, Value)>,
    unknown: BTreeMap<u32, Vec<UnknownField>>,
}

/// A stored entry, in field number order.
pub(super) enum StoredField<'a> {
    Field(u32, &'a Value),
    Extension(&'a ExtensionDescriptor, &'a Value),
    Unknown(&'a [UnknownField]),
}

impl DynamicMessageFieldSet {
    fn stored(&self, field: &FieldRef) -> Option<&Value> {
        match field {
            FieldRef::Field(field) => self.fields.get(&field.number()),
            FieldRef::Extension(extension) => self
                .extensions
                .get(&extension.number())
                .map(|(_, value)| value),
        }
    }

    fn stored_mut(&mut self, field: &FieldRef) -> &mut Value {
        match field {
            FieldRef::Field(field) => self
                .fields
                .entry(field.number())
                .or_insert_with(|| field.default_field_value()),
            FieldRef::Extension(extension) => {
                &mut self
                    .extensions
                    .entry(extension.number())
                    .or_insert_with(|| (extension.clone(), extension.default_field_value()))
                    .1
            }
        }
    }

    fn remove(&mut self, number: u32) {
        self.fields.remove(&number);
        self.extensions.remove(&number);
    }

    pub(super) fn stored_extension(&self, number: u32) -> Option<&ExtensionDescriptor> {
        self.extensions.get(&number).map(|(extension, _)| extension)
    }

    pub(super) fn has(
        &self,
        field: &FieldRef,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<bool, DecodeError> {
        if let Some(value) = self.stored(field) {
            return Ok(field.has(value));
        }
        match self.unknown.get(&field.number()) {
            Some(unknown) => {
                let value = parse_unknown(field, unknown, None, factory)?;
                Ok(field.has(&value))
            }
            None => Ok(false),
        }
    }

    pub(super) fn get(
        &self,
        field: &FieldRef,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<Cow<'_, Value>, DecodeError> {
        if let Some(value) = self.stored(field) {
            return Ok(Cow::Borrowed(value));
        }
        match self.unknown.get(&field.number()) {
            Some(unknown) => parse_unknown(field, unknown, None, factory).map(Cow::Owned),
            None => Ok(Cow::Owned(field.default_field_value())),
        }
    }

    pub(super) fn get_mut(
        &mut self,
        field: &FieldRef,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<&mut Value, DecodeError> {
        self.promote(field, factory)?;
        self.clear_oneof_fields(field);
        Ok(self.stored_mut(field))
    }

    pub(super) fn set(&mut self, field: &FieldRef, value: Value) {
        debug_assert!(
            field.is_valid_field_value(&value),
            "invalid value {:?} for field {:?}",
            value,
            field,
        );

        let number = field.number();
        self.unknown.remove(&number);
        if !field.has(&value) {
            self.remove(number);
            return;
        }

        self.clear_oneof_fields(field);
        match field {
            FieldRef::Field(_) => {
                self.fields.insert(number, value);
            }
            FieldRef::Extension(extension) => {
                self.extensions.insert(number, (extension.clone(), value));
            }
        }
    }

    /// Drops the stored value of `field` if it no longer counts as set.
    pub(super) fn prune(&mut self, field: &FieldRef) {
        if self.stored(field).map_or(false, |value| !field.has(value)) {
            self.remove(field.number());
        }
    }

    pub(super) fn clear(&mut self, field: &FieldRef) {
        let number = field.number();
        self.remove(number);
        self.unknown.remove(&number);
    }

    /// Merges `value` into the field using protobuf merge semantics.
    pub(super) fn merge_value(
        &mut self,
        field: &FieldRef,
        value: Value,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<(), DecodeError> {
        self.promote(field, factory)?;
        self.clear_oneof_fields(field);
        let slot = self.stored_mut(field);
        merge_values(slot, value, factory)?;
        if !field.has(slot) {
            self.remove(field.number());
        }
        Ok(())
    }

    /// Merges one decoded occurrence of a field.
    pub(super) fn merge_decoded(
        &mut self,
        field: &FieldRef,
        decoded: DecodedValue,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<(), DecodeError> {
        match decoded_into_value(field, decoded) {
            Some(value) => self.merge_value(field, value, factory),
            None => Ok(()),
        }
    }

    pub(super) fn add_unknown(
        &mut self,
        unknown: UnknownField,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<(), DecodeError> {
        let number = unknown.number();
        if let Some(extension) = self.stored_extension(number).cloned() {
            let field = FieldRef::Extension(extension);
            let value = parse_unknown(&field, std::slice::from_ref(&unknown), None, factory)?;
            return self.merge_value(&field, value, factory);
        }
        self.unknown.entry(number).or_default().push(unknown);
        Ok(())
    }

    /// Moves any retained unknown occurrences of `field` into the known store.
    fn promote(
        &mut self,
        field: &FieldRef,
        factory: &(impl MessageFactory + ?Sized),
    ) -> Result<(), DecodeError> {
        let number = field.number();
        let value = match self.unknown.get(&number) {
            Some(unknown) => parse_unknown(field, unknown, self.stored(field), factory)?,
            None => return Ok(()),
        };
        let count = self.unknown.remove(&number).map_or(0, |unknown| unknown.len());
        trace!(
            number,
            field = field.full_name(),
            count,
            "promoted unknown field"
        );
        match field {
            FieldRef::Field(_) => {
                self.fields.insert(number, value);
            }
            FieldRef::Extension(extension) => {
                self.extensions.insert(number, (extension.clone(), value));
            }
        }
        Ok(())
    }

    fn clear_oneof_fields(&mut self, field: &FieldRef) {
        if let Some(oneof) = field.containing_oneof() {
            for other in oneof.fields() {
                if other.number() != field.number() {
                    self.fields.remove(&other.number());
                }
            }
        }
    }

    pub(super) fn unknown_fields(&self) -> impl Iterator<Item = &UnknownField> + '_ {
        self.unknown.values().flatten()
    }

    pub(super) fn clear_unknown_fields(&mut self) {
        self.unknown.clear();
    }

    pub(super) fn clear_all(&mut self) {
        self.fields.clear();
        self.extensions.clear();
        self.unknown.clear();
    }

    #[allow(clippy::type_complexity)]
    pub(super) fn into_parts(
        self,
    ) -> (
        BTreeMap<u32, Value>,
        BTreeMap<u32, (ExtensionDescriptor, Value)>,
        BTreeMap<u32, Vec<UnknownField>>,
    ) {
        (self.fields, self.extensions, self.unknown)
    }

    pub(super) fn known_value(&self, number: u32) -> Option<&Value> {
        self.fields.get(&number)
    }

    pub(super) fn known_fields(&self) -> impl Iterator<Item = (u32, &Value)> + '_ {
        self.fields.iter().map(|(&number, value)| (number, value))
    }

    pub(super) fn extensions(&self) -> impl Iterator<Item = (&ExtensionDescriptor, &Value)> + '_ {
        self.extensions
            .values()
            .map(|(extension, value)| (extension, value))
    }

    /// Every stored entry, ordered by field number.
    pub(super) fn iter(&self) -> Vec<StoredField<'_>> {
        let mut entries: Vec<(u32, StoredField<'_>)> = Vec::with_capacity(
            self.fields.len() + self.extensions.len() + self.unknown.len(),
        );
        entries.extend(
            self.fields
                .iter()
                .map(|(&number, value)| (number, StoredField::Field(number, value))),
        );
        entries.extend(
            self.extensions
                .iter()
                .map(|(&number, (ext, value))| (number, StoredField::Extension(ext, value))),
        );
        entries.extend(
            self.unknown
                .iter()
                .map(|(&number, unknown)| (number, StoredField::Unknown(unknown))),
        );
        entries.sort_by_key(|(number, _)| *number);
        entries.into_iter().map(|(_, entry)| entry).collect()
    }
}

/// Parses retained unknown occurrences as values of `field`, merging onto `existing`.
fn parse_unknown(
    field: &FieldRef,
    unknown: &[UnknownField],
    existing: Option<&Value>,
    factory: &(impl MessageFactory + ?Sized),
) -> Result<Value, DecodeError> {
    let mut bytes = Buffer::new();
    for occurrence in unknown {
        bytes.encode_unknown_field(occurrence);
    }

    let mut value = match existing {
        Some(existing) => existing.clone(),
        None => field.default_field_value(),
    };
    let mut reader = Buffer::from_slice(bytes.bytes());
    while !reader.eof() {
        let (_, wire_type) = reader.decode_tag_and_wire_type()?;
        let decoded = reader.decode_known_field(field, wire_type, factory)?;
        if let Some(decoded) = decoded_into_value(field, decoded) {
            merge_values(&mut value, decoded, factory)?;
        }
    }
    Ok(value)
}

/// Shapes one decoded occurrence like the field's stored value.
fn decoded_into_value(field: &impl FieldDescriptorLike, decoded: DecodedValue) -> Option<Value> {
    match decoded {
        DecodedValue::Single(value) if field.is_list() => Some(Value::List(vec![value])),
        DecodedValue::Single(value) => Some(value),
        DecodedValue::Packed(values) if field.is_list() => Some(Value::List(values)),
        // A packed run on a singular field keeps the last element.
        DecodedValue::Packed(values) => values.into_iter().last(),
        DecodedValue::MapEntry(key, value) => {
            let mut map: HashMap<MapKey, Value> = HashMap::with_capacity(1);
            map.insert(key, value);
            Some(Value::Map(map))
        }
    }
}

fn merge_values(
    slot: &mut Value,
    value: Value,
    factory: &(impl MessageFactory + ?Sized),
) -> Result<(), DecodeError> {
    match (slot, value) {
        (Value::List(list), Value::List(values)) => list.extend(values),
        (Value::Map(map), Value::Map(values)) => map.extend(values),
        (Value::Message(message), Value::Message(other)) => message.merge_inner(other, factory)?,
        (slot, value) => *slot = value,
    }
    Ok(())
}

impl FieldDescriptorLike for FieldDescriptor {
    fn number(&self) -> u32 {
        self.number()
    }

    fn kind(&self) -> Kind {
        self.kind()
    }

    fn is_group(&self) -> bool {
        self.is_group()
    }

    fn is_list(&self) -> bool {
        self.is_list()
    }

    fn is_map(&self) -> bool {
        self.is_map()
    }

    fn is_packed(&self) -> bool {
        self.is_packed()
    }

    fn supports_presence(&self) -> bool {
        self.supports_presence()
    }

    fn containing_oneof(&self) -> Option<OneofDescriptor> {
        self.containing_oneof()
    }

    fn field_descriptor_proto(&self) -> &FieldDescriptorProto {
        self.field_descriptor_proto()
    }
}

impl FieldDescriptorLike for ExtensionDescriptor {
    fn number(&self) -> u32 {
        self.number()
    }

    fn kind(&self) -> Kind {
        self.kind()
    }

    fn is_group(&self) -> bool {
        self.is_group()
    }

    fn is_list(&self) -> bool {
        self.is_list()
    }

    fn is_map(&self) -> bool {
        self.is_map()
    }

    fn is_packed(&self) -> bool {
        self.is_packed()
    }

    fn supports_presence(&self) -> bool {
        self.supports_presence()
    }

    fn containing_oneof(&self) -> Option<OneofDescriptor> {
        None
    }

    fn field_descriptor_proto(&self) -> &FieldDescriptorProto {
        self.field_descriptor_proto()
    }
}

impl FieldDescriptorLike for FieldRef {
    fn number(&self) -> u32 {
        self.number()
    }

    fn kind(&self) -> Kind {
        self.kind()
    }

    fn is_group(&self) -> bool {
        match self {
            FieldRef::Field(field) => field.is_group(),
            FieldRef::Extension(extension) => extension.is_group(),
        }
    }

    fn is_list(&self) -> bool {
        match self {
            FieldRef::Field(field) => field.is_list(),
            FieldRef::Extension(extension) => extension.is_list(),
        }
    }

    fn is_map(&self) -> bool {
        match self {
            FieldRef::Field(field) => field.is_map(),
            FieldRef::Extension(extension) => extension.is_map(),
        }
    }

    fn is_packed(&self) -> bool {
        match self {
            FieldRef::Field(field) => field.is_packed(),
            FieldRef::Extension(extension) => extension.is_packed(),
        }
    }

    fn supports_presence(&self) -> bool {
        match self {
            FieldRef::Field(field) => field.supports_presence(),
            FieldRef::Extension(extension) => extension.supports_presence(),
        }
    }

    fn containing_oneof(&self) -> Option<OneofDescriptor> {
        match self {
            FieldRef::Field(field) => field.containing_oneof(),
            FieldRef::Extension(_) => None,
        }
    }

    fn field_descriptor_proto(&self) -> &FieldDescriptorProto {
        match self {
            FieldRef::Field(field) => field.field_descriptor_proto(),
            FieldRef::Extension(extension) => extension.field_descriptor_proto(),
        }
    }
}
