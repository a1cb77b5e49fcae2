//! A protobuf message whose type is only known at runtime.
//!
//! [`DynamicMessage`] holds a [`MessageDescriptor`] and a [`Value`] for each field that has been
//! set. Fields the descriptor does not know about are kept as [`UnknownField`]s, and parsed on
//! first use if an extension for them becomes known later.

mod convert;
mod error;
mod fields;
mod message;
mod registry;
mod unknown;
mod value;

use std::borrow::Cow;

use prost_reflect::{Cardinality, ExtensionDescriptor, FieldDescriptor, MessageDescriptor};

pub use self::error::{FieldError, FieldErrorKind};
pub(crate) use self::fields::{is_packable, FieldDescriptorLike};
pub use self::registry::ExtensionRegistry;
pub use self::unknown::{UnknownField, UnknownFieldValue};
pub use self::value::{MapKey, Value};

use self::fields::DynamicMessageFieldSet;
use crate::codec::{FieldFinder, FieldRef};

/// A protobuf message whose type is only known at runtime, through a [`MessageDescriptor`].
///
/// Every accessor comes in two forms. The `try_` form returns a [`FieldError`] if the field
/// does not belong to this message, the value has the wrong type, or retained unknown data for
/// the field cannot be parsed. The plain form panics in those cases.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    desc: MessageDescriptor,
    extensions: ExtensionRegistry,
    fields: DynamicMessageFieldSet,
}

impl DynamicMessage {
    /// An empty message of type `desc`.
    pub fn new(desc: MessageDescriptor) -> Self {
        DynamicMessage::new_with_extensions(desc, ExtensionRegistry::default())
    }

    /// Creates a new, empty message which also recognizes the extensions in `extensions` when
    /// decoding, in addition to those in the descriptor's pool.
    ///
    /// Nested messages created while decoding share the same registry.
    pub fn new_with_extensions(desc: MessageDescriptor, extensions: ExtensionRegistry) -> Self {
        DynamicMessage {
            desc,
            extensions,
            fields: DynamicMessageFieldSet::default(),
        }
    }

    /// Gets a reference to the message type of this message.
    pub fn descriptor(&self) -> MessageDescriptor {
        self.desc.clone()
    }

    /// Gets the extension registry used when decoding this message.
    pub fn extension_registry(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Whether `field_desc` is set.
    ///
    /// Fields with [presence](FieldDescriptor::supports_presence) are set once assigned, even to
    /// their default. Other fields count as set only while they hold a non-default value.
    pub fn try_has_field(&self, field_desc: &FieldDescriptor) -> Result<bool, FieldError> {
        let field = self.check_field(field_desc)?;
        Ok(self.fields.has(&field, &self.extensions)?)
    }

    /// Panicking version of [`try_has_field`](DynamicMessage::try_has_field).
    pub fn has_field(&self, field_desc: &FieldDescriptor) -> bool {
        or_panic(self.try_has_field(field_desc))
    }

    /// The value of `field_desc`, falling back to its default while unset.
    pub fn try_get_field(&self, field_desc: &FieldDescriptor) -> Result<Cow<'_, Value>, FieldError> {
        let field = self.check_field(field_desc)?;
        Ok(self.fields.get(&field, &self.extensions)?)
    }

    /// Panicking version of [`try_get_field`](DynamicMessage::try_get_field).
    pub fn get_field(&self, field_desc: &FieldDescriptor) -> Cow<'_, Value> {
        or_panic(self.try_get_field(field_desc))
    }

    /// Mutable access to `field_desc`. An unset field is stored with its default first.
    pub fn try_get_field_mut(
        &mut self,
        field_desc: &FieldDescriptor,
    ) -> Result<&mut Value, FieldError> {
        let field = self.check_field(field_desc)?;
        Ok(self.fields.get_mut(&field, &self.extensions)?)
    }

    /// Panicking version of [`try_get_field_mut`](DynamicMessage::try_get_field_mut).
    pub fn get_field_mut(&mut self, field_desc: &FieldDescriptor) -> &mut Value {
        or_panic(self.try_get_field_mut(field_desc))
    }

    /// Stores `value` in `field_desc`.
    ///
    /// Setting a member of a oneof clears the other members. Setting a field without presence
    /// to its default value clears it.
    pub fn try_set_field(
        &mut self,
        field_desc: &FieldDescriptor,
        value: Value,
    ) -> Result<(), FieldError> {
        let field = self.check_field(field_desc)?;
        check_value(&field, &value)?;
        self.fields.set(&field, value);
        Ok(())
    }

    /// Panicking version of [`try_set_field`](DynamicMessage::try_set_field).
    pub fn set_field(&mut self, field_desc: &FieldDescriptor, value: Value) {
        or_panic(self.try_set_field(field_desc, value))
    }

    /// Unsets `field_desc`, so it is neither reported by `has_field` nor encoded.
    pub fn try_clear_field(&mut self, field_desc: &FieldDescriptor) -> Result<(), FieldError> {
        let field = self.check_field(field_desc)?;
        self.fields.clear(&field);
        Ok(())
    }

    /// Panicking version of [`try_clear_field`](DynamicMessage::try_clear_field).
    pub fn clear_field(&mut self, field_desc: &FieldDescriptor) {
        or_panic(self.try_clear_field(field_desc))
    }

    /// Returns `true` if this message has a field or extension set with the given number.
    pub fn try_has_field_by_number(&self, number: u32) -> Result<bool, FieldError> {
        let field = self.field_by_number(number)?;
        Ok(self.fields.has(&field, &self.extensions)?)
    }

    /// Gets the value of the field or extension with the given number.
    pub fn try_get_field_by_number(&self, number: u32) -> Result<Cow<'_, Value>, FieldError> {
        let field = self.field_by_number(number)?;
        Ok(self.fields.get(&field, &self.extensions)?)
    }

    /// Panicking version of [`try_get_field_by_number`](DynamicMessage::try_get_field_by_number).
    pub fn get_field_by_number(&self, number: u32) -> Cow<'_, Value> {
        or_panic(self.try_get_field_by_number(number))
    }

    /// Gets a mutable reference to the field or extension with the given number.
    pub fn try_get_field_by_number_mut(&mut self, number: u32) -> Result<&mut Value, FieldError> {
        let field = self.field_by_number(number)?;
        Ok(self.fields.get_mut(&field, &self.extensions)?)
    }

    /// Sets the value of the field or extension with the given number.
    pub fn try_set_field_by_number(&mut self, number: u32, value: Value) -> Result<(), FieldError> {
        let field = self.field_by_number(number)?;
        check_value(&field, &value)?;
        self.fields.set(&field, value);
        Ok(())
    }

    /// Panicking version of [`try_set_field_by_number`](DynamicMessage::try_set_field_by_number).
    pub fn set_field_by_number(&mut self, number: u32, value: Value) {
        or_panic(self.try_set_field_by_number(number, value))
    }

    /// Clears the field or extension with the given number, including any unknown data retained
    /// for it.
    pub fn try_clear_field_by_number(&mut self, number: u32) -> Result<(), FieldError> {
        let field = self.field_by_number(number)?;
        self.fields.clear(&field);
        Ok(())
    }

    /// Returns `true` if this message has the field with the given name set.
    pub fn try_has_field_by_name(&self, name: &str) -> Result<bool, FieldError> {
        let field = self.field_by_name(name)?;
        Ok(self.fields.has(&field, &self.extensions)?)
    }

    /// Gets the value of the field with the given name.
    pub fn try_get_field_by_name(&self, name: &str) -> Result<Cow<'_, Value>, FieldError> {
        let field = self.field_by_name(name)?;
        Ok(self.fields.get(&field, &self.extensions)?)
    }

    /// Panicking version of [`try_get_field_by_name`](DynamicMessage::try_get_field_by_name).
    pub fn get_field_by_name(&self, name: &str) -> Cow<'_, Value> {
        or_panic(self.try_get_field_by_name(name))
    }

    /// Gets a mutable reference to the field with the given name.
    pub fn try_get_field_by_name_mut(&mut self, name: &str) -> Result<&mut Value, FieldError> {
        let field = self.field_by_name(name)?;
        Ok(self.fields.get_mut(&field, &self.extensions)?)
    }

    /// Sets the value of the field with the given name.
    pub fn try_set_field_by_name(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        let field = self.field_by_name(name)?;
        check_value(&field, &value)?;
        self.fields.set(&field, value);
        Ok(())
    }

    /// Panicking version of [`try_set_field_by_name`](DynamicMessage::try_set_field_by_name).
    pub fn set_field_by_name(&mut self, name: &str, value: Value) {
        or_panic(self.try_set_field_by_name(name, value))
    }

    /// Unsets the field called `name`.
    pub fn try_clear_field_by_name(&mut self, name: &str) -> Result<(), FieldError> {
        let field = self.field_by_name(name)?;
        self.fields.clear(&field);
        Ok(())
    }

    /// Whether the extension is set, either as a value or as retained unknown data.
    pub fn try_has_extension(
        &self,
        extension_desc: &ExtensionDescriptor,
    ) -> Result<bool, FieldError> {
        let field = self.check_extension(extension_desc)?;
        Ok(self.fields.has(&field, &self.extensions)?)
    }

    /// Panicking version of [`try_has_extension`](DynamicMessage::try_has_extension).
    pub fn has_extension(&self, extension_desc: &ExtensionDescriptor) -> bool {
        or_panic(self.try_has_extension(extension_desc))
    }

    /// The value of the extension, falling back to its default while unset.
    ///
    /// Unknown data retained under the extension's number is parsed, but not cached.
    pub fn try_get_extension(
        &self,
        extension_desc: &ExtensionDescriptor,
    ) -> Result<Cow<'_, Value>, FieldError> {
        let field = self.check_extension(extension_desc)?;
        Ok(self.fields.get(&field, &self.extensions)?)
    }

    /// Panicking version of [`try_get_extension`](DynamicMessage::try_get_extension).
    pub fn get_extension(&self, extension_desc: &ExtensionDescriptor) -> Cow<'_, Value> {
        or_panic(self.try_get_extension(extension_desc))
    }

    /// Gets a mutable reference to the value of the given extension field.
    ///
    /// Unknown data retained under the extension's number is parsed and moved into the value.
    pub fn try_get_extension_mut(
        &mut self,
        extension_desc: &ExtensionDescriptor,
    ) -> Result<&mut Value, FieldError> {
        let field = self.check_extension(extension_desc)?;
        Ok(self.fields.get_mut(&field, &self.extensions)?)
    }

    /// Panicking version of [`try_get_extension_mut`](DynamicMessage::try_get_extension_mut).
    pub fn get_extension_mut(&mut self, extension_desc: &ExtensionDescriptor) -> &mut Value {
        or_panic(self.try_get_extension_mut(extension_desc))
    }

    /// Stores `value` in the extension.
    pub fn try_set_extension(
        &mut self,
        extension_desc: &ExtensionDescriptor,
        value: Value,
    ) -> Result<(), FieldError> {
        let field = self.check_extension(extension_desc)?;
        check_value(&field, &value)?;
        self.fields.set(&field, value);
        Ok(())
    }

    /// Panicking version of [`try_set_extension`](DynamicMessage::try_set_extension).
    pub fn set_extension(&mut self, extension_desc: &ExtensionDescriptor, value: Value) {
        or_panic(self.try_set_extension(extension_desc, value))
    }

    /// Unsets the extension and drops unknown data under its number.
    pub fn try_clear_extension(
        &mut self,
        extension_desc: &ExtensionDescriptor,
    ) -> Result<(), FieldError> {
        let field = self.check_extension(extension_desc)?;
        self.fields.clear(&field);
        Ok(())
    }

    /// Panicking version of [`try_clear_extension`](DynamicMessage::try_clear_extension).
    pub fn clear_extension(&mut self, extension_desc: &ExtensionDescriptor) {
        or_panic(self.try_clear_extension(extension_desc))
    }

    /// Gets the value stored under `key` in a map field.
    pub fn try_get_map_entry(
        &self,
        field_desc: &FieldDescriptor,
        key: &MapKey,
    ) -> Result<Option<Value>, FieldError> {
        let field = self.check_map(field_desc, Some(key), None)?;
        let value = self.fields.get(&field, &self.extensions)?;
        Ok(value.as_map().and_then(|map| map.get(key)).cloned())
    }

    /// Panicking version of [`try_get_map_entry`](DynamicMessage::try_get_map_entry).
    pub fn get_map_entry(&self, field_desc: &FieldDescriptor, key: &MapKey) -> Option<Value> {
        or_panic(self.try_get_map_entry(field_desc, key))
    }

    /// Inserts an entry into a map field, returning the previous value for `key`.
    pub fn try_put_map_entry(
        &mut self,
        field_desc: &FieldDescriptor,
        key: MapKey,
        value: Value,
    ) -> Result<Option<Value>, FieldError> {
        let field = self.check_map(field_desc, Some(&key), Some(&value))?;
        let map = self.fields.get_mut(&field, &self.extensions)?;
        Ok(map.as_map_mut().and_then(|map| map.insert(key, value)))
    }

    /// Panicking version of [`try_put_map_entry`](DynamicMessage::try_put_map_entry).
    pub fn put_map_entry(
        &mut self,
        field_desc: &FieldDescriptor,
        key: MapKey,
        value: Value,
    ) -> Option<Value> {
        or_panic(self.try_put_map_entry(field_desc, key, value))
    }

    /// Removes an entry from a map field, returning its value.
    pub fn try_remove_map_entry(
        &mut self,
        field_desc: &FieldDescriptor,
        key: &MapKey,
    ) -> Result<Option<Value>, FieldError> {
        let field = self.check_map(field_desc, Some(key), None)?;
        let map = self.fields.get_mut(&field, &self.extensions)?;
        let removed = map.as_map_mut().and_then(|map| map.remove(key));
        self.fields.prune(&field);
        Ok(removed)
    }

    /// Panicking version of [`try_remove_map_entry`](DynamicMessage::try_remove_map_entry).
    pub fn remove_map_entry(&mut self, field_desc: &FieldDescriptor, key: &MapKey) -> Option<Value> {
        or_panic(self.try_remove_map_entry(field_desc, key))
    }

    /// Returns the number of entries in a map field.
    pub fn try_map_len(&self, field_desc: &FieldDescriptor) -> Result<usize, FieldError> {
        let field = self.check_map(field_desc, None, None)?;
        let value = self.fields.get(&field, &self.extensions)?;
        Ok(value.as_map().map_or(0, |map| map.len()))
    }

    /// Returns the number of elements in a repeated field.
    pub fn try_repeated_len(&self, field_desc: &FieldDescriptor) -> Result<usize, FieldError> {
        let field = self.check_repeated(field_desc, None)?;
        let value = self.fields.get(&field, &self.extensions)?;
        Ok(value.as_list().map_or(0, |list| list.len()))
    }

    /// Panicking version of [`try_repeated_len`](DynamicMessage::try_repeated_len).
    pub fn repeated_len(&self, field_desc: &FieldDescriptor) -> usize {
        or_panic(self.try_repeated_len(field_desc))
    }

    /// Gets the element at `index` of a repeated field.
    pub fn try_get_repeated(
        &self,
        field_desc: &FieldDescriptor,
        index: usize,
    ) -> Result<Value, FieldError> {
        let field = self.check_repeated(field_desc, None)?;
        let value = self.fields.get(&field, &self.extensions)?;
        let list = value.as_list().unwrap_or_default();
        match list.get(index) {
            Some(element) => Ok(element.clone()),
            None => Err(index_out_of_range(field_desc, index, list.len())),
        }
    }

    /// Panicking version of [`try_get_repeated`](DynamicMessage::try_get_repeated).
    pub fn get_repeated(&self, field_desc: &FieldDescriptor, index: usize) -> Value {
        or_panic(self.try_get_repeated(field_desc, index))
    }

    /// Replaces the element at `index` of a repeated field.
    pub fn try_set_repeated(
        &mut self,
        field_desc: &FieldDescriptor,
        index: usize,
        value: Value,
    ) -> Result<(), FieldError> {
        let field = self.check_repeated(field_desc, Some(&value))?;
        let list = self.fields.get_mut(&field, &self.extensions)?;
        match list.as_list_mut() {
            Some(list) if index < list.len() => {
                list[index] = value;
                Ok(())
            }
            list => Err(index_out_of_range(
                field_desc,
                index,
                list.map_or(0, |list| list.len()),
            )),
        }
    }

    /// Panicking version of [`try_set_repeated`](DynamicMessage::try_set_repeated).
    pub fn set_repeated(&mut self, field_desc: &FieldDescriptor, index: usize, value: Value) {
        or_panic(self.try_set_repeated(field_desc, index, value))
    }

    /// Appends an element to a repeated field.
    pub fn try_add_repeated(
        &mut self,
        field_desc: &FieldDescriptor,
        value: Value,
    ) -> Result<(), FieldError> {
        let field = self.check_repeated(field_desc, Some(&value))?;
        if let Some(list) = self.fields.get_mut(&field, &self.extensions)?.as_list_mut() {
            list.push(value);
        }
        Ok(())
    }

    /// Panicking version of [`try_add_repeated`](DynamicMessage::try_add_repeated).
    pub fn add_repeated(&mut self, field_desc: &FieldDescriptor, value: Value) {
        or_panic(self.try_add_repeated(field_desc, value))
    }

    /// Iterates over the fields of this message which are set, in field number order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldDescriptor, &Value)> + '_ {
        self.fields.known_fields().filter_map(move |(number, value)| {
            let field = self.desc.get_field(number)?;
            if field.has(value) {
                Some((field, value))
            } else {
                None
            }
        })
    }

    /// Iterates over the extension fields of this message which are set.
    pub fn extensions(&self) -> impl Iterator<Item = (&ExtensionDescriptor, &Value)> + '_ {
        self.fields
            .extensions()
            .filter(|&(extension, value)| extension.has(value))
    }

    /// Iterates over the unknown fields retained by this message, in field number order.
    pub fn unknown_fields(&self) -> impl Iterator<Item = &UnknownField> + '_ {
        self.fields.unknown_fields()
    }

    /// Discards every unknown field.
    pub fn clear_unknown_fields(&mut self) {
        self.fields.clear_unknown_fields();
    }

    /// Clears every field, extension and unknown field.
    pub fn clear(&mut self) {
        self.fields.clear_all();
    }

    /// Returns the names of required fields which are not set.
    ///
    /// Fields of nested messages are named by their path, for example `inner.id`. Elements of
    /// repeated fields include their index (`items[2].id`) and map values their key
    /// (`entries["a"].id`). An empty result means the message is fully initialized.
    pub fn validate(&self) -> Vec<String> {
        let mut missing = Vec::new();
        self.collect_missing("", &mut missing);
        missing
    }

    fn collect_missing(&self, prefix: &str, missing: &mut Vec<String>) {
        for field in self.desc.fields() {
            let name = format!("{}{}", prefix, field.name());
            match self.fields.known_value(field.number()) {
                None if field.cardinality() == Cardinality::Required => missing.push(name),
                None => (),
                Some(Value::Message(message)) => {
                    message.collect_missing(&format!("{}.", name), missing)
                }
                Some(Value::List(list)) => {
                    for (index, element) in list.iter().enumerate() {
                        if let Value::Message(message) = element {
                            message.collect_missing(&format!("{}[{}].", name, index), missing);
                        }
                    }
                }
                Some(Value::Map(map)) => {
                    let mut entries: Vec<_> = map.iter().collect();
                    entries.sort_by(|l, r| l.0.cmp(r.0));
                    for (key, value) in entries {
                        if let Value::Message(message) = value {
                            let key = map_key_label(key);
                            message.collect_missing(&format!("{}[{}].", name, key), missing);
                        }
                    }
                }
                Some(_) => (),
            }
        }
        for (extension, value) in self.fields.extensions() {
            if let Value::Message(message) = value {
                message.collect_missing(&format!("{}[{}].", prefix, extension.full_name()), missing);
            }
        }
    }

    fn check_field(&self, field_desc: &FieldDescriptor) -> Result<FieldRef, FieldError> {
        if field_desc.parent_message().full_name() == self.desc.full_name() {
            if let Some(field) = self.desc.get_field(field_desc.number()) {
                if field.name() == field_desc.name() {
                    return Ok(FieldRef::Field(field));
                }
            }
        }
        Err(FieldError::type_mismatch(
            field_desc.full_name(),
            self.desc.full_name(),
        ))
    }

    fn check_extension(&self, extension_desc: &ExtensionDescriptor) -> Result<FieldRef, FieldError> {
        let in_range = self
            .desc
            .extension_ranges()
            .any(|range| range.contains(&extension_desc.number()));
        if in_range && extension_desc.containing_message().full_name() == self.desc.full_name() {
            Ok(FieldRef::Extension(extension_desc.clone()))
        } else {
            Err(FieldError::type_mismatch(
                extension_desc.full_name(),
                self.desc.full_name(),
            ))
        }
    }

    fn check_map(
        &self,
        field_desc: &FieldDescriptor,
        key: Option<&MapKey>,
        value: Option<&Value>,
    ) -> Result<FieldRef, FieldError> {
        let field = self.check_field(field_desc)?;
        if !field_desc.is_map() {
            return Err(FieldErrorKind::FieldIsNotMap(field_desc.full_name().to_owned()).into());
        }
        if let Some(entry) = field_desc.kind().as_message() {
            if let Some(key) = key {
                if !key.is_valid(&entry.map_entry_key_field().kind()) {
                    return Err(invalid_value(field_desc.full_name(), key));
                }
            }
            if let Some(value) = value {
                if !value.is_valid(&entry.map_entry_value_field().kind()) {
                    return Err(invalid_value(field_desc.full_name(), value));
                }
            }
        }
        Ok(field)
    }

    fn check_repeated(
        &self,
        field_desc: &FieldDescriptor,
        value: Option<&Value>,
    ) -> Result<FieldRef, FieldError> {
        let field = self.check_field(field_desc)?;
        if !field_desc.is_list() {
            return Err(
                FieldErrorKind::FieldIsNotRepeated(field_desc.full_name().to_owned()).into(),
            );
        }
        if let Some(value) = value {
            if !value.is_valid(&field_desc.kind()) {
                return Err(invalid_value(field_desc.full_name(), value));
            }
        }
        Ok(field)
    }

    fn field_by_number(&self, number: u32) -> Result<FieldRef, FieldError> {
        self.find_field(number)
            .ok_or_else(|| FieldErrorKind::UnknownTagNumber(number).into())
    }

    fn field_by_name(&self, name: &str) -> Result<FieldRef, FieldError> {
        self.desc
            .get_field_by_name(name)
            .map(FieldRef::Field)
            .ok_or_else(|| FieldErrorKind::UnknownFieldName(name.to_owned()).into())
    }
}

impl FieldFinder for DynamicMessage {
    fn find_field(&self, number: u32) -> Option<FieldRef> {
        if let Some(field) = self.desc.get_field(number) {
            Some(FieldRef::Field(field))
        } else if let Some(extension) = self.fields.stored_extension(number) {
            Some(FieldRef::Extension(extension.clone()))
        } else if let Some(extension) = self.desc.get_extension(number) {
            Some(FieldRef::Extension(extension))
        } else {
            self.extensions
                .find(self.desc.full_name(), number)
                .cloned()
                .map(FieldRef::Extension)
        }
    }
}

/// Stored values which do not count as set, such as a zero left behind by
/// [`get_field_mut`](DynamicMessage::get_field_mut), are ignored.
impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.desc == other.desc
            && self.fields().eq(other.fields())
            && self.extensions().eq(other.extensions())
            && self.unknown_fields().eq(other.unknown_fields())
    }
}

impl Value {
    /// Whether this equals the default of `field_desc`.
    pub fn is_default_for_field(&self, field_desc: &FieldDescriptor) -> bool {
        field_desc.is_default_field_value(self)
    }

    /// Whether this can be stored in `field_desc`, taking its cardinality into account.
    pub fn is_valid_for_field(&self, field_desc: &FieldDescriptor) -> bool {
        field_desc.is_valid_field_value(self)
    }

    /// Whether this can be stored in the extension, taking its cardinality into account.
    pub fn is_valid_for_extension(&self, extension_desc: &ExtensionDescriptor) -> bool {
        extension_desc.is_valid_field_value(self)
    }
}

fn check_value(field: &FieldRef, value: &Value) -> Result<(), FieldError> {
    if field.is_valid_field_value(value) {
        Ok(())
    } else {
        Err(invalid_value(field.full_name(), value))
    }
}

fn invalid_value(field: &str, value: &impl std::fmt::Debug) -> FieldError {
    FieldErrorKind::InvalidValue {
        field: field.to_owned(),
        value: format!("{:?}", value),
    }
    .into()
}

fn index_out_of_range(field_desc: &FieldDescriptor, index: usize, len: usize) -> FieldError {
    FieldErrorKind::IndexOutOfRange {
        field: field_desc.full_name().to_owned(),
        index,
        len,
    }
    .into()
}

fn map_key_label(key: &MapKey) -> String {
    match key {
        MapKey::Bool(value) => value.to_string(),
        MapKey::I32(value) => value.to_string(),
        MapKey::I64(value) => value.to_string(),
        MapKey::U32(value) => value.to_string(),
        MapKey::U64(value) => value.to_string(),
        MapKey::String(value) => format!("{:?}", value),
    }
}

fn or_panic<T>(result: Result<T, FieldError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{}", err),
    }
}
