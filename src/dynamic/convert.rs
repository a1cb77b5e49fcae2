use std::collections::HashSet;

use prost::Message;
use prost_reflect::{FieldDescriptor, Kind, MessageDescriptor, ReflectMessage};

use super::{DynamicMessage, FieldError};

impl DynamicMessage {
    /// Creates a dynamic copy of a statically typed message.
    pub fn try_from_message<M>(message: &M) -> Result<Self, FieldError>
    where
        M: ReflectMessage,
    {
        let mut dynamic = DynamicMessage::new(message.descriptor());
        dynamic.try_merge_from_message(message)?;
        Ok(dynamic)
    }

    /// Merges the fields of a statically typed message into this message.
    ///
    /// The two types need not be identical, but every field number both know must have a
    /// compatible shape. This is checked before anything is copied, so on error this message is
    /// unchanged. Fields only this message's type declares are left as they are. Fields only
    /// `message`'s type declares become unknown fields.
    pub fn try_merge_from_message<M>(&mut self, message: &M) -> Result<(), FieldError>
    where
        M: ReflectMessage,
    {
        check_message_shape(&message.descriptor(), &self.desc, &mut HashSet::new())?;
        let mut merged = self.clone();
        merged.merge(&Message::encode_to_vec(message))?;
        *self = merged;
        Ok(())
    }

    /// Merges the fields of this message into a statically typed message.
    ///
    /// Shapes are checked as for [`try_merge_from_message`](DynamicMessage::try_merge_from_message).
    /// `prost` messages do not retain unknown fields, so fields `M` does not declare are dropped.
    pub fn try_merge_into_message<M>(&self, message: &mut M) -> Result<(), FieldError>
    where
        M: ReflectMessage + Clone,
    {
        let target = message.descriptor();
        check_message_shape(&self.desc, &target, &mut HashSet::new())?;
        let mut merged = message.clone();
        Message::merge(&mut merged, self.encode_to_vec().as_slice())
            .map_err(|err| FieldError::incompatible(target.full_name(), err.to_string()))?;
        *message = merged;
        Ok(())
    }

    /// Converts this message into a statically typed message.
    pub fn try_convert_to_message<M>(&self) -> Result<M, FieldError>
    where
        M: ReflectMessage + Clone + Default,
    {
        let mut message = M::default();
        self.try_merge_into_message(&mut message)?;
        Ok(message)
    }
}

/// Checks that every field number declared by both types can be transcoded.
fn check_message_shape(
    source: &MessageDescriptor,
    target: &MessageDescriptor,
    visited: &mut HashSet<(String, String)>,
) -> Result<(), FieldError> {
    if !visited.insert((source.full_name().to_owned(), target.full_name().to_owned())) {
        return Ok(());
    }

    for source_field in source.fields() {
        if let Some(target_field) = target.get_field(source_field.number()) {
            check_field_shape(&source_field, &target_field, visited)?;
        }
    }
    Ok(())
}

fn check_field_shape(
    source: &FieldDescriptor,
    target: &FieldDescriptor,
    visited: &mut HashSet<(String, String)>,
) -> Result<(), FieldError> {
    let name = source.full_name();
    if source.is_map() != target.is_map() {
        return Err(FieldError::incompatible(
            name,
            format!("map field corresponds to non-map field '{}'", target.full_name()),
        ));
    }
    if source.is_list() != target.is_list() {
        return Err(FieldError::incompatible(
            name,
            format!(
                "repeated field corresponds to singular field '{}'",
                target.full_name()
            ),
        ));
    }
    if source.is_group() != target.is_group() {
        return Err(FieldError::incompatible(
            name,
            format!("group corresponds to non-group field '{}'", target.full_name()),
        ));
    }

    if source.is_map() {
        match (source.kind(), target.kind()) {
            (Kind::Message(source_entry), Kind::Message(target_entry)) => {
                check_kind(
                    name,
                    &source_entry.map_entry_key_field().kind(),
                    &target_entry.map_entry_key_field().kind(),
                    visited,
                )?;
                check_kind(
                    name,
                    &source_entry.map_entry_value_field().kind(),
                    &target_entry.map_entry_value_field().kind(),
                    visited,
                )
            }
            _ => Err(FieldError::incompatible(name, "map field without an entry type")),
        }
    } else {
        check_kind(name, &source.kind(), &target.kind(), visited)
    }
}

fn check_kind(
    name: &str,
    source: &Kind,
    target: &Kind,
    visited: &mut HashSet<(String, String)>,
) -> Result<(), FieldError> {
    match (source, target) {
        (Kind::Message(source), Kind::Message(target)) => {
            check_message_shape(source, target, visited)
        }
        (Kind::Enum(_), Kind::Enum(_) | Kind::Int32) | (Kind::Int32, Kind::Enum(_)) => Ok(()),
        (source, target) if source == target => Ok(()),
        (source, target) => Err(FieldError::incompatible(
            name,
            format!("type {:?} cannot be converted to {:?}", source, target),
        )),
    }
}
