use std::ops::Range;

use prost_reflect::{Cardinality, FileDescriptor, Syntax};

use super::{
    names, BuildError, BuildErrorKind, Comments, EnumId, EnumValueId, FieldId, FieldShape,
    FieldType, FileId, MessageId, MethodId, NodeData, NodeId, NodeKind, OneofId, ParentId,
    SchemaBuilder, ServiceId,
};
use crate::{
    codec::{MAX_FIELD_NUMBER, RESERVED_FIELD_NUMBERS},
    dynamic::DynamicMessage,
};

pub(super) fn check_field_number(name: &str, number: i64) -> Result<u32, BuildError> {
    match u32::try_from(number) {
        Ok(n) if n >= 1 && n <= MAX_FIELD_NUMBER && !RESERVED_FIELD_NUMBERS.contains(&n) => Ok(n),
        _ => Err(BuildError::new(BuildErrorKind::InvalidNumber {
            name: name.to_owned(),
            number,
        })),
    }
}

fn check_range(name: &str, range: &Range<u32>) -> Result<(), BuildError> {
    let invalid = |number: u32| {
        BuildError::new(BuildErrorKind::InvalidNumber {
            name: name.to_owned(),
            number: i64::from(number),
        })
    };
    if range.start < 1 {
        Err(invalid(range.start))
    } else if range.end <= range.start || range.end > MAX_FIELD_NUMBER + 1 {
        Err(invalid(range.end))
    } else {
        Ok(())
    }
}

impl SchemaBuilder {
    /// Adds a message to a file or message, moving it from its current parent if it has one.
    pub fn add_message(
        &mut self,
        parent: impl Into<ParentId>,
        message: MessageId,
    ) -> Result<(), BuildError> {
        self.attach(parent.into().into(), message.node())
    }

    /// Adds an enum to a file or message, moving it from its current parent if it has one.
    pub fn add_enum(&mut self, parent: impl Into<ParentId>, enum_: EnumId) -> Result<(), BuildError> {
        self.attach(parent.into().into(), enum_.node())
    }

    /// Adds an extension created by [`new_extension`](SchemaBuilder::new_extension) to the scope
    /// it is declared in.
    pub fn add_extension(
        &mut self,
        parent: impl Into<ParentId>,
        extension: FieldId,
    ) -> Result<(), BuildError> {
        let parent = parent.into().into();
        if self.field_data(extension).extendee.is_none() {
            return Err(self.parent_error(
                extension.node(),
                parent,
                "only extensions can be added with add_extension",
            ));
        }
        self.attach(parent, extension.node())
    }

    /// Adds a field to a message, moving it from its current parent if it has one.
    pub fn add_field(&mut self, message: MessageId, field: FieldId) -> Result<(), BuildError> {
        if self.field_data(field).extendee.is_some() {
            return Err(self.parent_error(
                field.node(),
                message.node(),
                "extensions must be added with add_extension",
            ));
        }
        self.attach(message.node(), field.node())
    }

    /// Adds a oneof to a message, along with any fields already in it.
    pub fn add_oneof(&mut self, message: MessageId, oneof: OneofId) -> Result<(), BuildError> {
        self.attach(message.node(), oneof.node())
    }

    /// Adds a field to a oneof, moving it from its current parent if it has one.
    ///
    /// Map fields, repeated fields, extensions and proto3 `optional` fields cannot be part of a
    /// oneof.
    pub fn add_field_to_oneof(&mut self, oneof: OneofId, field: FieldId) -> Result<(), BuildError> {
        let data = self.field_data(field);
        let reason = if data.extendee.is_some() {
            Some("extensions cannot be part of a oneof")
        } else if data.shape == FieldShape::Map {
            Some("map fields cannot be part of a oneof")
        } else if data.label == Cardinality::Repeated {
            Some("repeated fields cannot be part of a oneof")
        } else if data.proto3_optional {
            Some("proto3 optional fields cannot be part of a oneof")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(self.parent_error(field.node(), oneof.node(), reason));
        }
        self.attach(oneof.node(), field.node())
    }

    /// Adds a value to an enum, moving it from its current parent if it has one.
    pub fn add_enum_value(&mut self, enum_: EnumId, value: EnumValueId) -> Result<(), BuildError> {
        self.attach(enum_.node(), value.node())
    }

    /// Adds a service to a file, moving it from its current parent if it has one.
    pub fn add_service(&mut self, file: FileId, service: ServiceId) -> Result<(), BuildError> {
        self.attach(file.node(), service.node())
    }

    /// Adds a method to a service, moving it from its current parent if it has one.
    pub fn add_method(&mut self, service: ServiceId, method: MethodId) -> Result<(), BuildError> {
        self.attach(service.node(), method.node())
    }

    /// Removes a node from its parent. The node and its descendants remain valid and may be
    /// added elsewhere.
    ///
    /// The message of a map or group field cannot be detached from its field.
    pub fn detach(&mut self, id: impl Into<NodeId>) -> Result<(), BuildError> {
        let id = id.into();
        if let Some(parent) = self.node(id).parent {
            if self.is_owned(id) {
                return Err(self.parent_error(
                    id,
                    parent,
                    "the structure of map and group fields cannot be changed",
                ));
            }
            self.unlink(id);
        }
        Ok(())
    }

    /// Detaches the child of `parent` named `name`, returning its id.
    pub fn remove_child(
        &mut self,
        parent: impl Into<NodeId>,
        name: &str,
    ) -> Result<NodeId, BuildError> {
        let child = self.find_child(parent, name).ok_or_else(|| {
            BuildError::new(BuildErrorKind::NotFound {
                name: name.to_owned(),
            })
        })?;
        self.detach(child)?;
        Ok(child)
    }

    /// Renames a node.
    ///
    /// Renaming a map field also renames its entry message. Renaming a group field renames its
    /// message to match, and renaming a group message renames its field to the lower-cased name.
    pub fn rename(&mut self, id: impl Into<NodeId>, name: &str) -> Result<(), BuildError> {
        let id = id.into();
        if self.kind(id) == NodeKind::File {
            self.node_mut(id).name = name.to_owned();
            return Ok(());
        }
        let renames = match &self.node(id).data {
            NodeData::Field(data) => match data.shape {
                FieldShape::Plain => {
                    if self.is_owned(id) {
                        return Err(BuildError::invalid_type(
                            &self.node(id).name,
                            "the fields of a map entry cannot be renamed",
                        ));
                    }
                    names::validate_identifier(name)?;
                    vec![(id, name.to_owned())]
                }
                FieldShape::Map => {
                    names::validate_identifier(name)?;
                    vec![
                        (id, name.to_owned()),
                        (self.node(id).children[0], names::map_entry_name(name)),
                    ]
                }
                FieldShape::Group => {
                    names::validate_group_field_name(name)?;
                    vec![
                        (id, name.to_owned()),
                        (self.node(id).children[0], names::group_message_name(name)),
                    ]
                }
            },
            NodeData::Message(_) => match self.owning_field(id) {
                Some((field, FieldShape::Group)) => {
                    names::validate_identifier(name)?;
                    vec![(id, name.to_owned()), (field, names::group_field_name(name))]
                }
                Some((_, _)) => {
                    return Err(BuildError::invalid_type(
                        &self.node(id).name,
                        "map entry messages are renamed with their field",
                    ))
                }
                None => {
                    names::validate_identifier(name)?;
                    vec![(id, name.to_owned())]
                }
            },
            _ => {
                names::validate_identifier(name)?;
                vec![(id, name.to_owned())]
            }
        };

        let renamed: Vec<NodeId> = renames.iter().map(|(node, _)| *node).collect();
        for (node, new_name) in &renames {
            if let Some(parent) = self.node(*node).parent {
                self.check_name_free(parent, new_name, &renamed)?;
            }
        }

        for (node, new_name) in renames {
            let scope = self.node(node).parent.and_then(|p| self.symbol_scope(p));
            if let Some(scope) = scope {
                let old_name = self.node(node).name.clone();
                let symbols = &mut self.node_mut(scope).symbols;
                if symbols.get(&old_name) == Some(&node) {
                    symbols.remove(&old_name);
                }
                symbols.insert(new_name.clone(), node);
            }
            self.node_mut(node).name = new_name;
        }
        Ok(())
    }

    /// Sets the number of a field or enum value. Passing `None` numbers the node automatically
    /// when built.
    ///
    /// Field numbers must be between 1 and 536,870,911, excluding the range 19,000 to 19,999
    /// reserved by the protobuf implementation, and unique within their message. Extensions
    /// must always have a number.
    pub fn set_number(
        &mut self,
        id: impl Into<NodeId>,
        number: Option<i32>,
    ) -> Result<(), BuildError> {
        let id = id.into();
        match self.kind(id) {
            NodeKind::EnumValue => {
                if let NodeData::EnumValue { number: n } = &mut self.node_mut(id).data {
                    *n = number;
                }
                Ok(())
            }
            NodeKind::Field => self.set_field_number(FieldId(id), number),
            _ => Err(BuildError::invalid_type(
                &self.node(id).name,
                "only fields and enum values have numbers",
            )),
        }
    }

    fn set_field_number(&mut self, field: FieldId, number: Option<i32>) -> Result<(), BuildError> {
        let id = field.node();
        let name = self.node(id).name.clone();
        if self.is_owned(id) {
            return Err(BuildError::invalid_type(
                &name,
                "the fields of a map entry cannot be renumbered",
            ));
        }
        let is_extension = self.field_data(field).extendee.is_some();
        let number = match number {
            Some(number) => Some(check_field_number(&name, i64::from(number))?),
            None if is_extension => {
                return Err(BuildError::new(BuildErrorKind::InvalidNumber { name, number: 0 }))
            }
            None => None,
        };

        let tag_scope = if is_extension {
            None
        } else {
            self.node(id).parent.and_then(|p| self.tag_scope(p))
        };
        if let (Some(scope), Some(number)) = (tag_scope, number) {
            if let Some(&owner) = self.message_tags(scope).get(&number) {
                if owner != id {
                    return Err(self.duplicate_tag(number, scope));
                }
            }
        } else if let (Some(parent), Some(number), false) = (self.node(id).parent, number, is_extension) {
            // a oneof which is not part of a message yet
            let clash = self.node(parent).children.iter().any(|&sibling| {
                sibling != id && self.numbered(sibling) == Some(number)
            });
            if clash {
                return Err(self.duplicate_tag(number, parent));
            }
        }

        let old = self.field_data(field).number;
        if let Some(scope) = tag_scope {
            let tags = self.message_tags_mut(scope);
            if let Some(old) = old {
                if tags.get(&old) == Some(&id) {
                    tags.remove(&old);
                }
            }
            if let Some(number) = number {
                tags.insert(number, id);
            }
        }
        self.field_data_mut(field).number = number;
        Ok(())
    }

    /// Sets the cardinality of a field.
    pub fn set_label(&mut self, field: FieldId, label: Cardinality) -> Result<(), BuildError> {
        let data = self.field_data(field);
        let reason = if data.shape == FieldShape::Map {
            Some("map fields are always repeated")
        } else if self.is_owned(field.node()) {
            Some("the fields of a map entry are always optional")
        } else if label == Cardinality::Repeated && self.in_oneof(field) {
            Some("fields in a oneof cannot be repeated")
        } else if label == Cardinality::Repeated && data.proto3_optional {
            Some("proto3 optional fields cannot be repeated")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(BuildError::invalid_type(&self.node(field.node()).name, reason));
        }
        self.field_data_mut(field).label = label;
        Ok(())
    }

    /// Sets the default value of a field, in the text format used by `descriptor.proto`.
    pub fn set_default_value(
        &mut self,
        field: FieldId,
        default_value: Option<String>,
    ) -> Result<(), BuildError> {
        if default_value.is_some() {
            let data = self.field_data(field);
            if matches!(data.ty, FieldType::Message(_)) || data.label == Cardinality::Repeated {
                return Err(BuildError::invalid_type(
                    &self.node(field.node()).name,
                    "only singular scalar and enum fields can have a default value",
                ));
            }
        }
        self.field_data_mut(field).default_value = default_value;
        Ok(())
    }

    /// Sets the JSON name of a field. If unset, the name is derived from the field name.
    pub fn set_json_name(&mut self, field: FieldId, json_name: Option<String>) {
        self.field_data_mut(field).json_name = json_name;
    }

    /// Marks a singular field in a `proto3` file as having explicit presence.
    pub fn set_proto3_optional(&mut self, field: FieldId, yes: bool) -> Result<(), BuildError> {
        if yes {
            let data = self.field_data(field);
            let reason = if data.extendee.is_some() {
                Some("extensions cannot be proto3 optional")
            } else if data.label == Cardinality::Repeated {
                Some("repeated fields cannot be proto3 optional")
            } else if data.shape != FieldShape::Plain || self.is_owned(field.node()) {
                Some("map and group fields cannot be proto3 optional")
            } else if self.in_oneof(field) {
                Some("fields in a oneof cannot be proto3 optional")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(BuildError::invalid_type(&self.node(field.node()).name, reason));
            }
        }
        self.field_data_mut(field).proto3_optional = yes;
        Ok(())
    }

    /// Sets the package of a file.
    pub fn set_package(&mut self, file: FileId, package: Option<&str>) -> Result<(), BuildError> {
        if let Some(package) = package {
            names::validate_package(package)?;
        }
        self.file_data_mut(file).package = package.map(ToOwned::to_owned);
        Ok(())
    }

    /// Sets the syntax of a file.
    pub fn set_syntax(&mut self, file: FileId, syntax: Syntax) {
        self.file_data_mut(file).syntax = syntax;
    }

    /// Adds an explicit import to a file. Files needed by the types a file uses are imported
    /// automatically, so this is only needed for imports which are not otherwise referenced.
    pub fn add_import(&mut self, file: FileId, import: FileDescriptor) {
        let imports = &mut self.file_data_mut(file).imports;
        if !imports.iter().any(|i| i.name() == import.name()) {
            imports.push(import);
        }
    }

    /// Declares a range of field numbers, with exclusive end, as available for extensions.
    pub fn add_extension_range(
        &mut self,
        message: MessageId,
        range: Range<u32>,
    ) -> Result<(), BuildError> {
        check_range(&self.node(message.node()).name, &range)?;
        self.message_data_mut(message).extension_ranges.push(range);
        Ok(())
    }

    /// Reserves a range of field numbers, with exclusive end. Reserved numbers are skipped when
    /// numbering fields automatically.
    pub fn add_reserved_range(
        &mut self,
        message: MessageId,
        range: Range<u32>,
    ) -> Result<(), BuildError> {
        check_range(&self.node(message.node()).name, &range)?;
        self.message_data_mut(message).reserved_ranges.push(range);
        Ok(())
    }

    /// Reserves a field name in a message.
    pub fn add_reserved_name(&mut self, message: MessageId, name: &str) -> Result<(), BuildError> {
        names::validate_identifier(name)?;
        let reserved = &mut self.message_data_mut(message).reserved_names;
        if !reserved.iter().any(|n| n == name) {
            reserved.push(name.to_owned());
        }
        Ok(())
    }

    /// Sets whether a method streams its requests and responses.
    pub fn set_streaming(&mut self, method: MethodId, client: bool, server: bool) {
        if let NodeData::Method(data) = &mut self.node_mut(method.node()).data {
            data.client_streaming = client;
            data.server_streaming = server;
        }
    }

    /// Sets the comments attached to a node.
    pub fn set_comments(&mut self, id: impl Into<NodeId>, comments: Comments) {
        self.node_mut(id.into()).comments = comments;
    }

    /// Sets the options of a node. The message must be the `google.protobuf` options type for
    /// the kind of node, for example `google.protobuf.FieldOptions` for a field.
    pub fn set_options(
        &mut self,
        id: impl Into<NodeId>,
        options: Option<DynamicMessage>,
    ) -> Result<(), BuildError> {
        let id = id.into();
        if let Some(options) = &options {
            let expected = options_type(self.kind(id));
            let actual = options.descriptor().full_name().to_owned();
            if actual != expected {
                return Err(BuildError::new(BuildErrorKind::InvalidOptions { expected, actual }));
            }
        }
        self.node_mut(id).options = options;
        Ok(())
    }

    pub(super) fn set_field_type(&mut self, field: FieldId, ty: FieldType) {
        self.field_data_mut(field).ty = ty;
    }

    pub(super) fn set_extendee(&mut self, field: FieldId, extendee: super::MessageRef) {
        self.field_data_mut(field).extendee = Some(extendee);
    }

    pub(super) fn set_input_output(
        &mut self,
        method: MethodId,
        input: super::MessageRef,
        output: super::MessageRef,
    ) {
        if let NodeData::Method(data) = &mut self.node_mut(method.node()).data {
            data.input = input;
            data.output = output;
        }
    }

    /// Validates and performs a move of `child` to the end of `parent`'s children.
    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), BuildError> {
        self.check_attach(parent, child)?;
        if self.node(child).parent.is_some() {
            self.unlink(child);
        }
        self.link(parent, child);
        Ok(())
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<(), BuildError> {
        let allowed = match (self.kind(parent), self.kind(child)) {
            (NodeKind::File, NodeKind::Field) | (NodeKind::Message, NodeKind::Field) => true,
            (NodeKind::File | NodeKind::Message, NodeKind::Message | NodeKind::Enum) => true,
            (NodeKind::File, NodeKind::Service) => true,
            (NodeKind::Message, NodeKind::Oneof) => true,
            (NodeKind::Oneof, NodeKind::Field) => true,
            (NodeKind::Enum, NodeKind::EnumValue) => true,
            (NodeKind::Service, NodeKind::Method) => true,
            _ => false,
        };
        if !allowed {
            return Err(self.parent_error(child, parent, "this kind of node cannot be added here"));
        }
        if self.is_owned(child) {
            return Err(self.parent_error(
                child,
                parent,
                "the structure of map and group fields cannot be changed",
            ));
        }
        if self.is_map_entry(parent) {
            return Err(self.parent_error(child, parent, "map entry messages cannot be changed"));
        }

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(self.parent_error(
                    child,
                    parent,
                    "a node cannot be added to itself or its descendants",
                ));
            }
            ancestor = self.node(id).parent;
        }

        let declared = self.declared_names(child);
        let owners: Vec<NodeId> = declared.iter().map(|(_, node)| *node).collect();
        for (name, _) in &declared {
            self.check_name_free(parent, name, &owners)?;
        }

        let tags = self.declared_tags(child);
        match self.tag_scope(parent) {
            Some(scope) => {
                let existing = self.message_tags(scope);
                for (number, _) in &tags {
                    if let Some(other) = existing.get(number) {
                        if !tags.iter().any(|(_, node)| node == other) {
                            return Err(self.duplicate_tag(*number, scope));
                        }
                    }
                }
            }
            None => {
                for (number, _) in &tags {
                    let clash = self.node(parent).children.iter().any(|&sibling| {
                        sibling != child && self.numbered(sibling) == Some(*number)
                    });
                    if clash {
                        return Err(self.duplicate_tag(*number, parent));
                    }
                }
            }
        }
        Ok(())
    }

    /// Adds `child` to the end of `parent`'s children and registers its names and numbers.
    pub(super) fn link(&mut self, parent: NodeId, child: NodeId) {
        let names = self.declared_names(child);
        let tags = self.declared_tags(child);

        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);

        if let Some(scope) = self.symbol_scope(parent) {
            self.node_mut(scope).symbols.extend(names);
        }
        if let Some(scope) = self.tag_scope(parent) {
            self.message_tags_mut(scope).extend(tags);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let parent = match self.node(child).parent {
            Some(parent) => parent,
            None => return,
        };
        let names = self.declared_names(child);
        let tags = self.declared_tags(child);

        if let Some(scope) = self.symbol_scope(parent) {
            let symbols = &mut self.node_mut(scope).symbols;
            for (name, owner) in names {
                if symbols.get(&name) == Some(&owner) {
                    symbols.remove(&name);
                }
            }
        }
        if let Some(scope) = self.tag_scope(parent) {
            let existing = self.message_tags_mut(scope);
            for (number, owner) in tags {
                if existing.get(&number) == Some(&owner) {
                    existing.remove(&number);
                }
            }
        }

        self.node_mut(parent).children.retain(|&c| c != child);
        self.node_mut(child).parent = None;
    }

    /// The names `id` contributes to the scope it is added to.
    fn declared_names(&self, id: NodeId) -> Vec<(String, NodeId)> {
        let node = self.node(id);
        let mut result = vec![(node.name.clone(), id)];
        match node.data {
            NodeData::Oneof => {
                for &field in &node.children {
                    result.extend(self.declared_names(field));
                }
            }
            NodeData::Field(_) => {
                for &message in &node.children {
                    result.push((self.node(message).name.clone(), message));
                }
            }
            _ => (),
        }
        result
    }

    /// The field numbers `id` contributes to the message it is added to.
    fn declared_tags(&self, id: NodeId) -> Vec<(u32, NodeId)> {
        let node = self.node(id);
        match &node.data {
            NodeData::Field(data) if data.extendee.is_none() => {
                data.number.map(|n| (n, id)).into_iter().collect()
            }
            NodeData::Oneof => node
                .children
                .iter()
                .flat_map(|&field| self.declared_tags(field))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn check_name_free(
        &self,
        parent: NodeId,
        name: &str,
        exclude: &[NodeId],
    ) -> Result<(), BuildError> {
        let clash = match self.symbol_scope(parent) {
            Some(scope) => match self.node(scope).symbols.get(name) {
                Some(owner) => !exclude.contains(owner),
                None => false,
            },
            None => self
                .node(parent)
                .children
                .iter()
                .any(|c| !exclude.contains(c) && self.node(*c).name == name),
        };
        if clash {
            let scope = self.symbol_scope(parent).unwrap_or(parent);
            Err(BuildError::new(BuildErrorKind::NameCollision {
                name: name.to_owned(),
                scope: self.full_name(scope),
            }))
        } else {
            Ok(())
        }
    }

    /// Whether `id` is part of the structure generated for a map or group field.
    pub(super) fn is_owned(&self, id: NodeId) -> bool {
        match self.node(id).parent {
            Some(parent) => {
                self.kind(parent) == NodeKind::Field
                    || (self.kind(id) == NodeKind::Field && self.is_map_entry(parent))
            }
            None => false,
        }
    }

    pub(super) fn is_map_entry(&self, id: NodeId) -> bool {
        matches!(self.owning_field(id), Some((_, FieldShape::Map)))
    }

    pub(super) fn owning_field(&self, message: NodeId) -> Option<(NodeId, FieldShape)> {
        let parent = self.node(message).parent?;
        match &self.node(parent).data {
            NodeData::Field(data) => Some((parent, data.shape)),
            _ => None,
        }
    }

    fn in_oneof(&self, field: FieldId) -> bool {
        match self.node(field.node()).parent {
            Some(parent) => self.kind(parent) == NodeKind::Oneof,
            None => false,
        }
    }

    fn numbered(&self, id: NodeId) -> Option<u32> {
        match &self.node(id).data {
            NodeData::Field(data) => data.number,
            _ => None,
        }
    }

    fn parent_error(&self, child: NodeId, parent: NodeId, reason: &'static str) -> BuildError {
        BuildError::invalid_parent(&self.full_name(child), &self.full_name(parent), reason)
    }

    fn duplicate_tag(&self, number: u32, message: NodeId) -> BuildError {
        BuildError::new(BuildErrorKind::DuplicateTag {
            number,
            message: self.full_name(message),
        })
    }

    fn message_tags(&self, message: NodeId) -> &std::collections::BTreeMap<u32, NodeId> {
        &self.message_data(MessageId(message)).tags
    }

    fn message_tags_mut(&mut self, message: NodeId) -> &mut std::collections::BTreeMap<u32, NodeId> {
        &mut self.message_data_mut(MessageId(message)).tags
    }

    pub(super) fn file_data_mut(&mut self, file: FileId) -> &mut super::FileData {
        match &mut self.node_mut(file.node()).data {
            NodeData::File(data) => data,
            _ => unreachable!(),
        }
    }

    pub(super) fn message_data_mut(&mut self, message: MessageId) -> &mut super::MessageData {
        match &mut self.node_mut(message.node()).data {
            NodeData::Message(data) => data,
            _ => unreachable!(),
        }
    }

    pub(super) fn field_data_mut(&mut self, field: FieldId) -> &mut super::FieldData {
        match &mut self.node_mut(field.node()).data {
            NodeData::Field(data) => data,
            _ => unreachable!(),
        }
    }
}

fn options_type(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::File => "google.protobuf.FileOptions",
        NodeKind::Message => "google.protobuf.MessageOptions",
        NodeKind::Field => "google.protobuf.FieldOptions",
        NodeKind::Oneof => "google.protobuf.OneofOptions",
        NodeKind::Enum => "google.protobuf.EnumOptions",
        NodeKind::EnumValue => "google.protobuf.EnumValueOptions",
        NodeKind::Service => "google.protobuf.ServiceOptions",
        NodeKind::Method => "google.protobuf.MethodOptions",
    }
}
