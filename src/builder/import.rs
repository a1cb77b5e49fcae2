use std::collections::{HashMap, HashSet};

use prost::Message;
use prost_reflect::{
    Cardinality, EnumDescriptor, ExtensionDescriptor, FieldDescriptor, FileDescriptor, Kind,
    MessageDescriptor, OneofDescriptor, ReflectMessage, ServiceDescriptor,
};

use super::{
    names, BuildError, Comments, EnumId, EnumRef, FieldId, FieldType, FileId, MessageId,
    MessageRef, MethodId, NodeId, OneofId, ParentId, ScalarType, SchemaBuilder,
};
use crate::dynamic::DynamicMessage;

impl SchemaBuilder {
    /// Copies a linked file into this builder, so it can be modified and built again.
    ///
    /// Types defined in `file` are referenced locally; types from its dependencies remain
    /// references to the existing descriptors. Comments and options are preserved. The
    /// synthetic oneofs of proto3 `optional` fields are not exposed as oneof nodes.
    pub fn import_file(&mut self, file: &FileDescriptor) -> Result<FileId, BuildError> {
        let mut importer = Importer {
            builder: self,
            comments: HashMap::new(),
            locals: HashMap::new(),
            field_types: Vec::new(),
            extendees: Vec::new(),
            methods: Vec::new(),
        };
        importer.collect_comments(file);
        let id = importer.file(file)?;
        importer.localize();
        Ok(id)
    }
}

struct Importer<'a> {
    builder: &'a mut SchemaBuilder,
    comments: HashMap<Vec<i32>, Comments>,
    /// Full names of the types defined in the file being imported.
    locals: HashMap<String, NodeId>,
    field_types: Vec<(FieldId, FieldType)>,
    extendees: Vec<(FieldId, MessageDescriptor)>,
    methods: Vec<(MethodId, MessageDescriptor, MessageDescriptor)>,
}

impl<'a> Importer<'a> {
    fn collect_comments(&mut self, file: &FileDescriptor) {
        let locations = file
            .file_descriptor_proto()
            .source_code_info
            .iter()
            .flat_map(|info| &info.location);
        for location in locations {
            let comments = Comments {
                leading_detached: location.leading_detached_comments.clone(),
                leading: location.leading_comments.clone(),
                trailing: location.trailing_comments.clone(),
            };
            if !comments.is_empty() {
                self.comments.insert(location.path.clone(), comments);
            }
        }
    }

    fn file(&mut self, file: &FileDescriptor) -> Result<FileId, BuildError> {
        let id = self.builder.new_file(file.name());
        if !file.package_name().is_empty() {
            self.builder.set_package(id, Some(file.package_name()))?;
        }
        self.builder.set_syntax(id, file.syntax());
        for dependency in file.dependencies() {
            self.builder.add_import(id, dependency);
        }
        self.annotate(id.node(), &[12], file.options())?;

        let groups = group_messages(file.extensions());
        for message in file.messages() {
            if !groups.contains(message.full_name()) {
                let message = self.message(&message)?;
                self.builder.add_message(id, message)?;
            }
        }
        for enum_ in file.enums() {
            let enum_ = self.enum_(&enum_)?;
            self.builder.add_enum(id, enum_)?;
        }
        for extension in file.extensions() {
            let extension = self.extension(&extension)?;
            self.builder.add_extension(id, extension)?;
        }
        for service in file.services() {
            self.service(id, &service)?;
        }
        Ok(id)
    }

    fn message(&mut self, desc: &MessageDescriptor) -> Result<MessageId, BuildError> {
        let id = self.builder.new_message(desc.name())?;
        self.message_body(id, desc)?;
        Ok(id)
    }

    fn message_body(&mut self, id: MessageId, desc: &MessageDescriptor) -> Result<(), BuildError> {
        self.locals.insert(desc.full_name().to_owned(), id.node());
        self.annotate(id.node(), desc.path(), desc.options())?;

        let mut oneofs: HashMap<String, OneofId> = HashMap::new();
        for field in desc.fields() {
            let field_id = self.field(&field)?;
            match field.containing_oneof().filter(|oneof| !is_synthetic(oneof)) {
                Some(oneof) => {
                    let oneof_id = match oneofs.get(oneof.name()) {
                        Some(&oneof_id) => oneof_id,
                        None => {
                            let oneof_id = self.builder.new_oneof(oneof.name())?;
                            self.annotate(oneof_id.node(), oneof.path(), oneof.options())?;
                            self.builder.add_oneof(id, oneof_id)?;
                            oneofs.insert(oneof.name().to_owned(), oneof_id);
                            oneof_id
                        }
                    };
                    self.builder.add_field_to_oneof(oneof_id, field_id)?;
                }
                None => self.builder.add_field(id, field_id)?,
            }
        }

        let groups = group_messages(desc.child_extensions());
        let groups: HashSet<String> = groups
            .into_iter()
            .chain(desc.fields().filter(|f| f.is_group()).filter_map(|f| message_name(&f.kind())))
            .collect();
        for child in desc.child_messages() {
            if !child.is_map_entry() && !groups.contains(child.full_name()) {
                let child = self.message(&child)?;
                self.builder.add_message(id, child)?;
            }
        }
        for enum_ in desc.child_enums() {
            let enum_ = self.enum_(&enum_)?;
            self.builder.add_enum(id, enum_)?;
        }
        for extension in desc.child_extensions() {
            let extension = self.extension(&extension)?;
            self.builder.add_extension(ParentId::Message(id), extension)?;
        }

        for range in desc.extension_ranges() {
            self.builder.add_extension_range(id, range)?;
        }
        for range in desc.reserved_ranges() {
            self.builder.add_reserved_range(id, range)?;
        }
        for name in desc.reserved_names() {
            self.builder.add_reserved_name(id, name)?;
        }
        Ok(())
    }

    fn field(&mut self, field: &FieldDescriptor) -> Result<FieldId, BuildError> {
        let id = if field.is_map() {
            let entry = match field.kind() {
                Kind::Message(entry) => entry,
                _ => unreachable!("map fields have a message type"),
            };
            let key = entry.map_entry_key_field().kind();
            let key = ScalarType::from_kind(&key)
                .ok_or_else(|| BuildError::invalid_type(field.name(), "invalid map key type"))?;
            let value = FieldType::from_kind(entry.map_entry_value_field().kind());
            let id = self.builder.new_map_field(field.name(), key, value.clone())?;
            if let Some(entry) = self.builder.map_entry(id) {
                let value_field = FieldId(self.builder.children(entry)[1]);
                self.field_types.push((value_field, value));
            }
            id
        } else if field.is_group() {
            let id = self.builder.new_group_field(field.name())?;
            self.group_body(id, &field.kind())?;
            id
        } else {
            let ty = FieldType::from_kind(field.kind());
            let id = self.builder.new_field(field.name(), ty.clone())?;
            self.field_types.push((id, ty));
            id
        };

        let proto = field.field_descriptor_proto();
        self.builder.set_number(id, Some(field.number() as i32))?;
        if !field.is_map() {
            self.builder.set_label(id, field.cardinality())?;
        }
        if proto.proto3_optional() {
            self.builder.set_proto3_optional(id, true)?;
        }
        self.field_details(id, field.name(), proto)?;
        self.annotate(id.node(), field.path(), field.options())?;
        Ok(id)
    }

    fn extension(&mut self, extension: &ExtensionDescriptor) -> Result<FieldId, BuildError> {
        let extendee = extension.containing_message();
        let id = if extension.is_group() {
            let id = self.builder.new_group_field(extension.name())?;
            self.builder
                .set_extendee(id, MessageRef::Foreign(extendee.clone()));
            self.builder.set_number(id, Some(extension.number() as i32))?;
            self.group_body(id, &extension.kind())?;
            id
        } else {
            let ty = FieldType::from_kind(extension.kind());
            let id = self.builder.new_extension(
                extension.name(),
                extension.number(),
                ty.clone(),
                extendee.clone(),
            )?;
            self.field_types.push((id, ty));
            id
        };
        self.extendees.push((id, extendee));

        if extension.cardinality() != Cardinality::Optional {
            self.builder.set_label(id, extension.cardinality())?;
        }
        self.field_details(id, extension.name(), extension.field_descriptor_proto())?;
        self.annotate(id.node(), extension.path(), extension.options())?;
        Ok(id)
    }

    fn group_body(&mut self, field: FieldId, kind: &Kind) -> Result<(), BuildError> {
        if let (Some(message), Kind::Message(desc)) = (self.builder.group_message(field), kind) {
            self.message_body(message, desc)?;
        }
        Ok(())
    }

    fn field_details(
        &mut self,
        id: FieldId,
        name: &str,
        proto: &prost_types::FieldDescriptorProto,
    ) -> Result<(), BuildError> {
        if proto.default_value.is_some() {
            self.builder
                .set_default_value(id, proto.default_value.clone())?;
        }
        if let Some(json_name) = &proto.json_name {
            if *json_name != names::to_json_name(name) {
                self.builder.set_json_name(id, Some(json_name.clone()));
            }
        }
        Ok(())
    }

    fn enum_(&mut self, desc: &EnumDescriptor) -> Result<EnumId, BuildError> {
        let id = self.builder.new_enum(desc.name())?;
        self.locals.insert(desc.full_name().to_owned(), id.node());
        self.annotate(id.node(), desc.path(), desc.options())?;
        for value in desc.values() {
            let value_id = self.builder.new_enum_value(value.name())?;
            self.builder.set_number(value_id, Some(value.number()))?;
            self.annotate(value_id.node(), value.path(), value.options())?;
            self.builder.add_enum_value(id, value_id)?;
        }
        Ok(id)
    }

    fn service(&mut self, file: FileId, desc: &ServiceDescriptor) -> Result<(), BuildError> {
        let id = self.builder.new_service(desc.name())?;
        self.annotate(id.node(), desc.path(), desc.options())?;
        for method in desc.methods() {
            let method_id =
                self.builder
                    .new_method(method.name(), method.input(), method.output())?;
            self.builder.set_streaming(
                method_id,
                method.is_client_streaming(),
                method.is_server_streaming(),
            );
            self.annotate(method_id.node(), method.path(), method.options())?;
            self.builder.add_method(id, method_id)?;
            self.methods.push((method_id, method.input(), method.output()));
        }
        self.builder.add_service(file, id)
    }

    /// Copies the comments at `path` and any non-empty options to a node.
    fn annotate(
        &mut self,
        id: NodeId,
        path: &[i32],
        options: prost_reflect::DynamicMessage,
    ) -> Result<(), BuildError> {
        if let Some(comments) = self.comments.remove(path) {
            self.builder.set_comments(id, comments);
        }

        let bytes = options.encode_to_vec();
        if !bytes.is_empty() {
            let options = DynamicMessage::decode(options.descriptor(), &bytes).map_err(|err| {
                BuildError::invalid_type(self.builder.name(id), err.to_string())
            })?;
            self.builder.set_options(id, Some(options))?;
        }
        Ok(())
    }

    /// Replaces references to types defined in the imported file with local references.
    fn localize(self) {
        let Importer {
            builder,
            locals,
            field_types,
            extendees,
            methods,
            ..
        } = self;
        let message = |desc: MessageDescriptor| match locals.get(desc.full_name()) {
            Some(&id) => MessageRef::Local(MessageId(id)),
            None => MessageRef::Foreign(desc),
        };

        for (field, ty) in field_types {
            let ty = match ty {
                FieldType::Message(MessageRef::Foreign(desc)) => FieldType::Message(message(desc)),
                FieldType::Enum(EnumRef::Foreign(desc)) => match locals.get(desc.full_name()) {
                    Some(&id) => FieldType::Enum(EnumRef::Local(EnumId(id))),
                    None => FieldType::Enum(EnumRef::Foreign(desc)),
                },
                ty => ty,
            };
            builder.set_field_type(field, ty);
        }
        for (field, extendee) in extendees {
            builder.set_extendee(field, message(extendee));
        }
        for (method, input, output) in methods {
            builder.set_input_output(method, message(input), message(output));
        }
    }
}

fn is_synthetic(oneof: &OneofDescriptor) -> bool {
    let mut fields = oneof.fields();
    match (fields.next(), fields.next()) {
        (Some(field), None) => field.field_descriptor_proto().proto3_optional(),
        _ => false,
    }
}

fn message_name(kind: &Kind) -> Option<String> {
    kind.as_message().map(|message| message.full_name().to_owned())
}

fn group_messages(extensions: impl Iterator<Item = ExtensionDescriptor>) -> HashSet<String> {
    extensions
        .filter(|extension| extension.is_group())
        .filter_map(|extension| message_name(&extension.kind()))
        .collect()
}
