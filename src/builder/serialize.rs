use std::{collections::HashSet, ops::Range};

use prost::Message;
use prost_reflect::{Cardinality, Syntax};
use prost_types::{
    descriptor_proto::ReservedRange,
    field_descriptor_proto::{Label, Type},
    source_code_info::Location,
    MessageOptions, SourceCodeInfo,
};

use super::{
    proto::{
        DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, ExtensionRange,
        FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto, OneofDescriptorProto,
        ServiceDescriptorProto,
    },
    tag, EnumRef, FieldShape, FieldType, MessageRef, NodeData, NodeId, SchemaBuilder,
};
use crate::{codec::RESERVED_FIELD_NUMBERS, dynamic::DynamicMessage};

/// Writes a tree of builder nodes out as a `FileDescriptorProto`.
pub(super) struct Serializer<'a> {
    builder: &'a SchemaBuilder,
    path: Vec<i32>,
    locations: Vec<Location>,
}

/// The definitions which may be nested in a file or message.
#[derive(Default)]
struct Definitions {
    messages: Vec<DescriptorProto>,
    enums: Vec<EnumDescriptorProto>,
    extensions: Vec<FieldDescriptorProto>,
}

#[derive(Clone, Copy)]
struct ScopeTags {
    message: i32,
    enum_: i32,
    extension: i32,
}

const FILE_SCOPE: ScopeTags = ScopeTags {
    message: tag::file::MESSAGE_TYPE,
    enum_: tag::file::ENUM_TYPE,
    extension: tag::file::EXTENSION,
};

const MESSAGE_SCOPE: ScopeTags = ScopeTags {
    message: tag::message::NESTED_TYPE,
    enum_: tag::message::ENUM_TYPE,
    extension: tag::message::EXTENSION,
};

const SYNTAX: i32 = 12;

/// Hands out field numbers which are not used, reserved or declared for extensions.
struct FieldNumbers {
    used: HashSet<u32>,
    skip: Vec<Range<u32>>,
    next: u32,
}

impl FieldNumbers {
    fn next(&mut self) -> u32 {
        loop {
            let number = self.next;
            self.next += 1;
            if let Some(range) = self.skip.iter().find(|range| range.contains(&number)) {
                self.next = range.end;
            } else if self.used.insert(number) {
                return number;
            }
        }
    }
}

impl<'a> Serializer<'a> {
    /// Serializes `root` as a file named `name`. If `root` is not a file node it is written as
    /// the only definition in a file with no package.
    pub(super) fn file(
        builder: &'a SchemaBuilder,
        root: NodeId,
        name: String,
        dependency: Vec<String>,
        synthetic_syntax: Syntax,
    ) -> FileDescriptorProto {
        let mut serializer = Serializer {
            builder,
            path: Vec::new(),
            locations: Vec::new(),
        };

        let mut defs = Definitions::default();
        let mut services = Vec::new();
        let node = builder.node(root);
        let (package, syntax, options) = match &node.data {
            NodeData::File(file) => {
                serializer.with_path(&[SYNTAX], |s| s.comments(root));
                for &child in &node.children {
                    serializer.definition(child, FILE_SCOPE, &mut defs, &mut services);
                }
                (
                    file.package.clone(),
                    file.syntax,
                    node.options.as_ref().map(DynamicMessage::encode_to_vec),
                )
            }
            _ => {
                serializer.definition(root, FILE_SCOPE, &mut defs, &mut services);
                (None, synthetic_syntax, None)
            }
        };

        let locations = serializer.locations;
        FileDescriptorProto {
            name: Some(name),
            package,
            dependency,
            message_type: defs.messages,
            enum_type: defs.enums,
            service: services,
            extension: defs.extensions,
            options,
            source_code_info: if locations.is_empty() {
                None
            } else {
                Some(SourceCodeInfo {
                    location: locations,
                })
            },
            syntax: Some(
                match syntax {
                    Syntax::Proto2 => "proto2",
                    Syntax::Proto3 => "proto3",
                }
                .to_owned(),
            ),
        }
    }

    fn definition(
        &mut self,
        id: NodeId,
        scope: ScopeTags,
        defs: &mut Definitions,
        services: &mut Vec<ServiceDescriptorProto>,
    ) {
        let builder = self.builder;
        match &builder.node(id).data {
            NodeData::Message(_) => {
                let message = self.with_path(&[scope.message, len(&defs.messages)], |s| {
                    s.message(id)
                });
                defs.messages.push(message);
            }
            NodeData::Enum => {
                let enum_ = self.with_path(&[scope.enum_, len(&defs.enums)], |s| s.enum_(id));
                defs.enums.push(enum_);
            }
            NodeData::Field(_) => {
                let extension = self.with_path(&[scope.extension, len(&defs.extensions)], |s| {
                    s.field(id, None, None)
                });
                defs.extensions.push(extension);
                self.owned_message(id, scope, defs);
            }
            NodeData::Service => {
                let service = self.with_path(&[tag::file::SERVICE, len(services)], |s| s.service(id));
                services.push(service);
            }
            _ => unreachable!("not a definition"),
        }
    }

    /// Writes the map entry or group message of a field alongside it.
    fn owned_message(&mut self, field: NodeId, scope: ScopeTags, defs: &mut Definitions) {
        let builder = self.builder;
        if let Some(&message) = builder.node(field).children.first() {
            let message = self.with_path(&[scope.message, len(&defs.messages)], |s| {
                s.message(message)
            });
            defs.messages.push(message);
        }
    }

    fn message(&mut self, id: NodeId) -> DescriptorProto {
        self.comments(id);
        let builder = self.builder;
        let node = builder.node(id);
        let data = match &node.data {
            NodeData::Message(data) => data,
            _ => unreachable!(),
        };

        let mut numbers = FieldNumbers {
            used: data.tags.keys().copied().collect(),
            skip: data
                .reserved_ranges
                .iter()
                .chain(&data.extension_ranges)
                .cloned()
                .chain(Some(*RESERVED_FIELD_NUMBERS.start()..*RESERVED_FIELD_NUMBERS.end() + 1))
                .collect(),
            next: 1,
        };

        let mut result = DescriptorProto {
            name: Some(node.name.clone()),
            ..Default::default()
        };
        let mut defs = Definitions::default();
        let mut optional_fields = Vec::new();
        for &child in &node.children {
            let child_node = builder.node(child);
            match &child_node.data {
                NodeData::Field(field) if field.extendee.is_none() => {
                    if field.proto3_optional {
                        optional_fields.push(result.field.len());
                    }
                    let field = self.with_path(&[tag::message::FIELD, len(&result.field)], |s| {
                        s.field(child, Some(&mut numbers), None)
                    });
                    result.field.push(field);
                    self.owned_message(child, MESSAGE_SCOPE, &mut defs);
                }
                NodeData::Oneof => {
                    let oneof_index = len(&result.oneof_decl);
                    self.with_path(&[tag::message::ONEOF_DECL, oneof_index], |s| s.comments(child));
                    result.oneof_decl.push(OneofDescriptorProto {
                        name: Some(child_node.name.clone()),
                        options: child_node.options.as_ref().map(DynamicMessage::encode_to_vec),
                    });
                    for &field in &child_node.children {
                        let proto = self.with_path(&[tag::message::FIELD, len(&result.field)], |s| {
                            s.field(field, Some(&mut numbers), Some(oneof_index))
                        });
                        result.field.push(proto);
                        self.owned_message(field, MESSAGE_SCOPE, &mut defs);
                    }
                }
                _ => {
                    let mut services = Vec::new();
                    self.definition(child, MESSAGE_SCOPE, &mut defs, &mut services);
                }
            }
        }

        for index in optional_fields {
            let oneof_index = len(&result.oneof_decl);
            let field = &mut result.field[index];
            result.oneof_decl.push(OneofDescriptorProto {
                name: Some(format!("_{}", field.name())),
                options: None,
            });
            field.oneof_index = Some(oneof_index);
        }

        result.nested_type = defs.messages;
        result.enum_type = defs.enums;
        result.extension = defs.extensions;
        result.extension_range = data
            .extension_ranges
            .iter()
            .map(|range| ExtensionRange {
                start: Some(range.start as i32),
                end: Some(range.end as i32),
            })
            .collect();
        result.reserved_range = data
            .reserved_ranges
            .iter()
            .map(|range| ReservedRange {
                start: Some(range.start as i32),
                end: Some(range.end as i32),
            })
            .collect();
        result.reserved_name = data.reserved_names.clone();
        result.options = if builder.is_map_entry(id) {
            Some(
                MessageOptions {
                    map_entry: Some(true),
                    ..Default::default()
                }
                .encode_to_vec(),
            )
        } else {
            node.options.as_ref().map(DynamicMessage::encode_to_vec)
        };
        result
    }

    fn field(
        &mut self,
        id: NodeId,
        numbers: Option<&mut FieldNumbers>,
        oneof_index: Option<i32>,
    ) -> FieldDescriptorProto {
        self.comments(id);
        let builder = self.builder;
        let node = builder.node(id);
        let data = match &node.data {
            NodeData::Field(data) => data,
            _ => unreachable!(),
        };

        let (ty, type_name) = match &data.ty {
            FieldType::Scalar(scalar) => (scalar.proto_type(), None),
            FieldType::Message(message) if data.shape == FieldShape::Group => {
                (Type::Group, Some(self.message_name(message)))
            }
            FieldType::Message(message) => (Type::Message, Some(self.message_name(message))),
            FieldType::Enum(enum_) => (Type::Enum, Some(self.enum_name(enum_))),
        };
        let label = match data.label {
            Cardinality::Optional => Label::Optional,
            Cardinality::Required => Label::Required,
            Cardinality::Repeated => Label::Repeated,
        };

        FieldDescriptorProto {
            name: Some(node.name.clone()),
            extendee: data.extendee.as_ref().map(|e| self.message_name(e)),
            number: data.number.or_else(|| numbers.map(FieldNumbers::next)).map(|n| n as i32),
            label: Some(label as i32),
            r#type: Some(ty as i32),
            type_name,
            default_value: data.default_value.clone(),
            options: node.options.as_ref().map(DynamicMessage::encode_to_vec),
            oneof_index,
            json_name: data.json_name.clone(),
            proto3_optional: if data.proto3_optional { Some(true) } else { None },
        }
    }

    fn enum_(&mut self, id: NodeId) -> EnumDescriptorProto {
        self.comments(id);
        let builder = self.builder;
        let node = builder.node(id);

        let mut used: HashSet<i32> = node
            .children
            .iter()
            .filter_map(|&value| match builder.node(value).data {
                NodeData::EnumValue { number } => number,
                _ => None,
            })
            .collect();
        let mut next = 0;

        let mut values = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            let value = builder.node(child);
            let number = match value.data {
                NodeData::EnumValue {
                    number: Some(number),
                } => number,
                _ => {
                    while !used.insert(next) {
                        next += 1;
                    }
                    next
                }
            };
            self.with_path(&[tag::enum_::VALUE, len(&values)], |s| s.comments(child));
            values.push(EnumValueDescriptorProto {
                name: Some(value.name.clone()),
                number: Some(number),
                options: value.options.as_ref().map(DynamicMessage::encode_to_vec),
            });
        }

        EnumDescriptorProto {
            name: Some(node.name.clone()),
            value: values,
            options: node.options.as_ref().map(DynamicMessage::encode_to_vec),
            reserved_range: Vec::new(),
            reserved_name: Vec::new(),
        }
    }

    fn service(&mut self, id: NodeId) -> ServiceDescriptorProto {
        self.comments(id);
        let builder = self.builder;
        let node = builder.node(id);
        let mut methods = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            let method = builder.node(child);
            let data = match &method.data {
                NodeData::Method(data) => data,
                _ => unreachable!(),
            };
            self.with_path(&[tag::service::METHOD, len(&methods)], |s| s.comments(child));
            methods.push(MethodDescriptorProto {
                name: Some(method.name.clone()),
                input_type: Some(self.message_name(&data.input)),
                output_type: Some(self.message_name(&data.output)),
                options: method.options.as_ref().map(DynamicMessage::encode_to_vec),
                client_streaming: if data.client_streaming { Some(true) } else { None },
                server_streaming: if data.server_streaming { Some(true) } else { None },
            });
        }

        ServiceDescriptorProto {
            name: Some(node.name.clone()),
            method: methods,
            options: node.options.as_ref().map(DynamicMessage::encode_to_vec),
        }
    }

    fn message_name(&self, message: &MessageRef) -> String {
        match message {
            MessageRef::Local(id) => format!(".{}", self.builder.full_name(*id)),
            MessageRef::Foreign(desc) => format!(".{}", desc.full_name()),
        }
    }

    fn enum_name(&self, enum_: &EnumRef) -> String {
        match enum_ {
            EnumRef::Local(id) => format!(".{}", self.builder.full_name(*id)),
            EnumRef::Foreign(desc) => format!(".{}", desc.full_name()),
        }
    }

    fn comments(&mut self, id: NodeId) {
        let builder = self.builder;
        let comments = &builder.node(id).comments;
        if !comments.is_empty() {
            self.locations.push(Location {
                path: self.path.clone(),
                span: vec![0, 0, 0],
                leading_comments: comments.leading.clone(),
                trailing_comments: comments.trailing.clone(),
                leading_detached_comments: comments.leading_detached.clone(),
            });
        }
    }

    fn with_path<T>(&mut self, path: &[i32], f: impl FnOnce(&mut Self) -> T) -> T {
        let depth = self.path.len();
        self.path.extend_from_slice(path);
        let result = f(self);
        self.path.truncate(depth);
        result
    }
}

fn len<T>(items: &[T]) -> i32 {
    items.len() as i32
}
