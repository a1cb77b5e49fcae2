//! Building protobuf schemas programmatically.
//!
//! A [`SchemaBuilder`] is an arena of definition nodes: files, messages, fields, oneofs, enums,
//! enum values, services and methods. Nodes are created free-standing, then arranged into trees
//! with the `add_*` methods. Any node can be built into a linked descriptor, at which point the
//! builder works out which files the node's tree depends on, writes the tree out as a
//! `FileDescriptorProto` and links it with [`prost_reflect::DescriptorPool`].
//!
//! Fields may refer to types defined in other builder trees, or to existing descriptors. Building
//! never modifies the builder, so nodes can be changed and built again.
//!
//! ```
//! use prost_dynamic::builder::{ScalarType, SchemaBuilder};
//!
//! let mut builder = SchemaBuilder::new();
//! let file = builder.new_file("example.proto");
//! builder.set_package(file, Some("example")).unwrap();
//!
//! let message = builder.new_message("User").unwrap();
//! let id = builder.new_field("id", ScalarType::Uint64).unwrap();
//! let name = builder.new_field("name", ScalarType::String).unwrap();
//! builder.add_field(message, id).unwrap();
//! builder.add_field(message, name).unwrap();
//! builder.add_message(file, message).unwrap();
//!
//! let desc = builder.build_message(message).unwrap();
//! assert_eq!(desc.full_name(), "example.User");
//! assert_eq!(desc.get_field_by_name("name").unwrap().number(), 2);
//! ```

mod error;
mod import;
mod mutate;
mod names;
mod options;
mod proto;
mod resolve;
mod serialize;
mod tag;
#[cfg(test)]
mod tests;

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    ops::Range,
};

use prost_reflect::{Cardinality, EnumDescriptor, FileDescriptor, Kind, MessageDescriptor, Syntax};
use prost_types::field_descriptor_proto::Type;

pub use self::{
    error::{BuildError, BuildErrorKind},
    options::BuildOptions,
};
use crate::dynamic::DynamicMessage;

/// Identifies a node in a [`SchemaBuilder`].
///
/// Ids are only meaningful to the builder which created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

/// The kind of definition a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A `.proto` file.
    File,
    /// A message type.
    Message,
    /// A message field or extension field.
    Field,
    /// A oneof in a message.
    Oneof,
    /// An enum type.
    Enum,
    /// A value of an enum type.
    EnumValue,
    /// A service.
    Service,
    /// A method of a service.
    Method,
}

/// A [`NodeId`] known to refer to a node of a particular [`NodeKind`].
pub trait TypedNodeId: Copy + Into<NodeId> + private::Sealed {
    /// The kind of node this id refers to.
    const KIND: NodeKind;

    #[doc(hidden)]
    fn from_node(id: NodeId) -> Self;
}

mod private {
    pub trait Sealed {}
}

macro_rules! typed_node_ids {
    ($($(#[$attr:meta])* $name:ident => $kind:ident;)*) => {
        $(
            $(#[$attr])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(NodeId);

            impl $name {
                /// Returns the untyped id.
                pub fn node(self) -> NodeId {
                    self.0
                }
            }

            impl From<$name> for NodeId {
                fn from(id: $name) -> NodeId {
                    id.0
                }
            }

            impl private::Sealed for $name {}

            impl TypedNodeId for $name {
                const KIND: NodeKind = NodeKind::$kind;

                fn from_node(id: NodeId) -> Self {
                    $name(id)
                }
            }
        )*
    };
}

typed_node_ids! {
    /// Identifies a file node.
    FileId => File;
    /// Identifies a message node.
    MessageId => Message;
    /// Identifies a field or extension node.
    FieldId => Field;
    /// Identifies a oneof node.
    OneofId => Oneof;
    /// Identifies an enum node.
    EnumId => Enum;
    /// Identifies an enum value node.
    EnumValueId => EnumValue;
    /// Identifies a service node.
    ServiceId => Service;
    /// Identifies a method node.
    MethodId => Method;
}

/// A node which can contain messages, enums and extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentId {
    /// A top-level definition in a file.
    File(FileId),
    /// A nested definition in a message.
    Message(MessageId),
}

impl From<FileId> for ParentId {
    fn from(id: FileId) -> Self {
        ParentId::File(id)
    }
}

impl From<MessageId> for ParentId {
    fn from(id: MessageId) -> Self {
        ParentId::Message(id)
    }
}

impl From<ParentId> for NodeId {
    fn from(id: ParentId) -> Self {
        match id {
            ParentId::File(id) => id.node(),
            ParentId::Message(id) => id.node(),
        }
    }
}

/// The scalar types a field may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

/// A reference to a message type, either in the same builder or already linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRef {
    /// A message node in the same builder.
    Local(MessageId),
    /// A message from a descriptor pool.
    Foreign(MessageDescriptor),
}

/// A reference to an enum type, either in the same builder or already linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumRef {
    /// An enum node in the same builder.
    Local(EnumId),
    /// An enum from a descriptor pool.
    Foreign(EnumDescriptor),
}

/// The type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A scalar type.
    Scalar(ScalarType),
    /// A message type.
    Message(MessageRef),
    /// An enum type.
    Enum(EnumRef),
}

/// Comments attached to a node, emitted as `SourceCodeInfo` when building.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    /// Comments separated from the node by a blank line.
    pub leading_detached: Vec<String>,
    /// The comment directly before the node.
    pub leading: Option<String>,
    /// The comment directly after the node.
    pub trailing: Option<String>,
}

/// An arena of schema definition nodes.
///
/// See the [module documentation](self) for an overview.
#[derive(Clone, Default)]
pub struct SchemaBuilder {
    nodes: Vec<Node>,
    options: BuildOptions,
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Names declared directly in this scope, including the fields of oneofs and the messages of
    /// map and group fields. Only used by files, messages, enums and services.
    symbols: HashMap<String, NodeId>,
    comments: Comments,
    options: Option<DynamicMessage>,
    data: NodeData,
}

#[derive(Debug, Clone)]
enum NodeData {
    File(FileData),
    Message(MessageData),
    Field(FieldData),
    Oneof,
    Enum,
    EnumValue { number: Option<i32> },
    Service,
    Method(MethodData),
}

#[derive(Debug, Clone)]
struct FileData {
    package: Option<String>,
    syntax: Syntax,
    imports: Vec<FileDescriptor>,
}

#[derive(Debug, Clone, Default)]
struct MessageData {
    /// Numbers of the fields in this message, including those in oneofs.
    tags: BTreeMap<u32, NodeId>,
    extension_ranges: Vec<Range<u32>>,
    reserved_ranges: Vec<Range<u32>>,
    reserved_names: Vec<String>,
}

#[derive(Debug, Clone)]
struct FieldData {
    number: Option<u32>,
    label: Cardinality,
    ty: FieldType,
    shape: FieldShape,
    extendee: Option<MessageRef>,
    default_value: Option<String>,
    json_name: Option<String>,
    proto3_optional: bool,
}

/// Map and group fields own their message type as their only child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldShape {
    Plain,
    Map,
    Group,
}

#[derive(Debug, Clone)]
struct MethodData {
    input: MessageRef,
    output: MessageRef,
    client_streaming: bool,
    server_streaming: bool,
}

impl SchemaBuilder {
    /// Creates an empty builder with the default [`BuildOptions`].
    pub fn new() -> Self {
        SchemaBuilder::default()
    }

    /// Creates an empty builder which builds descriptors using `options`.
    pub fn with_options(options: BuildOptions) -> Self {
        SchemaBuilder {
            nodes: Vec::new(),
            options,
        }
    }

    /// Gets the options used when building descriptors.
    pub fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    /// Sets the options used when building descriptors.
    pub fn set_build_options(&mut self, options: BuildOptions) {
        self.options = options;
    }

    /// Creates a new file with the given path, such as `foo/bar.proto`.
    ///
    /// Files default to `proto3` syntax and no package.
    pub fn new_file(&mut self, name: impl Into<String>) -> FileId {
        FileId(self.alloc(
            name.into(),
            NodeData::File(FileData {
                package: None,
                syntax: Syntax::Proto3,
                imports: Vec::new(),
            }),
        ))
    }

    /// Creates a new, empty message type.
    pub fn new_message(&mut self, name: &str) -> Result<MessageId, BuildError> {
        names::validate_identifier(name)?;
        Ok(MessageId(self.alloc(
            name.to_owned(),
            NodeData::Message(MessageData::default()),
        )))
    }

    /// Creates a new singular field. It is numbered automatically when built unless
    /// [`set_number`](SchemaBuilder::set_number) is called.
    ///
    /// A local message type which is the body of a group cannot be used as a field type.
    pub fn new_field(
        &mut self,
        name: &str,
        ty: impl Into<FieldType>,
    ) -> Result<FieldId, BuildError> {
        names::validate_identifier(name)?;
        let ty = ty.into();
        self.check_field_type(name, &ty)?;
        Ok(FieldId(self.alloc(
            name.to_owned(),
            NodeData::Field(FieldData::new(ty, FieldShape::Plain)),
        )))
    }

    /// Creates a new map field, along with its synthetic entry message.
    pub fn new_map_field(
        &mut self,
        name: &str,
        key: ScalarType,
        value: impl Into<FieldType>,
    ) -> Result<FieldId, BuildError> {
        names::validate_identifier(name)?;
        if !key.is_map_key() {
            return Err(BuildError::invalid_type(
                name,
                "map keys must be integral, bool or string",
            ));
        }
        let value = value.into();
        if matches!(&value, FieldType::Message(MessageRef::Local(message)) if self.is_group_message(message.node()))
        {
            return Err(BuildError::invalid_type(name, "map values cannot be groups"));
        }
        self.check_field_type(name, &value)?;

        let entry = self.alloc(
            names::map_entry_name(name),
            NodeData::Message(MessageData::default()),
        );
        let key_field = self.alloc(
            "key".to_owned(),
            NodeData::Field(FieldData {
                number: Some(1),
                ..FieldData::new(FieldType::Scalar(key), FieldShape::Plain)
            }),
        );
        let value_field = self.alloc(
            "value".to_owned(),
            NodeData::Field(FieldData {
                number: Some(2),
                ..FieldData::new(value, FieldShape::Plain)
            }),
        );
        self.link(entry, key_field);
        self.link(entry, value_field);

        let field = self.alloc(
            name.to_owned(),
            NodeData::Field(FieldData {
                label: Cardinality::Repeated,
                ..FieldData::new(
                    FieldType::Message(MessageRef::Local(MessageId(entry))),
                    FieldShape::Map,
                )
            }),
        );
        self.link(field, entry);
        Ok(FieldId(field))
    }

    /// Creates a new group field, along with its message type. The message is named after the
    /// field, with the first letter capitalized, and can be retrieved with
    /// [`group_message`](SchemaBuilder::group_message).
    ///
    /// Groups are only supported by `proto2` files.
    pub fn new_group_field(&mut self, name: &str) -> Result<FieldId, BuildError> {
        names::validate_group_field_name(name)?;
        let message = self.alloc(
            names::group_message_name(name),
            NodeData::Message(MessageData::default()),
        );
        let field = self.alloc(
            name.to_owned(),
            NodeData::Field(FieldData::new(
                FieldType::Message(MessageRef::Local(MessageId(message))),
                FieldShape::Group,
            )),
        );
        self.link(field, message);
        Ok(FieldId(field))
    }

    /// Creates a new extension of `extendee` with the given number.
    pub fn new_extension(
        &mut self,
        name: &str,
        number: u32,
        ty: impl Into<FieldType>,
        extendee: impl Into<MessageRef>,
    ) -> Result<FieldId, BuildError> {
        names::validate_identifier(name)?;
        mutate::check_field_number(name, i64::from(number))?;
        let ty = ty.into();
        self.check_field_type(name, &ty)?;
        Ok(FieldId(self.alloc(
            name.to_owned(),
            NodeData::Field(FieldData {
                number: Some(number),
                extendee: Some(extendee.into()),
                ..FieldData::new(ty, FieldShape::Plain)
            }),
        )))
    }

    /// Creates a new, empty oneof.
    pub fn new_oneof(&mut self, name: &str) -> Result<OneofId, BuildError> {
        names::validate_identifier(name)?;
        Ok(OneofId(self.alloc(name.to_owned(), NodeData::Oneof)))
    }

    /// Creates a new, empty enum type.
    pub fn new_enum(&mut self, name: &str) -> Result<EnumId, BuildError> {
        names::validate_identifier(name)?;
        Ok(EnumId(self.alloc(name.to_owned(), NodeData::Enum)))
    }

    /// Creates a new enum value. It is numbered automatically when built unless
    /// [`set_number`](SchemaBuilder::set_number) is called.
    pub fn new_enum_value(&mut self, name: &str) -> Result<EnumValueId, BuildError> {
        names::validate_identifier(name)?;
        Ok(EnumValueId(self.alloc(
            name.to_owned(),
            NodeData::EnumValue { number: None },
        )))
    }

    /// Creates a new, empty service.
    pub fn new_service(&mut self, name: &str) -> Result<ServiceId, BuildError> {
        names::validate_identifier(name)?;
        Ok(ServiceId(self.alloc(name.to_owned(), NodeData::Service)))
    }

    /// Creates a new unary method.
    pub fn new_method(
        &mut self,
        name: &str,
        input: impl Into<MessageRef>,
        output: impl Into<MessageRef>,
    ) -> Result<MethodId, BuildError> {
        names::validate_identifier(name)?;
        Ok(MethodId(self.alloc(
            name.to_owned(),
            NodeData::Method(MethodData {
                input: input.into(),
                output: output.into(),
                client_streaming: false,
                server_streaming: false,
            }),
        )))
    }

    /// Gets the kind of a node.
    ///
    /// # Panics
    ///
    /// Like all methods taking an id, panics if `id` was not created by this builder.
    pub fn kind(&self, id: impl Into<NodeId>) -> NodeKind {
        self.node(id.into()).data.kind()
    }

    /// Converts an untyped id to a typed id, if the node has the matching kind.
    pub fn cast<T: TypedNodeId>(&self, id: NodeId) -> Option<T> {
        if self.kind(id) == T::KIND {
            Some(T::from_node(id))
        } else {
            None
        }
    }

    /// Gets the short name of a node, or the path of a file.
    pub fn name(&self, id: impl Into<NodeId>) -> &str {
        &self.node(id.into()).name
    }

    /// Gets the fully qualified name a node would have if built in its current position.
    pub fn full_name(&self, id: impl Into<NodeId>) -> String {
        let id = id.into();
        let node = self.node(id);
        match node.data {
            NodeData::File(_) => node.name.clone(),
            NodeData::EnumValue { .. } => {
                let scope = node
                    .parent
                    .map(|parent| self.scope_name(self.node(parent).parent))
                    .unwrap_or_default();
                names::join_name(&scope, &node.name)
            }
            _ => names::join_name(&self.scope_name(node.parent), &node.name),
        }
    }

    /// Gets the parent of a node, if it has been added to one.
    pub fn parent(&self, id: impl Into<NodeId>) -> Option<NodeId> {
        self.node(id.into()).parent
    }

    /// Gets the children of a node in the order they were added.
    ///
    /// The children of a message are its fields, oneofs, nested types and extensions. Fields
    /// inside a oneof are children of the oneof. Map and group fields have their message type as
    /// their child.
    pub fn children(&self, id: impl Into<NodeId>) -> &[NodeId] {
        &self.node(id.into()).children
    }

    /// Gets the topmost ancestor of a node.
    pub fn root(&self, id: impl Into<NodeId>) -> NodeId {
        let mut id = id.into();
        while let Some(parent) = self.node(id).parent {
            id = parent;
        }
        id
    }

    /// Finds a child of `parent` by name.
    pub fn find_child(&self, parent: impl Into<NodeId>, name: &str) -> Option<NodeId> {
        self.node(parent.into())
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).name == name)
    }

    /// Gets the comments attached to a node.
    pub fn comments(&self, id: impl Into<NodeId>) -> &Comments {
        &self.node(id.into()).comments
    }

    /// Gets the options message set on a node.
    pub fn options(&self, id: impl Into<NodeId>) -> Option<&DynamicMessage> {
        self.node(id.into()).options.as_ref()
    }

    /// Gets the package of a file.
    pub fn package(&self, file: FileId) -> Option<&str> {
        self.file_data(file).package.as_deref()
    }

    /// Gets the syntax of a file.
    pub fn syntax(&self, file: FileId) -> Syntax {
        self.file_data(file).syntax
    }

    /// Gets the existing files imported by a file, in addition to those found while building.
    pub fn imports(&self, file: FileId) -> &[FileDescriptor] {
        &self.file_data(file).imports
    }

    /// Gets the number of a field, or `None` if it is numbered automatically.
    pub fn field_number(&self, field: FieldId) -> Option<u32> {
        self.field_data(field).number
    }

    /// Gets the number of an enum value, or `None` if it is numbered automatically.
    pub fn enum_value_number(&self, value: EnumValueId) -> Option<i32> {
        match &self.node(value.node()).data {
            NodeData::EnumValue { number } => *number,
            _ => unreachable!(),
        }
    }

    /// Gets the type of a field. For map fields this is the entry message.
    pub fn field_type(&self, field: FieldId) -> &FieldType {
        &self.field_data(field).ty
    }

    /// Gets the cardinality of a field.
    pub fn field_label(&self, field: FieldId) -> Cardinality {
        self.field_data(field).label
    }

    /// Gets the message extended by an extension, or `None` if `field` is a regular field.
    pub fn extendee(&self, field: FieldId) -> Option<&MessageRef> {
        self.field_data(field).extendee.as_ref()
    }

    /// Gets the synthetic entry message of a map field.
    pub fn map_entry(&self, field: FieldId) -> Option<MessageId> {
        self.owned_message(field, FieldShape::Map)
    }

    /// Gets the message type of a group field.
    pub fn group_message(&self, field: FieldId) -> Option<MessageId> {
        self.owned_message(field, FieldShape::Group)
    }

    fn owned_message(&self, field: FieldId, shape: FieldShape) -> Option<MessageId> {
        let data = self.field_data(field);
        match &data.ty {
            FieldType::Message(MessageRef::Local(message)) if data.shape == shape => {
                Some(*message)
            }
            _ => None,
        }
    }

    fn alloc(&mut self, name: String, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name,
            parent: None,
            children: Vec::new(),
            symbols: HashMap::new(),
            comments: Comments::default(),
            options: None,
            data,
        });
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    fn file_data(&self, file: FileId) -> &FileData {
        match &self.node(file.node()).data {
            NodeData::File(data) => data,
            _ => unreachable!(),
        }
    }

    fn message_data(&self, message: MessageId) -> &MessageData {
        match &self.node(message.node()).data {
            NodeData::Message(data) => data,
            _ => unreachable!(),
        }
    }

    fn field_data(&self, field: FieldId) -> &FieldData {
        match &self.node(field.node()).data {
            NodeData::Field(data) => data,
            _ => unreachable!(),
        }
    }

    /// The prefix for names declared directly inside `container`.
    fn scope_name(&self, container: Option<NodeId>) -> String {
        let container = match container {
            Some(container) => container,
            None => return String::new(),
        };
        let node = self.node(container);
        match &node.data {
            NodeData::File(data) => data.package.clone().unwrap_or_default(),
            NodeData::Oneof | NodeData::Field(_) => self.scope_name(node.parent),
            _ => self.full_name(container),
        }
    }

    /// The node whose symbol table holds names declared directly inside `container`.
    fn symbol_scope(&self, container: NodeId) -> Option<NodeId> {
        let node = self.node(container);
        match node.data {
            NodeData::Oneof | NodeData::Field(_) => {
                node.parent.and_then(|parent| self.symbol_scope(parent))
            }
            NodeData::EnumValue { .. } | NodeData::Method(_) => None,
            _ => Some(container),
        }
    }

    /// The message whose tag table holds numbers of fields declared directly inside `container`.
    fn tag_scope(&self, container: NodeId) -> Option<NodeId> {
        let node = self.node(container);
        match node.data {
            NodeData::Message(_) => Some(container),
            NodeData::Oneof => node.parent.and_then(|parent| self.tag_scope(parent)),
            _ => None,
        }
    }

    fn is_group_message(&self, message: NodeId) -> bool {
        match self.node(message).parent {
            Some(parent) => matches!(
                &self.node(parent).data,
                NodeData::Field(FieldData {
                    shape: FieldShape::Group,
                    ..
                })
            ),
            None => false,
        }
    }

    fn check_field_type(&self, name: &str, ty: &FieldType) -> Result<(), BuildError> {
        match ty {
            FieldType::Message(MessageRef::Local(message))
                if self.is_group_message(message.node()) =>
            {
                Err(BuildError::invalid_type(
                    name,
                    "the message type of a group cannot be used by other fields",
                ))
            }
            FieldType::Message(MessageRef::Foreign(desc)) if desc.is_map_entry() => Err(
                BuildError::invalid_type(name, "map entry messages cannot be used as field types"),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for SchemaBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("nodes", &self.nodes.len())
            .field("options", &self.options)
            .finish()
    }
}

impl NodeData {
    fn kind(&self) -> NodeKind {
        match self {
            NodeData::File(_) => NodeKind::File,
            NodeData::Message(_) => NodeKind::Message,
            NodeData::Field(_) => NodeKind::Field,
            NodeData::Oneof => NodeKind::Oneof,
            NodeData::Enum => NodeKind::Enum,
            NodeData::EnumValue { .. } => NodeKind::EnumValue,
            NodeData::Service => NodeKind::Service,
            NodeData::Method(_) => NodeKind::Method,
        }
    }
}

impl FieldData {
    fn new(ty: FieldType, shape: FieldShape) -> Self {
        FieldData {
            number: None,
            label: Cardinality::Optional,
            ty,
            shape,
            extendee: None,
            default_value: None,
            json_name: None,
            proto3_optional: false,
        }
    }
}

impl ScalarType {
    fn is_map_key(self) -> bool {
        !matches!(
            self,
            ScalarType::Double | ScalarType::Float | ScalarType::Bytes
        )
    }

    fn proto_type(self) -> Type {
        match self {
            ScalarType::Double => Type::Double,
            ScalarType::Float => Type::Float,
            ScalarType::Int32 => Type::Int32,
            ScalarType::Int64 => Type::Int64,
            ScalarType::Uint32 => Type::Uint32,
            ScalarType::Uint64 => Type::Uint64,
            ScalarType::Sint32 => Type::Sint32,
            ScalarType::Sint64 => Type::Sint64,
            ScalarType::Fixed32 => Type::Fixed32,
            ScalarType::Fixed64 => Type::Fixed64,
            ScalarType::Sfixed32 => Type::Sfixed32,
            ScalarType::Sfixed64 => Type::Sfixed64,
            ScalarType::Bool => Type::Bool,
            ScalarType::String => Type::String,
            ScalarType::Bytes => Type::Bytes,
        }
    }

    /// Returns the scalar type of `kind`, or `None` for message and enum kinds.
    pub fn from_kind(kind: &Kind) -> Option<Self> {
        Some(match kind {
            Kind::Double => ScalarType::Double,
            Kind::Float => ScalarType::Float,
            Kind::Int32 => ScalarType::Int32,
            Kind::Int64 => ScalarType::Int64,
            Kind::Uint32 => ScalarType::Uint32,
            Kind::Uint64 => ScalarType::Uint64,
            Kind::Sint32 => ScalarType::Sint32,
            Kind::Sint64 => ScalarType::Sint64,
            Kind::Fixed32 => ScalarType::Fixed32,
            Kind::Fixed64 => ScalarType::Fixed64,
            Kind::Sfixed32 => ScalarType::Sfixed32,
            Kind::Sfixed64 => ScalarType::Sfixed64,
            Kind::Bool => ScalarType::Bool,
            Kind::String => ScalarType::String,
            Kind::Bytes => ScalarType::Bytes,
            Kind::Message(_) | Kind::Enum(_) => return None,
        })
    }
}

impl FieldType {
    /// Returns the field type corresponding to `kind`, referring to existing descriptors for
    /// message and enum kinds.
    pub fn from_kind(kind: Kind) -> Self {
        match kind {
            Kind::Message(desc) => FieldType::Message(MessageRef::Foreign(desc)),
            Kind::Enum(desc) => FieldType::Enum(EnumRef::Foreign(desc)),
            scalar => match ScalarType::from_kind(&scalar) {
                Some(scalar) => FieldType::Scalar(scalar),
                None => unreachable!(),
            },
        }
    }
}

impl From<ScalarType> for FieldType {
    fn from(ty: ScalarType) -> Self {
        FieldType::Scalar(ty)
    }
}

impl From<MessageRef> for FieldType {
    fn from(ty: MessageRef) -> Self {
        FieldType::Message(ty)
    }
}

impl From<EnumRef> for FieldType {
    fn from(ty: EnumRef) -> Self {
        FieldType::Enum(ty)
    }
}

impl From<MessageId> for FieldType {
    fn from(id: MessageId) -> Self {
        FieldType::Message(MessageRef::Local(id))
    }
}

impl From<EnumId> for FieldType {
    fn from(id: EnumId) -> Self {
        FieldType::Enum(EnumRef::Local(id))
    }
}

impl From<MessageDescriptor> for FieldType {
    fn from(desc: MessageDescriptor) -> Self {
        FieldType::Message(MessageRef::Foreign(desc))
    }
}

impl From<EnumDescriptor> for FieldType {
    fn from(desc: EnumDescriptor) -> Self {
        FieldType::Enum(EnumRef::Foreign(desc))
    }
}

impl From<MessageId> for MessageRef {
    fn from(id: MessageId) -> Self {
        MessageRef::Local(id)
    }
}

impl From<MessageDescriptor> for MessageRef {
    fn from(desc: MessageDescriptor) -> Self {
        MessageRef::Foreign(desc)
    }
}

impl From<EnumId> for EnumRef {
    fn from(id: EnumId) -> Self {
        EnumRef::Local(id)
    }
}

impl From<EnumDescriptor> for EnumRef {
    fn from(desc: EnumDescriptor) -> Self {
        EnumRef::Foreign(desc)
    }
}

impl Comments {
    /// Returns `true` if there are no comments.
    pub fn is_empty(&self) -> bool {
        self.leading_detached.is_empty() && self.leading.is_none() && self.trailing.is_none()
    }
}
