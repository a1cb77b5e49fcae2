use std::collections::HashMap;

use prost::Message;
use prost_reflect::{
    DescriptorPool, EnumDescriptor, ExtensionDescriptor, FileDescriptor, MessageDescriptor,
    ServiceDescriptor,
};
use tracing::{debug, trace};

use super::{
    names, proto, serialize::Serializer, BuildError, BuildErrorKind, BuildOptions, EnumId,
    EnumRef, FieldId, FieldType, FileId, MessageId, MessageRef, NodeData, NodeId, NodeKind,
    SchemaBuilder, ServiceId,
};
use crate::dynamic::{DynamicMessage, Value};

impl SchemaBuilder {
    /// Builds a file and every file it depends on, returning the linked descriptor.
    ///
    /// Types from other files in this builder are built first. Building does not modify the
    /// builder: fields without a number are numbered in the output only.
    pub fn build_file(&self, file: FileId) -> Result<FileDescriptor, BuildError> {
        Resolver::new(self).resolve(file.node())
    }

    /// Builds the file containing a message, returning the linked message descriptor.
    ///
    /// If the message is not part of a file, it is placed in a generated file with no package.
    pub fn build_message(&self, message: MessageId) -> Result<MessageDescriptor, BuildError> {
        let file = self.build_containing_file(message.node())?;
        let name = self.full_name(message);
        file.parent_pool()
            .get_message_by_name(&name)
            .ok_or_else(|| not_found(name))
    }

    /// Builds the file containing an enum, returning the linked enum descriptor.
    pub fn build_enum(&self, enum_: EnumId) -> Result<EnumDescriptor, BuildError> {
        let file = self.build_containing_file(enum_.node())?;
        let name = self.full_name(enum_);
        file.parent_pool()
            .get_enum_by_name(&name)
            .ok_or_else(|| not_found(name))
    }

    /// Builds the file containing a service, returning the linked service descriptor.
    pub fn build_service(&self, service: ServiceId) -> Result<ServiceDescriptor, BuildError> {
        let file = self.build_containing_file(service.node())?;
        let name = self.full_name(service);
        file.parent_pool()
            .get_service_by_name(&name)
            .ok_or_else(|| not_found(name))
    }

    /// Builds the file containing an extension, returning the linked extension descriptor.
    pub fn build_extension(&self, extension: FieldId) -> Result<ExtensionDescriptor, BuildError> {
        let file = self.build_containing_file(extension.node())?;
        let name = self.full_name(extension);
        file.parent_pool()
            .get_extension_by_name(&name)
            .ok_or_else(|| not_found(name))
    }

    /// Builds the file containing a node and returns it in its serialized form, as it was
    /// linked.
    ///
    /// Custom options are not declared by `prost_types` and so are omitted from the result.
    pub fn build_file_proto(
        &self,
        id: impl Into<NodeId>,
    ) -> Result<prost_types::FileDescriptorProto, BuildError> {
        let root = self.root(id);
        let mut resolver = Resolver::new(self);
        resolver.stack.push(root);
        let (_, proto) = resolver.link_root(root)?;
        proto.to_prost().map_err(|err| {
            BuildError::invalid_type(&proto.name.unwrap_or_default(), err.to_string())
        })
    }

    fn build_containing_file(&self, id: NodeId) -> Result<FileDescriptor, BuildError> {
        Resolver::new(self).resolve(self.root(id))
    }
}

fn not_found(name: String) -> BuildError {
    BuildError::new(BuildErrorKind::NotFound { name })
}

/// Resolves and links the files needed by a single build.
struct Resolver<'a> {
    builder: &'a SchemaBuilder,
    options: &'a BuildOptions,
    pool: DescriptorPool,
    memo: HashMap<NodeId, FileDescriptor>,
    stack: Vec<NodeId>,
}

impl<'a> Resolver<'a> {
    fn new(builder: &'a SchemaBuilder) -> Self {
        Resolver {
            builder,
            options: &builder.options,
            pool: DescriptorPool::new(),
            memo: HashMap::new(),
            stack: Vec::new(),
        }
    }

    fn resolve(&mut self, root: NodeId) -> Result<FileDescriptor, BuildError> {
        if let Some(file) = self.memo.get(&root) {
            return Ok(file.clone());
        }
        if let Some(start) = self.stack.iter().position(|&r| r == root) {
            let chain: Vec<String> = self.stack[start..]
                .iter()
                .chain(Some(&root))
                .map(|&r| self.root_label(r))
                .collect();
            debug!(chain = ?chain, "detected cyclic dependency");
            return Err(BuildError::new(BuildErrorKind::CyclicDependency { chain }));
        }

        self.stack.push(root);
        let result = self.link_root(root);
        self.stack.pop();

        let (file, _) = result?;
        self.memo.insert(root, file.clone());
        Ok(file)
    }

    fn link_root(
        &mut self,
        root: NodeId,
    ) -> Result<(FileDescriptor, proto::FileDescriptorProto), BuildError> {
        self.check_root(root)?;

        let mut dependencies = Vec::new();
        self.collect_dependencies(root, root, &mut dependencies)?;
        dependencies.sort_by(|l, r| l.name().cmp(r.name()));
        dependencies.dedup_by(|l, r| l.name() == r.name());

        for dependency in &dependencies {
            self.add_to_pool(dependency)?;
        }

        let name = self.file_name(root);
        let dependency_names: Vec<String> = dependencies
            .iter()
            .map(|file| file.name().to_owned())
            .collect();
        debug!(file = %name, dependencies = ?dependency_names, "linking built file");
        let proto = Serializer::file(
            self.builder,
            root,
            name.clone(),
            dependency_names,
            self.options.synthetic_file_syntax,
        );
        self.pool
            .decode_file_descriptor_proto(proto.encode_to_vec().as_slice())?;
        let file = self.pool.get_file_by_name(&name).ok_or_else(|| not_found(name))?;
        Ok((file, proto))
    }

    fn check_root(&self, root: NodeId) -> Result<(), BuildError> {
        let reason = match &self.builder.node(root).data {
            NodeData::File(_) | NodeData::Message(_) | NodeData::Enum | NodeData::Service => None,
            NodeData::Field(field) if field.extendee.is_some() => None,
            NodeData::Field(_) => Some("fields must be part of a message to be built"),
            NodeData::Oneof => Some("oneofs must be part of a message to be built"),
            NodeData::EnumValue { .. } => Some("enum values must be part of an enum to be built"),
            NodeData::Method(_) => Some("methods must be part of a service to be built"),
        };
        match reason {
            Some(reason) => Err(BuildError::invalid_type(&self.builder.full_name(root), reason)),
            None => Ok(()),
        }
    }

    /// Adds a file which was linked elsewhere to the pool, after its own dependencies.
    fn add_to_pool(&mut self, file: &FileDescriptor) -> Result<(), BuildError> {
        if self.pool.get_file_by_name(file.name()).is_some() {
            return Ok(());
        }
        for dependency in file.dependencies() {
            self.add_to_pool(&dependency)?;
        }
        self.pool
            .decode_file_descriptor_proto(file.encode_to_vec().as_slice())?;
        Ok(())
    }

    /// The name of the built file for a root, with a numeric suffix if a file of that name was
    /// already linked.
    fn file_name(&self, root: NodeId) -> String {
        let node = self.builder.node(root);
        let name = match node.data {
            NodeData::File(_) => node.name.clone(),
            _ => format!("{}.proto", node.name),
        };
        if self.pool.get_file_by_name(&name).is_none() {
            return name;
        }

        let mut suffix = 1;
        loop {
            let candidate = names::with_suffix(&name, suffix);
            if self.pool.get_file_by_name(&candidate).is_none() {
                debug!(file = %name, renamed = %candidate, "renamed built file to avoid a collision");
                return candidate;
            }
            suffix += 1;
        }
    }

    fn root_label(&self, root: NodeId) -> String {
        match self.builder.kind(root) {
            NodeKind::File => self.builder.name(root).to_owned(),
            _ => self.builder.full_name(root),
        }
    }

    fn collect_dependencies(
        &mut self,
        root: NodeId,
        id: NodeId,
        dependencies: &mut Vec<FileDescriptor>,
    ) -> Result<(), BuildError> {
        let builder = self.builder;
        let node = builder.node(id);
        match &node.data {
            NodeData::File(file) => {
                for import in &file.imports {
                    self.add_dependency(import.clone(), dependencies);
                }
            }
            NodeData::Field(field) => {
                match &field.ty {
                    FieldType::Scalar(_) => (),
                    FieldType::Message(message) => {
                        self.message_dependency(root, message, dependencies)?
                    }
                    FieldType::Enum(EnumRef::Foreign(desc)) => {
                        self.add_dependency(desc.parent_file(), dependencies)
                    }
                    FieldType::Enum(EnumRef::Local(enum_)) => {
                        self.local_dependency(root, enum_.node(), dependencies)?
                    }
                }
                if let Some(extendee) = &field.extendee {
                    self.message_dependency(root, extendee, dependencies)?;
                }
            }
            NodeData::Method(method) => {
                self.message_dependency(root, &method.input, dependencies)?;
                self.message_dependency(root, &method.output, dependencies)?;
            }
            _ => (),
        }

        if let Some(options) = &node.options {
            self.option_dependencies(root, options, dependencies)?;
        }

        for &child in &node.children {
            self.collect_dependencies(root, child, dependencies)?;
        }
        Ok(())
    }

    fn message_dependency(
        &mut self,
        root: NodeId,
        message: &MessageRef,
        dependencies: &mut Vec<FileDescriptor>,
    ) -> Result<(), BuildError> {
        match message {
            MessageRef::Foreign(desc) => {
                self.add_dependency(desc.parent_file(), dependencies);
                Ok(())
            }
            MessageRef::Local(message) => self.local_dependency(root, message.node(), dependencies),
        }
    }

    fn local_dependency(
        &mut self,
        root: NodeId,
        target: NodeId,
        dependencies: &mut Vec<FileDescriptor>,
    ) -> Result<(), BuildError> {
        let target_root = self.builder.root(target);
        if target_root != root {
            let file = self.resolve(target_root)?;
            self.add_dependency(file, dependencies);
        }
        Ok(())
    }

    fn add_dependency(&self, file: FileDescriptor, dependencies: &mut Vec<FileDescriptor>) {
        if !dependencies.iter().any(|d| d.name() == file.name()) {
            trace!(file = file.name(), "collected dependency");
            dependencies.push(file);
        }
    }

    /// Finds the files declaring the extensions set in an options message.
    fn option_dependencies(
        &mut self,
        root: NodeId,
        options: &DynamicMessage,
        dependencies: &mut Vec<FileDescriptor>,
    ) -> Result<(), BuildError> {
        for (extension, value) in options.extensions() {
            self.add_dependency(extension.parent_file(), dependencies);
            self.value_dependencies(root, value, dependencies)?;
        }
        for (_, value) in options.fields() {
            self.value_dependencies(root, value, dependencies)?;
        }

        let desc = options.descriptor();
        for unknown in options.unknown_fields() {
            let number = unknown.number();
            match self.find_custom_option(root, &desc, number, dependencies) {
                Some(Some(file)) => self.add_dependency(file, dependencies),
                Some(None) => (),
                None if self.options.strict_custom_options => {
                    return Err(BuildError::new(BuildErrorKind::UnresolvableCustomOption {
                        options: desc.full_name().to_owned(),
                        number,
                    }))
                }
                None => {
                    trace!(
                        options = desc.full_name(),
                        number,
                        "skipped unresolved custom option"
                    );
                }
            }
        }
        Ok(())
    }

    fn value_dependencies(
        &mut self,
        root: NodeId,
        value: &Value,
        dependencies: &mut Vec<FileDescriptor>,
    ) -> Result<(), BuildError> {
        match value {
            Value::Message(message) => self.option_dependencies(root, message, dependencies),
            Value::List(values) => {
                for value in values {
                    self.value_dependencies(root, value, dependencies)?;
                }
                Ok(())
            }
            Value::Map(values) => {
                for value in values.values() {
                    self.value_dependencies(root, value, dependencies)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Looks up the extension declaring an unrecognized option field. Returns `Some(None)` if it
    /// is declared in the file being built.
    fn find_custom_option(
        &self,
        root: NodeId,
        options: &MessageDescriptor,
        number: u32,
        dependencies: &[FileDescriptor],
    ) -> Option<Option<FileDescriptor>> {
        let in_pool = |pool: &DescriptorPool| {
            pool.get_message_by_name(options.full_name())
                .and_then(|message| message.get_extension(number))
        };

        if let Some(extension) = dependencies.iter().find_map(|file| in_pool(file.parent_pool())) {
            return Some(Some(extension.parent_file()));
        }
        if self.has_local_extension(root, options.full_name(), number) {
            return Some(None);
        }
        if let Some(extension) = self
            .options
            .extension_registry
            .find(options.full_name(), number)
        {
            return Some(Some(extension.parent_file()));
        }
        in_pool(&DescriptorPool::global()).map(|extension| Some(extension.parent_file()))
    }

    fn has_local_extension(&self, id: NodeId, extendee: &str, number: u32) -> bool {
        let node = self.builder.node(id);
        if let NodeData::Field(field) = &node.data {
            if let Some(MessageRef::Foreign(desc)) = &field.extendee {
                if desc.full_name() == extendee && field.number == Some(number) {
                    return true;
                }
            }
        }
        node.children
            .iter()
            .any(|&child| self.has_local_extension(child, extendee, number))
    }
}
