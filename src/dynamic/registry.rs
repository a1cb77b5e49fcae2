use std::{collections::BTreeMap, sync::Arc};

use prost_reflect::{DescriptorPool, ExtensionDescriptor, FileDescriptor, MessageDescriptor};

/// A set of extension fields, indexed by extended message and field number.
///
/// Cloning a registry is cheap: the index is shared and only copied when a clone is modified.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    extensions: Arc<BTreeMap<String, BTreeMap<u32, ExtensionDescriptor>>>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ExtensionRegistry::default()
    }

    /// Creates a registry holding every extension in `pool`.
    pub fn from_pool(pool: &DescriptorPool) -> Self {
        let mut registry = ExtensionRegistry::new();
        for extension in pool.all_extensions() {
            registry.add_extension(extension);
        }
        registry
    }

    /// Adds an extension, returning the extension previously registered for the same message
    /// and number.
    pub fn add_extension(&mut self, extension: ExtensionDescriptor) -> Option<ExtensionDescriptor> {
        let extendee = extension.containing_message().full_name().to_owned();
        Arc::make_mut(&mut self.extensions)
            .entry(extendee)
            .or_default()
            .insert(extension.number(), extension)
    }

    /// Adds every extension declared in `file`, at the top level or nested in messages.
    pub fn add_file(&mut self, file: &FileDescriptor) {
        for extension in file.extensions() {
            self.add_extension(extension);
        }
        let mut messages: Vec<MessageDescriptor> = file.messages().collect();
        while let Some(message) = messages.pop() {
            for extension in message.child_extensions() {
                self.add_extension(extension);
            }
            messages.extend(message.child_messages());
        }
    }

    /// Finds the extension of `extendee` with the given field number.
    pub fn find(&self, extendee: &str, number: u32) -> Option<&ExtensionDescriptor> {
        self.extensions.get(extendee)?.get(&number)
    }

    /// Finds an extension of `extendee` by its fully-qualified name.
    pub fn find_by_name(&self, extendee: &str, full_name: &str) -> Option<&ExtensionDescriptor> {
        self.extensions
            .get(extendee)?
            .values()
            .find(|extension| extension.full_name() == full_name)
    }

    /// Iterates over the extensions of `extendee` in field number order.
    pub fn extensions_of<'a>(
        &'a self,
        extendee: &str,
    ) -> impl Iterator<Item = &'a ExtensionDescriptor> + 'a {
        self.extensions
            .get(extendee)
            .into_iter()
            .flat_map(|extensions| extensions.values())
    }

    /// Iterates over every registered extension.
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionDescriptor> + '_ {
        self.extensions.values().flat_map(|extensions| extensions.values())
    }

    /// Returns `true` if no extensions are registered.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
