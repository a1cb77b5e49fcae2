use prost_reflect::Syntax;

use crate::dynamic::ExtensionRegistry;

/// Options to control how a [`SchemaBuilder`](crate::builder::SchemaBuilder) builds descriptors.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub(super) strict_custom_options: bool,
    pub(super) extension_registry: ExtensionRegistry,
    pub(super) synthetic_file_syntax: Syntax,
}

impl BuildOptions {
    /// Creates a new instance of [`BuildOptions`], with the default options chosen to be lenient.
    pub fn new() -> Self {
        BuildOptions {
            strict_custom_options: false,
            extension_registry: ExtensionRegistry::new(),
            synthetic_file_syntax: Syntax::Proto3,
        }
    }

    /// Whether to fail when an options message contains a field which cannot be matched to an
    /// extension definition.
    ///
    /// Custom options are searched for in the files already being imported, extensions defined
    /// alongside the node being built, the [`extension_registry`](BuildOptions::extension_registry),
    /// and finally the [global descriptor pool](prost_reflect::DescriptorPool::global). If this
    /// option is disabled, unmatched options are still written to the built file as raw bytes, but
    /// their defining file is not imported.
    ///
    /// The default value is `false`.
    pub fn strict_custom_options(mut self, yes: bool) -> Self {
        self.strict_custom_options = yes;
        self
    }

    /// Extensions to consult when resolving custom options.
    ///
    /// The default value is an empty registry.
    pub fn extension_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.extension_registry = registry;
        self
    }

    /// The syntax of the file generated to hold a node which is not part of a file.
    ///
    /// The default value is [`Syntax::Proto3`].
    pub fn synthetic_file_syntax(mut self, syntax: Syntax) -> Self {
        self.synthetic_file_syntax = syntax;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new()
    }
}
