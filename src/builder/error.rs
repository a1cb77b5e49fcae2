use std::fmt;

use prost_reflect::DescriptorError;

/// An error that may occur while mutating a [`SchemaBuilder`](crate::builder::SchemaBuilder) or
/// building descriptors from it.
///
/// Mutations which fail leave the builder unchanged.
#[derive(Debug)]
pub struct BuildError {
    kind: Box<BuildErrorKind>,
}

/// The reason a builder operation failed.
#[derive(Debug)]
#[non_exhaustive]
pub enum BuildErrorKind {
    /// A name is already used in the scope a node was added to or renamed in.
    NameCollision {
        /// The conflicting name.
        name: String,
        /// The full name of the scope, or the file name for top-level definitions.
        scope: String,
    },
    /// A field number is already used in the message a field was added to.
    DuplicateTag {
        /// The conflicting number.
        number: u32,
        /// The full name of the message.
        message: String,
    },
    /// A name is not a valid protobuf identifier.
    InvalidIdentifier {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A field or extension number is outside the allowed range.
    InvalidNumber {
        /// The node being numbered.
        name: String,
        /// The rejected number.
        number: i64,
    },
    /// A type or label is not allowed for a node.
    InvalidType {
        /// The node being changed.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
    /// An options message has the wrong type for the node it was set on.
    InvalidOptions {
        /// The expected options message type.
        expected: &'static str,
        /// The type that was given.
        actual: String,
    },
    /// A node cannot be attached to, or detached from, a parent.
    InvalidParent {
        /// The node being moved.
        child: String,
        /// The intended parent.
        parent: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// Building would require a file to depend on itself.
    CyclicDependency {
        /// The names of the roots in the cycle, starting and ending with the same name.
        chain: Vec<String>,
    },
    /// A custom option could not be matched to an extension definition.
    UnresolvableCustomOption {
        /// The options message type.
        options: String,
        /// The field number of the option.
        number: u32,
    },
    /// A child was not found by name, or a built descriptor was missing from the linked file.
    NotFound {
        /// The name that was looked up.
        name: String,
    },
    /// The generated file was rejected by the descriptor pool.
    Link(DescriptorError),
}

impl BuildError {
    pub(crate) fn new(kind: BuildErrorKind) -> Self {
        BuildError {
            kind: Box::new(kind),
        }
    }

    /// Returns the reason this operation failed.
    pub fn kind(&self) -> &BuildErrorKind {
        &self.kind
    }

    pub(crate) fn invalid_type(name: &str, reason: impl Into<String>) -> Self {
        BuildError::new(BuildErrorKind::InvalidType {
            name: name.to_owned(),
            reason: reason.into(),
        })
    }

    pub(crate) fn invalid_parent(child: &str, parent: &str, reason: &'static str) -> Self {
        BuildError::new(BuildErrorKind::InvalidParent {
            child: child.to_owned(),
            parent: parent.to_owned(),
            reason,
        })
    }
}

impl From<BuildErrorKind> for BuildError {
    fn from(kind: BuildErrorKind) -> Self {
        BuildError::new(kind)
    }
}

impl From<DescriptorError> for BuildError {
    fn from(err: DescriptorError) -> Self {
        BuildError::new(BuildErrorKind::Link(err))
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            BuildErrorKind::Link(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.kind {
            BuildErrorKind::NameCollision { name, scope } => {
                write!(f, "name '{}' is already defined in '{}'", name, scope)
            }
            BuildErrorKind::DuplicateTag { number, message } => {
                write!(f, "field number {} is already used in '{}'", number, message)
            }
            BuildErrorKind::InvalidIdentifier { name, reason } => {
                write!(f, "invalid name '{}': {}", name, reason)
            }
            BuildErrorKind::InvalidNumber { name, number } => {
                write!(f, "invalid number {} for '{}'", number, name)
            }
            BuildErrorKind::InvalidType { name, reason } => {
                write!(f, "invalid type for '{}': {}", name, reason)
            }
            BuildErrorKind::InvalidOptions { expected, actual } => {
                write!(f, "expected options of type '{}', found '{}'", expected, actual)
            }
            BuildErrorKind::InvalidParent {
                child,
                parent,
                reason,
            } => write!(f, "cannot add '{}' to '{}': {}", child, parent, reason),
            BuildErrorKind::CyclicDependency { chain } => {
                write!(f, "cyclic dependency: {}", chain.join(" -> "))
            }
            BuildErrorKind::UnresolvableCustomOption { options, number } => write!(
                f,
                "no extension of '{}' with number {} was found for custom option",
                options, number
            ),
            BuildErrorKind::NotFound { name } => write!(f, "'{}' was not found", name),
            BuildErrorKind::Link(err) => write!(f, "failed to link built file: {}", err),
        }
    }
}

#[cfg(feature = "miette")]
#[cfg_attr(docsrs, doc(cfg(feature = "miette")))]
impl miette::Diagnostic for BuildError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &*self.kind {
            BuildErrorKind::NameCollision { .. } => "prost_dynamic::name_collision",
            BuildErrorKind::DuplicateTag { .. } => "prost_dynamic::duplicate_tag",
            BuildErrorKind::InvalidIdentifier { .. } => "prost_dynamic::invalid_identifier",
            BuildErrorKind::InvalidNumber { .. } => "prost_dynamic::invalid_number",
            BuildErrorKind::InvalidType { .. } => "prost_dynamic::invalid_type",
            BuildErrorKind::InvalidOptions { .. } => "prost_dynamic::invalid_options",
            BuildErrorKind::InvalidParent { .. } => "prost_dynamic::invalid_parent",
            BuildErrorKind::CyclicDependency { .. } => "prost_dynamic::cyclic_dependency",
            BuildErrorKind::UnresolvableCustomOption { .. } => {
                "prost_dynamic::unresolvable_custom_option"
            }
            BuildErrorKind::NotFound { .. } => "prost_dynamic::not_found",
            BuildErrorKind::Link(_) => "prost_dynamic::link",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &*self.kind {
            BuildErrorKind::InvalidNumber { .. } => Some(Box::new(
                "field numbers must be between 1 and 536,870,911, excluding 19,000 to 19,999",
            )),
            BuildErrorKind::UnresolvableCustomOption { .. } => Some(Box::new(
                "add the file declaring the extension to BuildOptions::extension_registry",
            )),
            _ => None,
        }
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn miette::Diagnostic> + 'a>> {
        match &*self.kind {
            BuildErrorKind::Link(err) => Some(Box::new(std::iter::once(
                err as &dyn miette::Diagnostic,
            ))),
            _ => None,
        }
    }
}
