use std::fmt;

use crate::codec::DecodeError;

/// An error returned by a [`DynamicMessage`](super::DynamicMessage) accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    kind: FieldErrorKind,
}

/// The reason a [`DynamicMessage`](super::DynamicMessage) operation failed.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FieldErrorKind {
    /// The message has no field or extension with this number.
    UnknownTagNumber(u32),
    /// The message has no field with this name.
    UnknownFieldName(String),
    /// A map operation was used on a field which is not a map.
    FieldIsNotMap(String),
    /// A repeated operation was used on a field which is not repeated.
    FieldIsNotRepeated(String),
    /// A list index was past the end of a repeated field.
    IndexOutOfRange {
        /// The field name.
        field: String,
        /// The requested index.
        index: usize,
        /// The number of elements in the field.
        len: usize,
    },
    /// The field or extension does not belong to the message.
    TypeMismatch {
        /// The full name of the field.
        field: String,
        /// The full name of the message.
        message: String,
    },
    /// A value does not have the type of the field it was assigned to.
    InvalidValue {
        /// The full name of the field.
        field: String,
        /// A description of the value.
        value: String,
    },
    /// Two message types cannot be converted to each other.
    IncompatibleShape {
        /// The full name of the field whose shapes differ.
        field: String,
        /// A description of the difference.
        reason: String,
    },
    /// Retained unknown field data could not be parsed as the field's type.
    Decode(DecodeError),
}

impl FieldError {
    pub(crate) fn new(kind: FieldErrorKind) -> Self {
        FieldError { kind }
    }

    pub(crate) fn type_mismatch(field: &str, message: &str) -> Self {
        FieldError::new(FieldErrorKind::TypeMismatch {
            field: field.to_owned(),
            message: message.to_owned(),
        })
    }

    pub(crate) fn incompatible(field: &str, reason: impl Into<String>) -> Self {
        FieldError::new(FieldErrorKind::IncompatibleShape {
            field: field.to_owned(),
            reason: reason.into(),
        })
    }

    /// Returns the reason the operation failed.
    pub fn kind(&self) -> &FieldErrorKind {
        &self.kind
    }
}

impl From<FieldErrorKind> for FieldError {
    fn from(kind: FieldErrorKind) -> Self {
        FieldError::new(kind)
    }
}

impl From<DecodeError> for FieldError {
    fn from(err: DecodeError) -> Self {
        FieldError::new(FieldErrorKind::Decode(err))
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FieldErrorKind::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::UnknownTagNumber(number) => {
                write!(f, "no field with number {}", number)
            }
            FieldErrorKind::UnknownFieldName(name) => write!(f, "no field named '{}'", name),
            FieldErrorKind::FieldIsNotMap(name) => write!(f, "field '{}' is not a map", name),
            FieldErrorKind::FieldIsNotRepeated(name) => {
                write!(f, "field '{}' is not repeated", name)
            }
            FieldErrorKind::IndexOutOfRange { field, index, len } => write!(
                f,
                "index {} is out of range for field '{}' with {} elements",
                index, field, len
            ),
            FieldErrorKind::TypeMismatch { field, message } => write!(
                f,
                "field '{}' does not belong to message '{}'",
                field, message
            ),
            FieldErrorKind::InvalidValue { field, value } => {
                write!(f, "invalid value {} for field '{}'", value, field)
            }
            FieldErrorKind::IncompatibleShape { field, reason } => {
                write!(f, "cannot convert field '{}': {}", field, reason)
            }
            FieldErrorKind::Decode(err) => write!(f, "failed to parse field data: {}", err),
        }
    }
}
