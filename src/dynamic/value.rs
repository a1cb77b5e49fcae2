use std::collections::HashMap;

use prost::bytes::Bytes;
use prost_reflect::{FieldDescriptor, Kind};

use super::{fields::FieldDescriptorLike, DynamicMessage};

/// A field value held by a [`DynamicMessage`].
///
/// Integer variants cover several wire encodings each (`I32` is used for `int32`, `sint32`
/// and `sfixed32`), so the field descriptor decides how a value is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bool`.
    Bool(bool),
    /// `int32`, `sint32` or `sfixed32`.
    I32(i32),
    /// `int64`, `sint64` or `sfixed64`.
    I64(i64),
    /// `uint32` or `fixed32`.
    U32(u32),
    /// `uint64` or `fixed64`.
    U64(u64),
    /// `float`.
    F32(f32),
    /// `double`.
    F64(f64),
    /// `string`.
    String(String),
    /// `bytes`.
    Bytes(Bytes),
    /// The number of an enum value. Numbers without a declared value are kept as-is.
    EnumNumber(i32),
    /// A nested message or group.
    Message(DynamicMessage),
    /// The elements of a repeated field.
    List(Vec<Value>),
    /// The entries of a map field.
    Map(HashMap<MapKey, Value>),
}

/// The key of a map field entry. Protobuf only allows integral, `bool` and `string` keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum MapKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

macro_rules! copy_accessors {
    ($($name:ident => $variant:ident($ty:ty),)*) => {
        $(
            #[doc = concat!("Returns the contained value if this is a `Value::", stringify!($variant), "`.")]
            pub fn $name(&self) -> Option<$ty> {
                match *self {
                    Value::$variant(value) => Some(value),
                    _ => None,
                }
            }
        )*
    };
}

macro_rules! ref_accessors {
    ($($name:ident, $name_mut:ident => $variant:ident($ty:ty, $ty_mut:ty),)*) => {
        $(
            #[doc = concat!("Borrows the contents if this is a `Value::", stringify!($variant), "`.")]
            pub fn $name(&self) -> Option<&$ty> {
                match self {
                    Value::$variant(value) => Some(value),
                    _ => None,
                }
            }

            #[doc = concat!("Mutably borrows the contents if this is a `Value::", stringify!($variant), "`.")]
            pub fn $name_mut(&mut self) -> Option<&mut $ty_mut> {
                match self {
                    Value::$variant(value) => Some(value),
                    _ => None,
                }
            }
        )*
    };
}

impl Value {
    /// The value an unset field reads as.
    ///
    /// Repeated fields give an empty list and map fields an empty map. A proto2 field with a
    /// declared default gives that default. Everything else falls back to
    /// [`default_value`](Value::default_value) of the field's kind.
    pub fn default_value_for_field(field: &FieldDescriptor) -> Self {
        field.default_field_value()
    }

    /// The zero value of a single element of `kind`. Messages default to an empty instance and
    /// enums to their first declared value.
    pub fn default_value(kind: &Kind) -> Self {
        match kind {
            Kind::Double => Value::F64(0.0),
            Kind::Float => Value::F32(0.0),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(0),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(0),
            Kind::Uint32 | Kind::Fixed32 => Value::U32(0),
            Kind::Uint64 | Kind::Fixed64 => Value::U64(0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Bytes::new()),
            Kind::Enum(desc) => Value::EnumNumber(desc.default_value().number()),
            Kind::Message(desc) => Value::Message(DynamicMessage::new(desc.clone())),
        }
    }

    /// Whether this equals [`Value::default_value(kind)`](Value::default_value).
    pub fn is_default(&self, kind: &Kind) -> bool {
        *self == Value::default_value(kind)
    }

    /// Whether this value is a single element of `kind`.
    ///
    /// Lists and maps never match. A message matches only a message kind with the same full name.
    pub fn is_valid(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::Message(message), Kind::Message(desc)) => {
                message.descriptor().full_name() == desc.full_name()
            }
            (Value::EnumNumber(_), Kind::Enum(_))
            | (Value::F64(_), Kind::Double)
            | (Value::F32(_), Kind::Float)
            | (Value::Bytes(_), Kind::Bytes) => true,
            (Value::List(_) | Value::Map(_) | Value::Message(_), _) => false,
            (value, kind) => value
                .clone()
                .into_map_key()
                .map_or(false, |key| key.is_valid(kind)),
        }
    }

    /// Converts a `bool`, integer or string value into the equivalent map key.
    pub fn into_map_key(self) -> Option<MapKey> {
        Some(match self {
            Value::Bool(value) => MapKey::Bool(value),
            Value::I32(value) => MapKey::I32(value),
            Value::I64(value) => MapKey::I64(value),
            Value::U32(value) => MapKey::U32(value),
            Value::U64(value) => MapKey::U64(value),
            Value::String(value) => MapKey::String(value),
            _ => return None,
        })
    }

    copy_accessors! {
        as_bool => Bool(bool),
        as_i32 => I32(i32),
        as_i64 => I64(i64),
        as_u32 => U32(u32),
        as_u64 => U64(u64),
        as_f32 => F32(f32),
        as_f64 => F64(f64),
        as_enum_number => EnumNumber(i32),
    }

    ref_accessors! {
        as_message, as_message_mut => Message(DynamicMessage, DynamicMessage),
        as_list, as_list_mut => List([Value], Vec<Value>),
        as_map, as_map_mut => Map(HashMap<MapKey, Value>, HashMap<MapKey, Value>),
    }

    /// Borrows the string if this is a `Value::String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Borrows the bytes if this is a `Value::Bytes`.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(value) => Some(value),
            _ => None,
        }
    }
}

impl MapKey {
    /// The zero key for `kind`.
    ///
    /// # Panics
    ///
    /// Panics if `kind` cannot be a map key.
    pub fn default_value(kind: &Kind) -> Self {
        match kind {
            Kind::Bool => MapKey::Bool(false),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => MapKey::I32(0),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => MapKey::I64(0),
            Kind::Uint32 | Kind::Fixed32 => MapKey::U32(0),
            Kind::Uint64 | Kind::Fixed64 => MapKey::U64(0),
            Kind::String => MapKey::String(String::new()),
            kind => panic!("{:?} cannot be used as a map key", kind),
        }
    }

    /// Whether this key can be written as `kind`.
    pub fn is_valid(&self, kind: &Kind) -> bool {
        match self {
            MapKey::Bool(_) => matches!(kind, Kind::Bool),
            MapKey::I32(_) => matches!(kind, Kind::Int32 | Kind::Sint32 | Kind::Sfixed32),
            MapKey::I64(_) => matches!(kind, Kind::Int64 | Kind::Sint64 | Kind::Sfixed64),
            MapKey::U32(_) => matches!(kind, Kind::Uint32 | Kind::Fixed32),
            MapKey::U64(_) => matches!(kind, Kind::Uint64 | Kind::Fixed64),
            MapKey::String(_) => matches!(kind, Kind::String),
        }
    }

    /// Borrows the string if this is a `MapKey::String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MapKey::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::Bool(value) => Value::Bool(value),
            MapKey::I32(value) => Value::I32(value),
            MapKey::I64(value) => Value::I64(value),
            MapKey::U32(value) => Value::U32(value),
            MapKey::U64(value) => Value::U64(value),
            MapKey::String(value) => Value::String(value),
        }
    }
}

/// Parses the text form of a proto2 `default_value`. Returns `None` if `text` does not fit `kind`.
pub(crate) fn parse_default_value(kind: &Kind, text: &str) -> Option<Value> {
    Some(match kind {
        Kind::Bool => Value::Bool(text.parse().ok()?),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(text.parse().ok()?),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(text.parse().ok()?),
        Kind::Uint32 | Kind::Fixed32 => Value::U32(text.parse().ok()?),
        Kind::Uint64 | Kind::Fixed64 => Value::U64(text.parse().ok()?),
        Kind::Float => Value::F32(text.parse().ok()?),
        Kind::Double => Value::F64(text.parse().ok()?),
        Kind::String => Value::String(text.to_owned()),
        Kind::Bytes => Value::Bytes(unescape_c_escape_string(text).ok()?),
        Kind::Enum(desc) => Value::EnumNumber(desc.get_value_by_name(text)?.number()),
        Kind::Message(_) => return None,
    })
}

/// Reverses the C-style escaping `protoc` applies to `bytes` defaults: the simple escapes,
/// up to three octal digits, and `\x` followed by exactly two hex digits.
pub(crate) fn unescape_c_escape_string(text: &str) -> Result<Bytes, &'static str> {
    let mut bytes = text.bytes().peekable();
    let mut out = Vec::with_capacity(text.len());

    while let Some(byte) = bytes.next() {
        if byte != b'\\' {
            out.push(byte);
            continue;
        }

        let escape = bytes.next().ok_or("missing escape character")?;
        let unescaped = match escape {
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0b,
            b'\\' | b'?' | b'\'' | b'"' => escape,
            b'0'..=b'7' => {
                let mut octal = escape - b'0';
                for _ in 0..2 {
                    match bytes.next_if(|digit| (b'0'..=b'7').contains(digit)) {
                        Some(digit) => octal = octal.wrapping_mul(8).wrapping_add(digit - b'0'),
                        None => break,
                    }
                }
                octal
            }
            b'x' | b'X' => {
                let mut hex = 0u8;
                for _ in 0..2 {
                    let digit = bytes.next().ok_or("hex escape must contain two characters")?;
                    let digit = (digit as char).to_digit(16).ok_or("invalid hex escape")?;
                    hex = hex * 16 + digit as u8;
                }
                hex
            }
            _ => return Err("invalid escape character"),
        };
        out.push(unescaped);
    }

    Ok(out.into())
}
