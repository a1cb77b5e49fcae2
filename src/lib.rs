//! Runtime protobuf support built on [`prost`] and [`prost_reflect`].
//!
//! This crate lets programs work with protobuf schemas and messages whose types are not known
//! at compile time:
//!
//! * [`codec`] reads and writes the protobuf binary wire format, including descriptor-driven
//!   encoding and decoding of whole field values.
//! * [`builder`] builds schemas programmatically. A [`SchemaBuilder`] holds a tree of
//!   definitions which can be changed freely, then built into linked descriptors.
//! * [`dynamic`] provides [`DynamicMessage`], a message value which can represent any message
//!   type given its descriptor, and convert to and from generated message types.
//!
//! # Example
//!
//! ```
//! use prost_dynamic::builder::{ScalarType, SchemaBuilder};
//! use prost_dynamic::{DynamicMessage, Value};
//!
//! let mut builder = SchemaBuilder::new();
//! let file = builder.new_file("point.proto");
//! let point = builder.new_message("Point").unwrap();
//! for name in ["x", "y"] {
//!     let field = builder.new_field(name, ScalarType::Sint32).unwrap();
//!     builder.add_field(point, field).unwrap();
//! }
//! builder.add_message(file, point).unwrap();
//! let desc = builder.build_message(point).unwrap();
//!
//! let mut message = DynamicMessage::new(desc.clone());
//! message.set_field_by_name("x", Value::I32(-3));
//! let bytes = message.encode_to_vec();
//! assert_eq!(bytes, [0x08, 0x05]);
//!
//! let decoded = DynamicMessage::decode(desc, &bytes).unwrap();
//! assert_eq!(decoded.get_field_by_name("x").as_i32(), Some(-3));
//! assert_eq!(decoded.get_field_by_name("y").as_i32(), Some(0));
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_debug_implementations, missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod codec;
pub mod dynamic;

pub use {prost, prost::bytes, prost_reflect, prost_types};

pub use self::builder::{BuildError, BuildOptions, SchemaBuilder};
pub use self::codec::{Buffer, DecodeError};
pub use self::dynamic::{DynamicMessage, ExtensionRegistry, FieldError, MapKey, Value};
