//! Shared fixtures for the integration tests: a test schema built with [`SchemaBuilder`], and
//! generated-style `prost` messages which reflect over it.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use prost_dynamic::builder::{BuildError, FileId, ScalarType, SchemaBuilder};
use prost_reflect::{Cardinality, DescriptorPool, MessageDescriptor, ReflectMessage, Syntax};

#[cfg(test)]
mod arbitrary;
#[cfg(test)]
mod builder;
#[cfg(test)]
mod decode;

static TEST_POOL: Lazy<DescriptorPool> = Lazy::new(|| {
    let mut builder = SchemaBuilder::new();
    let (_, test2) = build_test_schema(&mut builder).expect("failed to define test schema");
    let file = builder
        .build_file(test2)
        .expect("failed to build test schema");
    file.parent_pool().clone()
});

pub fn test_pool() -> DescriptorPool {
    TEST_POOL.clone()
}

pub const SCALAR_FIELDS: [(&str, ScalarType); 15] = [
    ("double", ScalarType::Double),
    ("float", ScalarType::Float),
    ("int32", ScalarType::Int32),
    ("int64", ScalarType::Int64),
    ("uint32", ScalarType::Uint32),
    ("uint64", ScalarType::Uint64),
    ("sint32", ScalarType::Sint32),
    ("sint64", ScalarType::Sint64),
    ("fixed32", ScalarType::Fixed32),
    ("fixed64", ScalarType::Fixed64),
    ("sfixed32", ScalarType::Sfixed32),
    ("sfixed64", ScalarType::Sfixed64),
    ("bool", ScalarType::Bool),
    ("string", ScalarType::String),
    ("bytes", ScalarType::Bytes),
];

/// Defines `test.proto` and `test2.proto`, which depends on the first, returning both files.
///
/// ```proto
/// // test.proto
/// syntax = "proto3";
/// package test;
///
/// message Scalars { double double = 1; ... bytes bytes = 15; }
/// message ScalarArrays { repeated double double = 1; ... repeated bytes bytes = 15; }
/// enum EnumType { DEFAULT = 0; FOO = 1; BAR = 2; }
/// message ComplexType {
///   map<string, Scalars> string_map = 1;
///   map<sint32, Scalars> int_map = 2;
///   Scalars nested = 3;
///   EnumType my_enum = 4;
///   repeated EnumType enum_list = 5;
///   map<uint64, EnumType> enum_map = 6;
///   optional string nickname = 7;
/// }
/// message MessageWithOneof {
///   oneof test_oneof { string oneof_field_1 = 1; int32 oneof_field_2 = 2; Scalars oneof_message = 3; }
/// }
///
/// // test2.proto
/// syntax = "proto2";
/// package test2;
///
/// enum Level { LOW = 1; HIGH = 2; }
/// message Defaults {
///   optional int32 int = 1 [default = 3];
///   optional string string = 2 [default = "hello"];
///   optional Level level = 3 [default = HIGH];
///   required int32 id = 4;
///   extensions 100 to 200;
/// }
/// extend Defaults { optional string note = 100; }
/// message ContainsGroup {
///   repeated group Item = 1 { required string name = 1; optional int32 count = 2; }
///   optional test.Scalars scalars = 2;
/// }
/// ```
pub fn build_test_schema(builder: &mut SchemaBuilder) -> Result<(FileId, FileId), BuildError> {
    let test = builder.new_file("test.proto");
    builder.set_package(test, Some("test"))?;

    let scalars = builder.new_message("Scalars")?;
    let scalar_arrays = builder.new_message("ScalarArrays")?;
    for (name, ty) in SCALAR_FIELDS {
        let field = builder.new_field(name, ty)?;
        builder.add_field(scalars, field)?;
        let list = builder.new_field(name, ty)?;
        builder.set_label(list, Cardinality::Repeated)?;
        builder.add_field(scalar_arrays, list)?;
    }
    builder.add_message(test, scalars)?;
    builder.add_message(test, scalar_arrays)?;

    let enum_type = builder.new_enum("EnumType")?;
    for name in ["DEFAULT", "FOO", "BAR"] {
        let value = builder.new_enum_value(name)?;
        builder.add_enum_value(enum_type, value)?;
    }
    builder.add_enum(test, enum_type)?;

    let complex = builder.new_message("ComplexType")?;
    let string_map = builder.new_map_field("string_map", ScalarType::String, scalars)?;
    let int_map = builder.new_map_field("int_map", ScalarType::Sint32, scalars)?;
    let nested = builder.new_field("nested", scalars)?;
    let my_enum = builder.new_field("my_enum", enum_type)?;
    let enum_list = builder.new_field("enum_list", enum_type)?;
    builder.set_label(enum_list, Cardinality::Repeated)?;
    let enum_map = builder.new_map_field("enum_map", ScalarType::Uint64, enum_type)?;
    let nickname = builder.new_field("nickname", ScalarType::String)?;
    builder.set_proto3_optional(nickname, true)?;
    for field in [
        string_map, int_map, nested, my_enum, enum_list, enum_map, nickname,
    ] {
        builder.add_field(complex, field)?;
    }
    builder.add_message(test, complex)?;

    let with_oneof = builder.new_message("MessageWithOneof")?;
    let test_oneof = builder.new_oneof("test_oneof")?;
    let oneof_field_1 = builder.new_field("oneof_field_1", ScalarType::String)?;
    let oneof_field_2 = builder.new_field("oneof_field_2", ScalarType::Int32)?;
    let oneof_message = builder.new_field("oneof_message", scalars)?;
    for field in [oneof_field_1, oneof_field_2, oneof_message] {
        builder.add_field_to_oneof(test_oneof, field)?;
    }
    builder.add_oneof(with_oneof, test_oneof)?;
    builder.add_message(test, with_oneof)?;

    let test2 = builder.new_file("test2.proto");
    builder.set_package(test2, Some("test2"))?;
    builder.set_syntax(test2, Syntax::Proto2);

    let level = builder.new_enum("Level")?;
    for (name, number) in [("LOW", 1), ("HIGH", 2)] {
        let value = builder.new_enum_value(name)?;
        builder.set_number(value, Some(number))?;
        builder.add_enum_value(level, value)?;
    }
    builder.add_enum(test2, level)?;

    let defaults = builder.new_message("Defaults")?;
    let int = builder.new_field("int", ScalarType::Int32)?;
    builder.set_default_value(int, Some("3".to_owned()))?;
    let string = builder.new_field("string", ScalarType::String)?;
    builder.set_default_value(string, Some("hello".to_owned()))?;
    let level_field = builder.new_field("level", level)?;
    builder.set_default_value(level_field, Some("HIGH".to_owned()))?;
    let id = builder.new_field("id", ScalarType::Int32)?;
    builder.set_label(id, Cardinality::Required)?;
    for field in [int, string, level_field, id] {
        builder.add_field(defaults, field)?;
    }
    builder.add_extension_range(defaults, 100..201)?;
    builder.add_message(test2, defaults)?;

    let note = builder.new_extension("note", 100, ScalarType::String, defaults)?;
    builder.add_extension(test2, note)?;

    let contains_group = builder.new_message("ContainsGroup")?;
    let item = builder.new_group_field("item")?;
    builder.set_label(item, Cardinality::Repeated)?;
    let item_message = builder
        .group_message(item)
        .expect("group fields always have a message");
    let name = builder.new_field("name", ScalarType::String)?;
    builder.set_label(name, Cardinality::Required)?;
    let count = builder.new_field("count", ScalarType::Int32)?;
    builder.add_field(item_message, name)?;
    builder.add_field(item_message, count)?;
    builder.add_field(contains_group, item)?;
    let scalars_field = builder.new_field("scalars", scalars)?;
    builder.add_field(contains_group, scalars_field)?;
    builder.add_message(test2, contains_group)?;

    Ok((test, test2))
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Scalars {
    #[prost(double, tag = "1")]
    pub double: f64,
    #[prost(float, tag = "2")]
    pub float: f32,
    #[prost(int32, tag = "3")]
    pub int32: i32,
    #[prost(int64, tag = "4")]
    pub int64: i64,
    #[prost(uint32, tag = "5")]
    pub uint32: u32,
    #[prost(uint64, tag = "6")]
    pub uint64: u64,
    #[prost(sint32, tag = "7")]
    pub sint32: i32,
    #[prost(sint64, tag = "8")]
    pub sint64: i64,
    #[prost(fixed32, tag = "9")]
    pub fixed32: u32,
    #[prost(fixed64, tag = "10")]
    pub fixed64: u64,
    #[prost(sfixed32, tag = "11")]
    pub sfixed32: i32,
    #[prost(sfixed64, tag = "12")]
    pub sfixed64: i64,
    #[prost(bool, tag = "13")]
    pub r#bool: bool,
    #[prost(string, tag = "14")]
    pub string: String,
    #[prost(bytes = "vec", tag = "15")]
    pub bytes: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ScalarArrays {
    #[prost(double, repeated, tag = "1")]
    pub double: Vec<f64>,
    #[prost(float, repeated, tag = "2")]
    pub float: Vec<f32>,
    #[prost(int32, repeated, tag = "3")]
    pub int32: Vec<i32>,
    #[prost(int64, repeated, tag = "4")]
    pub int64: Vec<i64>,
    #[prost(uint32, repeated, tag = "5")]
    pub uint32: Vec<u32>,
    #[prost(uint64, repeated, tag = "6")]
    pub uint64: Vec<u64>,
    #[prost(sint32, repeated, tag = "7")]
    pub sint32: Vec<i32>,
    #[prost(sint64, repeated, tag = "8")]
    pub sint64: Vec<i64>,
    #[prost(fixed32, repeated, tag = "9")]
    pub fixed32: Vec<u32>,
    #[prost(fixed64, repeated, tag = "10")]
    pub fixed64: Vec<u64>,
    #[prost(sfixed32, repeated, tag = "11")]
    pub sfixed32: Vec<i32>,
    #[prost(sfixed64, repeated, tag = "12")]
    pub sfixed64: Vec<i64>,
    #[prost(bool, repeated, tag = "13")]
    pub r#bool: Vec<bool>,
    #[prost(string, repeated, tag = "14")]
    pub string: Vec<String>,
    #[prost(bytes = "vec", repeated, tag = "15")]
    pub bytes: Vec<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum EnumType {
    Default = 0,
    Foo = 1,
    Bar = 2,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ComplexType {
    #[prost(map = "string, message", tag = "1")]
    pub string_map: HashMap<String, Scalars>,
    #[prost(map = "sint32, message", tag = "2")]
    pub int_map: HashMap<i32, Scalars>,
    #[prost(message, optional, tag = "3")]
    pub nested: Option<Scalars>,
    #[prost(enumeration = "EnumType", tag = "4")]
    pub my_enum: i32,
    #[prost(enumeration = "EnumType", repeated, tag = "5")]
    pub enum_list: Vec<i32>,
    #[prost(map = "uint64, enumeration(EnumType)", tag = "6")]
    pub enum_map: HashMap<u64, i32>,
    #[prost(string, optional, tag = "7")]
    pub nickname: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MessageWithOneof {
    #[prost(oneof = "TestOneof", tags = "1, 2, 3")]
    pub test_oneof: Option<TestOneof>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum TestOneof {
    #[prost(string, tag = "1")]
    OneofField1(String),
    #[prost(int32, tag = "2")]
    OneofField2(i32),
    #[prost(message, tag = "3")]
    OneofMessage(Scalars),
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Defaults {
    #[prost(int32, optional, tag = "1")]
    pub int: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub string: Option<String>,
    #[prost(int32, optional, tag = "3")]
    pub level: Option<i32>,
    #[prost(int32, required, tag = "4")]
    pub id: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ContainsGroup {
    #[prost(group, repeated, tag = "1")]
    pub item: Vec<Item>,
    #[prost(message, optional, tag = "2")]
    pub scalars: Option<Scalars>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Item {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(int32, optional, tag = "2")]
    pub count: Option<i32>,
}

macro_rules! reflect_messages {
    ($($ty:ty => $name:literal,)*) => {
        $(
            impl ReflectMessage for $ty {
                fn descriptor(&self) -> MessageDescriptor {
                    TEST_POOL
                        .get_message_by_name($name)
                        .expect(concat!($name, " is not defined"))
                }
            }
        )*
    };
}

reflect_messages! {
    Scalars => "test.Scalars",
    ScalarArrays => "test.ScalarArrays",
    ComplexType => "test.ComplexType",
    MessageWithOneof => "test.MessageWithOneof",
    Defaults => "test2.Defaults",
    ContainsGroup => "test2.ContainsGroup",
    Item => "test2.ContainsGroup.Item",
}
