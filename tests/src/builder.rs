use prost::Message;
use prost_dynamic::{
    builder::{Comments, FieldType, MessageId, MessageRef, ScalarType, SchemaBuilder},
    DynamicMessage, ExtensionRegistry, Value,
};
use prost_reflect::{Kind, ReflectMessage};

use crate::{build_test_schema, test_pool, ComplexType, Defaults, Scalars};

#[test]
fn test_schema_links() {
    let pool = test_pool();
    let test2 = pool.get_file_by_name("test2.proto").unwrap();
    let dependencies: Vec<String> = test2.dependencies().map(|file| file.name().to_owned()).collect();
    assert_eq!(dependencies, vec!["test.proto"]);

    let complex = pool.get_message_by_name("test.ComplexType").unwrap();
    let numbers: Vec<u32> = complex.fields().map(|field| field.number()).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    assert!(complex.get_field_by_name("int_map").unwrap().is_map());
    assert!(complex
        .get_field_by_name("nickname")
        .unwrap()
        .supports_presence());

    let item = pool.get_message_by_name("test2.ContainsGroup.Item").unwrap();
    assert_eq!(item.get_field_by_name("name").unwrap().number(), 1);
}

#[test]
fn imported_files_build_identically() {
    let mut builder = SchemaBuilder::new();
    let (test, test2) = build_test_schema(&mut builder).unwrap();
    let expected_test = builder.build_file_proto(test).unwrap();
    let expected_test2 = builder.build_file_proto(test2).unwrap();

    let pool = test_pool();
    let mut imported = SchemaBuilder::new();
    let test_copy = imported
        .import_file(&pool.get_file_by_name("test.proto").unwrap())
        .unwrap();
    let test2_copy = imported
        .import_file(&pool.get_file_by_name("test2.proto").unwrap())
        .unwrap();

    assert_eq!(imported.build_file_proto(test_copy).unwrap(), expected_test);
    assert_eq!(imported.build_file_proto(test2_copy).unwrap(), expected_test2);
}

#[test]
fn imported_file_can_be_edited() {
    let pool = test_pool();
    let mut builder = SchemaBuilder::new();
    let file = builder
        .import_file(&pool.get_file_by_name("test.proto").unwrap())
        .unwrap();
    let scalars = builder
        .find_child(file, "Scalars")
        .and_then(|id| builder.cast::<MessageId>(id))
        .unwrap();
    let extra = builder.new_field("extra", ScalarType::Bool).unwrap();
    builder.add_field(scalars, extra).unwrap();
    builder.set_comments(
        extra,
        Comments {
            leading: Some(" Added after import.\n".to_owned()),
            ..Default::default()
        },
    );

    let desc = builder.build_message(scalars).unwrap();
    assert_eq!(desc.get_field_by_name("extra").unwrap().number(), 16);

    // The old static type still decodes messages of the new type.
    let mut message = DynamicMessage::new(desc);
    message.set_field_by_name("int32", Value::I32(4));
    message.set_field_by_name("extra", Value::Bool(true));
    let decoded = Scalars::decode(message.encode_to_vec().as_slice()).unwrap();
    assert_eq!(decoded.int32, 4);
}

#[test]
fn build_against_existing_descriptors() {
    let pool = test_pool();
    let complex = pool.get_message_by_name("test.ComplexType").unwrap();
    let defaults = pool.get_message_by_name("test2.Defaults").unwrap();

    let mut builder = SchemaBuilder::new();
    let file = builder.new_file("extra.proto");
    builder.set_package(file, Some("extra")).unwrap();
    let wrapper = builder.new_message("Wrapper").unwrap();
    let inner = builder.new_field("inner", complex.clone()).unwrap();
    builder.add_field(wrapper, inner).unwrap();
    builder.add_message(file, wrapper).unwrap();
    let tag = builder
        .new_extension("tag", 150, ScalarType::Uint32, defaults.clone())
        .unwrap();
    builder.add_extension(file, tag).unwrap();
    builder.set_syntax(file, prost_reflect::Syntax::Proto2);

    assert!(matches!(
        builder.extendee(tag),
        Some(MessageRef::Foreign(desc)) if desc == &defaults
    ));
    assert!(matches!(
        builder.field_type(inner),
        FieldType::Message(MessageRef::Foreign(_))
    ));

    let built = builder.build_file(file).unwrap();
    let dependencies: Vec<String> = built.dependencies().map(|file| file.name().to_owned()).collect();
    assert_eq!(dependencies, vec!["test.proto", "test2.proto"]);

    let wrapper = built.parent_pool().get_message_by_name("extra.Wrapper").unwrap();
    match wrapper.get_field_by_name("inner").unwrap().kind() {
        Kind::Message(desc) => assert_eq!(desc.full_name(), complex.full_name()),
        kind => panic!("unexpected kind {:?}", kind),
    }

    // An extension registry makes the new extension visible to the existing message type.
    let mut registry = ExtensionRegistry::new();
    registry.add_file(&built);
    let ext = registry.find("test2.Defaults", 150).unwrap().clone();

    let mut static_message = Defaults {
        id: 1,
        ..Default::default()
    }
    .encode_to_vec();
    prost::encoding::uint32::encode(150, &9, &mut static_message);

    let mut message = DynamicMessage::new_with_extensions(defaults, registry);
    message.merge(&static_message).unwrap();
    assert_eq!(message.get_extension(&ext).as_ref(), &Value::U32(9));
    assert_eq!(message.unknown_fields().count(), 0);
}

#[test]
fn detached_message_using_test_types() {
    let mut builder = SchemaBuilder::new();
    let envelope = builder.new_message("Envelope").unwrap();
    let payload = builder
        .new_field("payload", ComplexType::default().descriptor())
        .unwrap();
    builder.add_field(envelope, payload).unwrap();

    let desc = builder.build_message(envelope).unwrap();
    let file = desc.parent_file();
    assert_eq!(file.name(), "Envelope.proto");
    let dependencies: Vec<String> = file.dependencies().map(|file| file.name().to_owned()).collect();
    assert_eq!(dependencies, vec!["test.proto"]);
}
