use prost_reflect::{Cardinality, DescriptorPool, Kind, Syntax};
use prost_types::{
    field_descriptor_proto::{Label, Type},
    FieldDescriptorProto, FileDescriptorProto,
};

use super::*;
use crate::{
    codec::MAX_FIELD_NUMBER,
    dynamic::{DynamicMessage, ExtensionRegistry, MapKey, Value},
};

fn file_with_message(builder: &mut SchemaBuilder, file: &str, message: &str) -> (FileId, MessageId) {
    let file = builder.new_file(file);
    let message = builder.new_message(message).unwrap();
    builder.add_message(file, message).unwrap();
    (file, message)
}

fn scalar_field(builder: &mut SchemaBuilder, message: MessageId, name: &str, ty: ScalarType) -> FieldId {
    let field = builder.new_field(name, ty).unwrap();
    builder.add_field(message, field).unwrap();
    field
}

fn field_numbers(desc: &MessageDescriptor) -> Vec<(String, u32)> {
    desc.fields()
        .map(|field| (field.name().to_owned(), field.number()))
        .collect()
}

fn dependency_names(file: &FileDescriptor) -> Vec<String> {
    file.dependencies().map(|dep| dep.name().to_owned()).collect()
}

/// A linked file declaring `extend google.protobuf.MessageOptions { optional string label = 50000; }`.
fn label_option_file() -> FileDescriptor {
    let mut pool = DescriptorPool::global();
    pool.add_file_descriptor_proto(FileDescriptorProto {
        name: Some("label.proto".to_owned()),
        package: Some("opts".to_owned()),
        dependency: vec!["google/protobuf/descriptor.proto".to_owned()],
        extension: vec![FieldDescriptorProto {
            name: Some("label".to_owned()),
            number: Some(50000),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::String as i32),
            extendee: Some(".google.protobuf.MessageOptions".to_owned()),
            ..Default::default()
        }],
        syntax: Some("proto2".to_owned()),
        ..Default::default()
    })
    .unwrap();
    pool.get_file_by_name("label.proto").unwrap()
}

/// `MessageOptions` with an unrecognized string field 50000.
fn message_options_with_label(value: &str) -> DynamicMessage {
    let desc = DescriptorPool::global()
        .get_message_by_name("google.protobuf.MessageOptions")
        .unwrap();
    let mut bytes = Vec::new();
    prost::encoding::string::encode(50000, &value.to_owned(), &mut bytes);
    DynamicMessage::decode(desc, &bytes).unwrap()
}

#[test]
fn unnumbered_fields_are_numbered_in_order() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "user.proto", "User");
    let id = scalar_field(&mut builder, message, "id", ScalarType::Uint64);
    scalar_field(&mut builder, message, "name", ScalarType::String);

    let desc = builder.build_message(message).unwrap();
    assert_eq!(
        field_numbers(&desc),
        vec![("id".to_owned(), 1), ("name".to_owned(), 2)]
    );
    assert_eq!(builder.field_number(id), None);
}

#[test]
fn numbering_skips_used_and_reserved_numbers() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "numbers.proto", "Numbers");
    builder.add_reserved_range(message, 2..3).unwrap();
    let a = scalar_field(&mut builder, message, "a", ScalarType::Int32);
    let x = scalar_field(&mut builder, message, "x", ScalarType::Int32);
    builder.set_number(x, Some(3)).unwrap();
    scalar_field(&mut builder, message, "b", ScalarType::Int32);
    scalar_field(&mut builder, message, "c", ScalarType::Int32);

    let desc = builder.build_message(message).unwrap();
    assert_eq!(
        field_numbers(&desc),
        vec![
            ("a".to_owned(), 1),
            ("x".to_owned(), 3),
            ("b".to_owned(), 4),
            ("c".to_owned(), 5)
        ]
    );
    assert_eq!(builder.field_number(a), None);
}

#[test]
fn numbering_skips_implementation_reserved_range() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "numbers.proto", "Numbers");
    let last = scalar_field(&mut builder, message, "last", ScalarType::Int32);
    builder.set_number(last, Some(18_999)).unwrap();
    builder.add_reserved_range(message, 1..18_999).unwrap();
    scalar_field(&mut builder, message, "next", ScalarType::Int32);

    let desc = builder.build_message(message).unwrap();
    assert_eq!(desc.get_field_by_name("next").unwrap().number(), 20_000);
}

#[test]
fn enum_values_are_numbered_from_zero() {
    let mut builder = SchemaBuilder::new();
    let file = builder.new_file("status.proto");
    let status = builder.new_enum("Status").unwrap();
    builder.add_enum(file, status).unwrap();
    for name in ["UNKNOWN", "ACTIVE", "DISABLED"] {
        let value = builder.new_enum_value(name).unwrap();
        if name == "ACTIVE" {
            builder.set_number(value, Some(1)).unwrap();
        }
        builder.add_enum_value(status, value).unwrap();
    }

    let desc = builder.build_enum(status).unwrap();
    let values: Vec<(String, i32)> = desc
        .values()
        .map(|value| (value.name().to_owned(), value.number()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("UNKNOWN".to_owned(), 0),
            ("ACTIVE".to_owned(), 1),
            ("DISABLED".to_owned(), 2)
        ]
    );
}

#[test]
fn duplicate_name_leaves_children_unchanged() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "user.proto", "User");
    let first = scalar_field(&mut builder, message, "id", ScalarType::Uint64);
    let second = builder.new_field("id", ScalarType::String).unwrap();

    let err = builder.add_field(message, second).unwrap_err();
    assert!(matches!(
        err.kind(),
        BuildErrorKind::NameCollision { name, scope } if name == "id" && scope == "User"
    ));
    assert_eq!(builder.children(message), &[first.node()]);
    assert_eq!(builder.parent(second), None);
}

#[test]
fn names_in_oneofs_share_the_message_scope() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "contact.proto", "Contact");
    scalar_field(&mut builder, message, "email", ScalarType::String);

    let oneof = builder.new_oneof("method").unwrap();
    let email = builder.new_field("email", ScalarType::String).unwrap();
    builder.add_field_to_oneof(oneof, email).unwrap();

    let err = builder.add_oneof(message, oneof).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::NameCollision { .. }));
    assert!(builder.children(message).len() == 1);
}

#[test]
fn duplicate_tag_is_rejected() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "tags.proto", "Tags");
    let a = scalar_field(&mut builder, message, "a", ScalarType::Int32);
    builder.set_number(a, Some(5)).unwrap();

    let b = builder.new_field("b", ScalarType::Int32).unwrap();
    builder.set_number(b, Some(5)).unwrap();
    let err = builder.add_field(message, b).unwrap_err();
    assert!(matches!(
        err.kind(),
        BuildErrorKind::DuplicateTag { number: 5, message } if message == "Tags"
    ));

    let c = scalar_field(&mut builder, message, "c", ScalarType::Int32);
    let err = builder.set_number(c, Some(5)).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::DuplicateTag { number: 5, .. }));
    assert_eq!(builder.field_number(c), None);

    builder.set_number(a, Some(6)).unwrap();
    builder.set_number(c, Some(5)).unwrap();
}

#[test]
fn out_of_range_numbers_are_rejected() {
    let mut builder = SchemaBuilder::new();
    let field = builder.new_field("f", ScalarType::Int32).unwrap();
    for number in [0, -1, 19_000, 19_999, MAX_FIELD_NUMBER as i32 + 1] {
        let err = builder.set_number(field, Some(number)).unwrap_err();
        assert!(matches!(err.kind(), BuildErrorKind::InvalidNumber { .. }));
    }
    builder.set_number(field, Some(18_999)).unwrap();
    builder.set_number(field, Some(MAX_FIELD_NUMBER as i32)).unwrap();
}

#[test]
fn invalid_identifiers_are_rejected() {
    let mut builder = SchemaBuilder::new();
    assert!(matches!(
        builder.new_message("1Bad").unwrap_err().kind(),
        BuildErrorKind::InvalidIdentifier { .. }
    ));
    assert!(builder.new_field("has-dash", ScalarType::Int32).is_err());
    assert!(builder.new_group_field("Upper").is_err());
    let file = builder.new_file("pkg.proto");
    assert!(builder.set_package(file, Some("a..b")).is_err());
    builder.set_package(file, Some("a.b")).unwrap();
    assert_eq!(builder.package(file), Some("a.b"));
}

#[test]
fn cannot_add_node_to_its_descendant() {
    let mut builder = SchemaBuilder::new();
    let outer = builder.new_message("Outer").unwrap();
    let inner = builder.new_message("Inner").unwrap();
    builder.add_message(outer, inner).unwrap();

    let err = builder.add_message(inner, outer).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::InvalidParent { .. }));
    let err = builder.add_message(outer, outer).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::InvalidParent { .. }));
    assert_eq!(builder.parent(outer), None);
}

#[test]
fn moving_a_node_frees_its_name() {
    let mut builder = SchemaBuilder::new();
    let (file, message) = file_with_message(&mut builder, "move.proto", "Thing");
    let container = builder.new_message("Container").unwrap();
    builder.add_message(file, container).unwrap();

    builder.add_message(container, message).unwrap();
    assert_eq!(builder.parent(message), Some(container.node()));
    assert_eq!(builder.children(file), &[container.node()]);
    assert_eq!(builder.full_name(message), "Container.Thing");

    let other = builder.new_message("Thing").unwrap();
    builder.add_message(file, other).unwrap();
}

#[test]
fn remove_child_by_name() {
    let mut builder = SchemaBuilder::new();
    let (file, message) = file_with_message(&mut builder, "remove.proto", "Gone");
    assert_eq!(builder.remove_child(file, "Gone").unwrap(), message.node());
    assert!(builder.children(file).is_empty());
    assert!(matches!(
        builder.remove_child(file, "Gone").unwrap_err().kind(),
        BuildErrorKind::NotFound { name } if name == "Gone"
    ));
}

#[test]
fn map_field_round_trip() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "counts.proto", "Counts");
    let field = builder
        .new_map_field("string_counts", ScalarType::String, ScalarType::Uint64)
        .unwrap();
    builder.add_field(message, field).unwrap();
    let entry = builder.map_entry(field).unwrap();
    assert_eq!(builder.name(entry), "StringCountsEntry");
    assert_eq!(builder.full_name(entry), "Counts.StringCountsEntry");

    let desc = builder.build_message(message).unwrap();
    let field_desc = desc.get_field_by_name("string_counts").unwrap();
    assert!(field_desc.is_map());

    let mut value = DynamicMessage::new(desc.clone());
    value.put_map_entry(&field_desc, MapKey::String("a".to_owned()), Value::U64(3));
    value.put_map_entry(&field_desc, MapKey::String("b".to_owned()), Value::U64(7));
    let decoded = DynamicMessage::decode(desc, &value.encode_to_vec()).unwrap();
    assert_eq!(
        decoded.get_map_entry(&field_desc, &MapKey::String("b".to_owned())),
        Some(Value::U64(7))
    );
    assert_eq!(decoded, value);
}

#[test]
fn map_field_constraints() {
    let mut builder = SchemaBuilder::new();
    let err = builder
        .new_map_field("bad", ScalarType::Double, ScalarType::Int32)
        .unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::InvalidType { .. }));

    let group = builder.new_group_field("result").unwrap();
    let group_message = builder.group_message(group).unwrap();
    let err = builder
        .new_map_field("results", ScalarType::String, group_message)
        .unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::InvalidType { .. }));

    let map = builder
        .new_map_field("ok", ScalarType::Int32, ScalarType::String)
        .unwrap();
    let entry = builder.map_entry(map).unwrap();
    assert!(builder.detach(entry).is_err());
    let oneof = builder.new_oneof("choice").unwrap();
    assert!(builder.add_field_to_oneof(oneof, map).is_err());
    assert!(builder.set_label(map, Cardinality::Optional).is_err());
}

#[test]
fn rename_keeps_mirrored_names_in_sync() {
    let mut builder = SchemaBuilder::new();
    let (file, message) = file_with_message(&mut builder, "rename.proto", "Search");
    builder.set_syntax(file, Syntax::Proto2);

    let map = builder
        .new_map_field("counts", ScalarType::String, ScalarType::Int32)
        .unwrap();
    builder.add_field(message, map).unwrap();
    builder.rename(map, "word_counts").unwrap();
    let entry = builder.map_entry(map).unwrap();
    assert_eq!(builder.name(entry), "WordCountsEntry");
    assert!(builder.rename(entry, "Other").is_err());

    let group = builder.new_group_field("result").unwrap();
    builder.add_field(message, group).unwrap();
    let group_message = builder.group_message(group).unwrap();
    assert_eq!(builder.name(group_message), "Result");

    builder.rename(group, "hit").unwrap();
    assert_eq!(builder.name(group_message), "Hit");
    builder.rename(group_message, "Match").unwrap();
    assert_eq!(builder.name(group), "match");

    let desc = builder.build_message(message).unwrap();
    let field = desc.get_field_by_name("match").unwrap();
    assert!(field.is_group());
    assert_eq!(field.kind().as_message().unwrap().name(), "Match");
    assert!(desc.get_field_by_name("word_counts").unwrap().is_map());
}

#[test]
fn rename_collision_changes_nothing() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "rename.proto", "Thing");
    scalar_field(&mut builder, message, "a", ScalarType::Int32);
    let b = scalar_field(&mut builder, message, "b", ScalarType::Int32);
    let map = builder
        .new_map_field("values", ScalarType::String, ScalarType::Int32)
        .unwrap();
    builder.add_field(message, map).unwrap();

    assert!(matches!(
        builder.rename(b, "a").unwrap_err().kind(),
        BuildErrorKind::NameCollision { .. }
    ));
    assert_eq!(builder.name(b), "b");

    let nested = builder.new_message("ItemsEntry").unwrap();
    builder.add_message(message, nested).unwrap();
    assert!(builder.rename(map, "items").is_err());
    assert_eq!(builder.name(map), "values");
    assert_eq!(builder.name(builder.map_entry(map).unwrap()), "ValuesEntry");

    builder.rename(b, "c").unwrap();
    let other = builder.new_field("b", ScalarType::Int32).unwrap();
    builder.add_field(message, other).unwrap();
}

#[test]
fn oneofs_and_proto3_optional() {
    let mut builder = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut builder, "choice.proto", "Choice");
    let oneof = builder.new_oneof("kind").unwrap();
    builder.add_oneof(message, oneof).unwrap();
    for name in ["a", "b"] {
        let field = builder.new_field(name, ScalarType::String).unwrap();
        builder.add_field_to_oneof(oneof, field).unwrap();
    }
    let nickname = scalar_field(&mut builder, message, "nickname", ScalarType::String);
    builder.set_proto3_optional(nickname, true).unwrap();

    let desc = builder.build_message(message).unwrap();
    let kind: Vec<String> = desc
        .oneofs()
        .next()
        .unwrap()
        .fields()
        .map(|field| field.name().to_owned())
        .collect();
    assert_eq!(kind, vec!["a".to_owned(), "b".to_owned()]);
    assert!(desc.get_field_by_name("nickname").unwrap().supports_presence());
    assert_eq!(desc.get_field_by_name("b").unwrap().number(), 2);

    let repeated = builder.new_field("list", ScalarType::Int32).unwrap();
    builder.set_label(repeated, Cardinality::Repeated).unwrap();
    assert!(builder.add_field_to_oneof(oneof, repeated).is_err());
    assert!(builder.set_proto3_optional(repeated, true).is_err());
    let a = builder.find_child(oneof, "a").and_then(|id| builder.cast::<FieldId>(id)).unwrap();
    assert!(builder.set_proto3_optional(a, true).is_err());
    assert!(builder.set_label(a, Cardinality::Repeated).is_err());
}

#[test]
fn local_reference_to_another_file_is_built_first() {
    let mut builder = SchemaBuilder::new();
    let (address_file, address) = file_with_message(&mut builder, "address.proto", "Address");
    builder.set_package(address_file, Some("geo")).unwrap();
    scalar_field(&mut builder, address, "city", ScalarType::String);

    let (_, user) = file_with_message(&mut builder, "user.proto", "User");
    let home = builder.new_field("home", address).unwrap();
    builder.add_field(user, home).unwrap();
    let work = builder.new_field("work", address).unwrap();
    builder.add_field(user, work).unwrap();

    let desc = builder.build_message(user).unwrap();
    assert_eq!(dependency_names(&desc.parent_file()), vec!["address.proto".to_owned()]);
    match desc.get_field_by_name("home").unwrap().kind() {
        Kind::Message(message) => assert_eq!(message.full_name(), "geo.Address"),
        kind => panic!("unexpected kind {:?}", kind),
    }
}

#[test]
fn built_dependency_is_listed_once() {
    let mut builder = SchemaBuilder::new();
    let (f2, shared) = file_with_message(&mut builder, "f2.proto", "Shared");
    let level = builder.new_enum("Level").unwrap();
    let zero = builder.new_enum_value("LEVEL_UNSPECIFIED").unwrap();
    builder.add_enum_value(level, zero).unwrap();
    builder.add_enum(f2, level).unwrap();
    let built = builder.build_file(f2).unwrap();
    let shared_desc = built.parent_pool().get_message_by_name("Shared").unwrap();
    let level_desc = built.parent_pool().get_enum_by_name("Level").unwrap();

    let (f1, user) = file_with_message(&mut builder, "f1.proto", "User");
    let a = builder.new_field("a", shared_desc.clone()).unwrap();
    builder.add_field(user, a).unwrap();
    let b = builder.new_field("b", shared_desc).unwrap();
    builder.add_field(user, b).unwrap();
    let c = builder.new_field("c", level_desc).unwrap();
    builder.add_field(user, c).unwrap();
    builder.add_import(f1, built.clone());

    let file = builder.build_file(f1).unwrap();
    assert_eq!(dependency_names(&file), vec!["f2.proto".to_owned()]);
    assert_eq!(builder.build_message(shared).unwrap().full_name(), "Shared");
}

#[test]
fn cyclic_dependency_names_the_chain() {
    let mut builder = SchemaBuilder::new();
    let (a_file, a) = file_with_message(&mut builder, "a.proto", "A");
    let (_, b) = file_with_message(&mut builder, "b.proto", "B");
    let to_b = builder.new_field("b", b).unwrap();
    builder.add_field(a, to_b).unwrap();
    let to_a = builder.new_field("a", a).unwrap();
    builder.add_field(b, to_a).unwrap();

    let err = builder.build_file(a_file).unwrap_err();
    match err.kind() {
        BuildErrorKind::CyclicDependency { chain } => assert_eq!(
            chain,
            &["a.proto".to_owned(), "b.proto".to_owned(), "a.proto".to_owned()]
        ),
        kind => panic!("unexpected error {:?}", kind),
    }
    assert_eq!(
        err.to_string(),
        "cyclic dependency: a.proto -> b.proto -> a.proto"
    );
}

#[test]
fn recursive_types_in_one_file_are_allowed() {
    let mut builder = SchemaBuilder::new();
    let (_, node) = file_with_message(&mut builder, "tree.proto", "Node");
    let children = builder.new_field("children", node).unwrap();
    builder.set_label(children, Cardinality::Repeated).unwrap();
    builder.add_field(node, children).unwrap();

    let desc = builder.build_message(node).unwrap();
    assert!(desc.get_field_by_name("children").unwrap().is_list());
}

#[test]
fn detached_message_gets_a_synthetic_file() {
    let mut builder =
        SchemaBuilder::with_options(BuildOptions::new().synthetic_file_syntax(Syntax::Proto2));
    let message = builder.new_message("Lonely").unwrap();
    let field = builder.new_field("value", ScalarType::Int32).unwrap();
    builder.add_field(message, field).unwrap();

    let desc = builder.build_message(message).unwrap();
    assert_eq!(desc.full_name(), "Lonely");
    let file = desc.parent_file();
    assert_eq!(file.name(), "Lonely.proto");
    assert_eq!(file.package_name(), "");
    assert_eq!(file.syntax(), Syntax::Proto2);
}

#[test]
fn colliding_file_name_gets_a_suffix() {
    let mut builder = SchemaBuilder::new();
    let (_, first) = file_with_message(&mut builder, "dup.proto", "First");
    let (second_file, second) = file_with_message(&mut builder, "dup.proto", "Second");
    let field = builder.new_field("first", first).unwrap();
    builder.add_field(second, field).unwrap();

    let file = builder.build_file(second_file).unwrap();
    assert_eq!(file.name(), "dup_1.proto");
    assert_eq!(dependency_names(&file), vec!["dup.proto".to_owned()]);
}

#[test]
fn building_twice_gives_equal_protos() {
    fn build() -> prost_types::FileDescriptorProto {
        let mut builder = SchemaBuilder::new();
        let (file, message) = file_with_message(&mut builder, "same.proto", "Same");
        builder.set_package(file, Some("same")).unwrap();
        scalar_field(&mut builder, message, "id", ScalarType::Int64);
        let map = builder
            .new_map_field("tags", ScalarType::String, ScalarType::String)
            .unwrap();
        builder.add_field(message, map).unwrap();
        let proto = builder.build_file_proto(file).unwrap();
        assert_eq!(proto, builder.build_file_proto(message).unwrap());
        proto
    }

    let proto = build();
    assert_eq!(proto, build());
    assert_eq!(proto.dependency, Vec::<String>::new());
    assert_eq!(proto.message_type[0].nested_type[0].name(), "TagsEntry");
    assert_eq!(proto.message_type[0].field[1].type_name(), ".same.Same.TagsEntry");
}

#[test]
fn extensions_and_ranges() {
    let mut builder = SchemaBuilder::new();
    let (file, base) = file_with_message(&mut builder, "ext.proto", "Base");
    builder.set_syntax(file, Syntax::Proto2);
    builder.add_extension_range(base, 100..200).unwrap();
    builder.add_reserved_name(base, "old").unwrap();
    assert!(builder.add_extension_range(base, 0..10).is_err());

    let note = builder
        .new_extension("note", 100, ScalarType::String, base)
        .unwrap();
    assert!(builder.add_field(base, note).is_err());
    builder.add_extension(file, note).unwrap();
    assert!(builder.set_number(note, None).is_err());

    let desc = builder.build_extension(note).unwrap();
    assert_eq!(desc.full_name(), "note");
    assert_eq!(desc.containing_message().full_name(), "Base");
    let base_desc = desc.containing_message();
    assert_eq!(base_desc.extension_ranges().collect::<Vec<_>>(), vec![100..200]);
    assert_eq!(base_desc.reserved_names().collect::<Vec<_>>(), vec!["old"]);
}

#[test]
fn services_and_methods() {
    let mut builder = SchemaBuilder::new();
    let (file, request) = file_with_message(&mut builder, "svc.proto", "Request");
    builder.set_package(file, Some("svc")).unwrap();
    let service = builder.new_service("Echo").unwrap();
    let method = builder.new_method("Stream", request, request).unwrap();
    builder.set_streaming(method, false, true);
    builder.add_method(service, method).unwrap();
    builder.add_service(file, service).unwrap();

    let desc = builder.build_service(service).unwrap();
    let method = desc.methods().next().unwrap();
    assert_eq!(method.full_name(), "svc.Echo.Stream");
    assert_eq!(method.input().full_name(), "svc.Request");
    assert!(!method.is_client_streaming());
    assert!(method.is_server_streaming());
}

#[test]
fn detached_plain_field_cannot_be_built() {
    let mut builder = SchemaBuilder::new();
    let field = builder.new_field("orphan", ScalarType::Int32).unwrap();
    assert!(matches!(
        builder.build_extension(field).unwrap_err().kind(),
        BuildErrorKind::InvalidType { .. }
    ));
}

#[test]
fn options_must_match_node_kind() {
    let mut builder = SchemaBuilder::new();
    let field = builder.new_field("f", ScalarType::Int32).unwrap();
    let err = builder
        .set_options(field, Some(message_options_with_label("x")))
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        BuildErrorKind::InvalidOptions { expected: "google.protobuf.FieldOptions", actual }
            if actual == "google.protobuf.MessageOptions"
    ));
}

#[test]
fn custom_option_resolved_from_registry() {
    let label_file = label_option_file();
    let mut registry = ExtensionRegistry::new();
    registry.add_file(&label_file);

    let mut builder = SchemaBuilder::with_options(
        BuildOptions::new()
            .strict_custom_options(true)
            .extension_registry(registry),
    );
    let (_, message) = file_with_message(&mut builder, "labelled.proto", "Labelled");
    builder
        .set_options(message, Some(message_options_with_label("important")))
        .unwrap();

    let desc = builder.build_message(message).unwrap();
    assert_eq!(dependency_names(&desc.parent_file()), vec!["label.proto".to_owned()]);
    let extension = desc.parent_pool().get_extension_by_name("opts.label").unwrap();
    let options = desc.options();
    assert_eq!(
        options.get_extension(&extension).as_str(),
        Some("important")
    );
}

#[test]
fn unresolved_custom_option() {
    let mut strict =
        SchemaBuilder::with_options(BuildOptions::new().strict_custom_options(true));
    let (_, message) = file_with_message(&mut strict, "labelled.proto", "Labelled");
    strict
        .set_options(message, Some(message_options_with_label("x")))
        .unwrap();
    assert!(matches!(
        strict.build_message(message).unwrap_err().kind(),
        BuildErrorKind::UnresolvableCustomOption { options, number: 50000 }
            if options == "google.protobuf.MessageOptions"
    ));

    let mut lenient = SchemaBuilder::new();
    let (_, message) = file_with_message(&mut lenient, "labelled.proto", "Labelled");
    lenient
        .set_options(message, Some(message_options_with_label("x")))
        .unwrap();
    let desc = lenient.build_message(message).unwrap();
    assert!(dependency_names(&desc.parent_file()).is_empty());
}

#[test]
fn custom_option_declared_in_same_file() {
    let descriptor_file = DescriptorPool::global()
        .get_file_by_name("google/protobuf/descriptor.proto")
        .unwrap();
    let message_options = descriptor_file
        .parent_pool()
        .get_message_by_name("google.protobuf.MessageOptions")
        .unwrap();

    let mut builder =
        SchemaBuilder::with_options(BuildOptions::new().strict_custom_options(true));
    let (file, message) = file_with_message(&mut builder, "local.proto", "Local");
    builder.set_syntax(file, Syntax::Proto2);
    let label = builder
        .new_extension("label", 50000, ScalarType::String, message_options)
        .unwrap();
    builder.add_extension(file, label).unwrap();
    builder
        .set_options(message, Some(message_options_with_label("here")))
        .unwrap();

    let desc = builder.build_message(message).unwrap();
    assert_eq!(
        dependency_names(&desc.parent_file()),
        vec!["google/protobuf/descriptor.proto".to_owned()]
    );
}

fn annotated_user_file(builder: &mut SchemaBuilder) -> FileId {
    let (file, user) = file_with_message(builder, "users.proto", "User");
    builder.set_package(file, Some("users")).unwrap();
    builder.set_comments(
        user,
        Comments {
            leading: Some(" A user.\n".to_owned()),
            ..Default::default()
        },
    );

    let id = scalar_field(builder, user, "id", ScalarType::Uint64);
    builder.set_comments(
        id,
        Comments {
            trailing: Some(" The id.\n".to_owned()),
            leading_detached: vec![" Identity.\n".to_owned()],
            ..Default::default()
        },
    );
    let counts = builder
        .new_map_field("counts", ScalarType::String, ScalarType::Uint64)
        .unwrap();
    builder.add_field(user, counts).unwrap();

    let contact = builder.new_oneof("contact").unwrap();
    builder.add_oneof(user, contact).unwrap();
    for name in ["email", "phone"] {
        let field = builder.new_field(name, ScalarType::String).unwrap();
        builder.add_field_to_oneof(contact, field).unwrap();
    }

    let nickname = scalar_field(builder, user, "nickname", ScalarType::String);
    builder.set_proto3_optional(nickname, true).unwrap();
    builder.set_json_name(nickname, Some("nick".to_owned()));

    let status = builder.new_enum("Status").unwrap();
    let status_field = builder.new_field("status", status).unwrap();
    builder.add_field(user, status_field).unwrap();

    let address = builder.new_message("Address").unwrap();
    let city = builder.new_field("city", ScalarType::String).unwrap();
    builder.add_field(address, city).unwrap();
    builder.add_message(user, address).unwrap();
    let address_field = builder.new_field("address", address).unwrap();
    builder.set_number(address_field, Some(20)).unwrap();
    builder.add_field(user, address_field).unwrap();

    for name in ["STATUS_UNKNOWN", "STATUS_ACTIVE"] {
        let value = builder.new_enum_value(name).unwrap();
        builder.add_enum_value(status, value).unwrap();
    }
    builder.add_enum(user, status).unwrap();

    let service = builder.new_service("Users").unwrap();
    builder.set_comments(
        service,
        Comments {
            leading: Some(" User lookups.\n".to_owned()),
            ..Default::default()
        },
    );
    let get = builder.new_method("Get", user, user).unwrap();
    builder.add_method(service, get).unwrap();
    builder.add_service(file, service).unwrap();
    file
}

#[test]
fn import_then_build_preserves_the_file() {
    let mut builder = SchemaBuilder::new();
    let file = annotated_user_file(&mut builder);
    let original = builder.build_file_proto(file).unwrap();
    let built = builder.build_file(file).unwrap();

    let mut imported = SchemaBuilder::new();
    let copy = imported.import_file(&built).unwrap();
    let user = imported
        .find_child(copy, "User")
        .and_then(|id| imported.cast::<MessageId>(id))
        .unwrap();
    let id = imported
        .find_child(user, "id")
        .and_then(|id| imported.cast::<FieldId>(id))
        .unwrap();
    assert_eq!(imported.field_number(id), Some(1));
    assert_eq!(imported.comments(id).trailing.as_deref(), Some(" The id.\n"));
    assert!(imported.find_child(user, "_nickname").is_none());
    assert!(matches!(
        imported.field_type(imported.cast::<FieldId>(imported.find_child(user, "status").unwrap()).unwrap()),
        FieldType::Enum(EnumRef::Local(_))
    ));

    assert_eq!(imported.build_file_proto(copy).unwrap(), original);
}

#[test]
fn import_preserves_groups_and_extensions() {
    let mut builder = SchemaBuilder::new();
    let (file, search) = file_with_message(&mut builder, "search.proto", "Search");
    builder.set_syntax(file, Syntax::Proto2);
    builder.add_extension_range(search, 100..101).unwrap();
    let group = builder.new_group_field("result").unwrap();
    builder.set_label(group, Cardinality::Repeated).unwrap();
    builder.add_field(search, group).unwrap();
    let url = builder.new_field("url", ScalarType::String).unwrap();
    builder.set_default_value(url, Some("about:blank".to_owned())).unwrap();
    let result = builder.group_message(group).unwrap();
    builder.add_field(result, url).unwrap();
    let tag = builder
        .new_extension("tag", 100, ScalarType::String, search)
        .unwrap();
    builder.add_extension(search, tag).unwrap();

    let original = builder.build_file_proto(file).unwrap();
    let built = builder.build_file(file).unwrap();

    let mut imported = SchemaBuilder::new();
    let copy = imported.import_file(&built).unwrap();
    assert_eq!(imported.build_file_proto(copy).unwrap(), original);
}

#[test]
fn import_preserves_options() {
    let mut builder = SchemaBuilder::new();
    let (file, message) = file_with_message(&mut builder, "labelled.proto", "Labelled");
    let options = message_options_with_label("kept");
    builder.set_options(message, Some(options.clone())).unwrap();

    let original = builder.build_file_proto(file).unwrap();
    let built = builder.build_file(file).unwrap();

    let mut imported = SchemaBuilder::new();
    let copy = imported.import_file(&built).unwrap();
    let message = imported
        .find_child(copy, "Labelled")
        .and_then(|id| imported.cast::<MessageId>(id))
        .unwrap();
    assert_eq!(
        imported.options(message).map(|options| options.encode_to_vec()),
        Some(options.encode_to_vec())
    );
    assert_eq!(imported.build_file_proto(copy).unwrap(), original);
}
