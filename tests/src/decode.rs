use std::{collections::HashMap, fmt::Debug};

use proptest::{prelude::*, test_runner::TestCaseError};
use prost::{bytes::Bytes, Message};
use prost_dynamic::{DynamicMessage, MapKey, Value};
use prost_reflect::ReflectMessage;

use crate::{
    arbitrary, test_pool, ComplexType, ContainsGroup, Defaults, EnumType, Item, MessageWithOneof,
    Scalars, ScalarArrays, TestOneof,
};

fn to_dynamic<T>(message: &T) -> DynamicMessage
where
    T: ReflectMessage,
{
    DynamicMessage::decode(message.descriptor(), &message.encode_to_vec()).unwrap()
}

fn roundtrip<T>(message: &T) -> Result<(), TestCaseError>
where
    T: ReflectMessage + Clone + PartialEq + Debug + Default,
{
    let dynamic = to_dynamic(message);
    let decoded = T::decode(dynamic.encode_to_vec().as_slice()).unwrap();
    prop_assert_eq!(&decoded, message);

    let converted: T = dynamic.try_convert_to_message().unwrap();
    prop_assert_eq!(&converted, message);
    Ok(())
}

fn sample_scalars() -> Scalars {
    Scalars {
        double: 1.1,
        float: 2.2,
        int32: 3,
        int64: 4,
        uint32: 5,
        uint64: 6,
        sint32: -7,
        sint64: -8,
        fixed32: 9,
        fixed64: 10,
        sfixed32: -11,
        sfixed64: -12,
        r#bool: true,
        string: "thirteen".to_owned(),
        bytes: b"fourteen".to_vec(),
    }
}

#[test]
fn decode_scalars() {
    let dynamic = to_dynamic(&sample_scalars());

    let expected = [
        ("double", Value::F64(1.1)),
        ("float", Value::F32(2.2)),
        ("int32", Value::I32(3)),
        ("int64", Value::I64(4)),
        ("uint32", Value::U32(5)),
        ("uint64", Value::U64(6)),
        ("sint32", Value::I32(-7)),
        ("sint64", Value::I64(-8)),
        ("fixed32", Value::U32(9)),
        ("fixed64", Value::U64(10)),
        ("sfixed32", Value::I32(-11)),
        ("sfixed64", Value::I64(-12)),
        ("bool", Value::Bool(true)),
        ("string", Value::String("thirteen".to_owned())),
        ("bytes", Value::Bytes(Bytes::from_static(b"fourteen"))),
    ];
    for (name, value) in expected {
        assert_eq!(dynamic.get_field_by_name(name).as_ref(), &value, "{}", name);
    }
}

#[test]
fn decode_scalar_arrays() {
    let dynamic = to_dynamic(&ScalarArrays {
        int32: vec![1, -2, 300],
        sint64: vec![-1],
        string: vec!["a".to_owned(), "b".to_owned()],
        ..Default::default()
    });

    assert_eq!(
        dynamic.get_field_by_name("int32").as_list().unwrap(),
        &[Value::I32(1), Value::I32(-2), Value::I32(300)]
    );
    assert_eq!(
        dynamic.get_field_by_name("sint64").as_list().unwrap(),
        &[Value::I64(-1)]
    );
    assert_eq!(
        dynamic.get_field_by_name("string").as_list().unwrap(),
        &[Value::String("a".to_owned()), Value::String("b".to_owned())]
    );
    assert!(dynamic.get_field_by_name("double").as_list().unwrap().is_empty());
}

#[test]
fn decode_complex_type() {
    let message = ComplexType {
        string_map: HashMap::from([("a".to_owned(), sample_scalars())]),
        int_map: HashMap::from([(-4, Scalars::default())]),
        nested: Some(Scalars {
            int32: 9,
            ..Default::default()
        }),
        my_enum: EnumType::Bar as i32,
        enum_list: vec![EnumType::Foo as i32, 5],
        enum_map: HashMap::from([(7, EnumType::Foo as i32)]),
        nickname: Some(String::new()),
    };
    let dynamic = to_dynamic(&message);
    let desc = dynamic.descriptor();

    let string_map = desc.get_field_by_name("string_map").unwrap();
    let entry = dynamic
        .get_map_entry(&string_map, &MapKey::String("a".to_owned()))
        .unwrap();
    assert_eq!(
        entry.as_message().unwrap().get_field_by_name("uint64").as_ref(),
        &Value::U64(6)
    );
    let int_map = desc.get_field_by_name("int_map").unwrap();
    assert!(dynamic.get_map_entry(&int_map, &MapKey::I32(-4)).is_some());

    assert_eq!(
        dynamic
            .get_field_by_name("nested")
            .as_message()
            .unwrap()
            .get_field_by_name("int32")
            .as_ref(),
        &Value::I32(9)
    );
    assert_eq!(
        dynamic.get_field_by_name("my_enum").as_ref(),
        &Value::EnumNumber(2)
    );
    assert_eq!(
        dynamic.get_field_by_name("enum_list").as_list().unwrap(),
        &[Value::EnumNumber(1), Value::EnumNumber(5)]
    );
    let enum_map = desc.get_field_by_name("enum_map").unwrap();
    assert_eq!(
        dynamic.get_map_entry(&enum_map, &MapKey::U64(7)),
        Some(Value::EnumNumber(1))
    );

    let nickname = desc.get_field_by_name("nickname").unwrap();
    assert!(dynamic.has_field(&nickname));
    assert_eq!(dynamic.get_field(&nickname).as_str(), Some(""));

    roundtrip(&message).unwrap();
}

#[test]
fn oneof_members_replace_each_other() {
    let mut dynamic = to_dynamic(&MessageWithOneof {
        test_oneof: Some(TestOneof::OneofField1("first".to_owned())),
    });
    let desc = dynamic.descriptor();
    let field_1 = desc.get_field_by_name("oneof_field_1").unwrap();
    let field_2 = desc.get_field_by_name("oneof_field_2").unwrap();
    assert!(dynamic.has_field(&field_1));

    dynamic.set_field(&field_2, Value::I32(0));
    assert!(!dynamic.has_field(&field_1));
    assert!(dynamic.has_field(&field_2));

    let converted: MessageWithOneof = dynamic.try_convert_to_message().unwrap();
    assert_eq!(converted.test_oneof, Some(TestOneof::OneofField2(0)));
}

#[test]
fn proto2_defaults_and_required_fields() {
    let dynamic = to_dynamic(&Defaults {
        id: 1,
        ..Default::default()
    });
    assert_eq!(dynamic.get_field_by_name("int").as_ref(), &Value::I32(3));
    assert_eq!(
        dynamic.get_field_by_name("string").as_str(),
        Some("hello")
    );
    assert_eq!(
        dynamic.get_field_by_name("level").as_ref(),
        &Value::EnumNumber(2)
    );
    assert!(dynamic.validate().is_empty());

    let empty = DynamicMessage::new(dynamic.descriptor());
    assert_eq!(empty.validate(), vec!["id".to_owned()]);
}

#[test]
fn extension_known_to_the_pool() {
    let pool = test_pool();
    let note = pool.get_extension_by_name("test2.note").unwrap();

    let mut message = DynamicMessage::new(pool.get_message_by_name("test2.Defaults").unwrap());
    message.set_field_by_name("id", Value::I32(2));
    message.set_extension(&note, Value::String("extended".to_owned()));
    let bytes = message.encode_to_vec();

    let decoded = DynamicMessage::decode(message.descriptor(), &bytes).unwrap();
    assert_eq!(decoded.get_extension(&note).as_str(), Some("extended"));
    assert_eq!(decoded.unknown_fields().count(), 0);

    let static_message = Defaults::decode(bytes.as_slice()).unwrap();
    assert_eq!(static_message.id, 2);
}

#[test]
fn groups() {
    let message = ContainsGroup {
        item: vec![
            Item {
                name: "one".to_owned(),
                count: Some(1),
            },
            Item {
                name: "two".to_owned(),
                count: None,
            },
        ],
        scalars: Some(sample_scalars()),
    };
    let dynamic = to_dynamic(&message);
    let items = dynamic.get_field_by_name("item");
    let items = items.as_list().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[1].as_message().unwrap().get_field_by_name("name").as_str(),
        Some("two")
    );
    roundtrip(&message).unwrap();

    let mut missing = dynamic.clone();
    let item = missing.descriptor().get_field_by_name("item").unwrap();
    let mut unnamed = DynamicMessage::new(item.kind().as_message().unwrap().clone());
    unnamed.set_field_by_name("count", Value::I32(3));
    missing.add_repeated(&item, Value::Message(unnamed));
    assert_eq!(missing.validate(), vec!["item[2].name".to_owned()]);
}

#[test]
fn unrecognized_fields_are_reencoded() {
    let pool = test_pool();
    let defaults = pool.get_message_by_name("test2.Defaults").unwrap();
    let scalars_bytes = Scalars {
        uint32: 5,
        string: "x".to_owned(),
        bytes: b"y".to_vec(),
        ..Default::default()
    }
    .encode_to_vec();

    // None of these numbers are fields of Defaults.
    let mut message = DynamicMessage::decode(defaults, &scalars_bytes).unwrap();
    let numbers: Vec<u32> = message.unknown_fields().map(|field| field.number()).collect();
    assert_eq!(numbers, vec![5, 14, 15]);
    assert_eq!(message.encode_to_vec(), scalars_bytes);

    message.clear_unknown_fields();
    assert_eq!(message.unknown_fields().count(), 0);
    assert!(message.encode_to_vec().is_empty());
}

#[test]
fn merge_into_static_message() {
    let mut dynamic = to_dynamic(&Scalars {
        int32: 5,
        ..Default::default()
    });
    dynamic.set_field_by_name("string", Value::String("merged".to_owned()));

    let mut target = Scalars {
        int64: 7,
        string: "old".to_owned(),
        ..Default::default()
    };
    dynamic.try_merge_into_message(&mut target).unwrap();
    assert_eq!(target.int32, 5);
    assert_eq!(target.int64, 7);
    assert_eq!(target.string, "merged");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roundtrip_scalars(message in arbitrary::scalars()) {
        roundtrip(&message)?;
    }

    #[test]
    fn roundtrip_scalar_arrays(message in arbitrary::scalar_arrays()) {
        roundtrip(&message)?;
    }

    #[test]
    fn roundtrip_complex_type(message in arbitrary::complex_type()) {
        roundtrip(&message)?;
    }
}
