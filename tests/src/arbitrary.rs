use proptest::prelude::*;

use crate::{ComplexType, EnumType, Scalars, ScalarArrays};

fn finite_f64() -> impl Strategy<Value = f64> {
    use prop::num::f64::*;
    POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO
}

fn finite_f32() -> impl Strategy<Value = f32> {
    use prop::num::f32::*;
    POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO
}

fn enum_number() -> impl Strategy<Value = i32> {
    prop_oneof![
        Just(EnumType::Default as i32),
        Just(EnumType::Foo as i32),
        Just(EnumType::Bar as i32),
    ]
}

prop_compose! {
    pub fn scalars()(
        (double, float, int32, int64, uint32) in (finite_f64(), finite_f32(), any::<i32>(), any::<i64>(), any::<u32>()),
        (uint64, sint32, sint64, fixed32, fixed64) in (any::<u64>(), any::<i32>(), any::<i64>(), any::<u32>(), any::<u64>()),
        (sfixed32, sfixed64, r#bool, string, bytes) in (any::<i32>(), any::<i64>(), any::<bool>(), any::<String>(), any::<Vec<u8>>()),
    ) -> Scalars {
        Scalars {
            double,
            float,
            int32,
            int64,
            uint32,
            uint64,
            sint32,
            sint64,
            fixed32,
            fixed64,
            sfixed32,
            sfixed64,
            r#bool,
            string,
            bytes,
        }
    }
}

prop_compose! {
    pub fn scalar_arrays()(
        double in prop::collection::vec(finite_f64(), 0..4),
        float in prop::collection::vec(finite_f32(), 0..4),
        int32 in prop::collection::vec(any::<i32>(), 0..4),
        sint64 in prop::collection::vec(any::<i64>(), 0..4),
        fixed32 in prop::collection::vec(any::<u32>(), 0..4),
        r#bool in prop::collection::vec(any::<bool>(), 0..4),
        string in prop::collection::vec(any::<String>(), 0..4),
        bytes in prop::collection::vec(any::<Vec<u8>>(), 0..4),
    ) -> ScalarArrays {
        ScalarArrays {
            double,
            float,
            int32,
            sint64,
            fixed32,
            r#bool,
            string,
            bytes,
            ..Default::default()
        }
    }
}

prop_compose! {
    pub fn complex_type()(
        string_map in prop::collection::hash_map(any::<String>(), scalars(), 0..3),
        int_map in prop::collection::hash_map(any::<i32>(), scalars(), 0..3),
        nested in prop::option::of(scalars()),
        my_enum in enum_number(),
        enum_list in prop::collection::vec(enum_number(), 0..4),
        enum_map in prop::collection::hash_map(any::<u64>(), enum_number(), 0..3),
        nickname in prop::option::of(any::<String>()),
    ) -> ComplexType {
        ComplexType {
            string_map,
            int_map,
            nested,
            my_enum,
            enum_list,
            enum_map,
            nickname,
        }
    }
}
