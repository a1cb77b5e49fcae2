//! Field numbers from `descriptor.proto`, used to build `SourceCodeInfo` paths.

pub(super) mod file {
    pub(in crate::builder) const MESSAGE_TYPE: i32 = 4;
    pub(in crate::builder) const ENUM_TYPE: i32 = 5;
    pub(in crate::builder) const SERVICE: i32 = 6;
    pub(in crate::builder) const EXTENSION: i32 = 7;
}

pub(super) mod message {
    pub(in crate::builder) const FIELD: i32 = 2;
    pub(in crate::builder) const NESTED_TYPE: i32 = 3;
    pub(in crate::builder) const ENUM_TYPE: i32 = 4;
    pub(in crate::builder) const EXTENSION: i32 = 6;
    pub(in crate::builder) const ONEOF_DECL: i32 = 8;
}

pub(super) mod enum_ {
    pub(in crate::builder) const VALUE: i32 = 2;
}

pub(super) mod service {
    pub(in crate::builder) const METHOD: i32 = 2;
}
