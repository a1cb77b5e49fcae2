use super::{BuildError, BuildErrorKind};

pub(super) fn validate_identifier(name: &str) -> Result<(), BuildError> {
    let reason = match name.chars().next() {
        None => "name is empty",
        Some(ch) if !(ch.is_ascii_alphabetic() || ch == '_') => {
            "name must start with a letter or underscore"
        }
        Some(_) if !name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') => {
            "name may only contain letters, digits and underscores"
        }
        Some(_) => return Ok(()),
    };
    Err(BuildError::new(BuildErrorKind::InvalidIdentifier {
        name: name.to_owned(),
        reason,
    }))
}

pub(super) fn validate_package(package: &str) -> Result<(), BuildError> {
    for part in package.split('.') {
        validate_identifier(part).map_err(|_| {
            BuildError::new(BuildErrorKind::InvalidIdentifier {
                name: package.to_owned(),
                reason: "package must be a dot-separated list of identifiers",
            })
        })?;
    }
    Ok(())
}

pub(super) fn validate_group_field_name(name: &str) -> Result<(), BuildError> {
    validate_identifier(name)?;
    if name.chars().any(|ch| ch.is_ascii_uppercase()) {
        return Err(BuildError::new(BuildErrorKind::InvalidIdentifier {
            name: name.to_owned(),
            reason: "group field names must be lower case",
        }));
    }
    Ok(())
}

pub(super) fn join_name(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", scope, name)
    }
}

pub(super) fn to_json_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut uppercase_next = false;

    for ch in name.chars() {
        if ch == '_' {
            uppercase_next = true
        } else if uppercase_next {
            result.push(ch.to_ascii_uppercase());
            uppercase_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}

/// The name of the synthetic message holding the entries of a map field.
pub(super) fn map_entry_name(field_name: &str) -> String {
    let mut result = String::with_capacity(field_name.len() + 5);
    let mut uppercase_next = true;

    for ch in field_name.chars() {
        if ch == '_' {
            uppercase_next = true
        } else if uppercase_next {
            result.push(ch.to_ascii_uppercase());
            uppercase_next = false;
        } else {
            result.push(ch);
        }
    }

    result.push_str("Entry");
    result
}

pub(super) fn group_message_name(field_name: &str) -> String {
    let mut chars = field_name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub(super) fn group_field_name(message_name: &str) -> String {
    message_name.to_ascii_lowercase()
}

/// Inserts a numeric suffix before the `.proto` extension, if any.
pub(super) fn with_suffix(file_name: &str, suffix: usize) -> String {
    match file_name.strip_suffix(".proto") {
        Some(stem) => format!("{}_{}.proto", stem, suffix),
        None => format!("{}_{}", file_name, suffix),
    }
}

#[test]
fn test_names() {
    assert!(validate_identifier("foo_Bar2").is_ok());
    assert!(validate_identifier("_x").is_ok());
    assert!(validate_identifier("").is_err());
    assert!(validate_identifier("2x").is_err());
    assert!(validate_identifier("a.b").is_err());
    assert!(validate_package("foo.bar_baz").is_ok());
    assert!(validate_package("foo..bar").is_err());

    assert_eq!(to_json_name("foo_bar_baz"), "fooBarBaz");
    assert_eq!(map_entry_name("string_counts"), "StringCountsEntry");
    assert_eq!(map_entry_name("values"), "ValuesEntry");
    assert_eq!(group_message_name("result"), "Result");
    assert_eq!(group_field_name("SearchResult"), "searchresult");
    assert_eq!(with_suffix("foo.proto", 1), "foo_1.proto");
    assert_eq!(with_suffix("foo", 2), "foo_2");
}
