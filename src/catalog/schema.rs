//! Declarative shape of a catalog entry.
//!
//! The table here is data only: field names, expected JSON types, whether a
//! field must be present, and a description of each field's predicate. The
//! validator walks `ENTRY_FIELDS` in order and performs every value check.

use crate::catalog::identity::Field;
use serde_json::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// Value constraint applied to a single field.
pub enum FieldKind {
    /// Non-empty string after trimming.
    Text,
    /// Absolute URL with an `http` or `https` scheme and a host.
    HttpUrl,
    /// Array of non-empty strings; duplicates collapse.
    StringSet { min_items: usize },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// Constraint row for one entry field.
pub struct FieldSpec {
    pub field: Field,
    pub kind: FieldKind,
    pub required: bool,
}

pub const ALLOWED_URL_SCHEMES: [&str; 2] = ["http", "https"];

pub const ENTRY_FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        field: Field::Name,
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        field: Field::Description,
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        field: Field::Url,
        kind: FieldKind::HttpUrl,
        required: true,
    },
    // Optional in presence, but an entry without technologies is rejected as
    // an empty set.
    FieldSpec {
        field: Field::Technologies,
        kind: FieldKind::StringSet { min_items: 1 },
        required: false,
    },
    FieldSpec {
        field: Field::Tags,
        kind: FieldKind::StringSet { min_items: 0 },
        required: false,
    },
    FieldSpec {
        field: Field::Vulnerabilities,
        kind: FieldKind::StringSet { min_items: 0 },
        required: false,
    },
];

impl FieldSpec {
    pub fn name(&self) -> &'static str {
        self.field.as_str()
    }

    /// Resolve a raw record key to its constraint row.
    pub fn lookup(key: &str) -> Option<&'static FieldSpec> {
        ENTRY_FIELDS.iter().find(|spec| spec.name() == key)
    }
}

impl FieldKind {
    /// JSON type a conforming value must have.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::HttpUrl => "a string",
            FieldKind::StringSet { .. } => "an array of strings",
        }
    }

    /// Human description of the constraint the validator enforces.
    pub fn predicate(&self) -> &'static str {
        match self {
            FieldKind::Text => "is non-empty string",
            FieldKind::HttpUrl => "is absolute http(s) URL",
            FieldKind::StringSet { min_items: 0 } => "is set of non-empty strings",
            FieldKind::StringSet { .. } => "is non-empty set of non-empty strings",
        }
    }
}

/// Name used in messages for the JSON type of `value`.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_declared_in_validation_order() {
        let names: Vec<&str> = ENTRY_FIELDS.iter().map(FieldSpec::name).collect();
        assert_eq!(
            names,
            vec![
                "name",
                "description",
                "url",
                "technologies",
                "tags",
                "vulnerabilities"
            ]
        );
        let required: Vec<&str> = ENTRY_FIELDS
            .iter()
            .filter(|spec| spec.required)
            .map(FieldSpec::name)
            .collect();
        assert_eq!(required, vec!["name", "description", "url"]);
    }

    #[test]
    fn lookup_resolves_known_keys_only() {
        assert_eq!(FieldSpec::lookup("url").map(|s| s.kind), Some(FieldKind::HttpUrl));
        assert!(FieldSpec::lookup("author").is_none());
        assert_eq!(FieldKind::HttpUrl.type_name(), "a string");
        assert_eq!(
            FieldKind::StringSet { min_items: 1 }.predicate(),
            "is non-empty set of non-empty strings"
        );
    }
}
