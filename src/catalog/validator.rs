//! Boundary validation from untyped records into `CatalogEntry`.
//!
//! `validate` never stops at the first problem: every field in
//! `ENTRY_FIELDS` is checked in order, then unknown keys are reported, and the
//! caller receives the whole list. Nothing here touches global state.

use crate::catalog::identity::{EntryName, Field};
use crate::catalog::model::CatalogEntry;
use crate::catalog::schema::{
    ALLOWED_URL_SCHEMES, ENTRY_FIELDS, FieldKind, FieldSpec, json_type_name,
};
use crate::error::{ValidationError, ValidationErrors};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use url::Url;

/// Validate a raw record and build an immutable entry from it.
pub fn validate(raw: &Value) -> Result<CatalogEntry, ValidationErrors> {
    let Some(object) = raw.as_object() else {
        return Err(ValidationErrors::new(vec![ValidationError::NotAnObject {
            found: json_type_name(raw),
        }]));
    };

    let mut errors = Vec::new();
    let mut parsed = ParsedFields::default();

    for spec in &ENTRY_FIELDS {
        check_field(spec, object, &mut parsed, &mut errors);
    }

    for key in object.keys() {
        if FieldSpec::lookup(key).is_none() {
            errors.push(ValidationError::UnknownField { key: key.clone() });
        }
    }

    let ParsedFields {
        name,
        description,
        url,
        technologies,
        tags,
        vulnerabilities,
    } = parsed;
    match (name, description, url) {
        (Some(name), Some(description), Some(url)) if errors.is_empty() => {
            Ok(CatalogEntry::from_parts(
                EntryName(name),
                description,
                url,
                technologies,
                tags,
                vulnerabilities,
            ))
        }
        _ => {
            // An unset required slot always has its violation recorded.
            debug_assert!(!errors.is_empty());
            Err(ValidationErrors::new(errors))
        }
    }
}

#[derive(Default)]
struct ParsedFields {
    name: Option<String>,
    description: Option<String>,
    url: Option<Url>,
    technologies: BTreeSet<String>,
    tags: BTreeSet<String>,
    vulnerabilities: BTreeSet<String>,
}

impl ParsedFields {
    fn set_text(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = Some(value),
            Field::Description => self.description = Some(value),
            _ => {}
        }
    }

    fn set_values(&mut self, field: Field, values: BTreeSet<String>) {
        match field {
            Field::Technologies => self.technologies = values,
            Field::Tags => self.tags = values,
            Field::Vulnerabilities => self.vulnerabilities = values,
            _ => {}
        }
    }
}

fn check_field(
    spec: &FieldSpec,
    object: &Map<String, Value>,
    parsed: &mut ParsedFields,
    errors: &mut Vec<ValidationError>,
) {
    let field = spec.field;
    let value = object.get(spec.name()).filter(|value| !value.is_null());

    let Some(value) = value else {
        if spec.required {
            errors.push(ValidationError::Missing { field });
        } else if let FieldKind::StringSet { min_items } = spec.kind {
            if min_items > 0 {
                errors.push(ValidationError::EmptySet { field, min_items });
            }
        }
        return;
    };

    match spec.kind {
        FieldKind::Text => {
            if let Some(text) = check_text(field, value, spec.kind, errors) {
                parsed.set_text(field, text);
            }
        }
        FieldKind::HttpUrl => {
            if let Some(text) = check_text(field, value, spec.kind, errors) {
                parsed.url = check_url(&text, errors);
            }
        }
        FieldKind::StringSet { min_items } => {
            if let Some(values) = check_string_set(field, value, min_items, errors) {
                parsed.set_values(field, values);
            }
        }
    }
}

fn check_text(
    field: Field,
    value: &Value,
    kind: FieldKind,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let Some(text) = value.as_str() else {
        errors.push(ValidationError::WrongType {
            field,
            expected: kind.type_name(),
            found: json_type_name(value),
        });
        return None;
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        errors.push(ValidationError::EmptyString { field });
        return None;
    }
    Some(trimmed.to_string())
}

fn check_url(text: &str, errors: &mut Vec<ValidationError>) -> Option<Url> {
    let url = match Url::parse(text) {
        Ok(url) => url,
        Err(err) => {
            errors.push(ValidationError::MalformedUrl {
                value: text.to_string(),
                reason: err.to_string(),
            });
            return None;
        }
    };
    if !ALLOWED_URL_SCHEMES.contains(&url.scheme()) {
        errors.push(ValidationError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        });
        return None;
    }
    if url.host_str().is_none_or(str::is_empty) {
        errors.push(ValidationError::MalformedUrl {
            value: text.to_string(),
            reason: "missing host".to_string(),
        });
        return None;
    }
    Some(url)
}

fn check_string_set(
    field: Field,
    value: &Value,
    min_items: usize,
    errors: &mut Vec<ValidationError>,
) -> Option<BTreeSet<String>> {
    let Some(items) = value.as_array() else {
        errors.push(ValidationError::WrongType {
            field,
            expected: FieldKind::StringSet { min_items }.type_name(),
            found: json_type_name(value),
        });
        return None;
    };

    let before = errors.len();
    let mut values = BTreeSet::new();
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            errors.push(ValidationError::WrongElementType {
                field,
                index,
                found: json_type_name(item),
            });
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            errors.push(ValidationError::EmptyStringInSet { field, index });
            continue;
        }
        values.insert(trimmed.to_string());
    }

    if errors.len() != before {
        return None;
    }
    if values.len() < min_items {
        errors.push(ValidationError::EmptySet { field, min_items });
        return None;
    }
    Some(values)
}
