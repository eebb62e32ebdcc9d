//! JSON Schema for the persisted catalog document.
//!
//! The canonical schema ships embedded from `schema/catalog_entry.schema.json`;
//! callers may point at an override file instead. Either way the document must
//! declare a `schema_version` from the allowed set before it is compiled, so a
//! stale or foreign schema cannot silently loosen the load-time check.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const CANONICAL_ENTRY_SCHEMA: &str = include_str!("../schema/catalog_entry.schema.json");
pub const ENTRY_SCHEMA_VERSION: &str = "catalog_entry_v1";

/// Controls how a schema document is checked before compilation.
pub(crate) struct SchemaLoadOptions<'a> {
    /// Where to find the schema_version string inside the schema payload.
    pub schema_version_pointer: &'a str,
    /// Allowed schema_version values; enforced when present.
    pub allowed_versions: Option<&'a BTreeSet<String>>,
}

impl Default for SchemaLoadOptions<'_> {
    fn default() -> Self {
        Self {
            schema_version_pointer: "/schema_version",
            allowed_versions: None,
        }
    }
}

/// Compiled persisted-form schema.
pub struct PersistedSchema {
    pub schema_version: String,
    compiled: JSONSchema,
}

impl fmt::Debug for PersistedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSchema")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

impl PersistedSchema {
    /// The schema embedded in the crate.
    pub fn canonical() -> Result<Self> {
        let value: Value = serde_json::from_str(CANONICAL_ENTRY_SCHEMA)
            .context("parsing embedded catalog entry schema")?;
        compile_schema_value(value, "embedded catalog entry schema", allowed_options())
    }

    /// Load an override schema from disk, or the canonical one when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => load_json_schema(path, allowed_options()),
            None => Self::canonical(),
        }
    }

    /// Check a document, reporting every schema violation at once.
    pub fn check(&self, document: &Value, origin: &str) -> Result<()> {
        if let Err(errors) = self.compiled.validate(document) {
            let details = errors
                .map(|err| format!("  {}: {err}", err.instance_path))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{origin} failed schema validation ({}):\n{details}", self.schema_version);
        }
        Ok(())
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.compiled.is_valid(document)
    }
}

fn allowed_versions() -> &'static BTreeSet<String> {
    static ALLOWED: std::sync::OnceLock<BTreeSet<String>> = std::sync::OnceLock::new();
    ALLOWED.get_or_init(|| BTreeSet::from_iter([ENTRY_SCHEMA_VERSION.to_string()]))
}

fn allowed_options() -> SchemaLoadOptions<'static> {
    SchemaLoadOptions {
        allowed_versions: Some(allowed_versions()),
        ..Default::default()
    }
}

pub(crate) fn load_json_schema(
    path: &Path,
    options: SchemaLoadOptions<'_>,
) -> Result<PersistedSchema> {
    let file = File::open(path).with_context(|| format!("opening schema {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing schema {}", path.display()))?;
    compile_schema_value(value, &path.display().to_string(), options)
}

pub(crate) fn compile_schema_value(
    value: Value,
    origin: &str,
    options: SchemaLoadOptions<'_>,
) -> Result<PersistedSchema> {
    let schema_version = extract_schema_version(&value, options.schema_version_pointer)
        .ok_or_else(|| anyhow!("schema {origin} missing schema_version"))?;

    if let Some(allowed) = options.allowed_versions {
        if !allowed.contains(&schema_version) {
            bail!(
                "schema_version '{}' not in allowed set {:?}",
                schema_version,
                allowed
            );
        }
    }

    let compiled = JSONSchema::compile(&value)
        .map_err(|err| anyhow!("compiling schema {origin}: {err}"))?;

    Ok(PersistedSchema {
        schema_version,
        compiled,
    })
}

fn extract_schema_version(schema: &Value, pointer: &str) -> Option<String> {
    let version = schema.pointer(pointer).and_then(Value::as_str)?;
    if !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[test]
    fn canonical_schema_compiles_and_checks_documents() {
        let schema = PersistedSchema::canonical().unwrap();
        assert_eq!(schema.schema_version, ENTRY_SCHEMA_VERSION);

        let good = json!([{
            "name": "fastfoodhackings",
            "description": "lab",
            "url": "https://www.bugbountytraining.com/fastfoodhackings/",
            "technologies": ["php"],
            "tags": [],
            "vulnerabilities": ["xss"]
        }]);
        assert!(schema.is_valid(&good));
        schema.check(&good, "inline").unwrap();

        let bad = json!([{ "name": "", "url": "ftp://x", "extra": true }]);
        let err = schema.check(&bad, "inline").unwrap_err().to_string();
        assert!(err.contains("inline failed schema validation"));
        assert!(err.lines().count() > 2, "expected several violations: {err}");
    }

    #[test]
    fn rejects_unknown_schema_versions() -> Result<()> {
        let mut value: Value = serde_json::from_str(CANONICAL_ENTRY_SCHEMA)?;
        value["schema_version"] = json!("catalog_entry_v9");
        let file = NamedTempFile::new()?;
        serde_json::to_writer(file.as_file(), &value)?;

        let err = PersistedSchema::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("not in allowed set"));

        value.as_object_mut().unwrap().remove("schema_version");
        let err = compile_schema_value(value, "inline", SchemaLoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("missing schema_version"));
        Ok(())
    }
}
