//! Strongly-typed catalog entry.
//!
//! A `CatalogEntry` can only be produced by the validator (directly, or via
//! `Deserialize`, which routes through it), so holding one means every field
//! constraint already holds. Fields are private and there are no setters:
//! changing an entry means removing it from the registry and inserting a new
//! one.

use crate::catalog::identity::{EntryName, Facet};
use crate::catalog::validator::validate;
use crate::error::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
/// One validated training target.
pub struct CatalogEntry {
    name: EntryName,
    description: String,
    url: Url,
    technologies: BTreeSet<String>,
    tags: BTreeSet<String>,
    vulnerabilities: BTreeSet<String>,
}

impl CatalogEntry {
    pub(crate) fn from_parts(
        name: EntryName,
        description: String,
        url: Url,
        technologies: BTreeSet<String>,
        tags: BTreeSet<String>,
        vulnerabilities: BTreeSet<String>,
    ) -> Self {
        Self {
            name,
            description,
            url,
            technologies,
            tags,
            vulnerabilities,
        }
    }

    pub fn name(&self) -> &EntryName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn technologies(&self) -> &BTreeSet<String> {
        &self.technologies
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn vulnerabilities(&self) -> &BTreeSet<String> {
        &self.vulnerabilities
    }

    /// Values of the set field backing `facet`.
    pub fn values(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Tag => &self.tags,
            Facet::Technology => &self.technologies,
            Facet::Vulnerability => &self.vulnerabilities,
        }
    }

    /// Case-insensitive substring match against the name and every set field.
    ///
    /// Blank keywords are ignored; with no usable keyword nothing matches.
    pub fn matches_keywords<S: AsRef<str>>(&self, keywords: &[S]) -> bool {
        let needles: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if needles.is_empty() {
            return false;
        }

        let haystack: Vec<String> = std::iter::once(self.name.as_str())
            .chain(Facet::ALL.iter().flat_map(|facet| {
                self.values(*facet).iter().map(String::as_str)
            }))
            .map(str::to_lowercase)
            .collect();

        needles
            .iter()
            .any(|needle| haystack.iter().any(|value| value.contains(needle.as_str())))
    }

    /// Serialize into the persisted JSON object form.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl TryFrom<Value> for CatalogEntry {
    type Error = ValidationErrors;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validate(&value)
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name:            {}", self.name)?;
        writeln!(f, "Description:     {}", self.description)?;
        writeln!(f, "URL:             {}", self.url)?;
        writeln!(f, "Technologies:    {}", join(&self.technologies))?;
        writeln!(f, "Tags:            {}", join(&self.tags))?;
        write!(f, "Vulnerabilities: {}", join(&self.vulnerabilities))
    }
}

fn join(values: &BTreeSet<String>) -> String {
    if values.is_empty() {
        return "-".to_string();
    }
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
