use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier of a catalog entry within a registry (e.g. `fastfoodhackings`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryName(pub String);

impl EntryName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields of the persisted entry object, in validation order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Field {
    Name,
    Description,
    Url,
    Technologies,
    Tags,
    Vulnerabilities,
}

/// Set-valued fields the registry indexes for lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Facet {
    Tag,
    Technology,
    Vulnerability,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Description,
        Field::Url,
        Field::Technologies,
        Field::Tags,
        Field::Vulnerabilities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Url => "url",
            Field::Technologies => "technologies",
            Field::Tags => "tags",
            Field::Vulnerabilities => "vulnerabilities",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|field| field.as_str() == key)
    }
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Tag, Facet::Technology, Facet::Vulnerability];

    /// The entry field backing this facet.
    pub fn field(&self) -> Field {
        match self {
            Facet::Tag => Field::Tags,
            Facet::Technology => Field::Technologies,
            Facet::Vulnerability => Field::Vulnerabilities,
        }
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            Facet::Tag => 0,
            Facet::Technology => 1,
            Facet::Vulnerability => 2,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field().as_str())
    }
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Field::from_key(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown entry field '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_round_trips_through_serde() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json.trim_matches('"'), field.as_str());
            let back: Field = serde_json::from_str(&json).unwrap();
            assert_eq!(back, field);
        }

        let err = serde_json::from_str::<Field>("\"author\"").unwrap_err();
        assert!(err.to_string().contains("unknown entry field 'author'"));
    }

    #[test]
    fn facets_map_to_set_fields() {
        assert_eq!(Facet::Tag.field(), Field::Tags);
        assert_eq!(Facet::Technology.field(), Field::Technologies);
        assert_eq!(Facet::Vulnerability.field(), Field::Vulnerabilities);
        assert_eq!(Facet::Technology.to_string(), "technologies");

        let slots: Vec<usize> = Facet::ALL.iter().map(Facet::slot).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn entry_name_is_transparent() {
        let name = EntryName("fastfoodhackings".to_string());
        let serialized = serde_json::to_string(&name).unwrap();
        assert_eq!(serialized, "\"fastfoodhackings\"");
        let parsed: EntryName = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, name);
        let borrowed: &str = name.borrow();
        assert_eq!(borrowed, "fastfoodhackings");
    }
}
