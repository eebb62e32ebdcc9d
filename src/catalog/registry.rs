//! In-memory registry of validated catalog entries.
//!
//! Entries live in insertion-ordered slots; removal leaves a tombstone that
//! is reclaimed once tombstones outnumber live entries. Names map to slots
//! for O(1) lookup, and `FacetIndex` answers tag/technology/vulnerability
//! queries. Re-registering an existing name is rejected, never overwritten.

use crate::catalog::identity::{EntryName, Facet};
use crate::catalog::index::FacetIndex;
use crate::catalog::model::CatalogEntry;
use crate::error::RegistryError;
use std::collections::HashMap;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default, Clone)]
/// Validated entries keyed by name, iterable in insertion order.
pub struct Registry {
    slots: Vec<Option<Arc<CatalogEntry>>>,
    by_name: HashMap<EntryName, usize>,
    index: FacetIndex,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry by inserting `entries` in order.
    ///
    /// Fails on the first duplicate name; the partially built registry is
    /// discarded.
    pub fn from_entries<I>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut registry = Self::new();
        for entry in entries {
            registry.insert(entry)?;
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Admit a validated entry.
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<(), RegistryError> {
        self.insert_shared(Arc::new(entry))
    }

    pub(crate) fn insert_shared(&mut self, entry: Arc<CatalogEntry>) -> Result<(), RegistryError> {
        if self.by_name.contains_key(entry.name().as_str()) {
            return Err(RegistryError::DuplicateName(entry.name().clone()));
        }
        let position = self.slots.len();
        self.index.insert(position, &entry);
        self.by_name.insert(entry.name().clone(), position);
        debug!(name = %entry.name(), position, "registered catalog entry");
        self.slots.push(Some(entry));
        Ok(())
    }

    /// Remove an entry by name and hand it back.
    pub fn remove(&mut self, name: &str) -> Result<Arc<CatalogEntry>, RegistryError> {
        let position = self
            .by_name
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let entry = self.slots[position]
            .take()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        self.index.remove(position, &entry);
        debug!(name, position, "removed catalog entry");

        if self.tombstones() > self.len() {
            self.compact();
        }
        Ok(entry)
    }

    pub fn get(&self, name: &str) -> Result<&CatalogEntry, RegistryError> {
        self.get_shared(name).map(Arc::as_ref)
    }

    pub(crate) fn get_shared(&self, name: &str) -> Result<&Arc<CatalogEntry>, RegistryError> {
        self.by_name
            .get(name)
            .and_then(|position| self.slots[*position].as_ref())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Entries whose `facet` set contains exactly `value`, in insertion order.
    pub fn find_by(&self, facet: Facet, value: &str) -> Vec<&CatalogEntry> {
        self.find_shared(facet, value).map(Arc::as_ref).collect()
    }

    pub(crate) fn find_shared<'a>(
        &'a self,
        facet: Facet,
        value: &str,
    ) -> impl Iterator<Item = &'a Arc<CatalogEntry>> + 'a {
        self.index
            .positions(facet, value)
            .iter()
            .filter_map(|position| self.slots[*position].as_ref())
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<&CatalogEntry> {
        self.find_by(Facet::Tag, tag)
    }

    pub fn find_by_technology(&self, technology: &str) -> Vec<&CatalogEntry> {
        self.find_by(Facet::Technology, technology)
    }

    pub fn find_by_vulnerability(&self, vulnerability: &str) -> Vec<&CatalogEntry> {
        self.find_by(Facet::Vulnerability, vulnerability)
    }

    /// Lazy walk over every entry in insertion order.
    ///
    /// The iterator is `Clone`, and calling `all()` again starts over.
    pub fn all(&self) -> Entries<'_> {
        Entries {
            slots: self.slots.iter(),
        }
    }

    /// Keyword search with case-insensitive substring matching (OR across
    /// keywords). Blank keywords are ignored.
    pub fn search<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<&CatalogEntry> {
        self.all()
            .filter(|entry| entry.matches_keywords(keywords))
            .collect()
    }

    /// `search` over a comma- or whitespace-delimited query string.
    pub fn search_query(&self, query: &str) -> Vec<&CatalogEntry> {
        self.search(&crate::split_list(query))
    }

    /// Distinct values known for `facet`, sorted.
    pub fn facet_values(&self, facet: Facet) -> Vec<&str> {
        self.index.values(facet)
    }

    pub(crate) fn shared_entries(&self) -> impl Iterator<Item = &Arc<CatalogEntry>> {
        self.slots.iter().flatten()
    }

    fn tombstones(&self) -> usize {
        self.slots.len() - self.by_name.len()
    }

    fn compact(&mut self) {
        let live: Vec<Arc<CatalogEntry>> = self.slots.drain(..).flatten().collect();
        debug!(live = live.len(), "compacting registry slots");
        self.by_name.clear();
        self.index.clear();
        for (position, entry) in live.into_iter().enumerate() {
            self.index.insert(position, &entry);
            self.by_name.insert(entry.name().clone(), position);
            self.slots.push(Some(entry));
        }
    }
}

#[derive(Clone, Debug)]
/// Insertion-ordered iterator returned by [`Registry::all`].
pub struct Entries<'a> {
    slots: std::slice::Iter<'a, Option<Arc<CatalogEntry>>>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = &'a CatalogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().flatten().next().map(Arc::as_ref)
    }
}

impl FusedIterator for Entries<'_> {}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a CatalogEntry;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.all()
    }
}
