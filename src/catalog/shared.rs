//! Thread-safe handle over a [`Registry`].
//!
//! Writers (`insert`, `remove`) take the write lock; every query takes the
//! read lock, so readers overlap with each other but never with a writer.
//! Results are `Arc` snapshots and no guard escapes a call.

use crate::catalog::identity::Facet;
use crate::catalog::model::CatalogEntry;
use crate::catalog::registry::Registry;
use crate::error::RegistryError;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug, Default)]
/// Cloneable, shareable registry handle.
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn insert(&self, entry: CatalogEntry) -> Result<(), RegistryError> {
        self.write().insert_shared(Arc::new(entry))
    }

    pub fn remove(&self, name: &str) -> Result<Arc<CatalogEntry>, RegistryError> {
        self.write().remove(name)
    }

    pub fn get(&self, name: &str) -> Result<Arc<CatalogEntry>, RegistryError> {
        self.read().get_shared(name).map(Arc::clone)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains(name)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn find_by(&self, facet: Facet, value: &str) -> Vec<Arc<CatalogEntry>> {
        self.read().find_shared(facet, value).cloned().collect()
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<Arc<CatalogEntry>> {
        self.find_by(Facet::Tag, tag)
    }

    pub fn find_by_technology(&self, technology: &str) -> Vec<Arc<CatalogEntry>> {
        self.find_by(Facet::Technology, technology)
    }

    pub fn find_by_vulnerability(&self, vulnerability: &str) -> Vec<Arc<CatalogEntry>> {
        self.find_by(Facet::Vulnerability, vulnerability)
    }

    pub fn search<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<Arc<CatalogEntry>> {
        self.read()
            .shared_entries()
            .filter(|entry| entry.matches_keywords(keywords))
            .cloned()
            .collect()
    }

    /// Point-in-time copy of every entry, in insertion order.
    pub fn all(&self) -> Vec<Arc<CatalogEntry>> {
        self.read().shared_entries().cloned().collect()
    }

    /// Run `f` against a consistent view of the whole registry.
    pub fn with_read<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        f(&self.read())
    }

    /// Clone out the current registry state.
    pub fn snapshot(&self) -> Registry {
        self.read().clone()
    }

    // Every mutation is a single map/slot update that completes before the
    // guard drops, so a poisoned lock still guards consistent state.
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.write().unwrap_or_else(|err| err.into_inner())
    }
}

impl From<Registry> for SharedRegistry {
    fn from(registry: Registry) -> Self {
        Self::new(registry)
    }
}
