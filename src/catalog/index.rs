//! Reverse index from set-field values to registry slots.
//!
//! Positions are registry slot numbers. Slots are only ever appended, so each
//! posting list stays sorted and lookups come back in insertion order without
//! a sort. Compaction renumbers slots and rebuilds the index from scratch.

use crate::catalog::identity::Facet;
use crate::catalog::model::CatalogEntry;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
/// Posting lists per facet, keyed by exact value.
pub struct FacetIndex {
    postings: [HashMap<String, Vec<usize>>; 3],
}

impl FacetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every facet value of `entry` at slot `position`.
    ///
    /// `position` must be greater than any slot already indexed.
    pub fn insert(&mut self, position: usize, entry: &CatalogEntry) {
        for facet in Facet::ALL {
            let postings = &mut self.postings[facet.slot()];
            for value in entry.values(facet) {
                let list = postings.entry(value.clone()).or_default();
                debug_assert!(list.last().is_none_or(|last| *last < position));
                list.push(position);
            }
        }
    }

    /// Drop slot `position` from every posting list `entry` appears in.
    pub fn remove(&mut self, position: usize, entry: &CatalogEntry) {
        for facet in Facet::ALL {
            let postings = &mut self.postings[facet.slot()];
            for value in entry.values(facet) {
                let now_empty = match postings.get_mut(value.as_str()) {
                    Some(list) => {
                        if let Ok(at) = list.binary_search(&position) {
                            list.remove(at);
                        }
                        list.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    postings.remove(value.as_str());
                }
            }
        }
    }

    /// Slots whose `facet` set contains exactly `value`, ascending.
    pub fn positions(&self, facet: Facet, value: &str) -> &[usize] {
        self.postings[facet.slot()]
            .get(value)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct values currently indexed for `facet`, sorted.
    pub fn values(&self, facet: Facet) -> Vec<&str> {
        let mut values: Vec<&str> = self.postings[facet.slot()]
            .keys()
            .map(String::as_str)
            .collect();
        values.sort_unstable();
        values
    }

    pub fn clear(&mut self) {
        for postings in &mut self.postings {
            postings.clear();
        }
    }
}
