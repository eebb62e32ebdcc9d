//! Catalog entry schema, validation, and registry.
//!
//! Raw records enter through `validator::validate` (or `Deserialize` on
//! `CatalogEntry`, which routes through it) and come out as immutable
//! entries. `Registry` holds them for lookup by name and by set-field value;
//! `SharedRegistry` is the same store behind a reader/writer lock.

pub mod identity;
pub mod index;
pub mod model;
pub mod registry;
pub mod schema;
pub mod shared;
pub mod validator;

pub use identity::{EntryName, Facet, Field};
pub use index::FacetIndex;
pub use model::CatalogEntry;
pub use registry::{Entries, Registry};
pub use schema::{ENTRY_FIELDS, FieldKind, FieldSpec};
pub use shared::SharedRegistry;
pub use validator::validate;
