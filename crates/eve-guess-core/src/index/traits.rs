//! The approximate-search seam.
//!
//! A `NameIndex` is built once per bucket from exactly the entities in that
//! bucket, and answers with positions into that same list.

use crate::models::Entity;

/// Ranked approximate search over one category's names.
pub trait NameIndex: Send + Sync {
    /// Positions of matching entities, best match first.
    fn search(&self, query: &str) -> Vec<usize>;
}

/// Builds a [`NameIndex`] for a freshly fetched entity list.
pub trait NameIndexBuilder: Send + Sync {
    fn build(&self, entities: &[Entity]) -> Box<dyn NameIndex>;
}
