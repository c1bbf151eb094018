//! One category's published catalog snapshot.

use crate::index::{NameIndex, NameIndexBuilder};
use crate::models::{Category, Entity};
use crate::resolve::normalize::{char_len, normalize_name};
use mini_moka::sync::Cache;
use std::collections::HashMap;
use tracing::debug;

/// Immutable-after-build snapshot of one category.
///
/// Holds the entities in fetch order, the precomputed name forms the pipeline
/// matches against, the fuzzy index, and the memo of answered queries. The
/// memo belongs to this instance only; a refresh builds a new bucket with an
/// empty one.
pub struct CacheBucket {
    category: Category,
    entities: Vec<Entity>,
    lower_names: Vec<String>,
    normalized_names: Vec<String>,
    positions_by_id: HashMap<i64, usize>,
    index: Box<dyn NameIndex>,
    memo: Cache<String, Option<Entity>>,
    longest_name: usize,
}

impl CacheBucket {
    /// Build a bucket, dropping repeated ids (first occurrence wins).
    pub fn build(
        category: Category,
        entities: Vec<Entity>,
        index_builder: &dyn NameIndexBuilder,
        memo_capacity: u64,
    ) -> Self {
        let fetched = entities.len();
        let mut positions_by_id = HashMap::with_capacity(fetched);
        let mut unique = Vec::with_capacity(fetched);
        for entity in entities {
            if !positions_by_id.contains_key(&entity.id) {
                positions_by_id.insert(entity.id, unique.len());
                unique.push(entity);
            }
        }
        if unique.len() != fetched {
            debug!(
                "Dropped {} duplicate {} ids",
                fetched - unique.len(),
                category
            );
        }

        let lower_names = unique.iter().map(|e| e.name.to_lowercase()).collect();
        let normalized_names = unique.iter().map(|e| normalize_name(&e.name)).collect();
        let longest_name = unique.iter().map(|e| char_len(&e.name)).max().unwrap_or(0);
        let index = index_builder.build(&unique);

        Self {
            category,
            entities: unique,
            lower_names,
            normalized_names,
            positions_by_id,
            index,
            memo: Cache::builder().max_capacity(memo_capacity).build(),
            longest_name,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Length in characters of the longest name in this bucket.
    pub fn longest_name(&self) -> usize {
        self.longest_name
    }

    pub fn get_by_id(&self, id: i64) -> Option<&Entity> {
        self.positions_by_id.get(&id).map(|&p| &self.entities[p])
    }

    pub fn lower_name(&self, position: usize) -> &str {
        &self.lower_names[position]
    }

    pub fn normalized_name(&self, position: usize) -> &str {
        &self.normalized_names[position]
    }

    pub fn index(&self) -> &dyn NameIndex {
        self.index.as_ref()
    }

    /// A previously computed answer: `Some(None)` is a memoized miss.
    pub fn memoized(&self, query: &str) -> Option<Option<Entity>> {
        self.memo.get(&query.to_string())
    }

    pub fn memoize(&self, query: &str, answer: Option<Entity>) {
        self.memo.insert(query.to_string(), answer);
    }
}

impl std::fmt::Debug for CacheBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBucket")
            .field("category", &self.category)
            .field("entities", &self.entities.len())
            .field("longest_name", &self.longest_name)
            .finish()
    }
}
