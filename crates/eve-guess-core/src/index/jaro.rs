//! Default fuzzy oracle based on Jaro-Winkler similarity.
//!
//! Each name is scored twice: as a whole string against the whole query, and
//! token by token (every query token takes its best-matching name token, the
//! scores are averaged). The better of the two counts, so "navy vexor" still
//! lands on "Vexor Navy Issue".

use crate::index::traits::{NameIndex, NameIndexBuilder};
use crate::models::Entity;
use std::cmp::Ordering;

const DEFAULT_MIN_SIMILARITY: f64 = 0.6;
const DEFAULT_LIMIT: usize = 10;

struct IndexedName {
    lower: String,
    tokens: Vec<String>,
}

/// Jaro-Winkler backed [`NameIndex`].
pub struct JaroWinklerIndex {
    names: Vec<IndexedName>,
    min_similarity: f64,
    limit: usize,
}

impl JaroWinklerIndex {
    fn score(&self, name: &IndexedName, query: &str, query_tokens: &[&str]) -> f64 {
        let whole = strsim::jaro_winkler(query, &name.lower);
        if query_tokens.is_empty() || name.tokens.is_empty() {
            return whole;
        }

        let token_total: f64 = query_tokens
            .iter()
            .map(|q| {
                name.tokens
                    .iter()
                    .map(|t| strsim::jaro_winkler(q, t))
                    .fold(0.0, f64::max)
            })
            .sum();

        whole.max(token_total / query_tokens.len() as f64)
    }
}

impl NameIndex for JaroWinklerIndex {
    fn search(&self, query: &str) -> Vec<usize> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let query_tokens: Vec<&str> = query.split_whitespace().collect();

        let mut scored: Vec<(usize, f64)> = self
            .names
            .iter()
            .enumerate()
            .map(|(position, name)| (position, self.score(name, &query, &query_tokens)))
            .filter(|(_, score)| *score >= self.min_similarity)
            .collect();

        // Stable, so equal scores keep fetch order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(self.limit);
        scored.into_iter().map(|(position, _)| position).collect()
    }
}

/// Builder for [`JaroWinklerIndex`].
#[derive(Debug, Clone)]
pub struct JaroWinklerIndexBuilder {
    min_similarity: f64,
    limit: usize,
}

impl Default for JaroWinklerIndexBuilder {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl JaroWinklerIndexBuilder {
    /// Discard candidates scoring below this similarity (0.0 to 1.0).
    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Maximum number of ranked results returned per search.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }
}

impl NameIndexBuilder for JaroWinklerIndexBuilder {
    fn build(&self, entities: &[Entity]) -> Box<dyn NameIndex> {
        let names = entities
            .iter()
            .map(|entity| {
                let lower = entity.name.to_lowercase();
                let tokens = lower.split_whitespace().map(str::to_string).collect();
                IndexedName { lower, tokens }
            })
            .collect();

        Box::new(JaroWinklerIndex {
            names,
            min_similarity: self.min_similarity,
            limit: self.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn index(names: &[&str]) -> Box<dyn NameIndex> {
        let entities: Vec<Entity> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Entity::new(i as i64, *name, Category::InventoryType))
            .collect();
        JaroWinklerIndexBuilder::default().build(&entities)
    }

    #[test]
    fn test_typo_finds_closest_name() {
        let index = index(&["Jita", "Perimeter", "Amarr"]);
        assert_eq!(index.search("pirimeter").first(), Some(&1));
    }

    #[test]
    fn test_token_order_does_not_matter() {
        let index = index(&["Vexor", "Vexor Navy Issue", "Raven Navy Issue"]);
        assert_eq!(index.search("navy vexor").first(), Some(&1));
    }

    #[test]
    fn test_unrelated_query_has_no_results() {
        let index = index(&["Jita", "Perimeter", "Amarr"]);
        assert!(index.search("xyzxyz").is_empty());
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn test_limit_is_respected() {
        let entities: Vec<Entity> = (0..50)
            .map(|i| Entity::new(i, format!("Jita {}", i), Category::System))
            .collect();
        let index = JaroWinklerIndexBuilder::default()
            .with_limit(3)
            .build(&entities);
        assert_eq!(index.search("jita").len(), 3);
    }
}
