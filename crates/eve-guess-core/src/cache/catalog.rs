//! The published set of buckets.
//!
//! Readers clone the `Arc` of the bucket they need and work on that snapshot
//! for the rest of the call; the refresher swaps whole buckets in under a
//! write lock once they are completely built.

use crate::cache::bucket::CacheBucket;
use crate::models::Category;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

#[derive(Default)]
struct Published {
    buckets: HashMap<Category, Arc<CacheBucket>>,
    longest_name: usize,
    published_at: Option<DateTime<Utc>>,
}

/// Currently published catalog, one bucket per category.
#[derive(Default)]
pub struct Catalog {
    published: RwLock<Published>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bucket currently published for `category`.
    pub fn bucket(&self, category: Category) -> Option<Arc<CacheBucket>> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .buckets
            .get(&category)
            .cloned()
    }

    /// Replace buckets atomically and re-derive the longest known name.
    ///
    /// Categories not in `buckets` keep their current bucket.
    pub fn publish(&self, buckets: impl IntoIterator<Item = CacheBucket>) {
        let mut published = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for bucket in buckets {
            info!(
                "Published {} {} entities",
                bucket.len(),
                bucket.category()
            );
            published.buckets.insert(bucket.category(), Arc::new(bucket));
        }

        published.longest_name = published
            .buckets
            .values()
            .map(|b| b.longest_name())
            .max()
            .unwrap_or(0);
        published.published_at = Some(Utc::now());
    }

    /// Maximum name length across every published category.
    pub fn longest_known_name_length(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .longest_name
    }

    /// When buckets were last swapped in.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .published_at
    }

    /// Whether every category has a bucket.
    pub fn is_loaded(&self) -> bool {
        let published = self.published.read().unwrap_or_else(PoisonError::into_inner);
        Category::ALL
            .iter()
            .all(|c| published.buckets.contains_key(c))
    }

    /// Entity counts per published category.
    pub fn counts(&self) -> HashMap<Category, usize> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .buckets
            .iter()
            .map(|(category, bucket)| (*category, bucket.len()))
            .collect()
    }
}
