//! Drops item types ESI marks as unpublished.

use crate::models::{AsEntity, Category, Entity};
use crate::sources::DynTypeMetadata;
use futures::stream::{self, StreamExt};
use tracing::debug;

/// Eligibility check against ESI type metadata.
///
/// Only `inventory_type` candidates are looked up; a failed lookup counts as
/// unpublished.
pub struct PublishedFilter {
    metadata: DynTypeMetadata,
    max_concurrent: usize,
}

impl PublishedFilter {
    pub fn new(metadata: DynTypeMetadata, max_concurrent: usize) -> Self {
        Self {
            metadata,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn is_published(&self, entity: &Entity) -> bool {
        self.lookup(entity.id, entity.category).await
    }

    async fn lookup(&self, id: i64, category: Category) -> bool {
        if category != Category::InventoryType {
            return true;
        }

        match self.metadata.type_info(id).await {
            Ok(info) => info.published,
            Err(e) => {
                debug!("Treating type {} as unpublished: {}", id, e);
                false
            }
        }
    }

    /// Keep the published candidates, in their original order.
    pub async fn filter<T: AsEntity + Send + Sync>(&self, candidates: Vec<T>) -> Vec<T> {
        if candidates
            .iter()
            .all(|c| c.entity().category != Category::InventoryType)
        {
            return candidates;
        }

        // Owned keys keep the stream free of borrows into `candidates`.
        let keys: Vec<(i64, Category)> = candidates
            .iter()
            .map(|c| (c.entity().id, c.entity().category))
            .collect();
        let keep: Vec<bool> = stream::iter(keys)
            .map(|(id, category)| self.lookup(id, category))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(candidate, keep)| keep.then_some(candidate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TypeInfo;
    use crate::sources::TypeMetadataFetcher;
    use crate::{GuessError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Published flags by id; ids not in the map fail the lookup.
    struct FakeMetadata {
        published: HashMap<i64, bool>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TypeMetadataFetcher for FakeMetadata {
        async fn type_info(&self, type_id: i64) -> Result<TypeInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.published
                .get(&type_id)
                .map(|&published| TypeInfo { type_id, published })
                .ok_or_else(|| GuessError::Upstream {
                    url: format!("/universe/types/{}/", type_id),
                    status: 404,
                })
        }
    }

    fn filter(published: &[(i64, bool)]) -> (PublishedFilter, Arc<FakeMetadata>) {
        let metadata = Arc::new(FakeMetadata {
            published: published.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        });
        (PublishedFilter::new(metadata.clone(), 4), metadata)
    }

    #[tokio::test]
    async fn test_keeps_order_and_drops_unpublished_and_failed() {
        let (filter, _) = filter(&[(1, true), (2, false), (4, true)]);
        let candidates = vec![
            Entity::new(4, "Damage Control II", Category::InventoryType),
            Entity::new(2, "Damage Control Blueprint", Category::InventoryType),
            Entity::new(3, "Damage Control Test", Category::InventoryType),
            Entity::new(1, "Damage Control I", Category::InventoryType),
        ];

        let kept: Vec<i64> = filter
            .filter(candidates)
            .await
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(kept, vec![4, 1]);
    }

    #[tokio::test]
    async fn test_non_type_categories_skip_lookups() {
        let (filter, metadata) = filter(&[]);
        let candidates = vec![
            Entity::new(30000142, "Jita", Category::System),
            Entity::new(10000002, "The Forge", Category::Region),
        ];

        assert_eq!(filter.filter(candidates.clone()).await, candidates);
        assert_eq!(metadata.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_filters_borrowed_candidates() {
        let (filter, _) = filter(&[(1, true)]);
        let owned = vec![
            Entity::new(1, "Tritanium", Category::InventoryType),
            Entity::new(9, "Unknown", Category::InventoryType),
        ];
        let borrowed: Vec<&Entity> = owned.iter().collect();

        let kept = filter.filter(borrowed).await;
        assert_eq!(kept, vec![&owned[0]]);
    }
}
