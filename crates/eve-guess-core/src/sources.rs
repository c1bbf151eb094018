//! Remote collaborator interfaces consumed by the refresher and the filter.
//!
//! [`crate::network::EsiClient`] implements all of them against ESI; tests
//! substitute in-memory fakes.

use crate::models::{Category, Entity, TypeInfo};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Reports the current remote data generation.
#[async_trait]
pub trait VersionProbe: Send + Sync {
    /// The opaque version token, or an error if the remote is unreachable.
    async fn server_version(&self) -> Result<String>;
}

/// Lists every id in a category.
#[async_trait]
pub trait EntityIdFetcher: Send + Sync {
    async fn entity_ids(&self, category: Category) -> Result<Vec<i64>>;
}

/// Resolves ids to named entities.
///
/// Callers chunk requests; implementations may assume at most
/// [`crate::config::NetworkConfig::NAMES_BATCH_SIZE`] ids per call.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve_names(&self, ids: &[i64]) -> Result<Vec<Entity>>;
}

/// Per-type metadata lookup used by the published filter.
#[async_trait]
pub trait TypeMetadataFetcher: Send + Sync {
    async fn type_info(&self, type_id: i64) -> Result<TypeInfo>;
}

/// Everything a refresh cycle needs from the remote.
pub trait UniverseSource: VersionProbe + EntityIdFetcher + NameResolver {}

impl<T: VersionProbe + EntityIdFetcher + NameResolver> UniverseSource for T {}

pub type DynUniverseSource = Arc<dyn UniverseSource>;
pub type DynTypeMetadata = Arc<dyn TypeMetadataFetcher>;
