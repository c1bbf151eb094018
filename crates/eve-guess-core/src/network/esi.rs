//! ESI implementation of the remote collaborator traits.

use crate::config::NetworkConfig;
use crate::models::{Category, Entity, ServerStatus, TypeInfo};
use crate::network::client::{page_count, HttpClient};
use crate::network::retry::{retry_async, RetryConfig};
use crate::sources::{EntityIdFetcher, NameResolver, TypeMetadataFetcher, VersionProbe};
use crate::{GuessError, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use mini_moka::sync::Cache;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the public ESI endpoints the catalog needs.
pub struct EsiClient {
    http: HttpClient,
    retry: RetryConfig,
    /// Published flags change rarely, and the filter asks for the same
    /// types over and over.
    type_info_cache: Cache<i64, TypeInfo>,
}

impl EsiClient {
    /// Create a client against the default ESI base URL.
    pub fn new() -> Result<Self> {
        Self::with_base_url(NetworkConfig::ESI_BASE_URL)
    }

    /// Create a client against a custom base URL (mirrors, test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            retry: RetryConfig::default(),
            type_info_cache: Cache::builder()
                .time_to_live(NetworkConfig::TYPE_INFO_TTL)
                .max_capacity(NetworkConfig::TYPE_INFO_CACHE_CAPACITY)
                .build(),
        })
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Override how long type metadata stays cached.
    pub fn with_type_info_ttl(mut self, ttl: Duration) -> Self {
        self.type_info_cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(NetworkConfig::TYPE_INFO_CACHE_CAPACITY)
            .build();
        self
    }

    fn ids_path(category: Category) -> &'static str {
        match category {
            Category::Region => "/universe/regions/",
            Category::Constellation => "/universe/constellations/",
            Category::System => "/universe/systems/",
            Category::InventoryType => "/universe/types/",
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, HeaderMap)> {
        let (result, attempts) = retry_async(
            &self.retry,
            || self.http.get_json::<T>(path, query),
            GuessError::is_retryable,
        )
        .await;

        if let Err(e) = &result {
            warn!("Request failed: {} after {} attempt(s): {}", path, attempts, e);
        }
        result
    }

    /// Fetch every page of the type id collection.
    ///
    /// The first page tells us how many there are; the rest are requested
    /// concurrently and appended in page order.
    async fn fetch_type_ids(&self) -> Result<Vec<i64>> {
        let path = Self::ids_path(Category::InventoryType);
        let (mut ids, headers): (Vec<i64>, _) =
            self.fetch(path, &[("page", "1".to_string())]).await?;

        let pages = page_count(&headers);
        debug!("Type id collection has {} page(s)", pages);

        if pages > 1 {
            let rest = try_join_all((2..=pages).map(|page| async move {
                let query = [("page", page.to_string())];
                self.fetch::<Vec<i64>>(path, &query)
                    .await
                    .map(|(ids, _)| ids)
            }))
            .await?;
            ids.extend(rest.into_iter().flatten());
        }

        Ok(ids)
    }
}

#[async_trait]
impl VersionProbe for EsiClient {
    async fn server_version(&self) -> Result<String> {
        let (status, _): (ServerStatus, _) = self.fetch("/status/", &[]).await?;
        Ok(status.server_version)
    }
}

#[async_trait]
impl EntityIdFetcher for EsiClient {
    async fn entity_ids(&self, category: Category) -> Result<Vec<i64>> {
        match category {
            Category::InventoryType => self.fetch_type_ids().await,
            _ => {
                let (ids, _) = self.fetch(Self::ids_path(category), &[]).await?;
                Ok(ids)
            }
        }
    }
}

#[async_trait]
impl NameResolver for EsiClient {
    async fn resolve_names(&self, ids: &[i64]) -> Result<Vec<Entity>> {
        if ids.len() > NetworkConfig::NAMES_BATCH_SIZE {
            return Err(GuessError::Validation {
                field: "ids".to_string(),
                message: format!(
                    "At most {} ids per names request, got {}",
                    NetworkConfig::NAMES_BATCH_SIZE,
                    ids.len()
                ),
            });
        }

        let (result, _) = retry_async(
            &self.retry,
            || self.http.post_json::<_, Vec<Entity>>("/universe/names/", ids),
            GuessError::is_retryable,
        )
        .await;
        result
    }
}

#[async_trait]
impl TypeMetadataFetcher for EsiClient {
    async fn type_info(&self, type_id: i64) -> Result<TypeInfo> {
        if let Some(info) = self.type_info_cache.get(&type_id) {
            return Ok(info);
        }

        let path = format!("/universe/types/{}/", type_id);
        let (info, _): (TypeInfo, _) = self.fetch(&path, &[]).await?;
        self.type_info_cache.insert(type_id, info);
        Ok(info)
    }
}
