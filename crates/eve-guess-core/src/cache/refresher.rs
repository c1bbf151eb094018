//! Cache lifecycle: version check, per-category load or fetch, commit, publish.
//!
//! A cycle either publishes a complete set of buckets or changes nothing the
//! resolver can see. Snapshots and the version token are only written once
//! every category came back non-empty.

use crate::cache::bucket::CacheBucket;
use crate::cache::catalog::Catalog;
use crate::cache::schedule::{next_refresh_at, Clock, SystemClock};
use crate::cache::store::SnapshotStore;
use crate::config::{CatalogConfig, NetworkConfig};
use crate::index::NameIndexBuilder;
use crate::models::{Category, Entity};
use crate::sources::DynUniverseSource;
use crate::{GuessError, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Where a category's entities came from in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Snapshot on disk, paired with the current version token.
    Cache,
    /// Freshly fetched from the remote.
    Remote,
    /// Snapshot on disk used because the remote id list could not be fetched.
    Fallback,
}

/// Summary of a committed cycle.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    /// Version token reported by the probe; `None` when it was unreachable.
    pub version: Option<String>,
    /// Per-category origin and entity count, in [`Category::ALL`] order.
    pub categories: Vec<(Category, Origin, usize)>,
}

impl RefreshReport {
    pub fn origin(&self, category: Category) -> Option<Origin> {
        self.categories
            .iter()
            .find(|(c, _, _)| *c == category)
            .map(|(_, origin, _)| *origin)
    }
}

struct Freshness {
    valid: bool,
    remote_version: Option<String>,
}

struct CategoryOutcome {
    category: Category,
    origin: Origin,
    entities: Arc<Vec<Entity>>,
}

/// Keeps the published catalog in sync with the remote.
pub struct CacheRefresher {
    source: DynUniverseSource,
    store: SnapshotStore,
    catalog: Arc<Catalog>,
    index_builder: Arc<dyn NameIndexBuilder>,
    memo_capacity: u64,
    refresh_hour: u32,
    clock: Arc<dyn Clock>,
}

impl CacheRefresher {
    pub fn new(
        source: DynUniverseSource,
        store: SnapshotStore,
        catalog: Arc<Catalog>,
        index_builder: Arc<dyn NameIndexBuilder>,
    ) -> Self {
        Self {
            source,
            store,
            catalog,
            index_builder,
            memo_capacity: CatalogConfig::DEFAULT_MEMO_CAPACITY,
            refresh_hour: CatalogConfig::DEFAULT_REFRESH_HOUR_UTC,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_memo_capacity(mut self, capacity: u64) -> Self {
        self.memo_capacity = capacity;
        self
    }

    pub fn with_refresh_hour(mut self, hour: u32) -> Self {
        self.refresh_hour = hour;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// When the scheduled loop will next run a cycle, counting from `now`.
    pub fn next_refresh_at(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> chrono::DateTime<chrono::Utc> {
        next_refresh_at(now, self.refresh_hour)
    }

    /// Run one refresh cycle.
    ///
    /// On error the previously published buckets stay live and the version
    /// token is gone, so the next cycle re-checks every category.
    pub async fn run_cycle(&self) -> Result<RefreshReport> {
        info!("Refreshing universe cache in {}", self.store.data_dir().display());
        let freshness = self.check_freshness().await;

        let outcomes = join_all(
            Category::ALL
                .iter()
                .map(|&category| self.resolve_category(category, freshness.valid)),
        )
        .await;

        let empty: Vec<Category> = outcomes
            .iter()
            .filter(|o| o.entities.is_empty())
            .map(|o| o.category)
            .collect();
        if !empty.is_empty() {
            if let Err(e) = self.store.delete_version_async().await {
                warn!("Could not delete the cache version token: {}", e);
            }
            let err = GuessError::RefreshIncomplete { categories: empty };
            error!("{}", err);
            return Err(err);
        }

        let mut token_matches_disk = !outcomes.iter().any(|o| o.origin == Origin::Fallback);
        let saves = join_all(
            outcomes
                .iter()
                .filter(|o| o.origin == Origin::Remote)
                .map(|o| async move {
                    let result = self
                        .store
                        .save_snapshot_async(o.category, o.entities.clone())
                        .await;
                    (o.category, result)
                }),
        )
        .await;
        for (category, result) in saves {
            if let Err(e) = result {
                warn!("Could not persist {} snapshot: {}", category, e);
                token_matches_disk = false;
            }
        }

        let report = RefreshReport {
            version: freshness.remote_version.clone(),
            categories: outcomes
                .iter()
                .map(|o| (o.category, o.origin, o.entities.len()))
                .collect(),
        };

        let buckets: Vec<CacheBucket> = outcomes
            .into_iter()
            .map(|o| {
                let entities =
                    Arc::try_unwrap(o.entities).unwrap_or_else(|shared| shared.as_ref().clone());
                CacheBucket::build(
                    o.category,
                    entities,
                    self.index_builder.as_ref(),
                    self.memo_capacity,
                )
            })
            .collect();
        self.catalog.publish(buckets);

        self.commit_version(freshness.remote_version.as_deref(), token_matches_disk)
            .await;
        info!("Universe cache refreshed");
        Ok(report)
    }

    /// Start the daily refresh loop in the background.
    ///
    /// Each cycle runs in its own task so a panic is contained to that
    /// cycle. The loop stops when the returned handle is stopped or dropped.
    pub fn spawn(self: Arc<Self>) -> RefreshHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            loop {
                let next = self.next_refresh_at(self.clock.now());
                info!("Next universe cache refresh at {}", next);

                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = self.clock.sleep_until(next) => {}
                }

                let refresher = self.clone();
                match tokio::spawn(async move { refresher.run_cycle().await }).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => error!(
                        "An error prevented a cache update, attempting to re-use the old cache: {}",
                        e
                    ),
                    Err(e) => error!(
                        "An error prevented a cache update, attempting to re-use the old cache: {}",
                        e
                    ),
                }
            }
            debug!("Refresh loop stopped");
        });

        RefreshHandle {
            stop: stop_tx,
            task,
        }
    }

    async fn check_freshness(&self) -> Freshness {
        let local = self.store.read_version_async().await;
        match self.source.server_version().await {
            Ok(remote) => {
                let valid = local.as_deref() == Some(remote.as_str());
                if valid {
                    debug!("Cache version {} is current", remote);
                } else {
                    info!(
                        "Cache version {:?} is outdated, ESI reports {}",
                        local, remote
                    );
                }
                Freshness {
                    valid,
                    remote_version: Some(remote),
                }
            }
            Err(e) => {
                warn!("Could not reach ESI, assuming the local cache is valid: {}", e);
                Freshness {
                    valid: true,
                    remote_version: None,
                }
            }
        }
    }

    async fn resolve_category(&self, category: Category, cache_valid: bool) -> CategoryOutcome {
        if cache_valid {
            if let Some(entities) = self.store.load_snapshot_async(category).await {
                return CategoryOutcome {
                    category,
                    origin: Origin::Cache,
                    entities: Arc::new(entities),
                };
            }
        }

        match self.source.entity_ids(category).await {
            Ok(ids) => CategoryOutcome {
                category,
                origin: Origin::Remote,
                entities: Arc::new(self.fetch_names(category, &ids).await),
            },
            Err(e) => {
                warn!(
                    "Could not fetch {} ids, trying the local snapshot: {}",
                    category, e
                );
                CategoryOutcome {
                    category,
                    origin: Origin::Fallback,
                    entities: Arc::new(
                        self.store
                            .load_snapshot_async(category)
                            .await
                            .unwrap_or_default(),
                    ),
                }
            }
        }
    }

    /// Resolve `ids` to names, one batch at a time.
    ///
    /// Any failed batch, or a batch that comes back short, leaves the
    /// category empty.
    async fn fetch_names(&self, category: Category, ids: &[i64]) -> Vec<Entity> {
        let mut entities = Vec::with_capacity(ids.len());
        for batch in ids.chunks(NetworkConfig::NAMES_BATCH_SIZE) {
            match self.source.resolve_names(batch).await {
                Ok(names) => entities.extend(names),
                Err(e) => {
                    warn!("Could not resolve {} names: {}", category, e);
                    return Vec::new();
                }
            }
        }

        if entities.len() != ids.len() {
            warn!(
                "Incomplete {} name data ({} names for {} ids)",
                category,
                entities.len(),
                ids.len()
            );
            return Vec::new();
        }

        for entity in &mut entities {
            entity.category = category;
        }
        debug!("Fetched {} {} entities from ESI", entities.len(), category);
        entities
    }

    async fn commit_version(&self, remote_version: Option<&str>, token_matches_disk: bool) {
        let result = match remote_version {
            // Version check unreachable: leave version.txt as it is.
            None => return,
            Some(version) if token_matches_disk => {
                self.store.write_version_async(version.to_string()).await
            }
            Some(_) => self.store.delete_version_async().await,
        };
        if let Err(e) = result {
            warn!("Could not update the cache version token: {}", e);
        }
    }
}

/// Handle to the background refresh loop started by [`CacheRefresher::spawn`].
#[must_use = "dropping the handle stops the refresh loop"]
pub struct RefreshHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the loop, waiting for an in-flight cycle to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            warn!("Refresh loop ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
