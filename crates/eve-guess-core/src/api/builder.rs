//! Builder for configuring Guesser initialization.

use std::sync::Arc;

use crate::api::GuesserState;
use crate::cache::{CacheRefresher, Catalog, Clock, SnapshotStore};
use crate::config::GuessConfig;
use crate::index::{JaroWinklerIndexBuilder, NameIndexBuilder};
use crate::network::EsiClient;
use crate::resolve::{PublishedFilter, Resolver};
use crate::sources::{DynTypeMetadata, DynUniverseSource};
use crate::{Guesser, Result};

/// Builder for configuring Guesser initialization.
///
/// Collaborators that are not supplied default to a single shared
/// [`EsiClient`] against `config.esi_base_url` and the Jaro-Winkler index.
///
/// # Example
///
/// ```rust,ignore
/// use eve_guess::{Category, Guesser};
///
/// let guesser = Guesser::builder()
///     .data_dir("./data")
///     .refresh_hour_utc(11)
///     .build()?;
/// guesser.refresh_now().await?;
/// let jita = guesser.resolve(Category::System, "jita").await?;
/// ```
pub struct GuesserBuilder {
    config: GuessConfig,
    source: Option<DynUniverseSource>,
    metadata: Option<DynTypeMetadata>,
    index_builder: Option<Arc<dyn NameIndexBuilder>>,
    clock: Option<Arc<dyn Clock>>,
}

impl GuesserBuilder {
    pub fn new() -> Self {
        Self::with_config(GuessConfig::default())
    }

    pub fn with_config(config: GuessConfig) -> Self {
        Self {
            config,
            source: None,
            metadata: None,
            index_builder: None,
            clock: None,
        }
    }

    /// Directory for snapshots and the version token.
    ///
    /// Default: `data`
    pub fn data_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// UTC hour of the daily refresh.
    ///
    /// Default: `12`
    pub fn refresh_hour_utc(mut self, hour: u32) -> Self {
        self.config.refresh_hour_utc = hour;
        self
    }

    /// Use a different universe data source than ESI.
    pub fn with_source(mut self, source: DynUniverseSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Use a different type metadata source than ESI.
    pub fn with_type_metadata(mut self, metadata: DynTypeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Use a different fuzzy name index.
    pub fn with_index_builder(mut self, builder: Arc<dyn NameIndexBuilder>) -> Self {
        self.index_builder = Some(builder);
        self
    }

    /// Drive the refresh schedule from a different clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Wire everything together. No network or disk access happens here.
    pub fn build(self) -> Result<Guesser> {
        let (source, metadata) = match (self.source, self.metadata) {
            (Some(source), Some(metadata)) => (source, metadata),
            (source, metadata) => {
                let esi = Arc::new(EsiClient::with_base_url(&self.config.esi_base_url)?);
                (
                    source.unwrap_or_else(|| esi.clone() as DynUniverseSource),
                    metadata.unwrap_or_else(|| esi.clone() as DynTypeMetadata),
                )
            }
        };
        let index_builder = self
            .index_builder
            .unwrap_or_else(|| Arc::new(JaroWinklerIndexBuilder::default()));

        let catalog = Arc::new(Catalog::new());
        let resolver = Resolver::new(
            catalog.clone(),
            PublishedFilter::new(metadata, self.config.max_concurrent_lookups),
        );

        let mut refresher = CacheRefresher::new(
            source,
            SnapshotStore::new(&self.config.data_dir),
            catalog.clone(),
            index_builder,
        )
        .with_memo_capacity(self.config.memo_capacity)
        .with_refresh_hour(self.config.refresh_hour_utc);
        if let Some(clock) = self.clock {
            refresher = refresher.with_clock(clock);
        }

        Ok(Guesser {
            inner: Arc::new(GuesserState {
                config: self.config,
                catalog,
                resolver,
                refresher: Arc::new(refresher),
            }),
        })
    }
}

impl Default for GuesserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
