//! eve-guess - Headless library that resolves free-text EVE Online names.
//!
//! Users type approximate, abbreviated or punctuation-mangled names ("jit",
//! "bcs ii", "augmented hammer"). This crate keeps a daily-refreshed catalog
//! of regions, constellations, systems and item types fetched from ESI, and
//! runs each query through a cascade of matching stages to pick the single
//! best canonical entity.
//!
//! The HTTP surface lives in the `eve-guess-server` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use eve_guess::{Category, Guesser};
//!
//! #[tokio::main]
//! async fn main() -> eve_guess::Result<()> {
//!     let guesser = Guesser::builder().data_dir("./data").build()?;
//!     guesser.refresh_now().await?;
//!
//!     let jita = guesser.resolve(Category::System, "jit").await?;
//!     println!("{:?}", jita);
//!
//!     let _refresh = guesser.start_refresh_loop();
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod network;
pub mod resolve;
pub mod sources;

mod api;

// Re-export commonly used types
pub use cache::{CacheBucket, CacheRefresher, Catalog, RefreshHandle, RefreshReport, SnapshotStore};
pub use config::GuessConfig;
pub use error::{GuessError, Result};
pub use index::{JaroWinklerIndexBuilder, NameIndex, NameIndexBuilder};
pub use models::{Category, Entity, TypeInfo};
pub use network::EsiClient;
pub use sources::{
    EntityIdFetcher, NameResolver, TypeMetadataFetcher, UniverseSource, VersionProbe,
};

// Re-export builder from api module
pub use api::GuesserBuilder;

use api::GuesserState;
use std::sync::Arc;

/// Main entry point: a catalog, its resolver and its refresher.
///
/// Cheap to clone; clones share the same catalog.
#[derive(Clone)]
pub struct Guesser {
    inner: Arc<GuesserState>,
}

impl Guesser {
    /// Create a builder for Guesser.
    pub fn builder() -> GuesserBuilder {
        GuesserBuilder::new()
    }

    /// Create a Guesser from a runtime config, talking to ESI.
    pub fn new(config: GuessConfig) -> Result<Self> {
        GuesserBuilder::with_config(config).build()
    }

    pub fn config(&self) -> &GuessConfig {
        &self.inner.config
    }

    /// The published catalog.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.inner.catalog
    }
}
