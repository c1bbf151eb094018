//! Shared state behind a [`crate::Guesser`].

use crate::cache::{CacheRefresher, Catalog};
use crate::config::GuessConfig;
use crate::resolve::Resolver;
use std::sync::Arc;

pub(crate) struct GuesserState {
    pub(crate) config: GuessConfig,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) resolver: Resolver,
    pub(crate) refresher: Arc<CacheRefresher>,
}
