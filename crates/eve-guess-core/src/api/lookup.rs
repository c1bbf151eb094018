//! Query methods.

use crate::models::{Category, Entity};
use crate::resolve::SHORTCUTS;
use crate::{Guesser, Result};
use std::collections::HashMap;

impl Guesser {
    /// Best catalog entity of `category` for a free-text `query`.
    ///
    /// `Ok(None)` means nothing matched; the only error a loaded catalog
    /// produces is a validation failure.
    pub async fn resolve(&self, category: Category, query: &str) -> Result<Option<Entity>> {
        self.inner.resolver.resolve(category, query).await
    }

    /// Longest name in the published catalog, in characters.
    pub fn longest_known_name_length(&self) -> usize {
        self.inner.catalog.longest_known_name_length()
    }

    /// The abbreviation table, alphabetical by key.
    pub fn shortcuts(&self) -> &'static [(&'static str, &'static str)] {
        SHORTCUTS
    }

    /// Whether every category has a published bucket.
    pub fn is_ready(&self) -> bool {
        self.inner.catalog.is_loaded()
    }

    /// Entity counts per published category.
    pub fn counts(&self) -> HashMap<Category, usize> {
        self.inner.catalog.counts()
    }
}
