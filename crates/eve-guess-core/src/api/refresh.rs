//! Cache refresh methods.

use crate::cache::{RefreshHandle, RefreshReport};
use crate::{Guesser, Result};
use chrono::{DateTime, Utc};

impl Guesser {
    /// Run one refresh cycle now.
    pub async fn refresh_now(&self) -> Result<RefreshReport> {
        self.inner.refresher.run_cycle().await
    }

    /// Start the daily refresh loop in the background.
    pub fn start_refresh_loop(&self) -> RefreshHandle {
        self.inner.refresher.clone().spawn()
    }

    /// When the daily loop fires next.
    pub fn next_refresh_at(&self) -> DateTime<Utc> {
        self.inner.refresher.next_refresh_at(Utc::now())
    }

    /// When buckets were last published.
    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.catalog.published_at()
    }
}
