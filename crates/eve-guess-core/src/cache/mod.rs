//! Catalog cache lifecycle.
//!
//! This module provides:
//! - [`CacheBucket`]: one category's entities, name index and memo
//! - [`Catalog`]: the published buckets, swapped atomically
//! - [`SnapshotStore`]: per-category JSON snapshots and the version token
//! - [`CacheRefresher`]: the refresh cycle and its daily schedule

mod atomic;
mod bucket;
mod catalog;
mod refresher;
mod schedule;
mod store;

pub use bucket::CacheBucket;
pub use catalog::Catalog;
pub use refresher::{CacheRefresher, Origin, RefreshHandle, RefreshReport};
pub use schedule::{next_refresh_at, Clock, SystemClock};
pub use store::SnapshotStore;
