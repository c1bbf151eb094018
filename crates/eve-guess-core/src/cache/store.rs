//! On-disk catalog snapshots.
//!
//! Layout of the data directory:
//! - `<category>.json`: array of `{id, name, category}`
//! - `version.txt`: the ESI server version the snapshots were fetched under
//!
//! Anything that cannot be read back is deleted and reported as absent.

use crate::cache::atomic;
use crate::config::CatalogConfig;
use crate::models::{Category, Entity};
use crate::{GuessError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Persisted state for one catalog.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn version_path(&self) -> PathBuf {
        self.data_dir.join(CatalogConfig::VERSION_FILE_NAME)
    }

    pub fn snapshot_path(&self, category: Category) -> PathBuf {
        self.data_dir.join(category.snapshot_file_name())
    }

    /// The version token the current snapshots belong to, if any.
    pub fn read_version(&self) -> Option<String> {
        let path = self.version_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let version = contents.trim_end_matches(['\r', '\n']).to_string();
                (!version.is_empty()).then_some(version)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("The file {} could not be read: {}", path.display(), e);
                self.discard(&path);
                None
            }
        }
    }

    pub fn write_version(&self, version: &str) -> Result<()> {
        atomic::write_bytes(&self.version_path(), version.as_bytes())
    }

    /// Forget the version token so the next cycle re-checks everything.
    pub fn delete_version(&self) -> Result<()> {
        if atomic::remove_if_exists(&self.version_path())? {
            debug!("Deleted {}", self.version_path().display());
        }
        Ok(())
    }

    /// Load a category snapshot.
    ///
    /// Missing, empty and corrupt snapshots all come back as `None`; corrupt
    /// files are deleted on the way.
    pub fn load_snapshot(&self, category: Category) -> Option<Vec<Entity>> {
        let path = self.snapshot_path(category);
        match atomic::read_json::<Vec<Entity>>(&path) {
            Ok(Some(entities)) if !entities.is_empty() => {
                debug!(
                    "Loaded {} {} entities from cache into memory",
                    entities.len(),
                    category
                );
                Some(entities)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Could not load cached {} data: {}", category, e);
                self.discard(&path);
                None
            }
        }
    }

    pub fn save_snapshot(&self, category: Category, entities: &[Entity]) -> Result<()> {
        let path = self.snapshot_path(category);
        atomic::write_json(&path, entities)?;
        debug!(
            "Wrote {} {} entities to cache at {}",
            entities.len(),
            category,
            path.display()
        );
        Ok(())
    }

    /// Run file I/O against this store on the blocking thread pool.
    async fn on_blocking_pool<R, F>(&self, work: F) -> Result<R>
    where
        F: FnOnce(&SnapshotStore) -> R + Send + 'static,
        R: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || work(&store))
            .await
            .map_err(|e| GuessError::Other(format!("Cache file task failed: {}", e)))
    }

    /// [`Self::read_version`] on the blocking thread pool.
    pub async fn read_version_async(&self) -> Option<String> {
        self.on_blocking_pool(|store| store.read_version())
            .await
            .unwrap_or_else(|e| {
                warn!("Reading the cache version token failed: {}", e);
                None
            })
    }

    pub async fn write_version_async(&self, version: String) -> Result<()> {
        self.on_blocking_pool(move |store| store.write_version(&version))
            .await?
    }

    pub async fn delete_version_async(&self) -> Result<()> {
        self.on_blocking_pool(|store| store.delete_version()).await?
    }

    /// [`Self::load_snapshot`] on the blocking thread pool.
    pub async fn load_snapshot_async(&self, category: Category) -> Option<Vec<Entity>> {
        self.on_blocking_pool(move |store| store.load_snapshot(category))
            .await
            .unwrap_or_else(|e| {
                warn!("Loading the {} snapshot failed: {}", category, e);
                None
            })
    }

    /// [`Self::save_snapshot`] on the blocking thread pool.
    pub async fn save_snapshot_async(
        &self,
        category: Category,
        entities: Arc<Vec<Entity>>,
    ) -> Result<()> {
        self.on_blocking_pool(move |store| store.save_snapshot(category, &entities))
            .await?
    }

    fn discard(&self, path: &Path) {
        match atomic::remove_if_exists(path) {
            Ok(true) => warn!("File {} deleted", path.display()),
            Ok(false) => {}
            Err(GuessError::Io { message, .. }) => warn!(
                "The file {} could not be deleted, please delete manually: {}",
                path.display(),
                message
            ),
            Err(e) => warn!("The file {} could not be deleted: {}", path.display(), e),
        }
    }
}
