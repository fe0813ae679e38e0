//! Directory-backed store: one JSON file per key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::KvStore;
use crate::{Result, ShotTermsError};

/// Durable [`KvStore`] writing each key to `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store files under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default location: `<data dir>/shotterms` (e.g. `~/.local/share/shotterms`).
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(".data"))
            .join("shotterms")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(ShotTermsError::InvalidInput(format!(
                "store key '{key}' must be non-empty ASCII alphanumerics, '.', '_' or '-'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KvStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShotTermsError::StorageDegraded(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ShotTermsError::StorageDegraded(format!(
                "failed to create store dir {}: {e}",
                self.dir.display()
            ))
        })?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, value).await.map_err(|e| {
            ShotTermsError::StorageDegraded(format!(
                "failed to write {}: {e}",
                tmp_path.display()
            ))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            ShotTermsError::StorageDegraded(format!(
                "failed to rename {} → {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShotTermsError::StorageDegraded(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}
