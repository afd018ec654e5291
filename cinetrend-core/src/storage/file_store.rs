//! File-backed search-count store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::table::CountTable;
use super::{SearchCountStore, StoreError, TrendingEntry};

/// Durable search-count store kept as a JSON table on disk.
///
/// The whole table lives in memory behind one async mutex. Every increment
/// holds the lock across update and persist, writes the table to a sibling
/// temporary file, fsyncs it and renames it over the target, so readers of
/// the file never observe a partial write and concurrent increments never
/// lose an update. A failed write rolls the in-memory change back. An empty
/// table file on open is reported as corrupt rather than read as zero counts.
#[derive(Debug)]
pub struct FileSearchCountStore {
    path: PathBuf,
    temp_path: PathBuf,
    table: Mutex<CountTable>,
}

impl FileSearchCountStore {
    /// Opens the table at `path`, loading existing counts if present.
    ///
    /// Missing parent directories are created. `temp_suffix` names the
    /// sibling file used for atomic replacement.
    ///
    /// # Errors
    ///
    /// - `StoreError::StoreUnavailable` - If the file or its directory cannot be accessed
    /// - `StoreError::Corrupt` - If the file exists but is not a valid table
    pub async fn open(path: impl Into<PathBuf>, temp_suffix: &str) -> Result<Self, StoreError> {
        let path = path.into();
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(temp_suffix);
        let temp_path = PathBuf::from(temp_name);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let table = Self::load(&path).await?;
        tracing::info!(
            "Opened search-count store at {} with {} entries",
            path.display(),
            table.len()
        );

        Ok(Self {
            path,
            temp_path,
            table: Mutex::new(table),
        })
    }

    async fn load(path: &Path) -> Result<CountTable, StoreError> {
        match fs::read(path).await {
            Ok(bytes) if bytes.is_empty() => Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: "table file is empty".to_string(),
            }),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CountTable::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, table: &CountTable) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(table).map_err(|e| StoreError::StoreUnavailable {
            reason: format!("Failed to encode table: {e}"),
        })?;

        let mut file = fs::File::create(&self.temp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&self.temp_path, &self.path).await?;
        self.sync_parent_dir().await
    }

    /// Flushes the directory entry so the rename itself survives a crash.
    #[cfg(unix)]
    async fn sync_parent_dir(&self) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::File::open(parent).await?.sync_all().await?;
        Ok(())
    }

    #[cfg(not(unix))]
    async fn sync_parent_dir(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl SearchCountStore for FileSearchCountStore {
    async fn increment(
        &self,
        item_id: u64,
        search_term: &str,
        poster_url: &str,
    ) -> Result<TrendingEntry, StoreError> {
        let mut table = self.table.lock().await;
        let (entry, undo) = table.increment(item_id, search_term, poster_url, Utc::now());

        if let Err(e) = self.persist(&table).await {
            table.rollback(undo);
            return Err(e);
        }

        Ok(entry)
    }

    async fn top_n(&self, n: usize) -> Result<Vec<TrendingEntry>, StoreError> {
        Ok(self.table.lock().await.top_n(n))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::test;

    use super::*;
    use crate::storage::test_fixtures::create_temp_store_path;

    #[test]
    async fn test_counts_survive_reopen() {
        let (_temp_dir, path) = create_temp_store_path();

        {
            let store = FileSearchCountStore::open(&path, ".tmp").await.unwrap();
            store.increment(550, "fight club", "/a.jpg").await.unwrap();
            store.increment(550, "fight", "/b.jpg").await.unwrap();
            store.increment(13, "forrest", "/c.jpg").await.unwrap();
        }

        let reopened = FileSearchCountStore::open(&path, ".tmp").await.unwrap();
        let top = reopened.top_n(5).await.unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].item_id, 550);
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].search_term, "fight");

        // Revisions continue after reopen, so recency ordering still holds.
        reopened.increment(13, "forrest gump", "/c.jpg").await.unwrap();
        let top = reopened.top_n(5).await.unwrap();
        assert_eq!(top[0].item_id, 13);
    }

    #[test]
    async fn test_open_missing_file_starts_empty() {
        let (_temp_dir, path) = create_temp_store_path();
        let store = FileSearchCountStore::open(path.join("nested/counts.json"), ".tmp")
            .await
            .unwrap();

        assert!(store.top_n(5).await.unwrap().is_empty());
    }

    #[test]
    async fn test_open_corrupt_file_fails() {
        let (_temp_dir, path) = create_temp_store_path();
        std::fs::write(&path, b"{ not json").unwrap();

        let result = FileSearchCountStore::open(&path, ".tmp").await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    async fn test_open_empty_file_is_corrupt_not_reset() {
        let (_temp_dir, path) = create_temp_store_path();
        {
            let store = FileSearchCountStore::open(&path, ".tmp").await.unwrap();
            for _ in 0..3 {
                store.increment(603, "matrix", "/m.jpg").await.unwrap();
            }
        }
        std::fs::File::create(&path).unwrap();

        let result = FileSearchCountStore::open(&path, ".tmp").await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    async fn test_persist_leaves_no_temp_file() {
        let (_temp_dir, path) = create_temp_store_path();
        let store = FileSearchCountStore::open(&path, ".tmp").await.unwrap();
        store.increment(550, "fight club", "/f.jpg").await.unwrap();

        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        assert!(!std::path::Path::new(&temp_name).exists());

        let on_disk: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(on_disk.is_object());
    }

    #[test]
    async fn test_concurrent_increments_are_not_lost() {
        let (_temp_dir, path) = create_temp_store_path();
        let store = Arc::new(FileSearchCountStore::open(&path, ".tmp").await.unwrap());

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .increment(603, &format!("matrix {i}"), "/m.jpg")
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let top = store.top_n(1).await.unwrap();
        assert_eq!(top[0].count, 32);

        let reopened = FileSearchCountStore::open(&path, ".tmp").await.unwrap();
        assert_eq!(reopened.top_n(1).await.unwrap()[0].count, 32);
    }

    #[test]
    async fn test_failed_persist_rolls_back() {
        let (temp_dir, path) = create_temp_store_path();
        let store = FileSearchCountStore::open(&path, ".tmp").await.unwrap();
        store.increment(1, "alien", "/x.jpg").await.unwrap();

        // Removing the directory makes every subsequent write fail.
        drop(temp_dir);

        let result = store.increment(1, "aliens", "/y.jpg").await;
        assert!(matches!(result, Err(StoreError::StoreUnavailable { .. })));

        let top = store.top_n(5).await.unwrap();
        assert_eq!(top[0].count, 1);
        assert_eq!(top[0].search_term, "alien");
    }
}
